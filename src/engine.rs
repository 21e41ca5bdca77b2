//! The seam to an in-process database engine.
//!
//! The runner does not contain a database. Hosts that want the embedded mode
//! supply an [`EmbeddedEngine`] that turns a [`NodeConfig`] into a running
//! [`EmbeddedNode`]; everything inside the node is the engine's business.

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;

/// Which projections the node runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionsMode {
    None,
    System,
    #[default]
    All,
}

/// Where the node keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageMode {
    InMemory,
    /// Rooted at an already resolved data directory.
    OnDisk(PathBuf),
}

/// Network endpoints the node binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoints {
    pub tcp: SocketAddr,
    pub http: SocketAddr,
}

impl Default for Endpoints {
    /// Loopback on the engine's standard ports.
    fn default() -> Self {
        Self {
            tcp: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 1113)),
            http: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 2113)),
        }
    }
}

/// Everything the engine is told about the node it should build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    pub cluster_size: usize,
    pub projections: ProjectionsMode,
    pub endpoints: Endpoints,
    pub storage: StorageMode,
}

impl NodeConfig {
    /// Single node, all projections, default endpoints.
    pub fn single_node(storage: StorageMode) -> Self {
        Self {
            cluster_size: 1,
            projections: ProjectionsMode::All,
            endpoints: Endpoints::default(),
            storage,
        }
    }
}

impl fmt::Display for NodeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let storage = match &self.storage {
            StorageMode::InMemory => "in-memory".to_string(),
            StorageMode::OnDisk(path) => format!("on-disk at {}", path.display()),
        };
        write!(
            f,
            "{}-node, projections {:?}, tcp {}, http {}, {}",
            self.cluster_size, self.projections, self.endpoints.tcp, self.endpoints.http, storage
        )
    }
}

/// Builds embedded nodes. Implemented by the host around its engine.
#[async_trait]
pub trait EmbeddedEngine: Send + Sync {
    /// Build a node for `config` without starting it.
    async fn build(&self, config: NodeConfig) -> Result<Box<dyn EmbeddedNode>>;
}

/// A node running inside the host process.
#[async_trait]
pub trait EmbeddedNode: Send + Sync {
    /// Instruct the node to start. May return before the node is serving.
    async fn start(&mut self) -> Result<()>;

    /// Instruct the node to stop and wait for it to release its storage.
    async fn stop(&mut self) -> Result<()>;

    /// Whether the node is accepting requests.
    ///
    /// Only polled when a start timeout is configured. Engines without a
    /// readiness signal can keep the default.
    async fn is_ready(&self) -> bool {
        true
    }
}
