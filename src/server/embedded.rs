use super::{ServerInstance, ServerKind};
use crate::engine::{EmbeddedEngine, EmbeddedNode, NodeConfig};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Interval between readiness polls while waiting on a start timeout.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// An embedded node owned by a runner.
pub struct EmbeddedServer {
    node: Option<Box<dyn EmbeddedNode>>,
    config: NodeConfig,
}

impl EmbeddedServer {
    /// Build the node for `config` and start it.
    ///
    /// With a `start_timeout`, also waits for [`EmbeddedNode::is_ready`]; a
    /// node that does not become ready in time is stopped again and the
    /// start fails with [`Error::Timeout`].
    #[tracing::instrument(skip(engine, config), fields(node = %config))]
    pub async fn start(
        engine: &dyn EmbeddedEngine,
        config: NodeConfig,
        start_timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut node = engine.build(config.clone()).await?;
        node.start().await?;
        tracing::debug!("Embedded node started");

        if let Some(timeout) = start_timeout {
            if let Err(e) = wait_until_ready(node.as_ref(), timeout).await {
                if let Err(stop_err) = node.stop().await {
                    tracing::warn!("Failed to stop embedded node after start timeout: {}", stop_err);
                }
                return Err(e);
            }
            tracing::debug!("Embedded node ready");
        }

        Ok(Self {
            node: Some(node),
            config,
        })
    }
}

async fn wait_until_ready(node: &dyn EmbeddedNode, timeout: Duration) -> Result<()> {
    let poll = async {
        while !node.is_ready().await {
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    };
    tokio::time::timeout(timeout, poll)
        .await
        .map_err(|_| Error::Timeout(timeout))
}

#[async_trait]
impl ServerInstance for EmbeddedServer {
    fn kind(&self) -> ServerKind {
        ServerKind::Embedded
    }

    #[tracing::instrument(skip(self), fields(node = %self.config))]
    async fn stop(&mut self) -> Result<()> {
        let Some(mut node) = self.node.take() else {
            return Ok(());
        };
        node.stop().await?;
        tracing::debug!("Embedded node stopped");
        Ok(())
    }
}

impl Drop for EmbeddedServer {
    fn drop(&mut self) {
        // Dropped without stop(): nobody else owns the node, so stop it on
        // the current runtime. Without a runtime there is nothing to run it on.
        let Some(mut node) = self.node.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let config = self.config.to_string();
                handle.spawn(async move {
                    match node.stop().await {
                        Ok(()) => tracing::debug!("Embedded node stopped after drop ({})", config),
                        Err(e) => tracing::warn!("Failed to stop dropped embedded node ({}): {}", config, e),
                    }
                });
            }
            Err(_) => {
                tracing::warn!(
                    "Embedded node ({}) dropped outside a tokio runtime; it was not stopped",
                    self.config
                );
            }
        }
    }
}
