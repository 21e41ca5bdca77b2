/// Abstraction over user-facing output.
///
/// Commands write through this trait instead of `println!` so that tracing
/// (on stderr) and user messages stay separate and commands can be exercised
/// without a terminal.
pub trait UserOutput: Send + Sync {
    /// Informational message (e.g., "Data directory: /opt/app/data")
    fn status(&self, message: &str);

    /// Success message (e.g., "EventStore server stopped")
    fn success(&self, message: &str);

    /// Warning message, written to stderr.
    fn warning(&self, message: &str);

    /// A blank line separator.
    fn blank(&self);
}

/// Standard CLI output.
pub struct CliOutput;

impl UserOutput for CliOutput {
    fn status(&self, message: &str) {
        println!("{}", message);
    }

    fn success(&self, message: &str) {
        println!("\x1b[32m{}\x1b[0m", message);
    }

    fn warning(&self, message: &str) {
        eprintln!("\x1b[33m{}\x1b[0m", message);
    }

    fn blank(&self) {
        println!();
    }
}
