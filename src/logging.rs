//! `tracing` subscriber setup shared by the binaries. Logs go to stderr so that
//! JSON printed on stdout stays machine-readable.

use tracing_subscriber::EnvFilter;

/// Install a formatter honouring `RUST_LOG` (default `info`). Safe to call more than once.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
