//! Logging initialization and configuration.
//!
//! # Configuration
//!
//! The log level can be controlled via the `RUST_LOG` environment variable:
//! - `RUST_LOG=debug` - Show debug and higher level logs
//! - `RUST_LOG=info` - Show info and higher level logs (default)
//! - `RUST_LOG=warn` - Show warnings and errors only
//! - `RUST_LOG=error` - Show errors only

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging system.
///
/// Logs go to stderr so tool output on stdout stays machine-readable.
/// The log level is controlled by the `RUST_LOG` environment variable,
/// defaulting to `info` if not set.
pub fn init_logging() {
    // Configure environment filter
    // Default to "info" level if RUST_LOG is not set
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);  // Include module path

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}
