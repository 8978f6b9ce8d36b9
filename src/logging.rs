//! Logging setup shared by the binaries.  The library itself only emits `tracing` events.
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;

/// Map a `-v` count onto a default filter directive
pub fn directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// `RUST_LOG` when set, otherwise the filter for `verbosity`
pub fn filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive(verbosity)))
}

/// A subscriber that logs to stderr
pub fn subscriber(filter: EnvFilter) -> impl Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish()
}

/// Install the stderr subscriber globally
pub fn init(verbosity: u8) {
    // Fails only if a subscriber is already installed, which is fine.
    let _ = tracing::subscriber::set_global_default(subscriber(filter(verbosity)));
}
