//! Structured logging initialisation for the node daemon.
//!
//! Library crates (`ledger`, `consensus`, `wallet_core`, `store`) only ever
//! call the `tracing` macros; only the named-interface daemon entrypoint
//! installs a subscriber, configured from [`bln_types::LoggingConfig`].
//!
//! The filter level can be overridden at runtime via the `RUST_LOG`
//! environment variable. When `RUST_LOG` is not set, `config.level` is used
//! (e.g. `"info"`, `"debug,bln_node=trace"`).

use bln_types::LoggingConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialise the global tracing subscriber from a node's logging config.
///
/// # Panics
///
/// Panics if a global subscriber has already been set (i.e. this function
/// was called twice in the same process).
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .init();
}
