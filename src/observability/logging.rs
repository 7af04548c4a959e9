//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Honour `RUST_LOG` when set, else the configured level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber. Calling it again is a no-op.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("balancermember={}", level)));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();

    if result.is_ok() {
        tracing::debug!(level = %level, "Logging initialized");
    }
}
