//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (target, fragment, resource)
//!
//! Consumers:
//!     → logging.rs (stderr, filtered by RUST_LOG or the configured level)
//! ```
//!
//! # Design Decisions
//! - Logs go to stderr so `render` output on stdout stays clean

pub mod logging;
