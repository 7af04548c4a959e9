//! Manifest management subsystem.
//!
//! # Data Flow
//! ```text
//! manifest file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ManifestConfig (validated, immutable)
//!     → catalog::Catalog::compile
//!
//! In watch mode:
//!     watcher.rs detects change
//!     → loader.rs loads new manifest
//!     → validation.rs validates
//!     → manifest handed to the apply loop
//! ```
//!
//! # Design Decisions
//! - All sections have defaults to allow minimal manifests
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::BalancerMemberConfig;
pub use schema::FragmentConfig;
pub use schema::ManifestConfig;
