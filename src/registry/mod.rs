//! Export/collect registries.
//!
//! # Data Flow
//! ```text
//! Producer host:
//!     manifest → BalancerMemberRequest (facts resolved locally)
//!     → Registry::publish(listening_service, ExportedMember)
//!
//! Collector host:
//!     Registry::query_all(listening_service)
//!     → member::evaluate → Concat
//! ```
//!
//! # Design Decisions
//! - Members are exported with facts already resolved; the collector never
//!   substitutes its own hostname or address
//! - `query_all` returns members sorted by name
//! - `MemoryRegistry` is immediately consistent; `DirectoryRegistry` shows a
//!   collector whatever has been published to the directory at query time

pub mod directory;
pub mod memory;
pub mod watcher;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::member::BalancerMemberRequest;

pub use directory::DirectoryRegistry;
pub use memory::MemoryRegistry;
pub use watcher::RegistryWatcher;

/// A member published by one host for collection by another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedMember {
    /// Hostname of the exporting host, for diagnostics only.
    pub exported_by: String,

    pub request: BalancerMemberRequest,
}

impl ExportedMember {
    pub fn new(exported_by: impl Into<String>, request: BalancerMemberRequest) -> Self {
        Self {
            exported_by: exported_by.into(),
            request,
        }
    }
}

/// Store through which members declared on many hosts become visible to a
/// collector. Selectors are listening-service names.
pub trait Registry {
    /// Publishes `member` under `selector`, replacing an earlier member of
    /// the same name.
    fn publish(&mut self, selector: &str, member: ExportedMember) -> Result<(), RegistryError>;

    /// Removes the member `name` from `selector`. Returns whether it existed.
    fn withdraw(&mut self, selector: &str, name: &str) -> Result<bool, RegistryError>;

    /// All members currently published under `selector`, sorted by name.
    fn query_all(&self, selector: &str) -> Result<Vec<ExportedMember>, RegistryError>;
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed registry entry {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
