//! Fragment assembly subsystem.
//!
//! # Data Flow
//! ```text
//! Fragment { id, order, body } from many producers
//!     → FragmentSink::register_fragment (per target file)
//!     → concat.rs (ordered by OrderKey, ties by fragment id)
//!     → sync: compare with file on disk, write atomically on change
//!     → reload.rs (run reload command only when content changed)
//! ```

pub mod concat;
pub mod order;
pub mod reload;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use concat::{Concat, SyncOutcome};
pub use order::OrderKey;
pub use reload::ReloadCommand;

/// A named, ordered piece of text contributed to an assembled file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub id: String,
    pub order: OrderKey,
    pub body: String,
}

/// Anything that accepts fragments for a target file.
pub trait FragmentSink {
    /// Registers the fragment `fragment_id` of `target`, replacing an earlier
    /// body registered under the same id and order.
    fn register_fragment(
        &mut self,
        target: &Path,
        fragment_id: &str,
        order: &OrderKey,
        body: &str,
    ) -> Result<(), AssemblyError>;
}

/// Failures reported by the assembler. Callers propagate these unchanged.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// The same fragment id was registered twice with different orders.
    #[error(
        "fragment '{fragment_id}' for {} registered with order '{existing}' and '{requested}'",
        .target.display()
    )]
    ConflictingOrder {
        target: PathBuf,
        fragment_id: String,
        existing: OrderKey,
        requested: OrderKey,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start reload command '{command}': {source}")]
    ReloadSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("reload command '{command}' exited with {status}")]
    Reload { command: String, status: String },
}
