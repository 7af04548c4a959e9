//! Crate-level error type.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::fragment::AssemblyError;
use crate::member::MemberError;
use crate::registry::RegistryError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Member(#[from] MemberError),

    /// One or more requests failed to evaluate. Nothing was submitted.
    #[error("evaluation failed: {}", join(.0))]
    Evaluation(Vec<MemberError>),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("failed to read fragment source {}: {source}", .path.display())]
    FragmentSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no registry configured (set registry.path)")]
    NoRegistry,
}

/// Result type for crate operations.
pub type Result<T> = std::result::Result<T, Error>;

fn join(errors: &[MemberError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
