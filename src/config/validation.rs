//! Manifest validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Required member parameters present and well formed
//! - Fragment ids unique per target
//! - Static fragments name exactly one body source
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ManifestConfig → Result<(), Vec<ValidationError>>
//! - Array lengths are checked at evaluation time, not here

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::ManifestConfig;
use crate::member::{fragment_id, request::required_parameters, MemberError};

/// A single semantic problem in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Member(#[from] MemberError),

    #[error("balancermember #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("fragment '{name}' must set exactly one of 'content' or 'source'")]
    FragmentBody { name: String },

    #[error("fragment id '{id}' is declared more than once")]
    DuplicateFragment { id: String },

    #[error("output.target must not be empty")]
    EmptyTarget,

    #[error("registry.collect is set but registry.path is not")]
    CollectWithoutRegistry,
}

pub fn validate_config(config: &ManifestConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    if config.output.target.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyTarget);
    }

    if !config.registry.collect.is_empty() && config.registry.path.is_none() {
        errors.push(ValidationError::CollectWithoutRegistry);
    }

    for fragment in &config.fragments {
        if fragment.content.is_some() == fragment.source.is_some() {
            errors.push(ValidationError::FragmentBody {
                name: fragment.name.clone(),
            });
        }

        if !ids.insert(fragment.name.clone()) {
            errors.push(ValidationError::DuplicateFragment {
                id: fragment.name.clone(),
            });
        }
    }

    for (index, member) in config.balancermembers.iter().enumerate() {
        if member.name.trim().is_empty() {
            errors.push(ValidationError::EmptyName { index });
            continue;
        }

        match required_parameters(member) {
            Ok((listening_service, _)) => {
                let id = fragment_id(&listening_service, &member.name);
                if !ids.insert(id.clone()) {
                    errors.push(ValidationError::DuplicateFragment { id });
                }
            }
            Err(e) => errors.push(e.into()),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
