//! In-process fragment assembler.
//!
//! # Responsibilities
//! - Collect fragments per target file
//! - Order them by `OrderKey`, ties broken by fragment id
//! - Write the assembled file only when its content changed
//! - Trigger the reload command after a write
//!
//! # Design Decisions
//! - An id keeps the order it was first registered with; a different order
//!   for the same id is rejected
//! - Writes go to a sibling temp file and are renamed into place

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{AssemblyError, FragmentSink, OrderKey, ReloadCommand};

/// Result of [`Concat::sync`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The file on disk already had the assembled content.
    Unchanged,
    /// The file was written (and the reload command, if any, ran).
    Updated,
}

#[derive(Debug, Clone)]
struct Entry {
    order: OrderKey,
    body: String,
}

/// Collects fragments for any number of target files.
#[derive(Debug, Default)]
pub struct Concat {
    /// Map of target path -> (fragment id -> entry).
    targets: HashMap<PathBuf, HashMap<String, Entry>>,
}

impl Concat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops a fragment. Returns whether it was registered.
    pub fn remove_fragment(&mut self, target: &Path, fragment_id: &str) -> bool {
        self.targets
            .get_mut(target)
            .map(|fragments| fragments.remove(fragment_id).is_some())
            .unwrap_or(false)
    }

    /// Fragment ids of `target` in assembly order.
    pub fn fragment_ids(&self, target: &Path) -> Vec<&str> {
        self.ordered(target).into_iter().map(|(id, _)| id).collect()
    }

    /// Concatenates the fragments of `target` in order. `None` when nothing
    /// was registered for it.
    pub fn assemble(&self, target: &Path) -> Option<String> {
        let fragments = self.ordered(target);
        if fragments.is_empty() {
            return None;
        }

        Some(fragments.into_iter().map(|(_, entry)| entry.body.as_str()).collect())
    }

    /// Brings the file at `target` in line with the assembled content.
    pub fn sync(&self, target: &Path, reload: Option<&ReloadCommand>) -> Result<SyncOutcome, AssemblyError> {
        let content = self.assemble(target).unwrap_or_else(|| {
            tracing::warn!(target = %target.display(), "No fragments registered, target will be empty");
            String::new()
        });

        let current = match fs::read_to_string(target) {
            Ok(current) => Some(current),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(source) => {
                return Err(AssemblyError::Io {
                    path: target.to_path_buf(),
                    source,
                })
            }
        };

        if current.as_deref() == Some(content.as_str()) {
            tracing::debug!(target = %target.display(), "Target already up to date");
            return Ok(SyncOutcome::Unchanged);
        }

        write_atomically(target, &content)?;
        tracing::info!(
            target = %target.display(),
            bytes = content.len(),
            created = current.is_none(),
            "Assembled file written"
        );

        if let Some(reload) = reload {
            reload.run()?;
        }

        Ok(SyncOutcome::Updated)
    }

    fn ordered(&self, target: &Path) -> Vec<(&str, &Entry)> {
        let mut fragments: Vec<(&str, &Entry)> = self
            .targets
            .get(target)
            .map(|fragments| fragments.iter().map(|(id, entry)| (id.as_str(), entry)).collect())
            .unwrap_or_default();

        fragments.sort_by(|(a_id, a), (b_id, b)| a.order.cmp(&b.order).then_with(|| a_id.cmp(b_id)));
        fragments
    }
}

impl FragmentSink for Concat {
    fn register_fragment(
        &mut self,
        target: &Path,
        fragment_id: &str,
        order: &OrderKey,
        body: &str,
    ) -> Result<(), AssemblyError> {
        let fragments = self.targets.entry(target.to_path_buf()).or_default();

        if let Some(existing) = fragments.get_mut(fragment_id) {
            if existing.order != *order {
                return Err(AssemblyError::ConflictingOrder {
                    target: target.to_path_buf(),
                    fragment_id: fragment_id.to_string(),
                    existing: existing.order.clone(),
                    requested: order.clone(),
                });
            }

            existing.body = body.to_string();
            return Ok(());
        }

        fragments.insert(
            fragment_id.to_string(),
            Entry {
                order: order.clone(),
                body: body.to_string(),
            },
        );
        Ok(())
    }
}

fn write_atomically(target: &Path, content: &str) -> Result<(), AssemblyError> {
    let mut temp = target.as_os_str().to_owned();
    temp.push(".balancermember-tmp");
    let temp = PathBuf::from(temp);

    fs::write(&temp, content).map_err(|source| AssemblyError::Io {
        path: temp.clone(),
        source,
    })?;

    fs::rename(&temp, target).map_err(|source| AssemblyError::Io {
        path: target.to_path_buf(),
        source,
    })
}
