//! Manifest file watcher for re-evaluation on change.

use std::path::{Path, PathBuf};
use std::time::Duration;
use notify::{Watcher, RecursiveMode, Event, RecommendedWatcher, Config};
use tokio::sync::mpsc;
use crate::config::loader::load_config;
use crate::config::schema::ManifestConfig;

/// A watcher that monitors the manifest for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<ManifestConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for validated manifests.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<ManifestConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (Self {
            path: path.to_path_buf(),
            update_tx,
        }, update_rx)
    }

    /// Start watching in a background thread. The returned watcher must be
    /// kept alive for events to keep flowing.
    ///
    /// The parent directory is watched rather than the file itself so that
    /// editors replacing the file by rename are still noticed.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();
        let file_name = self.path.file_name().map(|name| name.to_os_string());

        let mut watcher = RecommendedWatcher::new(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    let relevant = (event.kind.is_modify() || event.kind.is_create())
                        && event.paths.iter().any(|changed| changed.file_name() == file_name.as_deref());
                    if !relevant {
                        return;
                    }

                    tracing::info!(path = %path.display(), "Manifest change detected, reloading");
                    match load_config(&path) {
                        Ok(manifest) => {
                            let _ = tx.send(manifest);
                        }
                        Err(e) => {
                            tracing::error!("Failed to reload manifest: {}. Keeping current target.", e);
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            }
        }, Config::default().with_poll_interval(Duration::from_secs(2)))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Manifest watcher started");
        Ok(watcher)
    }
}
