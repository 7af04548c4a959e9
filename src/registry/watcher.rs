//! Directory-registry watcher for collectors.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::directory::{encode_component, EXTENSION};

/// Signals whenever a member of one of the collected selectors is
/// published, replaced or withdrawn in a [`DirectoryRegistry`](super::DirectoryRegistry).
pub struct RegistryWatcher {
    root: PathBuf,
    selectors: Vec<String>,
    change_tx: mpsc::UnboundedSender<()>,
}

impl RegistryWatcher {
    pub fn new(root: &Path, selectors: &[String]) -> (Self, mpsc::UnboundedReceiver<()>) {
        let (change_tx, change_rx) = mpsc::unbounded_channel();

        (
            Self {
                root: root.to_path_buf(),
                selectors: selectors.to_vec(),
                change_tx,
            },
            change_rx,
        )
    }

    /// Start watching. Selector directories are created if they do not
    /// exist yet. The returned watcher must be kept alive for events to flow.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let dirs: Vec<OsString> = self
            .selectors
            .iter()
            .map(|selector| OsString::from(encode_component(selector)))
            .collect();
        for dir in &dirs {
            fs::create_dir_all(self.root.join(dir)).map_err(notify::Error::io)?;
        }

        let tx = self.change_tx.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_access() {
                        return;
                    }

                    let relevant = event.paths.iter().any(|changed| {
                        let is_member = changed.extension().and_then(|ext| ext.to_str()) == Some(EXTENSION);
                        let selector = changed.parent().and_then(Path::file_name);
                        is_member && selector.map_or(false, |dir| dirs.iter().any(|d| d.as_os_str() == dir))
                    });

                    if relevant {
                        tracing::info!(paths = ?event.paths, "Registry change detected");
                        let _ = tx.send(());
                    }
                }
                Err(e) => tracing::error!("Registry watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.root, RecursiveMode::Recursive)?;

        tracing::info!(root = %self.root.display(), selectors = ?self.selectors, "Registry watcher started");
        Ok(watcher)
    }
}
