//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::GatewayConfig;

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<GatewayConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for validated configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<GatewayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    ///
    /// The parent directory is watched so that editors replacing the file by
    /// rename are still picked up. The returned handle must be kept alive for
    /// as long as updates are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let path = self.path.clone();
        let file_name = self.path.file_name().map(|name| name.to_os_string());
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event)
                    if (event.kind.is_modify() || event.kind.is_create())
                        && event
                            .paths
                            .iter()
                            .any(|p| p.file_name() == file_name.as_deref()) =>
                {
                    tracing::info!(path = ?path, "Config file change detected, reloading");
                    match load_config(&path) {
                        Ok(new_config) => {
                            let _ = tx.send(new_config);
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tokio::time::timeout;

    /// Replace the file in one step so the watcher never reads a half-written file.
    fn replace(path: &Path, contents: &str) {
        let staged = path.with_extension("staged");
        fs::write(&staged, contents).unwrap();
        fs::rename(&staged, path).unwrap();
    }

    #[tokio::test]
    async fn test_rewrite_delivers_new_rate_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("intake.toml");
        fs::write(&path, "[rate_limit]\nmax_requests = 5\n").unwrap();

        let (watcher, mut updates) = ConfigWatcher::new(&path);
        let _handle = watcher.run().unwrap();

        replace(&path, "[rate_limit]\nmax_requests = 9\n");

        let config = timeout(Duration::from_secs(5), updates.recv())
            .await
            .expect("no reload within 5s")
            .unwrap();
        assert_eq!(config.rate_limit.max_requests, 9);
    }

    #[tokio::test]
    async fn test_invalid_file_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("intake.toml");
        fs::write(&path, "[rate_limit]\nmax_requests = 5\n").unwrap();

        let (watcher, mut updates) = ConfigWatcher::new(&path);
        let _handle = watcher.run().unwrap();

        replace(&path, "[rate_limit\nmax_requests = ");
        assert!(timeout(Duration::from_millis(500), updates.recv()).await.is_err());

        replace(&path, "[rate_limit]\nmax_requests = 0\n");
        assert!(timeout(Duration::from_millis(500), updates.recv()).await.is_err());

        // the watcher is still alive after rejecting both
        replace(&path, "[rate_limit]\nmax_requests = 7\n");
        let config = timeout(Duration::from_secs(5), updates.recv())
            .await
            .expect("no reload within 5s")
            .unwrap();
        assert_eq!(config.rate_limit.max_requests, 7);
    }
}
