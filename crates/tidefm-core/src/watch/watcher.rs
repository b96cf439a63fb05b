//! Polling directory watcher.

use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::WatcherConfig;
use crate::error::{CoreError, CoreResult};
use crate::event::ChangeEvent;
use crate::fs::ops::FileSystem;
use crate::outcome::Outcome;
use crate::watch::snapshot::Snapshot;

/// Samples a directory tree at a fixed interval and reports what changed
/// between consecutive samples.
///
/// Each watcher is independent; run one per watched root. Cancellation is
/// only observed during the delay between samples, so a snapshot in progress
/// always completes first.
pub struct DirectoryWatcher {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
    interval: Duration,
    detect_moves: bool,
}

impl DirectoryWatcher {
    pub fn new(root: impl Into<PathBuf>, fs: Arc<dyn FileSystem>, config: &WatcherConfig) -> Self {
        Self {
            root: root.into(),
            fs,
            interval: config.interval(),
            detect_moves: config.detect_moves,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Runs the watcher on the current tokio runtime.
    pub fn spawn(
        self,
        events: Sender<ChangeEvent>,
        cancel: CancellationToken,
    ) -> JoinHandle<Outcome> {
        tokio::spawn(self.run(events, cancel))
    }

    /// Samples until cancelled, sending every change to `events`.
    ///
    /// Returns Ok when cancelled or when the receiving side of `events` is
    /// gone. A failed snapshot, including the initial one, stops the watcher
    /// and is returned as the error.
    pub async fn run(self, events: Sender<ChangeEvent>, cancel: CancellationToken) -> Outcome {
        tracing::debug!("watcher {}: sampling initial snapshot", self.root.display());
        let mut previous = match self.sample().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("watcher {}: initial snapshot failed: {e}", self.root.display());
                return e.into();
            }
        };

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("watcher {}: cancelled", self.root.display());
                    return Outcome::ok();
                }
                _ = tokio::time::sleep(self.interval) => {}
            }

            let current = match self.sample().await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::warn!("watcher {}: snapshot failed, stopping: {e}", self.root.display());
                    return e.into();
                }
            };

            let changes = previous.diff(&current, self.detect_moves);
            previous = current;
            if !changes.is_empty() {
                tracing::debug!("watcher {}: {} change(s)", self.root.display(), changes.len());
            }
            for change in changes {
                if events.send(change).is_err() {
                    tracing::debug!("watcher {}: receiver dropped", self.root.display());
                    return Outcome::ok();
                }
            }
        }
    }

    async fn sample(&self) -> CoreResult<Snapshot> {
        let fs = Arc::clone(&self.fs);
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || Snapshot::capture(fs.as_ref(), &root))
            .await
            .map_err(|e| {
                if e.is_cancelled() {
                    CoreError::Cancelled
                } else {
                    CoreError::Io(std::io::Error::other(e.to_string()))
                }
            })?
    }
}
