//! Debounced file watching for hot reload.
//!
//! The debouncer thread only sends [`ReloadRequest`]s; the render loop drains
//! them once per tick and performs the reload itself.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;

use anyhow::Context;
use notify_debouncer_mini::notify::{RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};
use tracing::{debug, warn};

use crate::error::{DeckError, DeckResult};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReloadRequest {
    pub paths: Vec<PathBuf>,
}

impl ReloadRequest {
    fn merge(&mut self, other: ReloadRequest) {
        for path in other.paths {
            if !self.paths.contains(&path) {
                self.paths.push(path);
            }
        }
    }
}

/// Watches a deck file (or a directory of them). Dropping the watcher stops
/// the background thread.
pub struct DeckWatcher {
    _debouncer: Debouncer<RecommendedWatcher>,
    rx: Receiver<ReloadRequest>,
    target: PathBuf,
}

impl DeckWatcher {
    pub fn new(path: impl AsRef<Path>) -> DeckResult<Self> {
        Self::with_debounce(path, DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(path: impl AsRef<Path>, debounce: Duration) -> DeckResult<Self> {
        let target = std::fs::canonicalize(path.as_ref())
            .map_err(|e| DeckError::io(path.as_ref(), e))?;

        // Editors often save by renaming over the file, which a watch on
        // the file itself would lose. Watch the parent and filter instead.
        let (dir, file, mode) = if target.is_dir() {
            (target.clone(), None, RecursiveMode::Recursive)
        } else {
            let dir = target
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            (dir, Some(target.clone()), RecursiveMode::NonRecursive)
        };

        let (tx, rx) = mpsc::channel();
        let mut debouncer = new_debouncer(debounce, move |result: DebounceEventResult| {
            match result {
                Ok(events) => {
                    let paths: Vec<PathBuf> = events
                        .into_iter()
                        .map(|e| e.path)
                        .filter(|p| is_relevant(p, file.as_deref()))
                        .collect();
                    if !paths.is_empty() {
                        debug!(?paths, "deck source changed");
                        // The receiver is gone once the presentation ends.
                        let _ = tx.send(ReloadRequest { paths });
                    }
                }
                Err(err) => warn!(error = %err, "file watcher error"),
            }
        })
        .context("failed to start file watcher")?;

        debouncer
            .watcher()
            .watch(&dir, mode)
            .with_context(|| format!("failed to watch {}", dir.display()))?;
        debug!(path = %target.display(), "watching");

        Ok(Self {
            _debouncer: debouncer,
            rx,
            target,
        })
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn try_recv(&self) -> Option<ReloadRequest> {
        match self.rx.try_recv() {
            Ok(request) => Some(request),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Everything queued since the last call, merged into one request.
    pub fn drain(&self) -> Option<ReloadRequest> {
        let mut merged: Option<ReloadRequest> = None;
        while let Some(request) = self.try_recv() {
            match merged.as_mut() {
                Some(m) => m.merge(request),
                None => merged = Some(request),
            }
        }
        merged
    }

    #[cfg(test)]
    fn recv_timeout(&self, timeout: Duration) -> Option<ReloadRequest> {
        self.rx.recv_timeout(timeout).ok()
    }
}

/// With a file target only that file counts. For a directory, anything
/// below it does except hidden files and editor backups.
fn is_relevant(path: &Path, file: Option<&Path>) -> bool {
    match file {
        Some(file) => path == file || path.file_name() == file.file_name(),
        None => path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| {
                !name.starts_with('.') && !name.ends_with('~') && !name.ends_with(".swp")
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Instant;

    #[test]
    fn relevance_filter() {
        let file = Path::new("/talks/deck.md");
        assert!(is_relevant(Path::new("/talks/deck.md"), Some(file)));
        assert!(!is_relevant(Path::new("/talks/notes.md"), Some(file)));
        assert!(is_relevant(Path::new("/talks/notes.MD"), None));
        assert!(is_relevant(Path::new("/talks/assets/chart.txt"), None));
        assert!(!is_relevant(Path::new("/talks/.deck.md.swp"), None));
        assert!(!is_relevant(Path::new("/talks/deck.md~"), None));
    }

    #[test]
    fn requests_merge_without_duplicates() {
        let mut a = ReloadRequest {
            paths: vec![PathBuf::from("a.md")],
        };
        a.merge(ReloadRequest {
            paths: vec![PathBuf::from("a.md"), PathBuf::from("b.md")],
        });
        assert_eq!(a.paths, vec![PathBuf::from("a.md"), PathBuf::from("b.md")]);
    }

    #[test]
    fn missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DeckWatcher::new(dir.path().join("nope.md")).err().unwrap();
        assert!(matches!(err, DeckError::Io { .. }));
    }

    #[test]
    fn edits_produce_a_reload_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.md");
        fs::write(&path, "# One").unwrap();
        let watcher = DeckWatcher::with_debounce(&path, Duration::from_millis(50)).unwrap();
        assert!(watcher.drain().is_none());

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut received = None;
        let mut n = 0;
        while received.is_none() && Instant::now() < deadline {
            n += 1;
            fs::write(&path, format!("# Edit {n}")).unwrap();
            received = watcher.recv_timeout(Duration::from_millis(500));
        }
        let request = received.expect("no reload request");
        assert!(request.paths.iter().all(|p| p.file_name() == path.file_name()));
    }

    #[test]
    fn directory_targets_see_nested_edits() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("parts/intro");
        fs::create_dir_all(&nested).unwrap();
        let path = nested.join("part.md");
        fs::write(&path, "# One").unwrap();
        let watcher = DeckWatcher::with_debounce(dir.path(), Duration::from_millis(50)).unwrap();

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut seen = false;
        let mut n = 0;
        while !seen && Instant::now() < deadline {
            n += 1;
            fs::write(&path, format!("# Edit {n}")).unwrap();
            if let Some(request) = watcher.recv_timeout(Duration::from_millis(500)) {
                seen = request.paths.iter().any(|p| p.file_name() == path.file_name());
            }
        }
        assert!(seen, "no reload request for a nested file");
    }
}
