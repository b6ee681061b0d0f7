// SPDX-License-Identifier: MIT OR Apache-2.0
//! File system watcher for spreadsheets backing loaded models.
//!
//! Debounced events are forwarded to the session loop, which re-ingests the
//! affected models.

use crate::config::SessionConfig;
use notify_debouncer_full::{
    new_debouncer,
    notify::{self, EventKind, RecommendedWatcher, RecursiveMode},
    DebounceEventResult, Debouncer, RecommendedCache,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Events emitted by the file watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    /// A file was created or modified
    Changed(PathBuf),
    /// A file was deleted
    Deleted(PathBuf),
    /// An error occurred
    Error(String),
}

/// Configuration for the file watcher
#[derive(Debug, Clone)]
pub struct FileWatcherConfig {
    /// Debounce duration for events
    pub debounce_duration: Duration,
    /// File extensions to watch (empty = watch all)
    pub extensions: HashSet<String>,
}

impl Default for FileWatcherConfig {
    fn default() -> Self {
        Self {
            debounce_duration: Duration::from_millis(250),
            extensions: HashSet::new(),
        }
    }
}

impl From<&SessionConfig> for FileWatcherConfig {
    fn from(config: &SessionConfig) -> Self {
        Self {
            debounce_duration: config.debounce(),
            extensions: config.extensions.iter().map(|e| e.to_lowercase()).collect(),
        }
    }
}

impl FileWatcherConfig {
    /// Whether a path passes the extension filter
    pub fn accepts(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.contains(&e.to_lowercase()))
            .unwrap_or(false)
    }
}

/// Watches the directories holding loaded spreadsheets
pub struct FileWatcher {
    /// The underlying debounced watcher
    watcher: Debouncer<RecommendedWatcher, RecommendedCache>,
    /// Watched directories
    watched_dirs: HashSet<PathBuf>,
}

impl FileWatcher {
    /// Create a watcher that forwards events to `events`
    pub fn new(config: FileWatcherConfig, events: UnboundedSender<FileEvent>) -> Result<Self, notify::Error> {
        let filter = config.clone();
        let watcher = new_debouncer(
            config.debounce_duration,
            None,
            move |result: DebounceEventResult| match result {
                Ok(events_batch) => {
                    for event in events_batch {
                        let paths = event.paths.iter().filter(|p| filter.accepts(p)).cloned();
                        match event.kind {
                            EventKind::Create(_) | EventKind::Modify(_) => {
                                for path in paths {
                                    let _ = events.send(FileEvent::Changed(path));
                                }
                            }
                            EventKind::Remove(_) => {
                                for path in paths {
                                    let _ = events.send(FileEvent::Deleted(path));
                                }
                            }
                            EventKind::Any | EventKind::Access(_) | EventKind::Other => {}
                        }
                    }
                }
                Err(errors) => {
                    for error in errors {
                        let _ = events.send(FileEvent::Error(error.to_string()));
                    }
                }
            },
        )?;

        Ok(Self {
            watcher,
            watched_dirs: HashSet::new(),
        })
    }

    /// Watch the directory containing `file`; does nothing if already watched
    pub fn watch_file(&mut self, file: &Path) -> Result<(), notify::Error> {
        let Some(dir) = file.parent() else {
            return Ok(());
        };
        if self.is_watching(dir) {
            return Ok(());
        }
        self.watcher.watch(dir, RecursiveMode::NonRecursive)?;
        self.watched_dirs.insert(dir.to_path_buf());
        tracing::info!("Watching directory for changes: {:?}", dir);
        Ok(())
    }

    /// Check if a directory is being watched
    pub fn is_watching(&self, path: &Path) -> bool {
        self.watched_dirs.contains(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_session() {
        let config = FileWatcherConfig::from(&SessionConfig {
            debounce_ms: 40,
            extensions: vec!["XLSX".into()],
            ..SessionConfig::default()
        });
        assert_eq!(config.debounce_duration, Duration::from_millis(40));
        assert!(config.accepts(Path::new("/tmp/model.xlsx")));
        assert!(config.accepts(Path::new("/tmp/MODEL.XLSX")));
        assert!(!config.accepts(Path::new("/tmp/~lock.tmp")));
    }

    #[test]
    fn test_empty_filter_accepts_everything() {
        let config = FileWatcherConfig::default();
        assert!(config.accepts(Path::new("anything")));
    }

    #[test]
    fn test_watch_file_registers_parent_once() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("model.xlsx");
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();

        let mut watcher = FileWatcher::new(FileWatcherConfig::default(), tx).unwrap();
        watcher.watch_file(&file).unwrap();
        watcher.watch_file(&file).unwrap();

        assert!(watcher.is_watching(dir.path()));
        assert_eq!(watcher.watched_dirs.len(), 1);
    }
}
