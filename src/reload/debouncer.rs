//! Debouncing of raw filesystem events.
//!
//! Pure timing and deduplication: the watch loop feeds `notify` events in and
//! takes a settled batch out once no event has arrived for the debounce
//! window.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

/// What happened to a file during the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

/// Collects events until they settle.
pub struct Debouncer {
    window: Duration,
    /// Path → ChangeKind (dedup via key uniqueness)
    changes: FxHashMap<PathBuf, ChangeKind>,
    last_event: Option<Instant>,
    ignored: Vec<PathBuf>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            changes: FxHashMap::default(),
            last_event: None,
            ignored: Vec::new(),
        }
    }

    /// Drop every event under `dir` (e.g. our own cache directory).
    pub fn ignore(mut self, dir: impl Into<PathBuf>) -> Self {
        self.ignored.push(dir.into());
        self
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Add a notify event, applying dedup rules:
    /// - Removed + Created/Modified → new event (file was restored)
    /// - Modified + Removed → Removed
    /// - Created + Removed → dropped
    /// - otherwise the first event wins
    pub fn add_event(&mut self, event: &notify::Event) {
        self.add_event_at(event, Instant::now());
    }

    fn add_event_at(&mut self, event: &notify::Event, now: Instant) {
        use notify::EventKind;
        use notify::event::ModifyKind;

        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Remove(_) => ChangeKind::Removed,
            // Metadata-only changes (mtime/chmod) would loop forever
            EventKind::Modify(ModifyKind::Metadata(_)) => return,
            EventKind::Modify(_) => ChangeKind::Modified,
            _ => return,
        };

        for path in &event.paths {
            if is_temp_file(path) || self.is_ignored(path) {
                continue;
            }

            match self.changes.get(path).copied() {
                None => {
                    crate::debug!("watch"; "event {}: {}", kind.label(), path.display());
                    self.changes.insert(path.clone(), kind);
                }
                Some(existing) => match (existing, kind) {
                    (ChangeKind::Removed, ChangeKind::Created | ChangeKind::Modified) => {
                        self.changes.insert(path.clone(), kind);
                    }
                    (ChangeKind::Modified, ChangeKind::Removed) => {
                        self.changes.insert(path.clone(), ChangeKind::Removed);
                    }
                    (ChangeKind::Created, ChangeKind::Removed) => {
                        crate::debug!("watch"; "discard created+removed: {}", path.display());
                        self.changes.remove(path);
                    }
                    _ => continue,
                },
            }
            self.last_event = Some(now);
        }
    }

    /// Take the settled batch, sorted by path.
    pub fn take_if_ready(&mut self) -> Option<Vec<(PathBuf, ChangeKind)>> {
        self.take_if_ready_at(Instant::now())
    }

    fn take_if_ready_at(&mut self, now: Instant) -> Option<Vec<(PathBuf, ChangeKind)>> {
        let last_event = self.last_event?;
        if now.saturating_duration_since(last_event) < self.window {
            return None;
        }

        self.last_event = None;
        let mut changes: Vec<_> = std::mem::take(&mut self.changes).into_iter().collect();
        if changes.is_empty() {
            return None;
        }
        changes.sort_by(|a, b| a.0.cmp(&b.0));
        Some(changes)
    }

    /// How long the watch loop may block before the batch can be ready.
    pub fn sleep_duration(&self) -> Duration {
        match self.last_event {
            Some(last_event) => self
                .window
                .saturating_sub(last_event.elapsed())
                .max(Duration::from_millis(1)),
            None => self.window,
        }
    }

    fn is_ignored(&self, path: &Path) -> bool {
        self.ignored.iter().any(|dir| path.starts_with(dir))
    }
}

/// Editor artifacts and hidden files.
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}
