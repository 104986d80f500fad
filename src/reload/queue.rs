//! Watch Queue
//!
//! Tracks which changed files belong to the build in flight and which wait
//! for the next one.
//!
//! ```text
//!   add_to_pending_queue            set_build_running            set_build_finished
//! ───────────────────────► pending ───────────────────► active ───────────────────► (cleared)
//!                            ▲        incremental: 1 file
//!                            │        batch:       all files
//!                            └── keeps filling while a build runs
//! ```
//!
//! The queue does not lock. Callers bracket every build with
//! [`set_build_running`](WatchQueue::set_build_running) and
//! [`set_build_finished`](WatchQueue::set_build_finished), one build at a time.

use std::collections::VecDeque;

use crate::graph::add_leading_dot_slash;

/// Whether a build is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchState {
    #[default]
    Idle,
    Building,
}

/// Pending and active changed-file queues of a watch session.
#[derive(Debug, Default)]
pub struct WatchQueue {
    incremental: bool,
    state: WatchState,
    pending: VecDeque<String>,
    active: Vec<String>,
}

impl WatchQueue {
    pub fn new(incremental: bool) -> Self {
        Self {
            incremental,
            ..Self::default()
        }
    }

    #[inline]
    pub fn is_incremental(&self) -> bool {
        self.incremental
    }

    /// Switch dispatch mode. Takes effect at the next `set_build_running`.
    pub fn set_incremental(&mut self, incremental: bool) {
        self.incremental = incremental;
    }

    #[inline]
    pub fn state(&self) -> WatchState {
        self.state
    }

    #[inline]
    pub fn is_build_running(&self) -> bool {
        self.state == WatchState::Building
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Queue a changed path for a future build. Empty paths are ignored.
    pub fn add_to_pending_queue(&mut self, path: &str) {
        if path.is_empty() {
            return;
        }
        let path = add_leading_dot_slash(path);
        crate::debug!("watch"; "queued {}", path);
        self.pending.push_back(path);
    }

    /// Start a build, promoting pending paths into the active queue.
    ///
    /// Incremental mode promotes the first pending path only; batch mode
    /// promotes all of them.
    pub fn set_build_running(&mut self) {
        self.state = WatchState::Building;
        self.active = if self.incremental {
            self.pending.pop_front().into_iter().collect()
        } else {
            self.pending.drain(..).collect()
        };
        crate::debug!(
            "watch";
            "build running: {} active, {} pending",
            self.active.len(),
            self.pending.len()
        );
    }

    /// Finish the build. Paths queued during the build stay pending.
    pub fn set_build_finished(&mut self) {
        self.state = WatchState::Idle;
        self.active.clear();
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The single file of an incremental build.
    ///
    /// Always `None` in batch mode.
    pub fn get_incremental_file(&self) -> Option<&str> {
        if !self.incremental {
            return None;
        }
        self.active.first().map(String::as_str)
    }

    /// Files of the build in flight; empty while idle.
    pub fn get_active_queue(&self) -> &[String] {
        match self.state {
            WatchState::Idle => &[],
            WatchState::Building => &self.active,
        }
    }

    #[inline]
    pub fn get_active_queue_size(&self) -> usize {
        self.get_active_queue().len()
    }

    pub fn get_pending_queue(&self) -> Vec<String> {
        self.pending.iter().cloned().collect()
    }

    #[inline]
    pub fn get_pending_queue_size(&self) -> usize {
        self.pending.len()
    }

    /// Whether `path` is part of the build in flight.
    pub fn is_file_in_queue(&self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }
        let path = add_leading_dot_slash(path);
        self.get_active_queue().iter().any(|queued| *queued == path)
    }

    /// Whether any of `paths` is part of the build in flight.
    pub fn has_queued_files<S: AsRef<str>>(&self, paths: &[S]) -> bool {
        paths.iter().any(|path| self.is_file_in_queue(path.as_ref()))
    }

    /// Whether the active queue is non-empty and every entry matches.
    pub fn has_all_queue_files(&self, matches: impl Fn(&str) -> bool) -> bool {
        let active = self.get_active_queue();
        !active.is_empty() && active.iter().all(|path| matches(path.as_str()))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn queue_with(incremental: bool, paths: &[&str]) -> WatchQueue {
        let mut queue = WatchQueue::new(incremental);
        for path in paths {
            queue.add_to_pending_queue(path);
        }
        queue
    }

    mod batch {
        use super::*;

        #[test]
        fn promotes_everything() {
            let mut queue = queue_with(false, &["test.md", "test2.md"]);
            queue.set_build_running();

            assert_eq!(queue.get_active_queue(), ["./test.md", "./test2.md"]);
            assert_eq!(queue.get_pending_queue_size(), 0);
            assert_eq!(queue.get_incremental_file(), None);
        }

        #[test]
        fn files_added_mid_build_wait() {
            let mut queue = queue_with(false, &["test.md"]);
            queue.set_build_running();
            queue.add_to_pending_queue("late.md");

            assert_eq!(queue.get_active_queue(), ["./test.md"]);
            assert_eq!(queue.get_pending_queue(), ["./late.md"]);

            queue.set_build_finished();
            assert!(queue.get_active_queue().is_empty());
            assert_eq!(queue.get_pending_queue(), ["./late.md"]);
        }
    }

    mod incremental {
        use super::*;

        #[test]
        fn promotes_one_file() {
            let mut queue = queue_with(true, &["test.md", "test2.md"]);
            queue.set_build_running();

            assert_eq!(queue.get_active_queue(), ["./test.md"]);
            assert_eq!(queue.get_pending_queue_size(), 1);
            assert_eq!(queue.get_incremental_file(), Some("./test.md"));
        }

        #[test]
        fn drains_one_cycle_at_a_time() {
            let mut queue = queue_with(true, &["a.md", "b.md"]);

            queue.set_build_running();
            assert_eq!(queue.get_incremental_file(), Some("./a.md"));
            queue.set_build_finished();

            queue.set_build_running();
            assert_eq!(queue.get_incremental_file(), Some("./b.md"));
            queue.set_build_finished();

            queue.set_build_running();
            assert_eq!(queue.get_incremental_file(), None);
            assert!(queue.get_active_queue().is_empty());
        }
    }

    mod state {
        use super::*;

        #[test]
        fn idle_has_no_active_files() {
            let queue = queue_with(false, &["test.md"]);
            assert!(!queue.is_build_running());
            assert!(queue.get_active_queue().is_empty());
            assert_eq!(queue.get_active_queue_size(), 0);
        }

        #[test]
        fn running_and_finished() {
            let mut queue = WatchQueue::new(false);
            queue.set_build_running();
            assert_eq!(queue.state(), WatchState::Building);
            queue.set_build_finished();
            assert_eq!(queue.state(), WatchState::Idle);
        }

        #[test]
        fn empty_and_prefixed_paths() {
            let mut queue = WatchQueue::new(false);
            queue.add_to_pending_queue("");
            queue.add_to_pending_queue("./already.md");
            queue.add_to_pending_queue("../outside.md");

            assert_eq!(queue.get_pending_queue(), ["./already.md", "../outside.md"]);
        }

        #[test]
        fn mode_switch_applies_next_cycle() {
            let mut queue = queue_with(true, &["a.md", "b.md", "c.md"]);
            queue.set_build_running();
            queue.set_incremental(false);
            assert_eq!(queue.get_active_queue_size(), 1);
            queue.set_build_finished();

            queue.set_build_running();
            assert_eq!(queue.get_active_queue(), ["./b.md", "./c.md"]);
        }
    }

    mod membership {
        use super::*;

        #[test]
        fn file_in_queue_accepts_either_form() {
            let mut queue = queue_with(false, &["posts/a.md"]);
            queue.set_build_running();

            assert!(queue.is_file_in_queue("posts/a.md"));
            assert!(queue.is_file_in_queue("./posts/a.md"));
            assert!(!queue.is_file_in_queue("posts/b.md"));
            assert!(!queue.is_file_in_queue(""));
            assert!(queue.has_queued_files(&["posts/b.md", "posts/a.md"]));
            assert!(!queue.has_queued_files(&["posts/b.md"]));
        }

        #[test]
        fn all_queue_files_requires_active_build() {
            let mut queue = queue_with(false, &["a.css", "b.css"]);
            assert!(!queue.has_all_queue_files(|p| p.ends_with(".css")));

            queue.set_build_running();
            assert!(queue.has_all_queue_files(|p| p.ends_with(".css")));
            assert!(!queue.has_all_queue_files(|p| p.starts_with("./a")));
        }
    }
}
