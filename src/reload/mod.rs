//! Reload Module
//!
//! Turns filesystem changes into build cycles.
//!
//! ```text
//! notify ─► Debouncer ─► WatchQueue ─► plan_rebuild ─► build cycle
//!          (settle)     (pending/active)  (DependencyMap)
//! ```
//!
//! # Modules
//!
//! - `classify` - Rebuild planning from the active queue
//! - `debouncer` - Event deduplication and timing
//! - `queue` - Pending/active watch queues

pub mod classify;
pub mod debouncer;
pub mod queue;

pub use classify::{Priority, RebuildPlan, plan_rebuild};
pub use debouncer::{ChangeKind, Debouncer};
pub use queue::{WatchQueue, WatchState};
