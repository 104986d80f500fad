//! Configuration section definitions.
//!
//! Each module corresponds to a section in `sitegraph.toml`:
//!
//! | Module        | TOML Section    | Purpose                              |
//! |---------------|-----------------|--------------------------------------|
//! | `build`       | `[build]`       | Manifest, cache and config file paths|
//! | `watch`       | `[watch]`       | Watch loop dispatch and debouncing   |
//! | `collections` | `[collections]` | Configuration-registered collections |

mod build;
mod collections;
mod watch;

pub use build::BuildConfig;
pub use collections::CollectionsConfig;
pub use watch::WatchConfig;
