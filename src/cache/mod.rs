//! Cache persistence for the dependency map.
//!
//! Restoring the map on startup lets the watch loop answer relevance queries
//! before the first full scan has finished.

mod graph;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::graph::GraphError;

/// Default cache directory (inside project root)
pub const CACHE_DIR: &str = ".sitegraph/cache";

/// Dependency map file name
pub(crate) const GRAPH_FILE: &str = "deps.json";

pub use graph::{clear_cache_dir, has_cache, persist_graph, restore_graph};

/// Errors raised while reading or writing the cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache IO error at `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("cached dependency graph is invalid")]
    Graph(#[from] GraphError),
}

/// Path of the dependency map file.
pub fn graph_path(root: &Path, cache_dir: &Path) -> PathBuf {
    root.join(cache_dir).join(GRAPH_FILE)
}
