//! Dependency map persistence (`deps.json`).

use std::fs;
use std::path::Path;

use super::{CacheError, graph_path};
use crate::graph::DependencyMap;

/// Write the dependency map to `<root>/<cache_dir>/deps.json`.
///
/// Skips the write when the file already holds the same content.
pub fn persist_graph(deps: &DependencyMap, root: &Path, cache_dir: &Path) -> Result<(), CacheError> {
    let dir = root.join(cache_dir);
    let path = graph_path(root, cache_dir);

    fs::create_dir_all(&dir).map_err(|e| CacheError::Io(dir.clone(), e))?;

    let json = deps.stringify()?;
    if file_content_matches(&path, &json) {
        crate::debug!("cache"; "dependency graph unchanged, skipping write");
        return Ok(());
    }

    fs::write(&path, &json).map_err(|e| CacheError::Io(path.clone(), e))?;
    crate::debug!("cache"; "saved {} nodes to {}", deps.len(), path.display());
    Ok(())
}

/// Read a persisted dependency map. `Ok(None)` when no cache exists.
pub fn restore_graph(root: &Path, cache_dir: &Path) -> Result<Option<DependencyMap>, CacheError> {
    let path = graph_path(root, cache_dir);
    if !path.exists() {
        return Ok(None);
    }

    let json = fs::read_to_string(&path).map_err(|e| CacheError::Io(path.clone(), e))?;
    let mut deps = DependencyMap::new();
    deps.restore(&json)?;

    crate::debug!("cache"; "restored {} nodes", deps.len());
    Ok(Some(deps))
}

/// Check if a persisted dependency map exists
pub fn has_cache(root: &Path, cache_dir: &Path) -> bool {
    graph_path(root, cache_dir).exists()
}

/// Remove the whole cache directory
pub fn clear_cache_dir(root: &Path, cache_dir: &Path) -> Result<(), CacheError> {
    let dir = root.join(cache_dir);
    if dir.exists() {
        fs::remove_dir_all(&dir).map_err(|e| CacheError::Io(dir.clone(), e))?;
    }
    Ok(())
}

fn file_content_matches(path: &Path, content: &str) -> bool {
    path.exists() && fs::read_to_string(path).is_ok_and(|existing| existing == content)
}
