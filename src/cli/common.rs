//! Common utilities shared across CLI commands.

use anyhow::{Context, Result};

use crate::cache::restore_graph;
use crate::config::GraphConfig;
use crate::graph::{BuildGraphs, StageGraph};
use crate::log;
use crate::manifest::Manifest;

/// Build both graphs from the project manifest.
pub fn load_graphs(config: &GraphConfig) -> Result<BuildGraphs> {
    let path = config.manifest_path();
    let manifest = Manifest::load(&path)
        .with_context(|| format!("failed to load manifest {}", path.display()))?;
    BuildGraphs::from_manifest(&manifest, &config.collections.config)
        .with_context(|| format!("invalid manifest {}", path.display()))
}

/// Like [`load_graphs`], falling back to the cached dependency map.
///
/// The stage graph cannot be recovered from the cache and starts empty.
pub fn load_graphs_or_cache(config: &GraphConfig) -> Result<BuildGraphs> {
    let err = match load_graphs(config) {
        Ok(graphs) => return Ok(graphs),
        Err(err) => err,
    };

    let cached = restore_graph(config.get_root(), config.cache_dir())
        .context("failed to read dependency cache")?;
    let Some(deps) = cached else {
        return Err(err);
    };

    log!("warning"; "{:#}, using cached dependency graph", err);
    let mut stages = StageGraph::new();
    for name in &config.collections.config {
        stages.add_config_collection_name(name);
    }
    Ok(BuildGraphs { deps, stages })
}

/// `1 template`, `3 templates`
pub fn plural_count(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}
