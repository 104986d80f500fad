//! Dependency tracking for incremental builds.
//!
//! Two graphs, one per concern:
//!
//! - [`DependencyMap`]: relevance index ("does a change to X affect Y?")
//! - [`StageGraph`]: collection ordering ("in which order are collections built?")
//!
//! Both live in a [`BuildGraphs`] owned by one configuration load and are
//! rebuilt from scratch on a full reset.

mod depgraph;
mod dependency;
mod error;
mod key;
mod stage;

pub use dependency::{DependencyMap, LayoutMap, Lookup};
pub use error::GraphError;
pub use key::{
    COLLECTION_PREFIX, NodeKind, add_leading_dot_slash, collection_key, collection_name,
    is_bracketed, is_collection_key, node_from_value, normalize_node, relative_to,
};
pub use stage::{Stage, StageGraph};

use serde_json::Value;

use crate::manifest::{Manifest, TemplateEntry};

/// Both graphs of one configuration load.
#[derive(Debug, Clone, Default)]
pub struct BuildGraphs {
    pub deps: DependencyMap,
    pub stages: StageGraph,
}

impl BuildGraphs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything recorded so far.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Populate both graphs from a project manifest.
    ///
    /// `config_collections` are collection names registered in configuration.
    pub fn from_manifest<S: AsRef<str>>(
        manifest: &Manifest,
        config_collections: &[S],
    ) -> Result<Self, GraphError> {
        let mut graphs = Self::new();
        for name in config_collections {
            graphs.stages.add_config_collection_name(name.as_ref());
        }
        for template in &manifest.templates {
            graphs.add_template(template)?;
        }
        graphs.deps.add_layouts_to_map(&manifest.layouts);

        crate::debug!(
            "graph";
            "loaded {} templates, {} nodes",
            manifest.templates.len(),
            graphs.deps.len()
        );
        Ok(graphs)
    }

    /// Re-read a manifest into existing graphs.
    ///
    /// Each listed template's edges are replaced, both what it uses and the
    /// collections it publishes into. Templates missing from the manifest keep
    /// their old edges. The stage graph is rebuilt since collection membership
    /// is re-reported in full. Nothing is changed when the manifest is invalid.
    pub fn refresh_from_manifest(&mut self, manifest: &Manifest) -> Result<(), GraphError> {
        let mut next = self.clone();
        next.stages = StageGraph::new();
        for name in self.stages.config_collection_names() {
            next.stages.add_config_collection_name(name);
        }

        for template in &manifest.templates {
            next.deps.reset_node(&template.path);
            next.deps.reset_publications(&template.path);
            next.add_template(template)?;
        }
        next.deps.add_layouts_to_map(&manifest.layouts);

        *self = next;
        Ok(())
    }

    fn add_template(&mut self, template: &TemplateEntry) -> Result<(), GraphError> {
        self.deps
            .add_dependency_value(&Value::String(template.path.clone()), &template.uses)?;
        for name in &template.consumes {
            self.deps
                .add_dependency_consumes_collection(&template.path, name);
        }
        for name in &template.publishes {
            self.deps
                .add_dependency_publishes_to_collection(&template.path, name);
        }
        self.stages
            .add_template(&template.path, &template.consumes, &template.publishes);
        Ok(())
    }
}
