//! Dependency map for incremental builds.
//!
//! Records which files and collections every template uses, and answers the
//! one question the rebuild loop cares about: "is this template affected by a
//! change to that file?"
//!
//! ```text
//! posts/a.md ──uses──► _includes/card.njk
//!     │
//!     └──uses──► _includes/base.njk        (layout, from `add_layouts_to_map`)
//!
//! __collection:posts ──uses──► posts/a.md  (a.md publishes into `posts`)
//! feed.njk ──uses──► __collection:posts    (feed.njk consumes `posts`)
//! ```
//!
//! The map is a relevance index, not a scheduler: cycles are fine and it never
//! produces an execution order itself. See [`StageGraph`](super::StageGraph)
//! for ordering.

use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;

use super::depgraph::DepGraph;
use super::key::{
    NodeKind, collection_key, collection_name, is_collection_key, node_from_value, normalize_node,
};
use super::GraphError;

/// Authoritative `layout → [templates using it]` mapping for one build.
pub type LayoutMap = FxHashMap<String, Vec<String>>;

/// Result of a dependency lookup.
///
/// `Unknown` means the node was never indexed. Callers should treat that as
/// "assume relevant".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Unknown,
    Known(Vec<String>),
}

impl Lookup {
    #[inline]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn contains(&self, node: &str) -> bool {
        match self {
            Self::Unknown => false,
            Self::Known(deps) => deps.iter().any(|d| d == node),
        }
    }

    pub fn into_known(self) -> Option<Vec<String>> {
        match self {
            Self::Unknown => None,
            Self::Known(deps) => Some(deps),
        }
    }
}

/// Dependency graph over files, layouts and collections.
///
/// # Invariants
/// - Keys are normalized with [`normalize_node`]
/// - Self-references are dropped
/// - One collection node per collection name
#[derive(Debug, Clone, Default)]
pub struct DependencyMap {
    graph: DepGraph<NodeKind>,
}

impl DependencyMap {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every node and edge.
    pub fn reset(&mut self) {
        self.graph.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn has_node(&self, node: &str) -> bool {
        self.graph.has_node(&normalize_node(node))
    }

    pub fn node_kind(&self, node: &str) -> Option<NodeKind> {
        self.graph.node_data(&normalize_node(node)).copied()
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Record that `from` uses every node in `to`.
    ///
    /// Missing nodes are created. Self-references and empty keys are skipped.
    pub fn add_dependency<S: AsRef<str>>(&mut self, from: &str, to: &[S]) {
        let from = normalize_node(from);
        if from.is_empty() {
            return;
        }
        self.ensure_node(&from);

        for dep in to {
            let dep = normalize_node(dep.as_ref());
            if dep.is_empty() || dep == from {
                continue;
            }
            self.ensure_node(&dep);
            self.graph.add_dependency(&from, &dep);
        }
    }

    /// Dynamically-typed form of [`add_dependency`](Self::add_dependency).
    ///
    /// Every value is validated before the graph is touched.
    pub fn add_dependency_value(&mut self, from: &Value, to: &Value) -> Result<(), GraphError> {
        let from = node_from_value(from)?;
        let Value::Array(items) = to else {
            return Err(GraphError::InvalidArgument(to.to_string()));
        };
        let deps = items
            .iter()
            .map(node_from_value)
            .collect::<Result<Vec<_>, _>>()?;

        self.add_dependency(&from, &deps);
        Ok(())
    }

    /// `from` reads the collection `name`.
    pub fn add_dependency_consumes_collection(&mut self, from: &str, name: &str) {
        if name.is_empty() {
            return;
        }
        self.add_dependency(from, &[collection_key(name)]);
    }

    /// `from` contributes itself to the collection `name`.
    pub fn add_dependency_publishes_to_collection(&mut self, from: &str, name: &str) {
        if name.is_empty() {
            return;
        }
        self.add_dependency(&collection_key(name), &[from]);
    }

    /// Drop every outgoing edge of `node`.
    ///
    /// Dependants are left alone: what uses this node is decided by the
    /// dependants' own content, not by this node.
    pub fn reset_node(&mut self, node: &str) {
        let node = normalize_node(node);
        let deps = self.graph.direct_dependencies_of(&node).to_vec();
        for dep in deps {
            self.graph.remove_dependency(&node, &dep);
        }
    }

    /// Take `node` out of every collection it publishes into.
    pub fn reset_publications(&mut self, node: &str) {
        let node = normalize_node(node);
        let collections: Vec<String> = self
            .graph
            .direct_dependants_of(&node)
            .iter()
            .filter(|key| is_collection_key(key))
            .cloned()
            .collect();
        for collection in collections {
            self.graph.remove_dependency(&collection, &node);
        }
    }

    pub fn remove_node(&mut self, node: &str) {
        self.graph.remove_node(&normalize_node(node));
    }

    /// Replace the layout relationships with those of the current build.
    ///
    /// Layout nodes missing from `layouts` are removed outright; every layout
    /// in `layouts` is (re)typed as a layout and used by each listed template.
    pub fn add_layouts_to_map(&mut self, layouts: &LayoutMap) {
        let current: FxHashSet<String> = layouts.keys().map(|k| normalize_node(k)).collect();

        let stale: Vec<String> = self
            .graph
            .keys()
            .filter(|key| self.is_layout(key) && !current.contains(*key))
            .map(str::to_string)
            .collect();
        for layout in stale {
            crate::debug!("dep"; "layout no longer used: {}", layout);
            self.graph.remove_node(&layout);
        }

        let mut entries: Vec<_> = layouts.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        for (raw_layout, templates) in entries {
            let layout = normalize_node(raw_layout);
            if layout.is_empty() {
                continue;
            }
            if !self.graph.set_node_data(&layout, NodeKind::Layout) {
                self.graph.add_node(&layout, NodeKind::Layout);
            }
            for template in templates {
                self.add_dependency(template, &[layout.as_str()]);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Direct dependencies of `node`.
    ///
    /// With `include_layouts = false`, layout nodes are filtered out.
    pub fn get_dependencies(&self, node: &str, include_layouts: bool) -> Lookup {
        let node = normalize_node(node);
        if !self.graph.has_node(&node) {
            return Lookup::Unknown;
        }
        Lookup::Known(
            self.graph
                .direct_dependencies_of(&node)
                .iter()
                .filter(|dep| include_layouts || !self.is_layout(dep))
                .cloned()
                .collect(),
        )
    }

    /// Direct dependants of `node`; empty for unknown nodes.
    pub fn get_dependants_for(&self, node: &str) -> Vec<String> {
        self.graph
            .direct_dependants_of(&normalize_node(node))
            .to_vec()
    }

    /// Whether `from` uses `to`, directly or through other nodes.
    pub fn has_dependency(&self, from: &str, to: &str, include_layouts: bool) -> bool {
        let from = normalize_node(from);
        let to = normalize_node(to);
        if !include_layouts && self.is_layout(&to) {
            return false;
        }
        self.graph.dependencies_of(&from).contains(&to)
    }

    /// Whether a change to `changed` can affect the output of `template`.
    ///
    /// True when both are the same file or `changed` is a (transitive)
    /// dependency of `template`. A missing `changed` is never relevant.
    pub fn is_file_relevant_to(
        &self,
        template: &str,
        changed: Option<&str>,
        include_layouts: bool,
    ) -> bool {
        let Some(changed) = changed.map(normalize_node).filter(|c| !c.is_empty()) else {
            return false;
        };
        normalize_node(template) == changed
            || self.has_dependency(template, &changed, include_layouts)
    }

    /// Whether `parent` uses `child`.
    #[inline]
    pub fn is_file_used_by(&self, parent: &str, child: &str, include_layouts: bool) -> bool {
        self.has_dependency(parent, child, include_layouts)
    }

    /// Templates that directly consume any of the named collections.
    pub fn get_templates_that_consume_collections<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> FxHashSet<String> {
        names
            .iter()
            .map(|name| collection_key(name.as_ref()))
            .flat_map(|key| self.graph.direct_dependants_of(&key).to_vec())
            .filter(|node| !is_collection_key(node))
            .collect()
    }

    /// Collections `node` used to consume that are not in `current`.
    pub fn find_collections_removed_from<S: AsRef<str>>(
        &self,
        node: &str,
        current: &[S],
    ) -> FxHashSet<String> {
        let current: FxHashSet<&str> = current.iter().map(|name| name.as_ref()).collect();
        self.graph
            .direct_dependencies_of(&normalize_node(node))
            .iter()
            .filter_map(|dep| collection_name(dep))
            .filter(|name| !current.contains(name))
            .map(str::to_string)
            .collect()
    }

    /// Layouts that use `node`, including `node` itself when it is a layout.
    pub fn get_layouts_used_by(&self, node: &str) -> Vec<String> {
        let node = normalize_node(node);
        if !self.graph.has_node(&node) {
            return Vec::new();
        }
        std::iter::once(node.clone())
            .chain(self.graph.dependants_of(&node))
            .filter(|key| self.is_layout(key))
            .collect()
    }

    /// Minimal rebuild set for a list of changed files.
    ///
    /// Every known file that changed or (transitively) uses a changed file,
    /// following collections. Collection nodes are never returned; layouts only
    /// with `include_layouts`. Sorted and de-duplicated.
    pub fn get_templates_relevant_to_file_list<S: AsRef<str>>(
        &self,
        files: &[S],
        include_layouts: bool,
    ) -> Vec<String> {
        let mut relevant = FxHashSet::default();

        for file in files {
            let file = normalize_node(file.as_ref());
            if !self.graph.has_node(&file) {
                continue;
            }
            let dependants = self.graph.dependants_of(&file);
            for node in std::iter::once(file).chain(dependants) {
                let keep = match self.graph.node_data(&node) {
                    Some(NodeKind::File) => true,
                    Some(NodeKind::Layout) => include_layouts,
                    Some(NodeKind::Collection) | None => false,
                };
                if keep {
                    relevant.insert(node);
                }
            }
        }

        let mut relevant: Vec<_> = relevant.into_iter().collect();
        relevant.sort();
        relevant
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    /// Serialize the whole graph, including both adjacency maps.
    pub fn stringify(&self) -> Result<String, GraphError> {
        self.graph.to_json()
    }

    /// Replace this map with one read from [`stringify`](Self::stringify) text.
    ///
    /// On error the current graph is left untouched.
    pub fn restore(&mut self, text: &str) -> Result<(), GraphError> {
        let graph = DepGraph::from_json(text)?;
        crate::debug!("dep"; "restored {} nodes", graph.len());
        self.graph = graph;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Private
    // -------------------------------------------------------------------------

    fn ensure_node(&mut self, key: &str) {
        self.graph.add_node(key, NodeKind::of_key(key));
    }

    #[inline]
    fn is_layout(&self, key: &str) -> bool {
        self.graph.node_data(key) == Some(&NodeKind::Layout)
    }
}

// =============================================================================
// Tests
// =============================================================================
