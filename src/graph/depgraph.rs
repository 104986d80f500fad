//! Cycle-tolerant directed graph.
//!
//! Both the dependency map and the stage graph are built on [`DepGraph`]:
//!
//! ```text
//! DepGraph
//! ├── nodes:    key → data          (insertion order kept in `order`)
//! ├── outgoing: key → [dependencies] ("key uses these")
//! └── incoming: key → [dependants]   ("these use key")
//! ```
//!
//! Cycles are never rejected. Traversals skip any node already on the current
//! path, so a cycle simply contributes no extra ordering constraint.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::GraphError;

type EdgeMap = FxHashMap<String, Vec<String>>;

/// Directed graph keyed by string, with per-node data.
///
/// # Invariants
/// - `outgoing` and `incoming` mirror each other exactly
/// - every edge endpoint is a node
/// - `order` holds each node key once, in insertion order
#[derive(Debug, Clone)]
pub struct DepGraph<D> {
    nodes: FxHashMap<String, D>,
    order: Vec<String>,
    outgoing: EdgeMap,
    incoming: EdgeMap,
    circular: bool,
}

impl<D> Default for DepGraph<D> {
    fn default() -> Self {
        Self {
            nodes: FxHashMap::default(),
            order: Vec::new(),
            outgoing: FxHashMap::default(),
            incoming: FxHashMap::default(),
            circular: true,
        }
    }
}

impl<D> DepGraph<D> {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn has_node(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    /// Add a node. Existing nodes keep their data.
    pub fn add_node(&mut self, key: &str, data: D) {
        if self.has_node(key) {
            return;
        }
        self.nodes.insert(key.to_string(), data);
        self.order.push(key.to_string());
        self.outgoing.insert(key.to_string(), Vec::new());
        self.incoming.insert(key.to_string(), Vec::new());
    }

    #[inline]
    pub fn node_data(&self, key: &str) -> Option<&D> {
        self.nodes.get(key)
    }

    /// Replace the data of an existing node. Returns false for unknown nodes.
    pub fn set_node_data(&mut self, key: &str, data: D) -> bool {
        match self.nodes.get_mut(key) {
            Some(slot) => {
                *slot = data;
                true
            }
            None => false,
        }
    }

    /// Remove a node along with every edge touching it.
    pub fn remove_node(&mut self, key: &str) {
        if self.nodes.remove(key).is_none() {
            return;
        }
        self.order.retain(|k| k != key);

        for dep in self.outgoing.remove(key).unwrap_or_default() {
            if let Some(dependants) = self.incoming.get_mut(&dep) {
                dependants.retain(|k| k != key);
            }
        }
        for dependant in self.incoming.remove(key).unwrap_or_default() {
            if let Some(deps) = self.outgoing.get_mut(&dependant) {
                deps.retain(|k| k != key);
            }
        }
    }

    /// Record that `from` uses `to`. Both nodes must exist.
    ///
    /// Returns false (and changes nothing) when either endpoint is missing.
    pub fn add_dependency(&mut self, from: &str, to: &str) -> bool {
        if !self.has_node(from) || !self.has_node(to) {
            return false;
        }
        if let Some(deps) = self.outgoing.get_mut(from)
            && !deps.iter().any(|d| d == to)
        {
            deps.push(to.to_string());
        }
        if let Some(dependants) = self.incoming.get_mut(to)
            && !dependants.iter().any(|d| d == from)
        {
            dependants.push(from.to_string());
        }
        true
    }

    pub fn remove_dependency(&mut self, from: &str, to: &str) {
        if let Some(deps) = self.outgoing.get_mut(from) {
            deps.retain(|d| d != to);
        }
        if let Some(dependants) = self.incoming.get_mut(to) {
            dependants.retain(|d| d != from);
        }
    }

    /// Nodes `key` uses directly.
    #[inline]
    pub fn direct_dependencies_of(&self, key: &str) -> &[String] {
        self.outgoing.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Nodes that use `key` directly.
    #[inline]
    pub fn direct_dependants_of(&self, key: &str) -> &[String] {
        self.incoming.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Transitive dependencies of `key`, dependencies first. Excludes `key`.
    pub fn dependencies_of(&self, key: &str) -> Vec<String> {
        self.walk_from(&self.outgoing, key)
    }

    /// Transitive dependants of `key`, farthest first. Excludes `key`.
    pub fn dependants_of(&self, key: &str) -> Vec<String> {
        self.walk_from(&self.incoming, key)
    }

    /// Order every node so that dependencies come before their dependants.
    ///
    /// Roots (nodes nothing depends on) are walked first, in insertion order;
    /// nodes only reachable through a cycle are picked up afterwards.
    pub fn overall_order(&self) -> Vec<String> {
        let mut visited = FxHashSet::default();
        let mut result = Vec::with_capacity(self.order.len());

        let roots = self
            .order
            .iter()
            .filter(|key| self.direct_dependants_of(key).is_empty());
        for key in roots {
            dfs(&self.outgoing, key, &mut visited, &mut result);
        }
        for key in &self.order {
            dfs(&self.outgoing, key, &mut visited, &mut result);
        }

        result.into_iter().map(str::to_string).collect()
    }

    /// Node keys in insertion order.
    #[inline]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[inline]
    pub fn is_circular(&self) -> bool {
        self.circular
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.order.clear();
        self.outgoing.clear();
        self.incoming.clear();
    }

    fn walk_from(&self, edges: &EdgeMap, key: &str) -> Vec<String> {
        if !self.has_node(key) {
            return Vec::new();
        }
        let mut visited = FxHashSet::default();
        let mut result = Vec::new();
        dfs(edges, key, &mut visited, &mut result);
        result
            .into_iter()
            .filter(|k| *k != key)
            .map(str::to_string)
            .collect()
    }
}

/// Iterative post-order DFS. Nodes on the current path are skipped.
fn dfs<'a>(
    edges: &'a EdgeMap,
    start: &'a str,
    visited: &mut FxHashSet<&'a str>,
    result: &mut Vec<&'a str>,
) {
    if visited.contains(start) {
        return;
    }

    let mut on_path: FxHashSet<&'a str> = FxHashSet::default();
    // (node, edges already pushed)
    let mut todo: Vec<(&'a str, bool)> = vec![(start, false)];

    while let Some(top) = todo.last_mut() {
        let (node, expanded) = *top;
        if expanded {
            todo.pop();
            on_path.remove(node);
            visited.insert(node);
            result.push(node);
            continue;
        }

        if visited.contains(node) || on_path.contains(node) {
            todo.pop();
            continue;
        }

        top.1 = true;
        on_path.insert(node);
        // Reverse push keeps the declared edge order when popping
        if let Some(next) = edges.get(node) {
            todo.extend(next.iter().rev().map(|dep| (dep.as_str(), false)));
        }
    }
}

// =============================================================================
// Serialization
// =============================================================================

#[derive(Serialize, Deserialize)]
struct NodeEntry<D> {
    key: String,
    data: D,
}

/// Borrowed view written by [`DepGraph::to_json`].
#[derive(Serialize)]
struct GraphView<'a, D> {
    nodes: Vec<NodeEntry<&'a D>>,
    outgoing_edges: &'a EdgeMap,
    incoming_edges: &'a EdgeMap,
    circular: bool,
}

/// Owned form read by [`DepGraph::from_json`].
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct GraphData<D> {
    nodes: Vec<NodeEntry<D>>,
    outgoing_edges: EdgeMap,
    incoming_edges: EdgeMap,
    circular: bool,
}

impl<D: Serialize> DepGraph<D> {
    /// Encode nodes, both adjacency maps and the cycle flag as JSON.
    pub fn to_json(&self) -> Result<String, GraphError> {
        let nodes = self
            .order
            .iter()
            .filter_map(|key| {
                self.nodes.get(key).map(|data| NodeEntry {
                    key: key.clone(),
                    data,
                })
            })
            .collect();

        let view = GraphView {
            nodes,
            outgoing_edges: &self.outgoing,
            incoming_edges: &self.incoming,
            circular: self.circular,
        };
        serde_json::to_string(&view).map_err(GraphError::Serialization)
    }
}

impl<D: DeserializeOwned> DepGraph<D> {
    /// Decode a graph written by [`to_json`](Self::to_json).
    ///
    /// The text is fully validated before a graph is returned.
    pub fn from_json(text: &str) -> Result<Self, GraphError> {
        let data: GraphData<D> =
            serde_json::from_str(text).map_err(|e| GraphError::malformed(e.to_string()))?;

        if !data.circular {
            return Err(GraphError::malformed("graph must tolerate cycles"));
        }

        let mut graph = Self::new();
        for entry in data.nodes {
            if graph.has_node(&entry.key) {
                return Err(GraphError::malformed(format!(
                    "duplicate node `{}`",
                    entry.key
                )));
            }
            graph.add_node(&entry.key, entry.data);
        }

        for (from, deps) in &data.outgoing_edges {
            for to in deps {
                if !graph.add_dependency(from, to) {
                    return Err(GraphError::malformed(format!(
                        "edge `{from}` -> `{to}` references an unknown node"
                    )));
                }
            }
        }

        // Incoming edges must describe the same edge set
        let mut incoming_count = 0;
        for (to, dependants) in &data.incoming_edges {
            for from in dependants {
                if !graph.direct_dependencies_of(from).iter().any(|d| d == to) {
                    return Err(GraphError::malformed(format!(
                        "incoming edge `{from}` -> `{to}` has no outgoing counterpart"
                    )));
                }
                incoming_count += 1;
            }
        }
        let outgoing_count: usize = graph.outgoing.values().map(Vec::len).sum();
        if incoming_count != outgoing_count {
            return Err(GraphError::malformed(
                "incoming and outgoing edge maps disagree",
            ));
        }

        Ok(graph)
    }
}
