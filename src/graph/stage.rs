//! Stage graph for collection ordering.
//!
//! Templates publish into collections and paginate over them, so the raw
//! edges between templates and collections cycle. A fixed chain of synthetic
//! stage markers turns "finish contributing before anyone reads" into plain
//! graph edges that a single topological sort can honor:
//!
//! ```text
//! all ──► [keys] ──► [userconfig] ──► [basic]
//!  │        │             │              │
//!  │        │             │              └── templates consuming nothing
//!  │        │             └── templates publishing into config collections
//!  │        └── templates consuming [userconfig], config collections
//!  └── every template publishing into `all`
//! ```
//!
//! Markers are collection nodes with bracketed names (`__collection:[keys]`).
//! Only `[keys]` survives in [`StageGraph::overall_order`]; `all` is always the
//! final entry.

use rustc_hash::FxHashSet;

use super::depgraph::DepGraph;
use super::key::{NodeKind, collection_key, collection_name, is_bracketed, normalize_node};

/// Ordering stages for collection realization, earliest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Tag collections built straight from front matter.
    Basic,
    /// Collections registered in configuration.
    UserConfig,
    /// Everything keyed or paginated over earlier stages.
    Keys,
    /// The `all` collection.
    All,
}

impl Stage {
    /// The fixed chain, earliest first.
    pub const CHAIN: [Stage; 4] = [Self::Basic, Self::UserConfig, Self::Keys, Self::All];

    /// Collection name of the stage as used by templates.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Basic => "[basic]",
            Self::UserConfig => "[userconfig]",
            Self::Keys => "[keys]",
            Self::All => "all",
        }
    }

    /// Graph key of the stage marker.
    #[inline]
    pub fn key(self) -> String {
        collection_key(self.name())
    }

    /// The stage that must wait for this one.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Basic => Some(Self::UserConfig),
            Self::UserConfig => Some(Self::Keys),
            Self::Keys => Some(Self::All),
            Self::All => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::CHAIN.into_iter().find(|stage| stage.name() == name)
    }
}

/// Dependency graph specialized for collection ordering.
#[derive(Debug, Clone)]
pub struct StageGraph {
    graph: DepGraph<NodeKind>,
    /// Registration order is kept so deferred wiring is deterministic.
    config_collections: Vec<String>,
}

impl Default for StageGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl StageGraph {
    /// Create a graph holding only the stage chain.
    pub fn new() -> Self {
        let mut stages = Self {
            graph: DepGraph::new(),
            config_collections: Vec::new(),
        };

        // Latest stage first so `all` is the first root in insertion order
        for stage in Stage::CHAIN.into_iter().rev() {
            if let Some(next) = stage.next() {
                stages.uses(&next.key(), &stage.key());
            } else {
                stages.ensure_node(&stage.key());
            }
        }
        stages
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Whether a node with this exact key exists.
    ///
    /// Template paths are normalized; collection keys are taken verbatim.
    pub fn has_node(&self, key: &str) -> bool {
        self.graph.has_node(&Self::node_key(key))
    }

    /// Transitive dependencies of a node, excluding itself.
    pub fn dependencies_of(&self, key: &str) -> Vec<String> {
        self.graph.dependencies_of(&Self::node_key(key))
    }

    /// Transitive dependants of a node, excluding itself.
    pub fn dependants_of(&self, key: &str) -> Vec<String> {
        self.graph.dependants_of(&Self::node_key(key))
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Record a template with the collections it reads and contributes to.
    ///
    /// Stage names (`[basic]`, `[userconfig]`, `[keys]`, `all`) may appear in
    /// `consumes` to pin the template after that stage.
    pub fn add_template<C, P>(&mut self, path: &str, consumes: &[C], publishes_to: &[P])
    where
        C: AsRef<str>,
        P: AsRef<str>,
    {
        let path = normalize_node(path);
        if path.is_empty() {
            return;
        }
        self.ensure_node(&path);

        let consumes = self.cleanup_collection_names(consumes);
        let mut publishes_to = self.cleanup_collection_names(publishes_to);

        if consumes.is_empty() {
            self.uses(&Stage::Basic.key(), &path);
        }

        // Publishing into `all` while reading it would make `all` wait on itself
        let consumes_all = consumes.iter().any(|name| name == Stage::All.name());
        if consumes_all {
            publishes_to.retain(|name| name != Stage::All.name());
        }
        let tag_stage = if consumes.iter().any(|name| name == Stage::UserConfig.name()) {
            Stage::Keys
        } else {
            Stage::Basic
        };
        for name in &publishes_to {
            if !consumes_all {
                self.add_tag(name, tag_stage);
            }
            self.uses(&collection_key(name), &path);
        }

        for name in &consumes {
            self.uses(&path, &collection_key(name));
            if let Some(next) = Stage::from_name(name).and_then(Stage::next) {
                self.uses(&next.key(), &path);
            }
        }

        crate::debug!(
            "stage";
            "{} consumes [{}] publishes [{}]",
            path,
            consumes.join(", "),
            publishes_to.join(", ")
        );
    }

    /// Register a collection defined in configuration rather than by tags.
    ///
    /// Its ordering against `[keys]` is wired in [`unfiltered_order`](Self::unfiltered_order).
    pub fn add_config_collection_name(&mut self, name: &str) {
        if name == Stage::All.name() || self.is_config_collection(name) {
            return;
        }
        self.config_collections.push(name.to_string());
    }

    pub fn config_collection_names(&self) -> impl Iterator<Item = &str> {
        self.config_collections.iter().map(String::as_str)
    }

    #[inline]
    pub fn is_config_collection(&self, name: &str) -> bool {
        self.config_collections.iter().any(|c| c == name)
    }

    // -------------------------------------------------------------------------
    // Ordering
    // -------------------------------------------------------------------------

    /// Topological order over every node, stage markers included.
    pub fn unfiltered_order(&mut self) -> Vec<String> {
        let keys = Stage::Keys.key();
        let config: Vec<String> = self
            .config_collections
            .iter()
            .map(|name| collection_key(name))
            .collect();
        for collection in config {
            self.uses(&keys, &collection);
        }
        self.graph.overall_order()
    }

    /// Execution order for callers.
    ///
    /// Bracketed stage markers other than `[keys]` are dropped and the `all`
    /// collection is moved to the very end.
    pub fn overall_order(&mut self) -> Vec<String> {
        let keys = Stage::Keys.key();
        let all = Stage::All.key();

        let mut order: Vec<String> = self
            .unfiltered_order()
            .into_iter()
            .filter(|key| *key == keys || !collection_name(key).is_some_and(is_bracketed))
            .filter(|key| *key != all)
            .collect();
        order.push(all);
        order
    }

    /// [`overall_order`](Self::overall_order) reduced to real collection names.
    pub fn collection_order(&mut self) -> Vec<String> {
        self.overall_order()
            .iter()
            .filter_map(|key| collection_name(key))
            .filter(|name| !is_bracketed(name))
            .map(str::to_string)
            .collect()
    }

    // -------------------------------------------------------------------------
    // Private
    // -------------------------------------------------------------------------

    fn node_key(key: &str) -> String {
        if collection_name(key).is_some() {
            key.to_string()
        } else {
            normalize_node(key)
        }
    }

    fn ensure_node(&mut self, key: &str) {
        self.graph.add_node(key, NodeKind::of_key(key));
    }

    fn uses(&mut self, from: &str, to: &str) {
        if from == to {
            return;
        }
        self.ensure_node(from);
        self.ensure_node(to);
        self.graph.add_dependency(from, to);
    }

    /// Make a stage marker wait for a tag collection.
    fn add_tag(&mut self, name: &str, stage: Stage) {
        if name == Stage::All.name() || is_bracketed(name) || self.is_config_collection(name) {
            return;
        }
        self.uses(&stage.key(), &collection_key(name));
    }

    /// De-duplicate names; touching a config collection implies `[userconfig]`.
    fn cleanup_collection_names<S: AsRef<str>>(&self, names: &[S]) -> Vec<String> {
        let mut seen = FxHashSet::default();
        let mut cleaned: Vec<String> = names
            .iter()
            .map(|name| name.as_ref())
            .filter(|name| !name.is_empty() && seen.insert(*name))
            .map(str::to_string)
            .collect();

        let user_config = Stage::UserConfig.name();
        if !seen.contains(user_config) && cleaned.iter().any(|n| self.is_config_collection(n)) {
            cleaned.push(user_config.to_string());
        }
        cleaned
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn position(order: &[String], key: &str) -> usize {
        order
            .iter()
            .position(|k| k == key)
            .unwrap_or_else(|| panic!("{key} missing from {order:?}"))
    }

    fn col(name: &str) -> String {
        collection_key(name)
    }

    const NONE: &[&str] = &[];

    mod stages {
        use super::*;

        #[test]
        fn chain_is_linked_in_order() {
            for pair in Stage::CHAIN.windows(2) {
                assert_eq!(pair[0].next(), Some(pair[1]));
            }
            assert_eq!(Stage::All.next(), None);
        }

        #[test]
        fn from_name_round_trips() {
            for stage in Stage::CHAIN {
                assert_eq!(Stage::from_name(stage.name()), Some(stage));
            }
            assert_eq!(Stage::from_name("posts"), None);
            assert_eq!(Stage::Keys.key(), "__collection:[keys]");
        }

        #[test]
        fn empty_graph_orders_markers() {
            let mut graph = StageGraph::new();
            assert_eq!(
                graph.unfiltered_order(),
                [col("[basic]"), col("[userconfig]"), col("[keys]"), col("all")]
            );
            assert_eq!(graph.overall_order(), [col("[keys]"), col("all")]);
        }
    }

    mod ordering {
        use super::*;

        fn sample() -> StageGraph {
            let mut graph = StageGraph::new();
            graph.add_template("T1", NONE, &["all", "posts"]);
            graph.add_template("T2", NONE, &["all", "posts", "dog"]);
            graph.add_template("Tnoop", &["all"], NONE);
            graph.add_template("Tuser", &["[userconfig]"], NONE);
            graph.add_template("Tkeys", &["[keys]"], NONE);
            graph.add_config_collection_name("myCollection");
            graph
        }

        #[test]
        fn publishers_before_their_collections() {
            let order = sample().overall_order();
            for template in ["T1", "T2"] {
                assert!(position(&order, template) < position(&order, &col("posts")));
            }
            assert!(position(&order, "T2") < position(&order, &col("dog")));
        }

        #[test]
        fn stage_consumers_follow_their_stage() {
            let order = sample().overall_order();
            let keys = position(&order, &col("[keys]"));

            assert!(position(&order, &col("posts")) < position(&order, "Tuser"));
            assert!(position(&order, &col("dog")) < position(&order, "Tuser"));
            assert!(position(&order, "Tuser") < keys);
            assert!(position(&order, &col("myCollection")) < keys);
            assert!(keys < position(&order, "Tkeys"));
            assert!(position(&order, "Tkeys") < position(&order, "Tnoop"));
        }

        #[test]
        fn all_is_last_exactly_once() {
            let order = sample().overall_order();
            let all = col("all");

            assert_eq!(order.last(), Some(&all));
            assert_eq!(order.iter().filter(|k| **k == all).count(), 1);
        }

        #[test]
        fn only_keys_marker_survives() {
            let order = sample().overall_order();
            let markers: Vec<&String> = order
                .iter()
                .filter(|k| collection_name(k).is_some_and(is_bracketed))
                .collect();
            assert_eq!(markers, [&col("[keys]")]);
        }

        #[test]
        fn full_example_order() {
            let order = sample().overall_order();
            assert_eq!(
                order,
                [
                    "T1".to_string(),
                    "T2".to_string(),
                    col("posts"),
                    col("dog"),
                    "Tuser".to_string(),
                    col("myCollection"),
                    col("[keys]"),
                    "Tkeys".to_string(),
                    "Tnoop".to_string(),
                    col("all"),
                ]
            );
        }

        #[test]
        fn ordering_is_repeatable() {
            let mut graph = sample();
            let first = graph.overall_order();
            assert_eq!(graph.overall_order(), first);
        }

        #[test]
        fn collection_order_names_only() {
            let mut graph = sample();
            assert_eq!(
                graph.collection_order(),
                ["posts", "dog", "myCollection", "all"]
            );
        }
    }

    mod config_collections {
        use super::*;

        #[test]
        fn consumer_runs_between_collection_and_keys() {
            let mut graph = StageGraph::new();
            graph.add_config_collection_name("myCollection");
            graph.add_template("feed.njk", &["myCollection"], &["feeds"]);

            let order = graph.overall_order();
            assert!(position(&order, &col("myCollection")) < position(&order, "feed.njk"));
            assert!(position(&order, "feed.njk") < position(&order, &col("[keys]")));
            // Its own publications must settle before [keys]
            assert!(position(&order, "feed.njk") < position(&order, &col("feeds")));
            assert!(position(&order, &col("feeds")) < position(&order, &col("[keys]")));
        }

        #[test]
        fn implied_userconfig_dependency() {
            let mut graph = StageGraph::new();
            graph.add_config_collection_name("myCollection");
            graph.add_template("feed.njk", &["myCollection"], NONE);

            let deps = graph.dependencies_of("feed.njk");
            assert!(deps.contains(&col("[userconfig]")));
            assert!(deps.contains(&col("myCollection")));
        }

        #[test]
        fn all_is_never_a_config_collection() {
            let mut graph = StageGraph::new();
            graph.add_config_collection_name("all");
            graph.add_config_collection_name("mine");
            graph.add_config_collection_name("mine");

            assert_eq!(graph.config_collection_names().collect::<Vec<_>>(), ["mine"]);
        }

        #[test]
        fn no_tag_edge_for_config_collection() {
            let mut graph = StageGraph::new();
            graph.add_config_collection_name("myCollection");
            graph.add_template("a.md", NONE, &["myCollection"]);

            let deps = graph.dependencies_of(&col("myCollection"));
            assert!(deps.contains(&"a.md".to_string()));
            assert!(!deps.contains(&col("[keys]")));
        }
    }

    mod templates {
        use super::*;

        #[test]
        fn consuming_all_only_drops_publishing_into_all() {
            let mut graph = StageGraph::new();
            graph.add_template("list.njk", &["pages"], NONE);
            graph.add_template("sitemap.njk", &["all"], &["all", "pages"]);

            let order = graph.overall_order();
            assert!(position(&order, "sitemap.njk") < position(&order, &col("pages")));
            assert!(position(&order, &col("pages")) < position(&order, "list.njk"));
            assert!(graph.dependencies_of("sitemap.njk").contains(&col("all")));
            assert!(!graph.dependencies_of(&col("all")).contains(&"sitemap.njk".to_string()));
            // A tag edge here would cycle back through `all`
            assert!(!graph.dependencies_of(&col("[basic]")).contains(&col("pages")));
        }

        #[test]
        fn blank_consumes_count_as_none() {
            let mut graph = StageGraph::new();
            graph.add_template("about.md", &[""], NONE);

            assert!(graph.dependants_of("about.md").contains(&col("[basic]")));
            assert!(!graph.has_node(&col("")));
        }

        #[test]
        fn non_consumers_run_in_first_wave() {
            let mut graph = StageGraph::new();
            graph.add_template("./about.md", NONE, NONE);

            assert!(graph.has_node("about.md"));
            assert!(graph.dependants_of("about.md").contains(&col("[basic]")));
        }

        #[test]
        fn consumer_of_tag_runs_after_publishers() {
            let mut graph = StageGraph::new();
            graph.add_template("list.njk", &["posts"], NONE);
            graph.add_template("a.md", NONE, &["posts"]);

            let order = graph.overall_order();
            assert!(position(&order, "a.md") < position(&order, &col("posts")));
            assert!(position(&order, &col("posts")) < position(&order, "list.njk"));
        }

        #[test]
        fn later_stages_wait_for_tags() {
            let mut graph = StageGraph::new();
            graph.add_template("a.md", NONE, &["posts"]);

            assert!(graph.dependencies_of(&col("[basic]")).contains(&col("posts")));
            assert!(graph.dependencies_of(&col("[userconfig]")).contains(&col("posts")));
            assert!(!graph.dependencies_of(&col("posts")).contains(&col("[basic]")));
        }

        #[test]
        fn empty_path_is_ignored() {
            let mut graph = StageGraph::new();
            let before = graph.len();
            graph.add_template("", &["posts"], NONE);
            assert_eq!(graph.len(), before);
        }
    }
}
