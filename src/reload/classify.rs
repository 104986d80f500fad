//! Rebuild Planning
//!
//! Pure functions turning the active watch queue into a rebuild plan.
//! No I/O, no global state.

use rustc_hash::FxHashSet;

use crate::graph::{DependencyMap, normalize_node};

// =============================================================================
// Priority
// =============================================================================

/// Rebuild priority of a template.
///
/// Higher value = rebuilt first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// Uses a changed file, directly or through collections
    Affected = 1,
    /// Changed on disk
    Direct = 2,
}

// =============================================================================
// Rebuild Plan
// =============================================================================

/// What a build cycle has to redo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebuildPlan {
    /// Everything must be rebuilt (config changed, or unknown file seen)
    pub full: bool,
    /// Changed files the graph knows about
    pub direct: Vec<String>,
    /// Files that use a changed file, excluding `direct`
    pub affected: Vec<String>,
    /// Changed files the graph has never indexed
    pub unknown: Vec<String>,
    /// Why a full rebuild was chosen
    pub note: Option<String>,
}

impl RebuildPlan {
    pub fn is_empty(&self) -> bool {
        !self.full && self.direct.is_empty() && self.affected.is_empty()
    }

    /// Files in rebuild order, direct changes first.
    pub fn prioritized(&self) -> Vec<(&str, Priority)> {
        let mut files: Vec<_> = self
            .direct
            .iter()
            .map(|f| (f.as_str(), Priority::Direct))
            .chain(self.affected.iter().map(|f| (f.as_str(), Priority::Affected)))
            .collect();
        // Stable: insertion order is kept within a priority
        files.sort_by_key(|(_, priority)| std::cmp::Reverse(*priority));
        files
    }
}

/// Plan a rebuild for the files of one build cycle.
///
/// - a changed config file forces a full rebuild
/// - unknown files force a full rebuild when `full_on_unknown` is set
/// - otherwise only the changed files and their dependants are rebuilt
pub fn plan_rebuild<S, C>(
    changed: &[S],
    deps: &DependencyMap,
    config_files: &[C],
    full_on_unknown: bool,
) -> RebuildPlan
where
    S: AsRef<str>,
    C: AsRef<str>,
{
    let config_files: FxHashSet<String> = config_files
        .iter()
        .map(|f| normalize_node(f.as_ref()))
        .collect();

    let mut plan = RebuildPlan::default();
    let mut seen = FxHashSet::default();

    for path in changed {
        let node = normalize_node(path.as_ref());
        if node.is_empty() || !seen.insert(node.clone()) {
            continue;
        }

        if config_files.contains(&node) {
            plan.full = true;
            plan.note = Some(format!("config changed: {node}"));
        } else if deps.has_node(&node) {
            plan.direct.push(node);
        } else {
            plan.unknown.push(node);
        }
    }

    if !plan.full && full_on_unknown && !plan.unknown.is_empty() {
        plan.full = true;
        plan.note = Some(format!("not in dependency graph: {}", plan.unknown.join(", ")));
    }

    if plan.full {
        return plan;
    }

    let direct: FxHashSet<&str> = plan.direct.iter().map(String::as_str).collect();
    plan.affected = deps
        .get_templates_relevant_to_file_list(&plan.direct, false)
        .into_iter()
        .filter(|node| !direct.contains(node.as_str()))
        .collect();

    crate::debug!(
        "plan";
        "{} direct, {} affected, {} unknown",
        plan.direct.len(),
        plan.affected.len(),
        plan.unknown.len()
    );
    plan
}

// =============================================================================
// Tests
// =============================================================================
