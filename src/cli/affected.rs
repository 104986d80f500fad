//! `affected` command: run one watch cycle for a list of changed files.

use std::io::{Write, stdout};
use std::path::Path;

use anyhow::Result;

use super::common::{load_graphs, plural_count};
use crate::config::GraphConfig;
use crate::graph::{DependencyMap, relative_to};
use crate::reload::{Priority, RebuildPlan, WatchQueue, plan_rebuild};

pub fn print_affected(config: &GraphConfig, paths: &[String]) -> Result<()> {
    let graphs = load_graphs(config)?;
    let mut queue = WatchQueue::new(config.watch.incremental);
    for path in paths {
        queue.add_to_pending_queue(&relative_to(Path::new(path), config.get_root()));
    }

    let plan = run_cycle(&mut queue, &graphs.deps, config);
    let mut out = stdout().lock();
    write_plan(&mut out, &plan)?;

    let pending = queue.get_pending_queue_size();
    if pending > 0 {
        writeln!(out, "{} left for later cycles", plural_count(pending, "file"))?;
    }
    Ok(())
}

/// Promote pending files, plan their rebuild, and finish the cycle.
pub fn run_cycle(queue: &mut WatchQueue, deps: &DependencyMap, config: &GraphConfig) -> RebuildPlan {
    queue.set_build_running();
    let plan = plan_rebuild(
        queue.get_active_queue(),
        deps,
        &config.config_file_nodes(),
        config.watch.full_rebuild_on_unknown,
    );
    queue.set_build_finished();
    plan
}

/// One `<kind>\t<file>` line per planned file.
pub fn write_plan(out: &mut impl Write, plan: &RebuildPlan) -> Result<()> {
    if plan.full {
        let note = plan.note.as_deref().unwrap_or("requested");
        writeln!(out, "full rebuild: {note}")?;
        return Ok(());
    }

    for (file, priority) in plan.prioritized() {
        let kind = match priority {
            Priority::Direct => "direct",
            Priority::Affected => "affected",
        };
        writeln!(out, "{kind}\t{file}")?;
    }
    for file in &plan.unknown {
        writeln!(out, "unknown\t{file}")?;
    }
    Ok(())
}
