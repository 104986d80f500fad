//! `watch` command: plan a rebuild for every settled batch of changes.
//!
//! ```text
//! notify thread ──► crossbeam channel ──► Debouncer ──► WatchQueue ──► build cycle
//!                                                                        │
//!                                            graph cache (deps.json) ◄───┘
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam::channel::{self, RecvTimeoutError};
use notify::{RecursiveMode, Watcher};

use super::affected::run_cycle;
use super::common::{load_graphs, load_graphs_or_cache, plural_count};
use crate::cache::persist_graph;
use crate::config::GraphConfig;
use crate::graph::{BuildGraphs, relative_to};
use crate::logger::{status_error, status_success, status_unchanged, status_warning};
use crate::reload::{Debouncer, RebuildPlan, WatchQueue};
use crate::state::{is_shutdown, set_watching};
use crate::{debug, log};

/// Upper bound on a single blocking wait, so Ctrl+C is noticed promptly.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub fn watch_project(config: &GraphConfig) -> Result<()> {
    let root = config.get_root().to_path_buf();
    let mut graphs = load_graphs_or_cache(config)?;
    save_cache(&graphs, config);

    // Watcher first: events buffer in the channel while we finish setup
    let (tx, rx) = channel::unbounded::<notify::Result<notify::Event>>();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = tx.send(res);
    })
    .context("failed to create file watcher")?;
    watcher
        .watch(&root, RecursiveMode::Recursive)
        .with_context(|| format!("failed to watch {}", root.display()))?;

    set_watching();
    log!("watch"; "watching {} ({} nodes)", root.display(), graphs.deps.len());

    let window = Duration::from_millis(config.watch.debounce_ms);
    let mut debouncer = Debouncer::new(window).ignore(config.root_join(config.cache_dir()));
    let mut queue = WatchQueue::new(config.watch.incremental);

    while !is_shutdown() {
        match rx.recv_timeout(debouncer.sleep_duration().min(POLL_INTERVAL)) {
            Ok(Ok(event)) => debouncer.add_event(&event),
            Ok(Err(e)) => log!("watch"; "notify error: {}", e),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if let Some(changes) = debouncer.take_if_ready() {
            for (path, kind) in changes {
                let node = relative_to(&path, &root);
                debug!("watch"; "{}: {}", kind.label(), node);
                queue.add_to_pending_queue(&node);
            }
        }

        // Incremental mode drains one file per cycle
        while queue.get_pending_queue_size() > 0 && !is_shutdown() {
            let plan = run_cycle(&mut queue, &graphs.deps, config);
            apply_plan(&mut graphs, config, &plan);
        }
    }

    log!("watch"; "stopped");
    Ok(())
}

/// Refresh the graphs a plan invalidated and report the outcome.
fn apply_plan(graphs: &mut BuildGraphs, config: &GraphConfig, plan: &RebuildPlan) {
    if plan.full {
        match load_graphs(config) {
            Ok(fresh) => *graphs = fresh,
            Err(e) => {
                status_error("full rebuild failed", &format!("{e:#}"));
                return;
            }
        }
        save_cache(graphs, config);
        let note = plan.note.as_deref().unwrap_or("requested");
        status_success(&format!("full rebuild ({note})"));
        return;
    }

    if plan.is_empty() {
        status_unchanged(&format!(
            "no templates affected ({})",
            plural_count(plan.unknown.len(), "unindexed file")
        ));
        return;
    }

    for (file, priority) in plan.prioritized() {
        debug!("plan"; "{:?}: {}", priority, file);
    }
    status_success(&format!(
        "rebuild {} ({} changed, {} affected)",
        plural_count(plan.direct.len() + plan.affected.len(), "template"),
        plan.direct.len(),
        plan.affected.len()
    ));
}

fn save_cache(graphs: &BuildGraphs, config: &GraphConfig) {
    if let Err(e) = persist_graph(&graphs.deps, config.get_root(), config.cache_dir()) {
        status_warning(&format!("could not save dependency cache: {e}"));
    }
}
