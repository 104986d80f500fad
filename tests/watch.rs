//! Watch cycles: queue promotion feeding rebuild planning.

use sitegraph::graph::{DependencyMap, LayoutMap};
use sitegraph::reload::{Priority, WatchQueue, WatchState, plan_rebuild};

const CONFIG: &[&str] = &["sitegraph.toml"];

fn site() -> DependencyMap {
    let mut deps = DependencyMap::new();
    deps.add_dependency("./test.md", &["./_includes/include.njk"]);
    deps.add_dependency("test2.md", &["_includes/include.njk"]);
    deps.add_dependency("index.njk", &[] as &[&str]);
    deps.add_dependency_publishes_to_collection("test.md", "posts");
    deps.add_dependency_consumes_collection("feed.njk", "posts");

    let mut layouts = LayoutMap::default();
    layouts.insert("_includes/base.njk".into(), vec!["test.md".into(), "index.njk".into()]);
    deps.add_layouts_to_map(&layouts);
    deps
}

#[test]
fn batch_mode_promotes_everything() {
    let mut queue = WatchQueue::new(false);
    queue.add_to_pending_queue("test.md");
    queue.add_to_pending_queue("test2.md");
    queue.set_build_running();

    assert_eq!(queue.get_active_queue(), ["./test.md", "./test2.md"]);
    assert_eq!(queue.get_pending_queue_size(), 0);
    assert_eq!(queue.get_incremental_file(), None);
}

#[test]
fn incremental_mode_promotes_one_file() {
    let mut queue = WatchQueue::new(true);
    queue.add_to_pending_queue("test.md");
    queue.add_to_pending_queue("test2.md");
    queue.set_build_running();

    assert_eq!(queue.get_active_queue(), ["./test.md"]);
    assert_eq!(queue.get_pending_queue_size(), 1);
    assert_eq!(queue.get_incremental_file(), Some("./test.md"));
}

#[test]
fn files_queued_mid_build_wait_for_next_cycle() {
    let mut queue = WatchQueue::new(false);
    queue.add_to_pending_queue("test.md");
    queue.set_build_running();
    queue.add_to_pending_queue("test2.md");
    queue.set_build_finished();

    assert_eq!(queue.state(), WatchState::Idle);
    assert!(queue.get_active_queue().is_empty());
    assert_eq!(queue.get_pending_queue(), ["./test2.md"]);
}

#[test]
fn include_change_plans_its_users() {
    let deps = site();
    let mut queue = WatchQueue::new(false);
    queue.add_to_pending_queue("_includes/include.njk");
    queue.set_build_running();

    let plan = plan_rebuild(queue.get_active_queue(), &deps, CONFIG, true);
    queue.set_build_finished();

    assert!(!plan.full);
    assert_eq!(plan.direct, ["_includes/include.njk"]);
    // test.md publishes into posts, which feed.njk consumes
    assert_eq!(plan.affected, ["feed.njk", "test.md", "test2.md"]);
    assert_eq!(
        plan.prioritized().first(),
        Some(&("_includes/include.njk", Priority::Direct))
    );
}

#[test]
fn layout_change_rebuilds_its_templates() {
    let deps = site();
    let plan = plan_rebuild(&["_includes/base.njk"], &deps, CONFIG, true);

    assert_eq!(plan.direct, ["_includes/base.njk"]);
    assert_eq!(plan.affected, ["feed.njk", "index.njk", "test.md"]);
}

#[test]
fn config_change_forces_full_rebuild() {
    let deps = site();
    let plan = plan_rebuild(&["./sitegraph.toml", "test.md"], &deps, CONFIG, false);

    assert!(plan.full);
    assert!(plan.note.unwrap().contains("sitegraph.toml"));
}

#[test]
fn unknown_files_follow_configuration() {
    let deps = site();

    let strict = plan_rebuild(&["new.md"], &deps, CONFIG, true);
    assert!(strict.full);
    assert_eq!(strict.unknown, ["new.md"]);

    let lenient = plan_rebuild(&["new.md"], &deps, CONFIG, false);
    assert!(!lenient.full);
    assert!(lenient.is_empty());
    assert_eq!(lenient.unknown, ["new.md"]);
}
