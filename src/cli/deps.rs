//! `deps` command: print what a node uses, or what uses it.

use std::io::{Write, stdout};

use anyhow::{Result, bail};

use super::common::load_graphs;
use crate::config::GraphConfig;
use crate::graph::{DependencyMap, Lookup, NodeKind};

pub fn print_deps(
    config: &GraphConfig,
    node: &str,
    dependants: bool,
    no_layouts: bool,
) -> Result<()> {
    let graphs = load_graphs(config)?;
    write_deps(&mut stdout().lock(), &graphs.deps, node, dependants, !no_layouts)
}

/// Direct dependencies (or dependants) of `node`, one per line.
pub fn write_deps(
    out: &mut impl Write,
    deps: &DependencyMap,
    node: &str,
    dependants: bool,
    include_layouts: bool,
) -> Result<()> {
    let nodes = if dependants {
        if !deps.has_node(node) {
            bail!("`{node}` is not in the dependency graph");
        }
        deps.get_dependants_for(node)
            .into_iter()
            .filter(|n| include_layouts || deps.node_kind(n) != Some(NodeKind::Layout))
            .collect()
    } else {
        match deps.get_dependencies(node, include_layouts) {
            Lookup::Known(nodes) => nodes,
            Lookup::Unknown => bail!("`{node}` is not in the dependency graph"),
        }
    };

    for dep in &nodes {
        writeln!(out, "{dep}")?;
    }
    Ok(())
}
