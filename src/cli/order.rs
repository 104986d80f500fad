//! `order` command: print the stage graph's execution order.

use std::io::{Write, stdout};

use anyhow::Result;

use super::common::load_graphs;
use crate::config::GraphConfig;
use crate::graph::StageGraph;

/// Which view of the stage graph to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderView {
    /// Caller-facing order, `all` last
    Overall,
    /// Every node, stage markers included
    Unfiltered,
    /// Collection names only
    Collections,
}

impl OrderView {
    pub fn from_flags(unfiltered: bool, collections: bool) -> Self {
        match (unfiltered, collections) {
            (_, true) => Self::Collections,
            (true, false) => Self::Unfiltered,
            (false, false) => Self::Overall,
        }
    }
}

pub fn print_order(config: &GraphConfig, view: OrderView) -> Result<()> {
    let mut graphs = load_graphs(config)?;
    write_order(&mut stdout().lock(), &mut graphs.stages, view)
}

/// Write one key per line.
pub fn write_order(out: &mut impl Write, stages: &mut StageGraph, view: OrderView) -> Result<()> {
    let order = match view {
        OrderView::Overall => stages.overall_order(),
        OrderView::Unfiltered => stages.unfiltered_order(),
        OrderView::Collections => stages.collection_order(),
    };
    crate::debug!("stage"; "{} entries ({:?})", order.len(), view);

    for key in &order {
        writeln!(out, "{key}")?;
    }
    Ok(())
}
