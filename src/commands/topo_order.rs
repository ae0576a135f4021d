use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::Path;
use tracing::info;

use crate::graph::topo::topo_order;
use crate::graph::CommitGraph;
use crate::repository::objects::LooseObjectStore;
use crate::repository::refs::{self, BranchMap};
use crate::repository::Repository;

/// Print every commit reachable from a local branch in topological order.
///
/// The whole listing is rendered before anything is written, so a failure
/// part way through never leaves partial output on stdout.
pub fn execute(start_dir: &Path) -> Result<()> {
    let output = run(start_dir)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;

    Ok(())
}

pub fn run(start_dir: &Path) -> Result<String> {
    let repo = Repository::discover(start_dir)?;

    let branches = refs::read_branches(repo.heads_dir())
        .with_context(|| format!("failed to read branches in {}", repo.git_dir.display()))?;
    if branches.is_empty() {
        info!("no local branches");
    } else {
        info!(branches = branches.len(), "read branch heads");
    }

    let store = LooseObjectStore::new(repo.objects_dir());
    let graph = CommitGraph::build(&store, &branches.heads())
        .context("failed to build the commit graph")?;

    if graph.is_empty() {
        return Ok(String::new());
    }

    let merges = graph.nodes().filter(|node| node.parents.len() > 1).count();
    info!(commits = graph.len(), merges, "sorting commits");

    let order = topo_order(&graph);
    Ok(render(&graph, &order, &branches))
}

/// Render `order` with branch labels and discontinuity markers.
///
/// Whenever the next commit is not a parent of the current one, the current
/// commit's parents are printed as `<parents>=` followed by a blank line, and
/// the next commit is preceded by `=<children>`.
pub fn render(graph: &CommitGraph, order: &[&str], branches: &BranchMap) -> String {
    let mut out = String::new();
    let mut jumped = false;

    for (i, &commit_hash) in order.iter().enumerate() {
        let node = graph.get(commit_hash);
        let children = node.map(|n| n.sorted_children()).unwrap_or_default();
        let parents = node.map(|n| n.sorted_parents()).unwrap_or_default();

        if jumped {
            jumped = false;
            out.push_str(&format!("={}\n", children.join(" ")));
        }

        out.push_str(commit_hash);
        let names = branches.names_at(commit_hash);
        if !names.is_empty() {
            out.push(' ');
            out.push_str(&names.join(" "));
        }
        out.push('\n');

        if let Some(&next) = order.get(i + 1) {
            if !node.is_some_and(|n| n.has_parent(next)) {
                jumped = true;
                out.push_str(&format!("{}=\n\n", parents.join(" ")));
            }
        }
    }

    out
}
