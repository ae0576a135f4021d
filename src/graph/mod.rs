//! Commit graph reconstructed from branch heads.
//!
//! Nodes never hold references to each other. Parent and child edges are
//! stored as hash keys into the [`CommitGraph`] registry, which owns every
//! node for the lifetime of a run.

use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use crate::error::Result;

pub mod topo;

/// Anything that can answer "which commits are the parents of `hash`".
pub trait ParentSource {
    fn parents(&self, hash: &str) -> Result<HashSet<String>>;
}

impl ParentSource for HashMap<String, HashSet<String>> {
    fn parents(&self, hash: &str) -> Result<HashSet<String>> {
        Ok(self.get(hash).cloned().unwrap_or_default())
    }
}

/// A single commit. Two nodes are equal iff their hashes are equal.
#[derive(Debug, Clone)]
pub struct CommitNode {
    pub hash: String,
    pub parents: HashSet<String>,
    pub children: HashSet<String>,
}

impl PartialEq for CommitNode {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for CommitNode {}

impl CommitNode {
    pub fn new(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            parents: HashSet::new(),
            children: HashSet::new(),
        }
    }

    pub fn has_parent(&self, hash: &str) -> bool {
        self.parents.contains(hash)
    }

    pub fn has_child(&self, hash: &str) -> bool {
        self.children.contains(hash)
    }

    /// Parent hashes in ascending order.
    pub fn sorted_parents(&self) -> Vec<&str> {
        sorted(&self.parents)
    }

    /// Child hashes in ascending order.
    pub fn sorted_children(&self) -> Vec<&str> {
        sorted(&self.children)
    }
}

fn sorted(hashes: &HashSet<String>) -> Vec<&str> {
    let mut hashes: Vec<&str> = hashes.iter().map(String::as_str).collect();
    hashes.sort_unstable();
    hashes
}

/// Registry of every commit reachable from the branch heads, plus the roots.
#[derive(Debug, Clone, Default)]
pub struct CommitGraph {
    nodes: HashMap<String, CommitNode>,
    roots: HashSet<String>,
}

impl CommitGraph {
    /// Discover every commit reachable from `heads` by following parent links.
    ///
    /// Each commit is read from `source` exactly once. Child edges are recorded
    /// every time an edge is seen, even when the parent was already visited,
    /// so the final child sets do not depend on discovery order.
    pub fn build<S: ParentSource + ?Sized>(source: &S, heads: &[String]) -> Result<Self> {
        let mut graph = CommitGraph::default();
        let mut visited: HashSet<String> = HashSet::new();
        let mut stack: Vec<String> = heads.to_vec();

        while let Some(commit_hash) = stack.pop() {
            if !visited.insert(commit_hash.clone()) {
                continue;
            }

            let parents = source.parents(&commit_hash)?;

            for parent_hash in &parents {
                graph
                    .nodes
                    .entry(parent_hash.clone())
                    .or_insert_with(|| CommitNode::new(parent_hash.clone()))
                    .children
                    .insert(commit_hash.clone());

                if !visited.contains(parent_hash) {
                    stack.push(parent_hash.clone());
                }
            }

            if parents.is_empty() {
                debug!(commit = %commit_hash, "found root commit");
                graph.roots.insert(commit_hash.clone());
            }

            graph
                .nodes
                .entry(commit_hash.clone())
                .or_insert_with(|| CommitNode::new(commit_hash.clone()))
                .parents = parents;
        }

        info!(
            commits = graph.nodes.len(),
            roots = graph.roots.len(),
            "built commit graph"
        );
        Ok(graph)
    }

    pub fn get(&self, hash: &str) -> Option<&CommitNode> {
        self.nodes.get(hash)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &CommitNode> {
        self.nodes.values()
    }

    /// Root hashes in ascending order.
    pub fn sorted_roots(&self) -> Vec<&str> {
        sorted(&self.roots)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
