use std::collections::HashSet;

use super::CommitGraph;

/// Order every commit so that each one comes before all of its parents.
///
/// Iterative two-stack walk. `frontier` holds commits still to visit and is
/// seeded with the roots; `chain` holds the current path of parent -> child
/// edges. When the next commit does not continue the top of `chain`, the
/// chain is unwound into the output until it does. Roots and children are
/// always pushed in ascending hash order, so the result depends only on the
/// shape of the graph.
pub fn topo_order(graph: &CommitGraph) -> Vec<&str> {
    let mut frontier: Vec<&str> = graph.sorted_roots();
    let mut chain: Vec<&str> = Vec::new();
    let mut visited: HashSet<&str> = HashSet::with_capacity(graph.len());
    let mut order: Vec<&str> = Vec::with_capacity(graph.len());

    while let Some(commit) = frontier.pop() {
        if !visited.insert(commit) {
            continue;
        }

        while let Some(&top) = chain.last() {
            if graph.get(top).is_some_and(|node| node.has_child(commit)) {
                break;
            }
            order.push(top);
            chain.pop();
        }

        chain.push(commit);

        if let Some(node) = graph.get(commit) {
            for child in node.sorted_children() {
                if !visited.contains(child) {
                    frontier.push(child);
                }
            }
        }
    }

    order.extend(chain.into_iter().rev());
    order
}
