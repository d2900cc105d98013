//! Critical path extraction.
//!
//! Starting from every critical terminal that finishes on the project
//! finish, walk back through critical predecessors, preferring the one with
//! the latest earliest finish (the one actually gating the start) and
//! breaking ties by lexical id. The longest chain wins; equal lengths go to
//! the lexically smaller terminal. When recorded actuals leave no terminal
//! on the project finish, any critical node finishing there may end the path.

use super::timing::Passes;
use crate::graph::DependencyGraph;

/// Node indices on the critical path, root first.
pub(crate) fn critical_path(graph: &DependencyGraph, passes: &Passes) -> Vec<usize> {
    let nodes = graph.nodes();

    let ends_project = |i: usize| passes.is_critical(i) && passes.ef[i] == passes.project_finish;
    // Index order is lexical id order, so ascending iteration gives the
    // terminal tie-break for free.
    let mut ends: Vec<usize> = (0..nodes.len())
        .filter(|&i| nodes[i].successors().is_empty() && ends_project(i))
        .collect();
    if ends.is_empty() {
        ends = (0..nodes.len()).filter(|&i| ends_project(i)).collect();
    }

    let mut best: Vec<usize> = Vec::new();
    for end in ends {
        let chain = walk_back(graph, passes, end);
        if chain.len() > best.len() {
            best = chain;
        }
    }
    best.reverse();
    best
}

fn walk_back(graph: &DependencyGraph, passes: &Passes, end: usize) -> Vec<usize> {
    let nodes = graph.nodes();
    let mut chain = vec![end];
    let mut current = end;
    while let Some(prev) = nodes[current]
        .predecessors()
        .iter()
        .copied()
        .filter(|&p| passes.is_critical(p))
        .min_by_key(|&p| (std::cmp::Reverse(passes.ef[p]), p))
    {
        chain.push(prev);
        current = prev;
    }
    chain
}
