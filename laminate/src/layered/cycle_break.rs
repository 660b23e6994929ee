// Copyright (c) The laminate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cycle breaking.
//!
//! A depth-first traversal from every unvisited node marks each edge whose
//! target is on the current recursion stack as reversed, swapping the edge's
//! ports in place. Reversed back edges point from an ancestor to a
//! descendant of the traversal, so the remaining graph is acyclic.
//!
//! Outgoing edges are visited in descending priority order, which makes
//! high-priority edges the least likely to end up reversed. Self-loops never
//! constrain layering and are ignored here.

use crate::layered::lgraph::{LEdgeIx, LGraph, LNodeIx};
use fixedbitset::FixedBitSet;
use log::debug;

pub(super) fn break_cycles(graph: &mut LGraph) {
    let node_count = graph.nodes.len();
    let mut visited = FixedBitSet::with_capacity(node_count);
    let mut on_stack = FixedBitSet::with_capacity(node_count);
    let mut reversed_count = 0;

    for root in graph.node_ixs() {
        if visited.contains(root.index()) {
            continue;
        }

        let mut stack: Vec<(LNodeIx, Vec<LEdgeIx>, usize)> = Vec::new();
        visited.insert(root.index());
        on_stack.insert(root.index());
        stack.push((root, prioritized_outgoing(graph, root), 0));

        while let Some(frame) = stack.last_mut() {
            let (node, edges, next) = (frame.0, &frame.1, &mut frame.2);

            if *next >= edges.len() {
                on_stack.set(node.index(), false);
                stack.pop();
                continue;
            }

            let edge = edges[*next];
            *next += 1;

            if graph.edge(edge).reversed || graph.is_self_loop(edge) {
                continue;
            }

            let target = graph.edge_target_node(edge);
            if on_stack.contains(target.index()) {
                graph.reverse_edge(edge);
                reversed_count += 1;
            } else if !visited.contains(target.index()) {
                visited.insert(target.index());
                on_stack.insert(target.index());
                let target_edges = prioritized_outgoing(graph, target);
                stack.push((target, target_edges, 0));
            }
        }
    }

    if reversed_count > 0 {
        debug!("reversed {} edges to break cycles", reversed_count);
    }
}

/// The node's outgoing edges, highest priority first. The sort is stable so
/// equal priorities keep their creation order.
fn prioritized_outgoing(graph: &LGraph, node: LNodeIx) -> Vec<LEdgeIx> {
    let mut edges = graph.node_outgoing_edges(node);
    edges.sort_by_key(|&e| std::cmp::Reverse(graph.edge(e).priority));
    edges
}
