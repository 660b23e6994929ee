// Copyright (c) The laminate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Node placement.
//!
//! Horizontal layouts place nodes along the cross axis (Y) using linear
//! segments: maximal chains of long-edge dummies move as one unit so the
//! edge they carry stays straight, and every other node is a unit of its
//! own. Segments are placed greedily in a topologically valid order, each
//! taking the smallest coordinate that respects the node spacing against
//! everything already placed in its layers. The along-axis coordinate is
//! assigned later by the edge router from the routing slot counts.
//!
//! Vertical layouts use a stacked placement: nodes line up along X within
//! their layer, and the gap between consecutive layers is inflated by how
//! far ports protrude beyond the node boxes.
//!
//! Both paths cache the per-layer port extent maxima on the layers.

use crate::layered::lgraph::{LGraph, LNodeIx, LNodeKind};
use log::debug;
use petgraph::prelude::*;
use petgraph::visit::VisitMap;

pub(super) fn place_nodes_horizontal(graph: &mut LGraph) {
    compute_port_extents(graph);

    let segments = collect_linear_segments(graph);
    let order = segment_order(graph, &segments);

    let mut layer_bottom: Vec<Option<f64>> = vec![None; graph.layers.len()];
    for &segment_ix in &order {
        let members = &segments[segment_ix];

        let mut y: f64 = 0.0;
        for &node in members {
            if let Some(bottom) = layer_bottom[graph.node(node).layer] {
                y = y.max(bottom + graph.node_node_spacing);
            }
        }
        for &node in members {
            let layer = graph.node(node).layer;
            let height = graph.node(node).size.height;
            graph.node_mut(node).position.y = y;
            layer_bottom[layer] = Some(y + height);
        }
    }

    debug!("placed {} linear segments", segments.len());
}

pub(super) fn place_nodes_vertical(graph: &mut LGraph) {
    compute_port_extents(graph);

    let mut current_y = 0.0;
    for layer_ix in 0..graph.layers.len() {
        let nodes = graph.layers[layer_ix].nodes.clone();
        let mut current_x = 0.0;
        let mut max_height: f64 = 0.0;

        for node in nodes {
            let size = graph.node(node).size;
            graph.node_mut(node).position.x = current_x;
            graph.node_mut(node).position.y = current_y;
            current_x += size.width + graph.node_node_spacing;
            max_height = max_height.max(size.height);
        }

        // The gap to the next layer grows by however far ports stick out of
        // the node boxes on the facing sides.
        let mut effective_spacing = graph.layer_spacing;
        effective_spacing += graph.layers[layer_ix].max_port_extent_below;
        if layer_ix + 1 < graph.layers.len() {
            effective_spacing += graph.layers[layer_ix + 1].max_port_extent_above;
        }

        current_y += max_height + effective_spacing;
    }
}

/// Caches, per layer, the largest amounts by which a port protrudes above or
/// below its node's bounding box.
fn compute_port_extents(graph: &mut LGraph) {
    for layer_ix in 0..graph.layers.len() {
        let mut above: f64 = 0.0;
        let mut below: f64 = 0.0;
        for &node in &graph.layers[layer_ix].nodes {
            let node_height = graph.node(node).size.height;
            for &port in &graph.node(node).ports {
                let p = graph.port(port);
                above = above.max(-p.position.y);
                below = below.max(p.position.y + p.size.height - node_height);
            }
        }
        graph.layers[layer_ix].max_port_extent_above = above;
        graph.layers[layer_ix].max_port_extent_below = below;
    }
}

/// Groups the graph's nodes into linear segments: maximal dummy chains plus
/// singleton real nodes. Returns the member lists; members are ordered by
/// layer along each chain.
fn collect_linear_segments(graph: &LGraph) -> Vec<Vec<LNodeIx>> {
    let mut segment_of: Vec<Option<usize>> = vec![None; graph.nodes.len()];
    let mut segments: Vec<Vec<LNodeIx>> = Vec::new();

    for node in graph.node_ixs() {
        if segment_of[node.index()].is_some() {
            continue;
        }

        if graph.node(node).kind == LNodeKind::Normal {
            segment_of[node.index()] = Some(segments.len());
            segments.push(vec![node]);
            continue;
        }

        // Walk back to the head of this dummy chain, then collect forward.
        let mut head = node;
        loop {
            let predecessor = graph
                .node_incoming_edges(head)
                .first()
                .map(|&edge| graph.edge_source_node(edge));
            match predecessor {
                Some(pred) if graph.node(pred).kind == LNodeKind::LongEdgeDummy => head = pred,
                _ => break,
            }
        }

        let segment_ix = segments.len();
        let mut members = Vec::new();
        let mut current = head;
        loop {
            segment_of[current.index()] = Some(segment_ix);
            members.push(current);
            let successor = graph
                .node_outgoing_edges(current)
                .first()
                .map(|&edge| graph.edge_target_node(edge));
            match successor {
                Some(next) if graph.node(next).kind == LNodeKind::LongEdgeDummy => current = next,
                _ => break,
            }
        }
        segments.push(members);
    }

    segments
}

/// Orders segments so that within every layer, a segment containing an
/// earlier node is placed before one containing a later node. The
/// constraints form a DAG in all but pathological cases; the DFS post-order
/// walk tolerates cycles by ignoring the offending constraint.
fn segment_order(graph: &LGraph, segments: &[Vec<LNodeIx>]) -> Vec<usize> {
    let mut segment_of = vec![0usize; graph.nodes.len()];
    for (segment_ix, members) in segments.iter().enumerate() {
        for &node in members {
            segment_of[node.index()] = segment_ix;
        }
    }

    let mut constraints: Graph<(), (), Directed, u32> =
        Graph::with_capacity(segments.len(), graph.nodes.len());
    for _ in 0..segments.len() {
        constraints.add_node(());
    }
    for layer in &graph.layers {
        for pair in layer.nodes.windows(2) {
            let upper = segment_of[pair[0].index()];
            let lower = segment_of[pair[1].index()];
            if upper != lower {
                constraints.add_edge(NodeIndex::new(upper), NodeIndex::new(lower), ());
            }
        }
    }

    // Reversed DFS post-order: a topological order on a DAG, and still a
    // usable total order if a constraint cycle slips through.
    let mut dfs = DfsPostOrder::empty(&constraints);
    dfs.stack.extend(
        constraints
            .node_indices()
            .filter(|&n| constraints.neighbors_directed(n, Incoming).next().is_none()),
    );
    let mut order: Vec<NodeIndex<u32>> = std::iter::from_fn(|| dfs.next(&constraints)).collect();
    // Constraint cycles can leave nodes unvisited; sweep them up.
    for n in constraints.node_indices() {
        if !dfs.finished.is_visited(&n) {
            dfs.move_to(n);
            while let Some(visited) = dfs.next(&constraints) {
                order.push(visited);
            }
        }
    }
    order.reverse();

    order.into_iter().map(|n| n.index()).collect()
}
