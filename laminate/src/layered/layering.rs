// Copyright (c) The laminate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layer assignment and long-edge dummy insertion.
//!
//! Layers are assigned by longest path over a topological order: every node
//! lands one past its furthest predecessor. Edges spanning more than one
//! layer are then normalized by inserting a chain of zero-size dummy nodes,
//! one per intervening layer, so that every surviving edge connects adjacent
//! layers. The user edge rides on the final chain segment.

use crate::geometry::{Point, Size};
use crate::graph::{PortKind, PortSide};
use crate::layered::lgraph::{LEdge, LGraph, LNode, LNodeIx, LNodeKind, LPort, Layer};
use crate::layered::PortConstraints;
use log::debug;
use petgraph::prelude::*;
use smallvec::SmallVec;

pub(super) fn assign_layers(graph: &mut LGraph) {
    let order = topological_order(graph);

    // Longest-path layering: one past the furthest predecessor.
    let mut max_layer = 0;
    for &node in &order {
        let mut layer = 0;
        for edge in graph.node_incoming_edges(node) {
            if !graph.is_self_loop(edge) {
                let source = graph.edge_source_node(edge);
                layer = layer.max(graph.node(source).layer + 1);
            }
        }
        graph.node_mut(node).layer = layer;
        max_layer = max_layer.max(layer);
    }

    graph.layers = vec![Layer::default(); max_layer + 1];
    for &node in &order {
        let layer = graph.node(node).layer;
        graph.layers[layer].nodes.push(node);
    }
    graph.renumber_layer_orders();

    debug!(
        "assigned {} nodes to {} layers",
        graph.nodes.len(),
        graph.layers.len(),
    );
}

/// A topological order of the L-graph's nodes, computed as a reversed DFS
/// post-order on the node adjacency.
fn topological_order(graph: &LGraph) -> Vec<LNodeIx> {
    // Mirror the arena in a petgraph graph; node indices coincide.
    let mut adjacency: Graph<(), (), Directed, u32> = Graph::with_capacity(
        graph.nodes.len(),
        graph.edges.len(),
    );
    for _ in 0..graph.nodes.len() {
        adjacency.add_node(());
    }
    for edge in graph.edge_ixs() {
        if !graph.is_self_loop(edge) {
            adjacency.add_edge(
                NodeIndex::new(graph.edge_source_node(edge).index()),
                NodeIndex::new(graph.edge_target_node(edge).index()),
                (),
            );
        }
    }

    // After cycle breaking the adjacency is a DAG, so every node is
    // reachable from some source node.
    let mut dfs = DfsPostOrder::empty(&adjacency);
    dfs.stack.extend(
        adjacency
            .node_indices()
            .filter(|&n| adjacency.neighbors_directed(n, Incoming).next().is_none()),
    );
    let mut order: Vec<NodeIndex<u32>> = std::iter::from_fn(|| dfs.next(&adjacency)).collect();
    order.reverse();

    debug_assert_eq!(order.len(), graph.nodes.len());
    order.into_iter().map(|n| LNodeIx::new(n.index())).collect()
}

pub(super) fn insert_dummy_nodes(graph: &mut LGraph) {
    let long_edges: Vec<_> = graph
        .edge_ixs()
        .filter(|&edge| {
            !graph.is_self_loop(edge)
                && graph.node(graph.edge_target_node(edge)).layer
                    >= graph.node(graph.edge_source_node(edge)).layer + 2
        })
        .collect();

    let mut dummy_count = 0;
    for edge in long_edges {
        let source_layer = graph.node(graph.edge_source_node(edge)).layer;
        let target_layer = graph.node(graph.edge_target_node(edge)).layer;

        let mut previous_port = graph.edge(edge).source;
        for layer in (source_layer + 1)..target_layer {
            let dummy = graph.add_node(LNode {
                original: None,
                kind: LNodeKind::LongEdgeDummy,
                size: Size::default(),
                position: Point::default(),
                layer,
                order: 0,
                ports: Vec::new(),
                constraints: PortConstraints::Free,
            });
            graph.layers[layer].nodes.push(dummy);
            dummy_count += 1;

            let dummy_in = graph.add_port(LPort {
                original: None,
                owner: dummy,
                side: PortSide::West,
                kind: PortKind::Input,
                size: Size::default(),
                position: Point::default(),
                anchor: Point::default(),
                incoming: SmallVec::new(),
                outgoing: SmallVec::new(),
            });
            let dummy_out = graph.add_port(LPort {
                original: None,
                owner: dummy,
                side: PortSide::East,
                kind: PortKind::Output,
                size: Size::default(),
                position: Point::default(),
                anchor: Point::default(),
                incoming: SmallVec::new(),
                outgoing: SmallVec::new(),
            });

            graph.add_edge(LEdge {
                original: None,
                source: previous_port,
                target: dummy_in,
                reversed: false,
                priority: 0,
                bend_points: Vec::new(),
                junction_points: Vec::new(),
            });
            previous_port = dummy_out;
        }

        // The user edge becomes the last segment of the chain.
        graph.reroute_edge_source(edge, previous_port);
    }

    if dummy_count > 0 {
        graph.renumber_layer_orders();
        debug!("inserted {} long-edge dummies", dummy_count);
    }
}
