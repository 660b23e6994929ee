// Copyright (c) The laminate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Crossing minimization by repeated barycenter layer sweeps.
//!
//! Alternating forward and backward sweeps reorder each layer by the mean
//! position of its neighbours in the previously processed layer. The sort is
//! stable, so nodes without neighbours and ties keep their relative order.
//! A fixed number of iterations suffices in practice; the loop exits early
//! once a full iteration changes nothing.

use crate::layered::lgraph::LGraph;
use crate::layered::CrossingMinimization;
use log::debug;

const SWEEP_ITERATIONS: usize = 5;

pub(super) fn minimize_crossings(graph: &mut LGraph, strategy: CrossingMinimization) {
    if strategy == CrossingMinimization::None {
        return;
    }

    for iteration in 0..SWEEP_ITERATIONS {
        let mut changed = false;
        for layer in 1..graph.layers.len() {
            changed |= barycenter_pass(graph, layer, true);
        }
        if graph.layers.len() >= 2 {
            for layer in (0..graph.layers.len() - 1).rev() {
                changed |= barycenter_pass(graph, layer, false);
            }
        }
        if !changed {
            debug!("crossing minimization settled after {} iterations", iteration + 1);
            break;
        }
    }
}

/// Reorders one layer by barycenter. With `use_incoming`, a node follows the
/// mean order of the sources of its incoming edges (forward sweep);
/// otherwise the targets of its outgoing edges (backward sweep). Returns
/// true if the layer's order changed.
fn barycenter_pass(graph: &mut LGraph, layer: usize, use_incoming: bool) -> bool {
    let nodes = graph.layers[layer].nodes.clone();

    let mut keyed: Vec<(f64, _)> = nodes
        .iter()
        .map(|&node| {
            let edges = if use_incoming {
                graph.node_incoming_edges(node)
            } else {
                graph.node_outgoing_edges(node)
            };

            let mut sum = 0.0;
            let mut count = 0;
            for edge in edges {
                if graph.is_self_loop(edge) {
                    continue;
                }
                let other = if use_incoming {
                    graph.edge_source_node(edge)
                } else {
                    graph.edge_target_node(edge)
                };
                sum += graph.node(other).order as f64;
                count += 1;
            }

            let barycenter = if count > 0 {
                sum / count as f64
            } else {
                // No neighbours in the fixed layer: hold the current spot.
                graph.node(node).order as f64
            };
            (barycenter, node)
        })
        .collect();

    keyed.sort_by(|a, b| f64::total_cmp(&a.0, &b.0));

    let reordered: Vec<_> = keyed.into_iter().map(|(_, node)| node).collect();
    let changed = reordered != nodes;

    for (position, &node) in reordered.iter().enumerate() {
        graph.node_mut(node).order = position;
    }
    graph.layers[layer].nodes = reordered;

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Size};
    use crate::graph::{PortKind, PortSide};
    use crate::layered::lgraph::{LEdge, LNode, LNodeIx, LNodeKind, LPort, Layer};
    use crate::layered::PortConstraints;
    use smallvec::SmallVec;

    fn node_in_layer(graph: &mut LGraph, layer: usize, order: usize) -> LNodeIx {
        let ix = graph.add_node(LNode {
            original: None,
            kind: LNodeKind::Normal,
            size: Size::new(10.0, 10.0),
            position: Point::default(),
            layer,
            order,
            ports: Vec::new(),
            constraints: PortConstraints::Free,
        });
        while graph.layers.len() <= layer {
            graph.layers.push(Layer::default());
        }
        graph.layers[layer].nodes.push(ix);
        ix
    }

    fn connect(graph: &mut LGraph, from: LNodeIx, to: LNodeIx) {
        let out = graph.add_port(LPort {
            original: None,
            owner: from,
            side: PortSide::East,
            kind: PortKind::Output,
            size: Size::default(),
            position: Point::default(),
            anchor: Point::default(),
            incoming: SmallVec::new(),
            outgoing: SmallVec::new(),
        });
        let inp = graph.add_port(LPort {
            original: None,
            owner: to,
            side: PortSide::West,
            kind: PortKind::Input,
            size: Size::default(),
            position: Point::default(),
            anchor: Point::default(),
            incoming: SmallVec::new(),
            outgoing: SmallVec::new(),
        });
        graph.add_edge(LEdge {
            original: None,
            source: out,
            target: inp,
            reversed: false,
            priority: 0,
            bend_points: Vec::new(),
            junction_points: Vec::new(),
        });
    }

    #[test]
    fn crossed_pair_is_untangled() {
        let mut graph = LGraph::new(20.0, 10.0, 10.0, 40.0, 1);
        let a0 = node_in_layer(&mut graph, 0, 0);
        let a1 = node_in_layer(&mut graph, 0, 1);
        let b0 = node_in_layer(&mut graph, 1, 0);
        let b1 = node_in_layer(&mut graph, 1, 1);
        // a0 feeds the bottom slot, a1 the top one: one crossing.
        connect(&mut graph, a0, b1);
        connect(&mut graph, a1, b0);

        minimize_crossings(&mut graph, CrossingMinimization::LayerSweep);

        // The second layer follows its sources, removing the crossing.
        assert_eq!(graph.node(b1).order, graph.node(a0).order);
        assert_eq!(graph.node(b0).order, graph.node(a1).order);
    }

    #[test]
    fn strategy_none_keeps_order() {
        let mut graph = LGraph::new(20.0, 10.0, 10.0, 40.0, 1);
        let a0 = node_in_layer(&mut graph, 0, 0);
        let a1 = node_in_layer(&mut graph, 0, 1);
        let b0 = node_in_layer(&mut graph, 1, 0);
        let b1 = node_in_layer(&mut graph, 1, 1);
        connect(&mut graph, a0, b1);
        connect(&mut graph, a1, b0);

        minimize_crossings(&mut graph, CrossingMinimization::None);
        assert_eq!(graph.node(b0).order, 0);
        assert_eq!(graph.node(b1).order, 1);
    }

    #[test]
    fn unconnected_nodes_hold_their_spot() {
        let mut graph = LGraph::new(20.0, 10.0, 10.0, 40.0, 1);
        let a0 = node_in_layer(&mut graph, 0, 0);
        let b0 = node_in_layer(&mut graph, 1, 0);
        let b1 = node_in_layer(&mut graph, 1, 1);
        connect(&mut graph, a0, b1);

        minimize_crossings(&mut graph, CrossingMinimization::LayerSweep);

        // b0 has no neighbours; b1's barycenter equals a0's order, which
        // ties with b0's held position, and the stable sort keeps b0 first.
        assert_eq!(graph.node(b0).order, 0);
        assert_eq!(graph.node(b1).order, 1);
    }
}
