// Copyright (c) The laminate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Self-loop routing.
//!
//! Self-loops are invisible to the rest of the pipeline: they don't
//! constrain layering and never enter a routing band. Once nodes have their
//! final positions, each loop gets a rectangular detour on the side its
//! source port sits on, just outside the node; multiple loops on one node
//! stack outwards.

use crate::geometry::Point;
use crate::graph::PortSide;
use crate::layered::lgraph::{LEdgeIx, LGraph, LNodeIx};
use indexmap::IndexMap;

pub(super) fn route_self_loops(graph: &mut LGraph) {
    let mut loops_by_node: IndexMap<LNodeIx, Vec<LEdgeIx>> = IndexMap::new();
    for edge in graph.edge_ixs() {
        if graph.is_self_loop(edge) {
            loops_by_node
                .entry(graph.edge_source_node(edge))
                .or_default()
                .push(edge);
        }
    }

    for (node, loops) in loops_by_node {
        for (stack_index, edge) in loops.into_iter().enumerate() {
            route_loop(graph, node, edge, stack_index);
        }
    }
}

fn route_loop(graph: &mut LGraph, node: LNodeIx, edge: LEdgeIx, stack_index: usize) {
    let side = match graph.port(graph.edge(edge).source).side {
        PortSide::Undefined => PortSide::East,
        side => side,
    };
    let offset = graph.edge_node_spacing + stack_index as f64 * graph.edge_edge_spacing;

    let position = graph.node(node).position;
    let size = graph.node(node).size;
    let start = graph.port_absolute_anchor(graph.edge(edge).source);
    let end = graph.port_absolute_anchor(graph.edge(edge).target);

    let bends = match side {
        PortSide::East | PortSide::Undefined => {
            let x = position.x + size.width + offset;
            [Point::new(x, start.y), Point::new(x, end.y)]
        }
        PortSide::West => {
            let x = position.x - offset;
            [Point::new(x, start.y), Point::new(x, end.y)]
        }
        PortSide::North => {
            let y = position.y - offset;
            [Point::new(start.x, y), Point::new(end.x, y)]
        }
        PortSide::South => {
            let y = position.y + size.height + offset;
            [Point::new(start.x, y), Point::new(end.x, y)]
        }
    };

    let e = graph.edge_mut(edge);
    e.bend_points.clear();
    e.bend_points.extend(bends);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::graph::PortKind;
    use crate::layered::lgraph::{LEdge, LNode, LNodeKind, LPort};
    use crate::layered::PortConstraints;
    use smallvec::SmallVec;

    #[test]
    fn east_loop_detours_right_of_the_node() {
        let mut graph = LGraph::new(20.0, 10.0, 10.0, 40.0, 1);
        let node = graph.add_node(LNode {
            original: None,
            kind: LNodeKind::Normal,
            size: Size::new(40.0, 30.0),
            position: Point::new(100.0, 50.0),
            layer: 0,
            order: 0,
            ports: Vec::new(),
            constraints: PortConstraints::Free,
        });
        let out = graph.add_port(LPort {
            original: None,
            owner: node,
            side: PortSide::East,
            kind: PortKind::Output,
            size: Size::default(),
            position: Point::new(40.0, 5.0),
            anchor: Point::default(),
            incoming: SmallVec::new(),
            outgoing: SmallVec::new(),
        });
        let inp = graph.add_port(LPort {
            original: None,
            owner: node,
            side: PortSide::East,
            kind: PortKind::Input,
            size: Size::default(),
            position: Point::new(40.0, 25.0),
            anchor: Point::default(),
            incoming: SmallVec::new(),
            outgoing: SmallVec::new(),
        });
        let edge = graph.add_edge(LEdge {
            original: None,
            source: out,
            target: inp,
            reversed: false,
            priority: 0,
            bend_points: Vec::new(),
            junction_points: Vec::new(),
        });

        route_self_loops(&mut graph);

        let bends = &graph.edge(edge).bend_points;
        // Node right edge at 140, plus the edge-node gap.
        assert_eq!(bends.as_slice(), &[
            Point::new(150.0, 55.0),
            Point::new(150.0, 75.0),
        ]);
    }
}
