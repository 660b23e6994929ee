// Copyright (c) The laminate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transfer of the computed layout back to the user graph.
//!
//! Only normal nodes with an original reference are written back; dummies
//! stay engine-internal. Every routed edge becomes a single section running
//! from the source port's absolute anchor over the bend points to the target
//! port's absolute anchor. The whole drawing is shifted by the graph
//! padding, and the graph size is the padded bounding box of the normal
//! nodes.

use crate::geometry::{Point, Size};
use crate::graph::{EdgeSection, LayoutGraph};
use crate::layered::lgraph::{LGraph, LNodeKind};
use crate::layered::Direction;

/// Padding between the graph border and its content, applied on all sides.
const GRAPH_PADDING: f64 = 12.0;
/// Smallest size reported for a laid-out graph.
const MIN_GRAPH_SIZE: f64 = 40.0;

pub(super) fn apply_layout(lgraph: &mut LGraph, graph: &mut LayoutGraph, direction: Direction) {
    if direction.is_mirrored() {
        mirror(lgraph, direction);
    }

    let padding = Point::new(GRAPH_PADDING, GRAPH_PADDING);

    // Node and port geometry.
    for ix in lgraph.node_ixs() {
        let lnode = lgraph.node(ix);
        if lnode.kind != LNodeKind::Normal {
            continue;
        }
        let node_id = match lnode.original {
            Some(id) => id,
            None => continue,
        };
        graph.nodes[node_id.index()].position = lnode.position + padding;

        for &port_ix in &lnode.ports {
            let lport = lgraph.port(port_ix);
            if let Some(port_id) = lport.original {
                graph.ports[port_id.index()].position = lport.position;
                graph.ports[port_id.index()].anchor = lport.anchor;
            }
        }
    }

    // Edge sections and junction points.
    for ix in lgraph.edge_ixs() {
        let ledge = lgraph.edge(ix);
        let edge_id = match ledge.original {
            Some(id) => id,
            None => continue,
        };

        let mut points = Vec::with_capacity(ledge.bend_points.len() + 2);
        points.push(lgraph.port_absolute_anchor(ledge.source) + padding);
        points.extend(ledge.bend_points.iter().map(|&p| p + padding));
        points.push(lgraph.port_absolute_anchor(ledge.target) + padding);

        let section = EdgeSection {
            start_point: points[0],
            end_point: points[points.len() - 1],
            bend_points: points[1..points.len() - 1].to_vec(),
        };

        let edge = &mut graph.edges[edge_id.index()];
        edge.sections = vec![section];
        edge.junction_points = ledge.junction_points.iter().map(|&p| p + padding).collect();
    }

    // Overall graph size: the padded bounding box of the normal nodes.
    let mut max_x: f64 = 0.0;
    let mut max_y: f64 = 0.0;
    for ix in lgraph.node_ixs() {
        let lnode = lgraph.node(ix);
        if lnode.kind == LNodeKind::Normal && lnode.original.is_some() {
            max_x = max_x.max(lnode.position.x + lnode.size.width);
            max_y = max_y.max(lnode.position.y + lnode.size.height);
        }
    }
    graph.size = Size::new(
        (max_x + 2.0 * GRAPH_PADDING).max(MIN_GRAPH_SIZE),
        (max_y + 2.0 * GRAPH_PADDING).max(MIN_GRAPH_SIZE),
    );
}

/// Reflects the computed layout so that left and up layouts come out of the
/// canonical rightward/downward pipeline. Port geometry is reflected within
/// each node, undoing the reflection applied at import.
fn mirror(lgraph: &mut LGraph, direction: Direction) {
    let horizontal = direction == Direction::Left;

    // The router records the full content width; vertical layouts derive
    // their extent from the nodes.
    let extent = if horizontal {
        lgraph.size.width
    } else {
        lgraph
            .nodes
            .iter()
            .map(|n| n.position.y + n.size.height)
            .fold(0.0, f64::max)
    };

    for node in &mut lgraph.nodes {
        if horizontal {
            node.position.x = extent - node.position.x - node.size.width;
        } else {
            node.position.y = extent - node.position.y - node.size.height;
        }
    }

    for port in &mut lgraph.ports {
        let owner_size = lgraph.nodes[port.owner.index()].size;
        if horizontal {
            port.position.x = owner_size.width - port.position.x - port.size.width;
            port.anchor.x = port.size.width - port.anchor.x;
        } else {
            port.position.y = owner_size.height - port.position.y - port.size.height;
            port.anchor.y = port.size.height - port.anchor.y;
        }
    }

    for edge in &mut lgraph.edges {
        for point in edge
            .bend_points
            .iter_mut()
            .chain(edge.junction_points.iter_mut())
        {
            if horizontal {
                point.x = extent - point.x;
            } else {
                point.y = extent - point.y;
            }
        }
    }
}
