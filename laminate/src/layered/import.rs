// Copyright (c) The laminate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Import of the user graph into the engine's L-graph.
//!
//! The importer copies nodes and ports, mirrors port geometry for the
//! non-canonical directions (left and up are computed as mirrored right and
//! down), derives undeclared port kinds from connectivity, and assigns sides
//! to ports that don't declare one. Edges missing a source or target port
//! are skipped silently.

use crate::geometry::Point;
use crate::graph::{LayoutGraph, PortId, PortKind, PortSide};
use crate::layered::lgraph::{LEdge, LGraph, LNode, LNodeKind, LPort, LPortIx};
use crate::layered::{
    Direction, LayeredLayout, PortConstraints, PROPERTY_EDGE_PRIORITY, PROPERTY_PORT_CONSTRAINTS,
};
use indexmap::IndexMap;
use log::debug;
use smallvec::SmallVec;

pub(super) fn import_graph(provider: &LayeredLayout, graph: &LayoutGraph) -> LGraph {
    let mut lgraph = LGraph::new(
        provider.node_node_spacing,
        provider.edge_edge_spacing,
        provider.edge_node_spacing,
        provider.layer_spacing,
        provider.seed,
    );
    let direction = provider.direction;

    let mut port_map: IndexMap<PortId, LPortIx> = IndexMap::new();

    for node_id in graph.node_ids() {
        let node = graph.node(node_id);
        let constraints = node
            .properties()
            .get(PROPERTY_PORT_CONSTRAINTS)
            .and_then(|value| PortConstraints::from_property(value))
            .unwrap_or_default();

        let lnode = lgraph.add_node(LNode {
            original: Some(node_id),
            kind: LNodeKind::Normal,
            size: node.size(),
            position: node.position(),
            layer: 0,
            order: 0,
            ports: Vec::new(),
            constraints,
        });

        for &port_id in node.ports() {
            let port = graph.port(port_id);
            let mut side = port.side();
            let mut position = port.position();
            let mut anchor = port.anchor();

            // Left and up layouts run through the canonical pipeline on a
            // mirrored copy; the mirror is undone when results are applied.
            if direction == Direction::Left {
                side = mirror_side_horizontal(side);
                position.x = node.size().width - position.x - port.size().width;
                anchor.x = port.size().width - anchor.x;
            } else if direction == Direction::Up {
                side = mirror_side_vertical(side);
                position.y = node.size().height - position.y - port.size().height;
                anchor.y = port.size().height - anchor.y;
            }

            let lport = lgraph.add_port(LPort {
                original: Some(port_id),
                owner: lnode,
                side,
                kind: port.kind(),
                size: port.size(),
                position,
                anchor,
                incoming: SmallVec::new(),
                outgoing: SmallVec::new(),
            });
            port_map.insert(port_id, lport);
        }
    }

    let mut skipped = 0;
    for edge_id in graph.edge_ids() {
        let edge = graph.edge(edge_id);
        let (source, target) = match (edge.source_ports().first(), edge.target_ports().first()) {
            (Some(&source), Some(&target)) => (source, target),
            _ => {
                skipped += 1;
                continue;
            }
        };
        let (source, target) = match (port_map.get(&source), port_map.get(&target)) {
            (Some(&source), Some(&target)) => (source, target),
            _ => {
                skipped += 1;
                continue;
            }
        };

        let priority = edge
            .properties()
            .get(PROPERTY_EDGE_PRIORITY)
            .and_then(|value| value.parse::<i32>().ok())
            .unwrap_or(0);

        lgraph.add_edge(LEdge {
            original: Some(edge_id),
            source,
            target,
            reversed: false,
            priority,
            bend_points: Vec::new(),
            junction_points: Vec::new(),
        });
    }

    derive_port_kinds(&mut lgraph);
    assign_undefined_sides(&mut lgraph, direction);

    debug!(
        "imported {} nodes, {} ports, {} edges ({} skipped)",
        lgraph.nodes.len(),
        lgraph.ports.len(),
        lgraph.edges.len(),
        skipped,
    );

    lgraph
}

fn mirror_side_horizontal(side: PortSide) -> PortSide {
    match side {
        PortSide::East => PortSide::West,
        PortSide::West => PortSide::East,
        other => other,
    }
}

fn mirror_side_vertical(side: PortSide) -> PortSide {
    match side {
        PortSide::North => PortSide::South,
        PortSide::South => PortSide::North,
        other => other,
    }
}

/// Ports that don't declare a kind get one from their adjacency: a port with
/// outgoing edges emits, one with only incoming edges accepts. Unconnected
/// ports stay undefined.
fn derive_port_kinds(graph: &mut LGraph) {
    for ix in 0..graph.ports.len() {
        let port = &graph.ports[ix];
        if port.kind == PortKind::Undefined {
            if !port.outgoing.is_empty() {
                graph.ports[ix].kind = PortKind::Output;
            } else if !port.incoming.is_empty() {
                graph.ports[ix].kind = PortKind::Input;
            }
        }
    }
}

/// Ports without a declared side get one matching the flow direction, placed
/// at the middle of that side of their node.
fn assign_undefined_sides(graph: &mut LGraph, direction: Direction) {
    for ix in 0..graph.ports.len() {
        if graph.ports[ix].side != PortSide::Undefined {
            continue;
        }
        let owner_size = graph.nodes[graph.ports[ix].owner.index()].size;
        let kind = graph.ports[ix].kind;

        let side = if direction.is_horizontal() {
            match kind {
                PortKind::Input => PortSide::West,
                _ => PortSide::East,
            }
        } else {
            match kind {
                PortKind::Input => PortSide::North,
                _ => PortSide::South,
            }
        };

        let port = &mut graph.ports[ix];
        port.side = side;
        port.position = match side {
            PortSide::West => Point::new(0.0, owner_size.height / 2.0),
            PortSide::East => Point::new(owner_size.width, owner_size.height / 2.0),
            PortSide::North => Point::new(owner_size.width / 2.0, 0.0),
            PortSide::South | PortSide::Undefined => {
                Point::new(owner_size.width / 2.0, owner_size.height)
            }
        };
    }
}
