// Copyright (c) The laminate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The engine's intermediate graph representation.
//!
//! An [`LGraph`] owns all layout-time entities in arena vectors; every
//! cross-reference between them is a compact index type. This keeps the
//! heavily cyclic node/port/edge structure free of ownership knots and makes
//! iteration while mutating unproblematic.
//!
//! The L-graph is created by the importer, threaded through the pipeline
//! phases, and dropped after its results have been applied to the user
//! graph.

use crate::geometry::{Point, Size};
use crate::graph::{EdgeId, NodeId, PortId, PortKind, PortSide};
use crate::layered::PortConstraints;
use rand::rngs::StdRng;
use rand::SeedableRng;
use smallvec::SmallVec;
use std::fmt;

macro_rules! lgraph_ix {
    ($(#[$doc:meta])* $ix_type:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
        pub(crate) struct $ix_type(u32);

        impl $ix_type {
            #[inline]
            pub(crate) fn new(ix: usize) -> Self {
                $ix_type(ix as u32)
            }

            #[inline]
            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $ix_type {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

lgraph_ix! {
    /// Index of an L-node within its L-graph.
    LNodeIx
}
lgraph_ix! {
    /// Index of an L-port within its L-graph.
    LPortIx
}
lgraph_ix! {
    /// Index of an L-edge within its L-graph.
    LEdgeIx
}

/// What an L-node stands for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum LNodeKind {
    /// A node imported from the user graph.
    Normal,
    /// A zero-size node inserted on an edge spanning more than one layer.
    LongEdgeDummy,
}

#[derive(Clone, Debug)]
pub(crate) struct LNode {
    pub(crate) original: Option<NodeId>,
    pub(crate) kind: LNodeKind,
    pub(crate) size: Size,
    pub(crate) position: Point,
    /// Index of the layer this node was assigned to.
    pub(crate) layer: usize,
    /// Position of this node within its layer.
    pub(crate) order: usize,
    pub(crate) ports: Vec<LPortIx>,
    pub(crate) constraints: PortConstraints,
}

#[derive(Clone, Debug)]
pub(crate) struct LPort {
    pub(crate) original: Option<PortId>,
    pub(crate) owner: LNodeIx,
    pub(crate) side: PortSide,
    pub(crate) kind: PortKind,
    pub(crate) size: Size,
    /// Position relative to the owner's top-left corner.
    pub(crate) position: Point,
    /// Anchor relative to the port's top-left corner.
    pub(crate) anchor: Point,
    pub(crate) incoming: SmallVec<[LEdgeIx; 2]>,
    pub(crate) outgoing: SmallVec<[LEdgeIx; 2]>,
}

#[derive(Clone, Debug)]
pub(crate) struct LEdge {
    pub(crate) original: Option<EdgeId>,
    pub(crate) source: LPortIx,
    pub(crate) target: LPortIx,
    pub(crate) reversed: bool,
    /// Cycle-breaking priority; higher values are reversed last.
    pub(crate) priority: i32,
    pub(crate) bend_points: Vec<Point>,
    pub(crate) junction_points: Vec<Point>,
}

/// One layer of the graph: an ordered run of nodes plus the port extent
/// maxima cached by the placement phase.
#[derive(Clone, Debug, Default)]
pub(crate) struct Layer {
    pub(crate) nodes: Vec<LNodeIx>,
    /// Largest amount by which any port protrudes above a node of this layer.
    pub(crate) max_port_extent_above: f64,
    /// Largest amount by which any port protrudes below a node of this layer.
    pub(crate) max_port_extent_below: f64,
}

/// The mutable intermediate graph threaded through the pipeline.
#[derive(Debug)]
pub(crate) struct LGraph {
    pub(crate) nodes: Vec<LNode>,
    pub(crate) ports: Vec<LPort>,
    pub(crate) edges: Vec<LEdge>,
    pub(crate) layers: Vec<Layer>,
    pub(crate) node_node_spacing: f64,
    pub(crate) edge_edge_spacing: f64,
    pub(crate) edge_node_spacing: f64,
    pub(crate) layer_spacing: f64,
    pub(crate) size: Size,
    pub(crate) rng: StdRng,
}

impl LGraph {
    pub(crate) fn new(
        node_node_spacing: f64,
        edge_edge_spacing: f64,
        edge_node_spacing: f64,
        layer_spacing: f64,
        seed: u64,
    ) -> Self {
        LGraph {
            nodes: Vec::new(),
            ports: Vec::new(),
            edges: Vec::new(),
            layers: Vec::new(),
            node_node_spacing,
            edge_edge_spacing,
            edge_node_spacing,
            layer_spacing,
            size: Size::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    // ---
    // Entity access
    // ---

    pub(crate) fn node(&self, ix: LNodeIx) -> &LNode {
        &self.nodes[ix.index()]
    }

    pub(crate) fn node_mut(&mut self, ix: LNodeIx) -> &mut LNode {
        &mut self.nodes[ix.index()]
    }

    pub(crate) fn port(&self, ix: LPortIx) -> &LPort {
        &self.ports[ix.index()]
    }

    pub(crate) fn port_mut(&mut self, ix: LPortIx) -> &mut LPort {
        &mut self.ports[ix.index()]
    }

    pub(crate) fn edge(&self, ix: LEdgeIx) -> &LEdge {
        &self.edges[ix.index()]
    }

    pub(crate) fn edge_mut(&mut self, ix: LEdgeIx) -> &mut LEdge {
        &mut self.edges[ix.index()]
    }

    pub(crate) fn node_ixs(&self) -> impl Iterator<Item = LNodeIx> {
        (0..self.nodes.len()).map(LNodeIx::new)
    }

    pub(crate) fn edge_ixs(&self) -> impl Iterator<Item = LEdgeIx> {
        (0..self.edges.len()).map(LEdgeIx::new)
    }

    // ---
    // Entity creation
    // ---

    pub(crate) fn add_node(&mut self, node: LNode) -> LNodeIx {
        let ix = LNodeIx::new(self.nodes.len());
        self.nodes.push(node);
        ix
    }

    pub(crate) fn add_port(&mut self, port: LPort) -> LPortIx {
        let ix = LPortIx::new(self.ports.len());
        let owner = port.owner;
        self.ports.push(port);
        self.nodes[owner.index()].ports.push(ix);
        ix
    }

    /// Creates an edge and registers it on both ports' edge lists.
    pub(crate) fn add_edge(&mut self, edge: LEdge) -> LEdgeIx {
        let ix = LEdgeIx::new(self.edges.len());
        self.ports[edge.source.index()].outgoing.push(ix);
        self.ports[edge.target.index()].incoming.push(ix);
        self.edges.push(edge);
        ix
    }

    // ---
    // Derived structure
    // ---

    /// Returns the owner node of the edge's source port.
    pub(crate) fn edge_source_node(&self, ix: LEdgeIx) -> LNodeIx {
        self.port(self.edge(ix).source).owner
    }

    /// Returns the owner node of the edge's target port.
    pub(crate) fn edge_target_node(&self, ix: LEdgeIx) -> LNodeIx {
        self.port(self.edge(ix).target).owner
    }

    /// Returns true if both endpoints of the edge sit on the same node.
    pub(crate) fn is_self_loop(&self, ix: LEdgeIx) -> bool {
        self.edge_source_node(ix) == self.edge_target_node(ix)
    }

    /// All edges arriving at any port of `node`.
    pub(crate) fn node_incoming_edges(&self, node: LNodeIx) -> Vec<LEdgeIx> {
        self.node(node)
            .ports
            .iter()
            .flat_map(|&p| self.port(p).incoming.iter().copied())
            .collect()
    }

    /// All edges leaving any port of `node`.
    pub(crate) fn node_outgoing_edges(&self, node: LNodeIx) -> Vec<LEdgeIx> {
        self.node(node)
            .ports
            .iter()
            .flat_map(|&p| self.port(p).outgoing.iter().copied())
            .collect()
    }

    /// The ports reachable from `port` over a single edge, in edge-list
    /// order: targets of outgoing edges first, then sources of incoming ones.
    /// Self-loop edges are skipped; they are handled by the self-loop router
    /// and must stay invisible to hyperedge trunks.
    pub(crate) fn connected_ports(&self, port: LPortIx) -> Vec<LPortIx> {
        let p = self.port(port);
        let mut connected = Vec::with_capacity(p.outgoing.len() + p.incoming.len());
        for &edge in &p.outgoing {
            if !self.is_self_loop(edge) {
                connected.push(self.edge(edge).target);
            }
        }
        for &edge in &p.incoming {
            if !self.is_self_loop(edge) {
                connected.push(self.edge(edge).source);
            }
        }
        connected
    }

    /// Returns the absolute position of a port's anchor point.
    pub(crate) fn port_absolute_anchor(&self, ix: LPortIx) -> Point {
        let port = self.port(ix);
        let node = self.node(port.owner);
        node.position + port.position + port.anchor
    }

    /// Reverses an edge in place: the ports swap roles, the edge lists of
    /// both ports are updated, and the reversed marker is toggled.
    pub(crate) fn reverse_edge(&mut self, ix: LEdgeIx) {
        let (old_source, old_target) = {
            let edge = self.edge(ix);
            (edge.source, edge.target)
        };

        self.ports[old_source.index()].outgoing.retain(|e| *e != ix);
        self.ports[old_target.index()].incoming.retain(|e| *e != ix);
        self.ports[old_target.index()].outgoing.push(ix);
        self.ports[old_source.index()].incoming.push(ix);

        let edge = self.edge_mut(ix);
        edge.source = old_target;
        edge.target = old_source;
        edge.reversed = !edge.reversed;
    }

    /// Moves an edge's source to another port, keeping both ports' edge
    /// lists consistent. Used when a long edge is rerouted through its dummy
    /// chain.
    pub(crate) fn reroute_edge_source(&mut self, edge: LEdgeIx, new_source: LPortIx) {
        let old_source = self.edge(edge).source;
        self.ports[old_source.index()].outgoing.retain(|e| *e != edge);
        self.ports[new_source.index()].outgoing.push(edge);
        self.edge_mut(edge).source = new_source;
    }

    /// Renumbers `order` for every node from its position in its layer.
    pub(crate) fn renumber_layer_orders(&mut self) {
        for layer_ix in 0..self.layers.len() {
            for position in 0..self.layers[layer_ix].nodes.len() {
                let node = self.layers[layer_ix].nodes[position];
                self.nodes[node.index()].order = position;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_graph() -> LGraph {
        LGraph::new(20.0, 10.0, 10.0, 40.0, 1)
    }

    fn add_plain_node(graph: &mut LGraph) -> LNodeIx {
        graph.add_node(LNode {
            original: None,
            kind: LNodeKind::Normal,
            size: Size::new(10.0, 10.0),
            position: Point::default(),
            layer: 0,
            order: 0,
            ports: Vec::new(),
            constraints: PortConstraints::Free,
        })
    }

    fn add_plain_port(graph: &mut LGraph, owner: LNodeIx, side: PortSide) -> LPortIx {
        graph.add_port(LPort {
            original: None,
            owner,
            side,
            kind: PortKind::Undefined,
            size: Size::default(),
            position: Point::default(),
            anchor: Point::default(),
            incoming: SmallVec::new(),
            outgoing: SmallVec::new(),
        })
    }

    #[test]
    fn reverse_edge_maintains_port_lists() {
        let mut graph = test_graph();
        let a = add_plain_node(&mut graph);
        let b = add_plain_node(&mut graph);
        let out = add_plain_port(&mut graph, a, PortSide::East);
        let inp = add_plain_port(&mut graph, b, PortSide::West);
        let edge = graph.add_edge(LEdge {
            original: None,
            source: out,
            target: inp,
            reversed: false,
            priority: 0,
            bend_points: Vec::new(),
            junction_points: Vec::new(),
        });

        graph.reverse_edge(edge);
        assert!(graph.edge(edge).reversed);
        assert_eq!(graph.edge(edge).source, inp);
        assert_eq!(graph.edge(edge).target, out);
        assert_eq!(graph.port(inp).outgoing.as_slice(), &[edge]);
        assert_eq!(graph.port(out).incoming.as_slice(), &[edge]);
        assert!(graph.port(out).outgoing.is_empty());

        // Reversing again restores the original orientation.
        graph.reverse_edge(edge);
        assert!(!graph.edge(edge).reversed);
        assert_eq!(graph.edge(edge).source, out);
    }

    #[test]
    fn connected_ports_skips_self_loops() {
        let mut graph = test_graph();
        let a = add_plain_node(&mut graph);
        let b = add_plain_node(&mut graph);
        let out = add_plain_port(&mut graph, a, PortSide::East);
        let loop_in = add_plain_port(&mut graph, a, PortSide::East);
        let inp = add_plain_port(&mut graph, b, PortSide::West);
        graph.add_edge(LEdge {
            original: None,
            source: out,
            target: inp,
            reversed: false,
            priority: 0,
            bend_points: Vec::new(),
            junction_points: Vec::new(),
        });
        graph.add_edge(LEdge {
            original: None,
            source: out,
            target: loop_in,
            reversed: false,
            priority: 0,
            bend_points: Vec::new(),
            junction_points: Vec::new(),
        });

        assert_eq!(graph.connected_ports(out), vec![inp]);
    }
}
