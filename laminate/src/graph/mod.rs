// Copyright (c) The laminate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The user-facing graph model.
//!
//! A [`LayoutGraph`] is the boundary between callers and the layout engine:
//! callers describe nodes, ports and edges through the [`GraphBuilder`], run a
//! layout provider over the graph, then read back node positions, edge
//! sections and junction points.
//!
//! All entities live in arena vectors owned by the graph and are addressed by
//! the compact index types [`NodeId`], [`PortId`] and [`EdgeId`]. Identifiers
//! stay valid for the lifetime of the graph; entities are never removed.

use crate::geometry::{Point, Size};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

mod build;
mod json;

pub use build::GraphBuilder;

/// String-keyed side channel for options the typed model doesn't cover.
///
/// Recognized keys are documented on [`crate::layered::LayeredLayout`];
/// unknown keys are carried through untouched and ignored by the engine.
pub type PropertyMap = IndexMap<String, String>;

macro_rules! graph_id {
    ($(#[$doc:meta])* $id_type:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
        pub struct $id_type(u32);

        impl $id_type {
            #[inline]
            pub(crate) fn new(ix: usize) -> Self {
                $id_type(ix as u32)
            }

            #[inline]
            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $id_type {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

graph_id! {
    /// Identifier of a node within its [`LayoutGraph`].
    NodeId
}
graph_id! {
    /// Identifier of a port within its [`LayoutGraph`].
    PortId
}
graph_id! {
    /// Identifier of an edge within its [`LayoutGraph`].
    EdgeId
}

/// The side of a node a port is attached to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PortSide {
    /// Top side of the node.
    North,
    /// Right side of the node.
    East,
    /// Bottom side of the node.
    South,
    /// Left side of the node.
    West,
    /// No declared side; the engine may assign one.
    Undefined,
}

impl PortSide {
    /// Returns the side opposite to this one. `Undefined` is its own
    /// opposite.
    pub fn opposite(self) -> Self {
        match self {
            PortSide::North => PortSide::South,
            PortSide::East => PortSide::West,
            PortSide::South => PortSide::North,
            PortSide::West => PortSide::East,
            PortSide::Undefined => PortSide::Undefined,
        }
    }
}

/// Whether a port accepts or emits connections.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PortKind {
    /// Edges end here.
    Input,
    /// Edges start here.
    Output,
    /// Derived from connectivity at import time.
    Undefined,
}

/// A node of the user graph.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) size: Size,
    pub(crate) position: Point,
    pub(crate) ports: Vec<PortId>,
    pub(crate) properties: PropertyMap,
}

impl Node {
    /// Returns the node's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the node's size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns the node's position, relative to the graph origin. Written by
    /// the layout engine.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Returns the ports attached to this node, in insertion order.
    pub fn ports(&self) -> &[PortId] {
        &self.ports
    }

    /// Returns the node's property map.
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }
}

/// A connection point on a node.
#[derive(Clone, Debug)]
pub struct Port {
    pub(crate) name: String,
    pub(crate) owner: NodeId,
    pub(crate) side: PortSide,
    pub(crate) kind: PortKind,
    pub(crate) size: Size,
    pub(crate) position: Point,
    pub(crate) anchor: Point,
    pub(crate) properties: PropertyMap,
}

impl Port {
    /// Returns the port's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the node this port is attached to.
    pub fn owner(&self) -> NodeId {
        self.owner
    }

    /// Returns the side of the owner this port sits on.
    pub fn side(&self) -> PortSide {
        self.side
    }

    /// Returns whether this port accepts or emits connections.
    pub fn kind(&self) -> PortKind {
        self.kind
    }

    /// Returns the port's size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns the port's position relative to its owner's top-left corner.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Returns the point edges attach to, relative to the port's top-left
    /// corner. Defaults to the port's center.
    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// Returns the port's property map.
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }
}

/// One polyline piece of a routed edge.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeSection {
    /// Where the section starts (the source port's absolute anchor).
    pub start_point: Point,
    /// Where the section ends (the target port's absolute anchor).
    pub end_point: Point,
    /// Interior bend points, in routing order.
    pub bend_points: Vec<Point>,
}

/// An edge of the user graph, connecting ports.
#[derive(Clone, Debug)]
pub struct Edge {
    pub(crate) name: String,
    pub(crate) source_ports: Vec<PortId>,
    pub(crate) target_ports: Vec<PortId>,
    pub(crate) sections: Vec<EdgeSection>,
    pub(crate) junction_points: Vec<Point>,
    pub(crate) properties: PropertyMap,
}

impl Edge {
    /// Returns the edge's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the ports this edge starts at. Only the first one is routed.
    pub fn source_ports(&self) -> &[PortId] {
        &self.source_ports
    }

    /// Returns the ports this edge ends at. Only the first one is routed.
    pub fn target_ports(&self) -> &[PortId] {
        &self.target_ports
    }

    /// Returns the routed sections of this edge. Written by the layout
    /// engine; empty before layout.
    pub fn sections(&self) -> &[EdgeSection] {
        &self.sections
    }

    /// Returns the points where this edge joins or leaves other edges of the
    /// same hyperedge. Renderers typically draw these as dots.
    pub fn junction_points(&self) -> &[Point] {
        &self.junction_points
    }

    /// Returns the edge's property map.
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }
}

/// A graph to be laid out, owning all of its nodes, ports and edges.
#[derive(Clone, Debug, Default)]
pub struct LayoutGraph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) ports: Vec<Port>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) size: Size,
    pub(crate) properties: PropertyMap,
}

impl LayoutGraph {
    /// Starts building a new graph.
    pub fn builder() -> GraphBuilder {
        GraphBuilder::new()
    }

    /// Constructs a graph from its JSON description.
    pub fn from_json(json: impl AsRef<str>) -> Result<Self, crate::Error> {
        json::from_json(json.as_ref())
    }

    /// Serializes this graph, including any computed layout, to JSON.
    pub fn to_json(&self) -> Result<String, crate::Error> {
        json::to_json(self)
    }

    /// Returns the node with the given identifier.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Returns the port with the given identifier.
    pub fn port(&self, id: PortId) -> &Port {
        &self.ports[id.index()]
    }

    /// Returns the edge with the given identifier.
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    /// Iterates over all node identifiers in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::new)
    }

    /// Iterates over all edge identifiers in insertion order.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        (0..self.edges.len()).map(EdgeId::new)
    }

    /// Returns the number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the graph's overall size. Written by the layout engine.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns the graph's property map.
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    /// Looks up a node by name. Linear in the number of nodes.
    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.name == name)
            .map(NodeId::new)
    }

    /// Returns the absolute position of a port's top-left corner.
    pub fn port_position(&self, id: PortId) -> Point {
        let port = self.port(id);
        self.node(port.owner).position + port.position
    }

    /// Returns the absolute position of a port's anchor point.
    pub fn port_anchor(&self, id: PortId) -> Point {
        self.port_position(id) + self.port(id).anchor
    }

    /// Verifies internal invariants on this graph. Not part of the documented
    /// API.
    #[doc(hidden)]
    pub fn verify(&self) -> Result<(), crate::Error> {
        for (ix, port) in self.ports.iter().enumerate() {
            let owner = &self.nodes[port.owner.index()];
            if !owner.ports.contains(&PortId::new(ix)) {
                return Err(crate::Error::GraphInternalError(format!(
                    "port '{}' not listed on its owner '{}'",
                    port.name, owner.name,
                )));
            }
        }
        for edge in &self.edges {
            for &port_id in edge.source_ports.iter().chain(&edge.target_ports) {
                if port_id.index() >= self.ports.len() {
                    return Err(crate::Error::GraphInternalError(format!(
                        "edge '{}' references unknown port {}",
                        edge.name, port_id,
                    )));
                }
            }
        }
        Ok(())
    }
}
