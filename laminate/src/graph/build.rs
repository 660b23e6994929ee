// Copyright (c) The laminate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::geometry::{Point, Size};
use crate::graph::{
    Edge, EdgeId, LayoutGraph, Node, NodeId, Port, PortId, PortKind, PortSide, PropertyMap,
};
use crate::Error;

/// Checked, incremental construction of a [`LayoutGraph`].
///
/// Nodes and ports are created through the builder so that every
/// cross-reference is validated as it is added; `finish` therefore cannot
/// fail.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: LayoutGraph,
}

impl GraphBuilder {
    /// Creates a new, empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node with the given name and size.
    pub fn add_node(&mut self, name: impl Into<String>, size: Size) -> NodeId {
        let id = NodeId::new(self.graph.nodes.len());
        self.graph.nodes.push(Node {
            name: name.into(),
            size,
            position: Point::default(),
            ports: Vec::new(),
            properties: PropertyMap::new(),
        });
        id
    }

    /// Adds a port to `node` at `position` (relative to the node's top-left
    /// corner). The anchor defaults to the port's center.
    pub fn add_port(
        &mut self,
        node: NodeId,
        name: impl Into<String>,
        side: PortSide,
        position: Point,
    ) -> Result<PortId, Error> {
        self.add_sized_port(node, name, side, position, Size::default())
    }

    /// Adds a port with an explicit size.
    pub fn add_sized_port(
        &mut self,
        node: NodeId,
        name: impl Into<String>,
        side: PortSide,
        position: Point,
        size: Size,
    ) -> Result<PortId, Error> {
        let name = name.into();
        if node.index() >= self.graph.nodes.len() {
            return Err(Error::GraphConstructError(format!(
                "port '{}' added to unknown node {}",
                name, node,
            )));
        }
        let id = PortId::new(self.graph.ports.len());
        self.graph.ports.push(Port {
            name,
            owner: node,
            side,
            kind: PortKind::Undefined,
            size,
            position,
            anchor: Point::new(size.width / 2.0, size.height / 2.0),
            properties: PropertyMap::new(),
        });
        self.graph.nodes[node.index()].ports.push(id);
        Ok(id)
    }

    /// Sets a node's initial position. Layout ignores input positions, so
    /// this only matters for graphs that are serialized without being laid
    /// out.
    pub fn set_node_position(&mut self, node: NodeId, position: Point) -> Result<(), Error> {
        if node.index() >= self.graph.nodes.len() {
            return Err(Error::GraphConstructError(format!(
                "position set on unknown node {}",
                node,
            )));
        }
        self.graph.nodes[node.index()].position = position;
        Ok(())
    }

    /// Overrides the anchor of an existing port.
    pub fn set_port_anchor(&mut self, port: PortId, anchor: Point) -> Result<(), Error> {
        self.port_mut(port)?.anchor = anchor;
        Ok(())
    }

    /// Declares a port as input or output. Undeclared ports have their kind
    /// derived from connectivity when a layout runs.
    pub fn set_port_kind(&mut self, port: PortId, kind: PortKind) -> Result<(), Error> {
        self.port_mut(port)?.kind = kind;
        Ok(())
    }

    /// Adds an edge from `source_port` to `target_port`.
    pub fn add_edge(
        &mut self,
        name: impl Into<String>,
        source_port: PortId,
        target_port: PortId,
    ) -> Result<EdgeId, Error> {
        let name = name.into();
        for port in [source_port, target_port] {
            if port.index() >= self.graph.ports.len() {
                return Err(Error::GraphConstructError(format!(
                    "edge '{}' references unknown port {}",
                    name, port,
                )));
            }
        }
        let id = EdgeId::new(self.graph.edges.len());
        self.graph.edges.push(Edge {
            name,
            source_ports: vec![source_port],
            target_ports: vec![target_port],
            sections: Vec::new(),
            junction_points: Vec::new(),
            properties: PropertyMap::new(),
        });
        Ok(id)
    }

    /// Sets a string property on a node.
    pub fn set_node_property(
        &mut self,
        node: NodeId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), Error> {
        if node.index() >= self.graph.nodes.len() {
            return Err(Error::GraphConstructError(format!(
                "property set on unknown node {}",
                node,
            )));
        }
        self.graph.nodes[node.index()]
            .properties
            .insert(key.into(), value.into());
        Ok(())
    }

    /// Sets a string property on an edge.
    pub fn set_edge_property(
        &mut self,
        edge: EdgeId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), Error> {
        if edge.index() >= self.graph.edges.len() {
            return Err(Error::GraphConstructError(format!(
                "property set on unknown edge {}",
                edge,
            )));
        }
        self.graph.edges[edge.index()]
            .properties
            .insert(key.into(), value.into());
        Ok(())
    }

    /// Consumes the builder and returns the finished graph.
    pub fn finish(self) -> LayoutGraph {
        self.graph
    }

    fn port_mut(&mut self, port: PortId) -> Result<&mut Port, Error> {
        if port.index() >= self.graph.ports.len() {
            return Err(Error::GraphConstructError(format!(
                "unknown port {}",
                port,
            )));
        }
        Ok(&mut self.graph.ports[port.index()])
    }
}
