// Copyright (c) The laminate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON import and export for [`LayoutGraph`].
//!
//! The format mirrors the usual interchange shape for port-based graphs: a
//! root object with `children` (nodes carrying `ports`) and `edges` whose
//! `sources`/`targets` reference port ids. Export adds the computed
//! positions, sections and junction points.

use crate::geometry::{Point, Size};
use crate::graph::{GraphBuilder, LayoutGraph, PortId, PortKind, PortSide, PropertyMap};
use crate::Error;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GraphDto {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    height: Option<f64>,
    children: Vec<NodeDto>,
    edges: Vec<EdgeDto>,
    #[serde(skip_serializing_if = "PropertyMap::is_empty")]
    properties: PropertyMap,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct NodeDto {
    id: String,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    ports: Vec<PortDto>,
    #[serde(skip_serializing_if = "PropertyMap::is_empty")]
    properties: PropertyMap,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PortDto {
    id: String,
    side: PortSide,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<PortKind>,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    #[serde(skip_serializing_if = "PropertyMap::is_empty")]
    properties: PropertyMap,
}

impl Default for PortDto {
    fn default() -> Self {
        PortDto {
            id: String::new(),
            side: PortSide::Undefined,
            kind: None,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            properties: PropertyMap::new(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct EdgeDto {
    id: String,
    sources: Vec<String>,
    targets: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sections: Vec<SectionDto>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    junction_points: Vec<Point>,
    #[serde(skip_serializing_if = "PropertyMap::is_empty")]
    properties: PropertyMap,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SectionDto {
    start_point: Point,
    end_point: Point,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    bend_points: Vec<Point>,
}

pub(super) fn from_json(json: &str) -> Result<LayoutGraph, Error> {
    let dto: GraphDto = serde_json::from_str(json)?;

    let mut builder = GraphBuilder::new();
    let mut port_ids: IndexMap<String, PortId> = IndexMap::new();

    for node_dto in &dto.children {
        let node = builder.add_node(node_dto.id.as_str(), Size::new(node_dto.width, node_dto.height));
        builder.set_node_position(node, Point::new(node_dto.x, node_dto.y))?;
        for (key, value) in &node_dto.properties {
            builder.set_node_property(node, key.as_str(), value.as_str())?;
        }
        for port_dto in &node_dto.ports {
            let port = builder.add_sized_port(
                node,
                port_dto.id.as_str(),
                port_dto.side,
                Point::new(port_dto.x, port_dto.y),
                Size::new(port_dto.width, port_dto.height),
            )?;
            if let Some(kind) = port_dto.kind {
                builder.set_port_kind(port, kind)?;
            }
            if port_ids.insert(port_dto.id.clone(), port).is_some() {
                return Err(Error::GraphConstructError(format!(
                    "duplicate port id '{}'",
                    port_dto.id,
                )));
            }
        }
    }

    for edge_dto in &dto.edges {
        let resolve = |ids: &[String], role: &str| -> Result<Vec<PortId>, Error> {
            ids.iter()
                .map(|id| {
                    port_ids.get(id).copied().ok_or_else(|| {
                        Error::GraphConstructError(format!(
                            "edge '{}' references unknown {} port '{}'",
                            edge_dto.id, role, id,
                        ))
                    })
                })
                .collect()
        };
        let sources = resolve(&edge_dto.sources, "source")?;
        let targets = resolve(&edge_dto.targets, "target")?;
        // Edges without a source or target port are dropped here already;
        // the importer would skip them anyway.
        if let (Some(&source), Some(&target)) = (sources.first(), targets.first()) {
            let edge = builder.add_edge(edge_dto.id.as_str(), source, target)?;
            for (key, value) in &edge_dto.properties {
                builder.set_edge_property(edge, key.as_str(), value.as_str())?;
            }
        }
    }

    let mut graph = builder.finish();
    graph.properties = dto.properties;
    Ok(graph)
}

pub(super) fn to_json(graph: &LayoutGraph) -> Result<String, Error> {
    let children = graph
        .nodes
        .iter()
        .map(|node| NodeDto {
            id: node.name.clone(),
            x: node.position.x,
            y: node.position.y,
            width: node.size.width,
            height: node.size.height,
            ports: node
                .ports
                .iter()
                .map(|&port_id| {
                    let port = graph.port(port_id);
                    PortDto {
                        id: port.name.clone(),
                        side: port.side,
                        kind: match port.kind {
                            PortKind::Undefined => None,
                            kind => Some(kind),
                        },
                        x: port.position.x,
                        y: port.position.y,
                        width: port.size.width,
                        height: port.size.height,
                        properties: port.properties.clone(),
                    }
                })
                .collect(),
            properties: node.properties.clone(),
        })
        .collect();

    let edges = graph
        .edges
        .iter()
        .map(|edge| EdgeDto {
            id: edge.name.clone(),
            sources: edge
                .source_ports
                .iter()
                .map(|&p| graph.port(p).name.clone())
                .collect(),
            targets: edge
                .target_ports
                .iter()
                .map(|&p| graph.port(p).name.clone())
                .collect(),
            sections: edge
                .sections
                .iter()
                .map(|section| SectionDto {
                    start_point: section.start_point,
                    end_point: section.end_point,
                    bend_points: section.bend_points.clone(),
                })
                .collect(),
            junction_points: edge.junction_points.clone(),
            properties: edge.properties.clone(),
        })
        .collect();

    let dto = GraphDto {
        id: "root".to_string(),
        width: Some(graph.size.width),
        height: Some(graph.size.height),
        children,
        edges,
        properties: graph.properties.clone(),
    };

    Ok(serde_json::to_string_pretty(&dto)?)
}
