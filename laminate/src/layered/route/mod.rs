// Copyright (c) The laminate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Orthogonal edge routing.
//!
//! Walks the layers from left to right, fixing each layer's along-axis
//! position and routing the band between it and the next layer. The number
//! of routing slots a band ends up with determines how wide it is, which is
//! how edge congestion translates into layer spacing.

use crate::layered::lgraph::LGraph;
use log::debug;

mod cycles;
mod generator;
mod segment;
mod splitter;
mod strategy;

/// Routes all edges of a horizontally laid out graph and assigns the final
/// along-axis coordinates of nodes and layers.
pub(super) fn route_edges(graph: &mut LGraph) {
    let node_node_spacing = graph.node_node_spacing;
    let edge_edge_spacing = graph.edge_edge_spacing;
    let edge_node_spacing = graph.edge_node_spacing;
    let layer_spacing = graph.layer_spacing;

    let mut xpos = 0.0;
    let layer_count = graph.layers.len();
    let mut left_layer: Option<usize> = None;

    for layer_ix in 0..=layer_count {
        let right_layer = if layer_ix < layer_count {
            Some(layer_ix)
        } else {
            None
        };

        // The left layer's nodes get their final along-axis position now.
        if let Some(left) = left_layer {
            let nodes = graph.layers[left].nodes.clone();
            let mut layer_width: f64 = 0.0;
            for node in nodes {
                graph.node_mut(node).position.x = xpos;
                layer_width = layer_width.max(graph.node(node).size.width);
            }
            xpos += layer_width;
        }

        let start_pos = if left_layer.is_none() {
            xpos
        } else {
            xpos + edge_node_spacing
        };
        let slot_count = generator::route_band(graph, left_layer, right_layer, start_pos);

        if slot_count > 0 {
            let mut routing_width = (slot_count - 1) as f64 * edge_edge_spacing;
            if left_layer.is_some() {
                routing_width += edge_node_spacing;
            }
            if right_layer.is_some() {
                routing_width += edge_node_spacing;
            }
            // Between two layers the band is never narrower than the minimum
            // node spacing.
            if left_layer.is_some() && right_layer.is_some() && routing_width < node_node_spacing {
                routing_width = node_node_spacing;
            }
            xpos += routing_width;
        } else if left_layer.is_some() && right_layer.is_some() {
            // All edges in this band are straight; fall back to the
            // configured minimum band width.
            xpos += layer_spacing;
        }

        left_layer = right_layer;
    }

    graph.size.width = xpos;
    debug!("routed {} bands, total width {}", layer_count + 1, xpos);
}
