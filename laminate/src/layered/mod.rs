// Copyright (c) The laminate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The layered layout engine.
//!
//! [`LayeredLayout`] runs a seven-phase pipeline over a mutable intermediate
//! graph: import, cycle breaking, layer assignment (with long-edge dummies),
//! crossing minimization, node placement, orthogonal edge routing, and
//! application of the results back to the user graph. Each phase's
//! post-conditions are the next phase's preconditions; data flows forward
//! only.
//!
//! ```
//! use laminate::geometry::{Point, Size};
//! use laminate::graph::{LayoutGraph, PortSide};
//! use laminate::layered::LayeredLayout;
//!
//! let mut builder = LayoutGraph::builder();
//! let a = builder.add_node("a", Size::new(30.0, 20.0));
//! let b = builder.add_node("b", Size::new(30.0, 20.0));
//! let out = builder.add_port(a, "a.out", PortSide::East, Point::new(30.0, 10.0)).unwrap();
//! let inp = builder.add_port(b, "b.in", PortSide::West, Point::new(0.0, 10.0)).unwrap();
//! builder.add_edge("e", out, inp).unwrap();
//! let mut graph = builder.finish();
//!
//! LayeredLayout::new().layout(&mut graph);
//! assert!(graph.node(b).position().x > graph.node(a).position().x);
//! ```

use crate::graph::LayoutGraph;
use log::debug;

mod apply;
mod cycle_break;
mod import;
mod layering;
pub(crate) mod lgraph;
mod ordering;
mod placement;
mod route;
mod self_loops;

/// The direction the graph flows in.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Direction {
    /// Layers are laid out west to east.
    #[default]
    Right,
    /// Layers are laid out east to west.
    Left,
    /// Layers are laid out north to south.
    Down,
    /// Layers are laid out south to north.
    Up,
}

impl Direction {
    /// Returns true if layers advance along the X axis.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Right | Direction::Left)
    }

    /// Returns true if the layout is computed in the canonical orientation
    /// (rightward or downward) and mirrored afterwards.
    pub(crate) fn is_mirrored(self) -> bool {
        matches!(self, Direction::Left | Direction::Up)
    }
}

/// How the within-layer node order is chosen.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum CrossingMinimization {
    /// Repeated barycenter layer sweeps.
    #[default]
    LayerSweep,
    /// Keep the order produced by layer assignment. Mostly useful for
    /// testing.
    None,
}

/// How far the engine may rearrange a node's ports.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum PortConstraints {
    /// Undeclared port sides may be assigned by the engine.
    #[default]
    Free,
    /// Sides are fixed; the order on each side must be kept.
    FixedOrder,
    /// Ports stay exactly where the user put them.
    FixedPos,
}

impl PortConstraints {
    /// Parses the `portConstraints` property value. Unknown values are
    /// treated as absent.
    pub(crate) fn from_property(value: &str) -> Option<Self> {
        match value {
            "FREE" => Some(PortConstraints::Free),
            "FIXED_ORDER" => Some(PortConstraints::FixedOrder),
            "FIXED_POS" => Some(PortConstraints::FixedPos),
            _ => None,
        }
    }
}

/// Node property selecting the port constraints for that node.
pub const PROPERTY_PORT_CONSTRAINTS: &str = "portConstraints";
/// Edge property weighting an edge for cycle breaking; higher-priority edges
/// are less likely to be reversed.
pub const PROPERTY_EDGE_PRIORITY: &str = "layered.priority.direction";
/// Edge property reserved for renderers; does not influence the layout.
pub const PROPERTY_EDGE_THICKNESS: &str = "edge.thickness";

/// Layered layout provider.
///
/// Configuration lives on the provider; one provider can lay out any number
/// of graphs. A single invocation mutates a single graph and shares no state
/// with other invocations, so separate graphs may be laid out concurrently
/// from separate threads.
#[derive(Clone, Debug)]
pub struct LayeredLayout {
    direction: Direction,
    node_node_spacing: f64,
    edge_edge_spacing: f64,
    edge_node_spacing: f64,
    layer_spacing: f64,
    crossing_minimization: CrossingMinimization,
    seed: u64,
}

impl Default for LayeredLayout {
    fn default() -> Self {
        LayeredLayout {
            direction: Direction::Right,
            node_node_spacing: 20.0,
            edge_edge_spacing: 10.0,
            edge_node_spacing: 10.0,
            layer_spacing: 40.0,
            crossing_minimization: CrossingMinimization::LayerSweep,
            seed: 1,
        }
    }
}

impl LayeredLayout {
    /// Creates a provider with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the layout direction.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Sets the minimum gap between two nodes in the same layer.
    pub fn with_node_node_spacing(mut self, spacing: f64) -> Self {
        self.node_node_spacing = spacing;
        self
    }

    /// Sets the distance between adjacent routing slots.
    pub fn with_edge_edge_spacing(mut self, spacing: f64) -> Self {
        self.edge_edge_spacing = spacing;
        self
    }

    /// Sets the gap between a routing band and the adjacent layer of nodes.
    pub fn with_edge_node_spacing(mut self, spacing: f64) -> Self {
        self.edge_node_spacing = spacing;
        self
    }

    /// Sets the fallback minimum band width between two layers.
    pub fn with_layer_spacing(mut self, spacing: f64) -> Self {
        self.layer_spacing = spacing;
        self
    }

    /// Sets the crossing minimization strategy.
    pub fn with_crossing_minimization(mut self, strategy: CrossingMinimization) -> Self {
        self.crossing_minimization = strategy;
        self
    }

    /// Sets the seed of the deterministic random number generator used for
    /// tie-breaking.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Returns the configured layout direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Lays out the graph in place.
    pub fn layout(&self, graph: &mut LayoutGraph) {
        self.run(graph, &mut |_, _| {});
    }

    /// Lays out the graph in place, reporting progress at phase boundaries.
    ///
    /// The callback receives a task name and a fraction in `[0, 1]`. It is
    /// purely observational and never called concurrently.
    pub fn layout_with_progress(
        &self,
        graph: &mut LayoutGraph,
        progress: &mut dyn FnMut(&str, f64),
    ) {
        self.run(graph, progress);
    }

    fn run(&self, graph: &mut LayoutGraph, progress: &mut dyn FnMut(&str, f64)) {
        progress("Importing graph", 0.0);
        let mut lgraph = import::import_graph(self, graph);
        if lgraph.nodes.is_empty() {
            progress("Layout complete", 1.0);
            return;
        }

        progress("Breaking cycles", 0.15);
        cycle_break::break_cycles(&mut lgraph);

        progress("Assigning layers", 0.30);
        layering::assign_layers(&mut lgraph);

        progress("Processing long edges", 0.45);
        layering::insert_dummy_nodes(&mut lgraph);

        progress("Minimizing crossings", 0.60);
        ordering::minimize_crossings(&mut lgraph, self.crossing_minimization);

        progress("Placing nodes", 0.75);
        if self.direction.is_horizontal() {
            placement::place_nodes_horizontal(&mut lgraph);
            progress("Routing edges", 0.90);
            route::route_edges(&mut lgraph);
        } else {
            placement::place_nodes_vertical(&mut lgraph);
            progress("Routing edges", 0.90);
        }

        self_loops::route_self_loops(&mut lgraph);

        apply::apply_layout(&mut lgraph, graph, self.direction);
        debug!(
            "layout finished: {} layers, graph size {}",
            lgraph.layers.len(),
            graph.size(),
        );

        progress("Layout complete", 1.0);
    }
}
