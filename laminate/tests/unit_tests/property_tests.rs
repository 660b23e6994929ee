// Copyright (c) The laminate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Law tests over randomly generated graphs.

use laminate::geometry::{Point, Rect, Size};
use laminate::graph::{EdgeSection, GraphBuilder, LayoutGraph, PortSide};
use laminate::layered::LayeredLayout;
use crate::support::assert_orthogonal;
use proptest::prelude::*;

/// Node count plus an arbitrary edge list over those nodes. Cycles and
/// self-loops are allowed; the engine has to cope with both.
fn graph_shape() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (2usize..6).prop_flat_map(|node_count| {
        (
            Just(node_count),
            proptest::collection::vec((0..node_count, 0..node_count), 0..8),
        )
    })
}

/// Builds the graph described by a shape. Every edge gets its own east/west
/// port pair at staggered heights so that trunks overlap and conflict.
fn build_graph(node_count: usize, edges: &[(usize, usize)], offset: Point) -> LayoutGraph {
    let mut builder = GraphBuilder::new();
    let nodes: Vec<_> = (0..node_count)
        .map(|i| {
            let node = builder.add_node(format!("n{}", i), Size::new(30.0, 60.0));
            builder.set_node_position(node, offset).unwrap();
            node
        })
        .collect();
    for (k, &(from, to)) in edges.iter().enumerate() {
        let y = 5.0 + (k % 8) as f64 * 7.0;
        let out = builder
            .add_port(nodes[from], format!("e{}.out", k), PortSide::East, Point::new(30.0, y))
            .unwrap();
        let inp = builder
            .add_port(nodes[to], format!("e{}.in", k), PortSide::West, Point::new(0.0, y))
            .unwrap();
        builder.add_edge(format!("e{}", k), out, inp).unwrap();
    }
    builder.finish()
}

/// Everything layout writes back, in comparable form.
fn snapshot(graph: &LayoutGraph) -> (Vec<Point>, Vec<Vec<EdgeSection>>, Vec<Vec<Point>>) {
    (
        graph.node_ids().map(|n| graph.node(n).position()).collect(),
        graph
            .edge_ids()
            .map(|e| graph.edge(e).sections().to_vec())
            .collect(),
        graph
            .edge_ids()
            .map(|e| graph.edge(e).junction_points().to_vec())
            .collect(),
    )
}

proptest! {
    /// With identical seed and input, two runs produce identical output.
    #[test]
    fn layout_is_deterministic((node_count, edges) in graph_shape()) {
        let mut first = build_graph(node_count, &edges, Point::default());
        let mut second = build_graph(node_count, &edges, Point::default());

        let provider = LayeredLayout::new().with_seed(7);
        provider.layout(&mut first);
        provider.layout(&mut second);

        prop_assert_eq!(snapshot(&first), snapshot(&second));
    }

    /// Input positions don't influence the layout.
    #[test]
    fn layout_is_translation_invariant((node_count, edges) in graph_shape()) {
        let mut centered = build_graph(node_count, &edges, Point::default());
        let mut shifted = build_graph(node_count, &edges, Point::new(370.0, -130.0));

        let provider = LayeredLayout::new();
        provider.layout(&mut centered);
        provider.layout(&mut shifted);

        prop_assert_eq!(snapshot(&centered), snapshot(&shifted));
    }

    /// Every routed leg is strictly horizontal or strictly vertical.
    #[test]
    fn routed_edges_are_orthogonal((node_count, edges) in graph_shape()) {
        let mut graph = build_graph(node_count, &edges, Point::default());
        LayeredLayout::new().layout(&mut graph);

        for edge in graph.edge_ids() {
            for section in graph.edge(edge).sections() {
                assert_orthogonal(section, graph.edge(edge).name());
            }
        }
    }

    /// No two node rectangles overlap after layout.
    #[test]
    fn node_rectangles_are_disjoint((node_count, edges) in graph_shape()) {
        let mut graph = build_graph(node_count, &edges, Point::default());
        LayeredLayout::new().layout(&mut graph);

        let rects: Vec<Rect> = graph
            .node_ids()
            .map(|n| Rect::new(graph.node(n).position(), graph.node(n).size()))
            .collect();
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                prop_assert!(!a.intersects(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }
}
