// Copyright (c) The laminate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use laminate::geometry::{Point, Size};
use laminate::graph::{GraphBuilder, LayoutGraph, PortSide};
use laminate::layered::{CrossingMinimization, Direction, LayeredLayout};
use crate::support::assert_orthogonal;
use pretty_assertions::assert_eq;

#[test]
fn empty_graph_is_left_untouched() {
    let mut graph = LayoutGraph::default();
    LayeredLayout::new().layout(&mut graph);
    assert_eq!(graph.size(), Size::default());
}

#[test]
fn single_node_gets_padding_and_minimum_size() {
    let (mut graph, node) = fixtures::single_node();
    LayeredLayout::new().layout(&mut graph);

    assert_eq!(graph.node(node).position(), Point::new(12.0, 12.0));
    // 30 + 2*12 wide, and the height is clamped to the 40-unit minimum.
    assert_eq!(graph.size(), Size::new(54.0, 44.0));
}

#[test]
fn vcc_gnd_downward_layout_matches_reference_geometry() {
    let (mut graph, vcc, gnd) = fixtures::vcc_gnd();
    LayeredLayout::new()
        .with_direction(Direction::Down)
        .with_node_node_spacing(35.0)
        .with_layer_spacing(5.0)
        .layout(&mut graph);

    assert_eq!(graph.node(vcc).position(), Point::new(12.0, 12.0));
    assert_eq!(graph.node(gnd).position(), Point::new(12.0, 62.0));
    assert_eq!(graph.size(), Size::new(44.0, 104.0));
}

#[test]
fn chain_produces_equidistant_layers() {
    let (mut graph, nodes) = fixtures::chain4();
    LayeredLayout::new()
        .with_node_node_spacing(35.0)
        .with_layer_spacing(80.0)
        .layout(&mut graph);

    // Four distinct layers from left to right.
    let xs: Vec<f64> = nodes.iter().map(|&n| graph.node(n).position().x).collect();
    for pair in xs.windows(2) {
        // Node width plus the width of the straight routing band.
        assert_eq!(pair[1] - pair[0], 30.0 + 80.0);
    }
    assert_eq!(xs[0], 12.0);

    // Straight chain: no bend points anywhere.
    for edge in graph.edge_ids() {
        let sections = graph.edge(edge).sections();
        assert_eq!(sections.len(), 1);
        assert!(sections[0].bend_points.is_empty());
        assert_orthogonal(&sections[0], "chain edge");
    }
}

#[test]
fn diamond_stacks_the_middle_layer() {
    let (mut graph, nodes) = fixtures::diamond();
    LayeredLayout::new().layout(&mut graph);

    let pos = |i: usize| graph.node(nodes[i]).position();
    // n1 and n2 share the middle layer...
    assert_eq!(pos(1).x, pos(2).x);
    // ...stacked vertically with clearance.
    assert!(pos(2).y >= pos(1).y + 25.0);
    // n0 and n3 bracket them.
    assert!(pos(0).x < pos(1).x);
    assert!(pos(1).x < pos(3).x);

    for edge in graph.edge_ids() {
        assert_orthogonal(&graph.edge(edge).sections()[0], "diamond edge");
    }
}

#[test]
fn fixed_port_gap_equals_layer_spacing() {
    // Port extents of 5 below the upper node and 10 above the lower node;
    // the port-to-port gap must come out as exactly the layer spacing.
    let mut builder = GraphBuilder::new();
    let a = builder.add_node("a", Size::new(20.0, 30.0));
    let b = builder.add_node("b", Size::new(20.0, 30.0));
    builder
        .set_node_property(a, "portConstraints", "FIXED_POS")
        .unwrap();
    builder
        .set_node_property(b, "portConstraints", "FIXED_POS")
        .unwrap();
    let out = builder
        .add_port(a, "a.p", PortSide::South, Point::new(10.0, 35.0))
        .unwrap();
    let inp = builder
        .add_port(b, "b.p", PortSide::North, Point::new(10.0, -10.0))
        .unwrap();
    builder.add_edge("e", out, inp).unwrap();
    let mut graph = builder.finish();

    let layer_spacing = 25.0;
    LayeredLayout::new()
        .with_direction(Direction::Down)
        .with_layer_spacing(layer_spacing)
        .layout(&mut graph);

    let gap = graph.port_anchor(inp).y - graph.port_anchor(out).y;
    assert_eq!(gap, layer_spacing);
}

#[test]
fn cycle_is_broken_and_layered() {
    let (mut graph, nodes) = fixtures::triangle_cycle();
    LayeredLayout::new().layout(&mut graph);

    // The cycle c0 -> c1 -> c2 -> c0 unrolls into three layers.
    let xs: Vec<f64> = nodes.iter().map(|&n| graph.node(n).position().x).collect();
    assert!(xs[0] < xs[1]);
    assert!(xs[1] < xs[2]);

    for edge in graph.edge_ids() {
        assert_eq!(graph.edge(edge).sections().len(), 1);
    }
}

#[test]
fn crossing_strategy_none_keeps_import_order() {
    let (mut with_sweep, _) = fixtures::diamond();
    let (mut without, _) = fixtures::diamond();
    LayeredLayout::new().layout(&mut with_sweep);
    LayeredLayout::new()
        .with_crossing_minimization(CrossingMinimization::None)
        .layout(&mut without);

    // For the diamond the import order is already optimal, so both
    // strategies agree; the point is that NONE is a supported no-op.
    for node in with_sweep.node_ids() {
        assert_eq!(
            with_sweep.node(node).position(),
            without.node(node).position(),
        );
    }
}

#[test]
fn leftward_layout_mirrors_the_flow() {
    let mut graph = leftward_chain();
    LayeredLayout::new()
        .with_direction(Direction::Left)
        .layout(&mut graph);

    let xs: Vec<f64> = graph
        .node_ids()
        .map(|n| graph.node(n).position().x)
        .collect();
    // The chain flows right to left.
    assert!(xs[0] > xs[1]);
    assert!(xs[1] > xs[2]);

    for edge in graph.edge_ids() {
        assert_orthogonal(&graph.edge(edge).sections()[0], "leftward edge");
    }
}

#[test]
fn upward_layout_mirrors_the_flow() {
    let mut graph = leftward_chain();
    LayeredLayout::new()
        .with_direction(Direction::Up)
        .layout(&mut graph);

    let ys: Vec<f64> = graph
        .node_ids()
        .map(|n| graph.node(n).position().y)
        .collect();
    assert!(ys[0] > ys[1]);
    assert!(ys[1] > ys[2]);
}

#[test]
fn long_edge_is_carried_through_dummy_layers() {
    // A chain n0 -> n1 -> n2 plus a skip edge n0 -> n2 spanning two layers.
    let mut builder = GraphBuilder::new();
    let nodes: Vec<_> = (0..3)
        .map(|i| builder.add_node(format!("n{}", i), Size::new(30.0, 25.0)))
        .collect();
    let connect = |builder: &mut GraphBuilder, from: usize, to: usize, y: f64, tag: &str| {
        let out = builder
            .add_port(
                nodes[from],
                format!("n{}.out{}", from, tag),
                PortSide::East,
                Point::new(30.0, y),
            )
            .unwrap();
        let inp = builder
            .add_port(
                nodes[to],
                format!("n{}.in{}", to, tag),
                PortSide::West,
                Point::new(0.0, y),
            )
            .unwrap();
        builder.add_edge(format!("e{}{}", from, to), out, inp).unwrap()
    };
    connect(&mut builder, 0, 1, 12.5, "a");
    connect(&mut builder, 1, 2, 12.5, "a");
    let skip = connect(&mut builder, 0, 2, 18.0, "b");
    let mut graph = builder.finish();

    LayeredLayout::new().layout(&mut graph);

    // Three layers, in order.
    let xs: Vec<f64> = nodes.iter().map(|&n| graph.node(n).position().x).collect();
    assert!(xs[0] < xs[1]);
    assert!(xs[1] < xs[2]);

    // The skip edge is routed and orthogonal like everything else.
    let section = &graph.edge(skip).sections()[0];
    assert!(!section.bend_points.is_empty());
    for edge in graph.edge_ids() {
        assert_orthogonal(&graph.edge(edge).sections()[0], "long edge graph");
    }
}

#[test]
fn progress_is_reported_in_order() {
    let (mut graph, _) = fixtures::diamond();
    let mut reports: Vec<(String, f64)> = Vec::new();
    LayeredLayout::new().layout_with_progress(&mut graph, &mut |task, fraction| {
        reports.push((task.to_string(), fraction));
    });

    assert_eq!(reports.first().map(|r| r.0.as_str()), Some("Importing graph"));
    assert_eq!(
        reports.last().map(|r| (r.0.as_str(), r.1)),
        Some(("Layout complete", 1.0)),
    );
    for pair in reports.windows(2) {
        assert!(pair[0].1 <= pair[1].1, "progress went backwards");
    }
}

#[test]
fn json_graph_runs_through_the_pipeline() {
    let json = r#"{
        "id": "root",
        "children": [
            {
                "id": "a",
                "width": 30.0,
                "height": 20.0,
                "ports": [{"id": "a.out", "side": "EAST", "x": 30.0, "y": 10.0}]
            },
            {
                "id": "b",
                "width": 30.0,
                "height": 20.0,
                "ports": [{"id": "b.in", "side": "WEST", "x": 0.0, "y": 10.0}]
            }
        ],
        "edges": [{"id": "e", "sources": ["a.out"], "targets": ["b.in"]}]
    }"#;
    let mut graph = LayoutGraph::from_json(json).unwrap();
    LayeredLayout::new().layout(&mut graph);

    let exported = graph.to_json().unwrap();
    let reparsed = LayoutGraph::from_json(exported).unwrap();
    let a = reparsed.node_by_name("a").unwrap();
    let b = reparsed.node_by_name("b").unwrap();
    assert!(reparsed.node(b).position().x > reparsed.node(a).position().x);
}

/// A three-node chain with undeclared port sides, suitable for mirrored
/// directions.
fn leftward_chain() -> LayoutGraph {
    let mut builder = GraphBuilder::new();
    let nodes: Vec<_> = (0..3)
        .map(|i| builder.add_node(format!("m{}", i), Size::new(30.0, 20.0)))
        .collect();
    for i in 0..2 {
        let out = builder
            .add_port(nodes[i], format!("m{}.out", i), PortSide::Undefined, Point::default())
            .unwrap();
        let inp = builder
            .add_port(
                nodes[i + 1],
                format!("m{}.in", i + 1),
                PortSide::Undefined,
                Point::default(),
            )
            .unwrap();
        builder.add_edge(format!("e{}", i), out, inp).unwrap();
    }
    builder.finish()
}
