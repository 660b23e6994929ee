// Copyright (c) The laminate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use laminate::geometry::Size;
use laminate::layered::LayeredLayout;
use crate::support::assert_orthogonal;
use pretty_assertions::assert_eq;

#[test]
fn crossed_ports_are_routed_through_distinct_slots() {
    let (mut graph, down, up) = fixtures::crossed_ports();
    LayeredLayout::new().layout(&mut graph);

    let down_bends = &graph.edge(down).sections()[0].bend_points;
    let up_bends = &graph.edge(up).sections()[0].bend_points;

    // No straight-line routing: both edges bend at least twice.
    assert!(down_bends.len() >= 2);
    assert!(up_bends.len() >= 2);

    // The critical conflict forces a split: one of the two edges detours
    // through a second slot.
    let bend_counts = {
        let mut counts = [down_bends.len(), up_bends.len()];
        counts.sort_unstable();
        counts
    };
    assert_eq!(bend_counts, [2, 4]);

    // All bends sit on the slot grid of the single routing band: the band
    // starts at 52 (node width 30, edge-node gap 10, graph padding 12) and
    // slots are 10 apart.
    for bend in down_bends.iter().chain(up_bends) {
        let slot = (bend.x - 52.0) / 10.0;
        assert!(
            (slot - slot.round()).abs() < 1e-9 && (0.0..3.0).contains(&slot),
            "bend {} off the slot grid",
            bend,
        );
    }

    // The two edges use different trunks.
    assert_ne!(down_bends[0].x, up_bends[0].x);

    // Plain crossing edges produce no junction points.
    assert!(graph.edge(down).junction_points().is_empty());
    assert!(graph.edge(up).junction_points().is_empty());

    for edge in [down, up] {
        assert_orthogonal(&graph.edge(edge).sections()[0], "crossed edge");
    }
}

#[test]
fn hyperedge_fan_in_shares_one_trunk() {
    let (mut graph, edges) = fixtures::hyperedge_fan_in();
    LayeredLayout::new().layout(&mut graph);

    // Every non-straight edge of the hyperedge bends on the same vertical
    // trunk: one shared routing slot.
    let mut trunk_xs: Vec<f64> = Vec::new();
    for &edge in &edges {
        for bend in &graph.edge(edge).sections()[0].bend_points {
            trunk_xs.push(bend.x);
        }
    }
    assert!(!trunk_xs.is_empty());
    for &x in &trunk_xs {
        assert_eq!(x, trunk_xs[0]);
    }

    // Junction points mark where the trunk branches: one interior branch
    // and one joint where the straight edge meets the trunk.
    let junction_count: usize = edges
        .iter()
        .map(|&edge| graph.edge(edge).junction_points().len())
        .sum();
    assert_eq!(junction_count, 2);

    for &edge in &edges {
        assert_orthogonal(&graph.edge(edge).sections()[0], "fan-in edge");
    }
}

#[test]
fn east_self_loop_routes_outside_the_node() {
    let (mut graph, node, edge) = fixtures::east_self_loop();
    LayeredLayout::new().layout(&mut graph);

    // No routing band was consumed: the graph is exactly the node plus
    // padding.
    assert_eq!(graph.size(), Size::new(64.0, 54.0));

    let node_right = graph.node(node).position().x + graph.node(node).size().width;
    let section = &graph.edge(edge).sections()[0];
    assert_eq!(section.bend_points.len(), 2);
    for bend in &section.bend_points {
        assert!(
            bend.x > node_right,
            "self-loop bend {} not outside the node",
            bend,
        );
    }
    assert_orthogonal(section, "self loop");
}

#[test]
fn stacked_self_loops_do_not_overlap() {
    use laminate::geometry::Point;
    use laminate::graph::{GraphBuilder, PortSide};

    let mut builder = GraphBuilder::new();
    let node = builder.add_node("n", Size::new(40.0, 40.0));
    let mut edges = Vec::new();
    for i in 0..2 {
        let out = builder
            .add_port(
                node,
                format!("out{}", i),
                PortSide::East,
                Point::new(40.0, 5.0 + i as f64 * 10.0),
            )
            .unwrap();
        let inp = builder
            .add_port(
                node,
                format!("in{}", i),
                PortSide::East,
                Point::new(40.0, 25.0 + i as f64 * 10.0),
            )
            .unwrap();
        edges.push(builder.add_edge(format!("loop{}", i), out, inp).unwrap());
    }
    let mut graph = builder.finish();
    LayeredLayout::new().layout(&mut graph);

    let detour_x = |edge| graph.edge(edge).sections()[0].bend_points[0].x;
    // The second loop stacks one edge spacing further out.
    assert_eq!(detour_x(edges[1]) - detour_x(edges[0]), 10.0);
}
