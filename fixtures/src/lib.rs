// Copyright (c) The laminate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test fixtures for laminate.
//!
//! Each function builds one of the small graphs the engine's end-to-end
//! tests exercise, returning the graph together with the identifiers the
//! tests need to inspect the result.

use laminate::geometry::{Point, Size};
use laminate::graph::{EdgeId, GraphBuilder, LayoutGraph, NodeId, PortId, PortSide};

/// Two 20x30 nodes stacked on top of each other: `vcc` with a south port on
/// its bottom edge and `gnd` with a north port floating 15 units above it.
pub fn vcc_gnd() -> (LayoutGraph, NodeId, NodeId) {
    let mut builder = GraphBuilder::new();
    let vcc = builder.add_node("vcc", Size::new(20.0, 30.0));
    let gnd = builder.add_node("gnd", Size::new(20.0, 30.0));
    let out = builder
        .add_port(vcc, "vcc.p", PortSide::South, Point::new(10.0, 30.0))
        .unwrap();
    let inp = builder
        .add_port(gnd, "gnd.p", PortSide::North, Point::new(10.0, -15.0))
        .unwrap();
    builder.add_edge("e", out, inp).unwrap();
    (builder.finish(), vcc, gnd)
}

/// A chain `n0 -> n1 -> n2 -> n3` of 30x25 nodes with fixed east/west ports
/// at mid height.
pub fn chain4() -> (LayoutGraph, Vec<NodeId>) {
    let mut builder = GraphBuilder::new();
    let nodes: Vec<NodeId> = (0..4)
        .map(|i| {
            let node = builder.add_node(format!("n{}", i), Size::new(30.0, 25.0));
            builder
                .set_node_property(node, "portConstraints", "FIXED_POS")
                .unwrap();
            node
        })
        .collect();
    for i in 0..3 {
        let out = builder
            .add_port(
                nodes[i],
                format!("n{}.out", i),
                PortSide::East,
                Point::new(30.0, 12.5),
            )
            .unwrap();
        let inp = builder
            .add_port(
                nodes[i + 1],
                format!("n{}.in", i + 1),
                PortSide::West,
                Point::new(0.0, 12.5),
            )
            .unwrap();
        builder.add_edge(format!("e{}", i), out, inp).unwrap();
    }
    (builder.finish(), nodes)
}

/// A diamond `n0 -> {n1, n2} -> n3` with the same node geometry as
/// [`chain4`].
pub fn diamond() -> (LayoutGraph, Vec<NodeId>) {
    let mut builder = GraphBuilder::new();
    let nodes: Vec<NodeId> = (0..4)
        .map(|i| builder.add_node(format!("n{}", i), Size::new(30.0, 25.0)))
        .collect();

    let port_pair = |builder: &mut GraphBuilder, from: usize, to: usize, tag: &str| {
        let out = builder
            .add_port(
                nodes[from],
                format!("n{}.out{}", from, tag),
                PortSide::East,
                Point::new(30.0, 12.5),
            )
            .unwrap();
        let inp = builder
            .add_port(
                nodes[to],
                format!("n{}.in{}", to, tag),
                PortSide::West,
                Point::new(0.0, 12.5),
            )
            .unwrap();
        builder
            .add_edge(format!("e{}{}", from, to), out, inp)
            .unwrap();
    };
    port_pair(&mut builder, 0, 1, "a");
    port_pair(&mut builder, 0, 2, "b");
    port_pair(&mut builder, 1, 3, "a");
    port_pair(&mut builder, 2, 3, "b");
    (builder.finish(), nodes)
}

/// Two nodes whose port pairs cross: east ports at y 10 and 50 connect to
/// west ports at y 50 and 10.
pub fn crossed_ports() -> (LayoutGraph, EdgeId, EdgeId) {
    let mut builder = GraphBuilder::new();
    let a = builder.add_node("a", Size::new(30.0, 60.0));
    let b = builder.add_node("b", Size::new(30.0, 60.0));
    let out_top = builder
        .add_port(a, "a.top", PortSide::East, Point::new(30.0, 10.0))
        .unwrap();
    let out_bottom = builder
        .add_port(a, "a.bottom", PortSide::East, Point::new(30.0, 50.0))
        .unwrap();
    let in_top = builder
        .add_port(b, "b.top", PortSide::West, Point::new(0.0, 10.0))
        .unwrap();
    let in_bottom = builder
        .add_port(b, "b.bottom", PortSide::West, Point::new(0.0, 50.0))
        .unwrap();
    let down = builder.add_edge("down", out_top, in_bottom).unwrap();
    let up = builder.add_edge("up", out_bottom, in_top).unwrap();
    (builder.finish(), down, up)
}

/// Three source nodes feeding a single input port on one target node: a
/// hyperedge with a shared trunk.
pub fn hyperedge_fan_in() -> (LayoutGraph, Vec<EdgeId>) {
    let mut builder = GraphBuilder::new();
    let target = builder.add_node("t", Size::new(30.0, 20.0));
    let inp = builder
        .add_port(target, "t.in", PortSide::West, Point::new(0.0, 10.0))
        .unwrap();
    let mut edges = Vec::new();
    for i in 0..3 {
        let source = builder.add_node(format!("s{}", i), Size::new(30.0, 20.0));
        let out = builder
            .add_port(
                source,
                format!("s{}.out", i),
                PortSide::East,
                Point::new(30.0, 10.0),
            )
            .unwrap();
        edges.push(builder.add_edge(format!("e{}", i), out, inp).unwrap());
    }
    (builder.finish(), edges)
}

/// A single node with a self-loop between two ports on its east side.
pub fn east_self_loop() -> (LayoutGraph, NodeId, EdgeId) {
    let mut builder = GraphBuilder::new();
    let node = builder.add_node("n", Size::new(40.0, 30.0));
    let out = builder
        .add_port(node, "n.out", PortSide::East, Point::new(40.0, 5.0))
        .unwrap();
    let inp = builder
        .add_port(node, "n.in", PortSide::East, Point::new(40.0, 25.0))
        .unwrap();
    let edge = builder.add_edge("loop", out, inp).unwrap();
    (builder.finish(), node, edge)
}

/// A three-node cycle; the layouter has to reverse one edge.
pub fn triangle_cycle() -> (LayoutGraph, Vec<NodeId>) {
    let mut builder = GraphBuilder::new();
    let nodes: Vec<NodeId> = (0..3)
        .map(|i| builder.add_node(format!("c{}", i), Size::new(30.0, 20.0)))
        .collect();
    for i in 0..3 {
        let from = nodes[i];
        let to = nodes[(i + 1) % 3];
        let out = builder
            .add_port(from, format!("c{}.out", i), PortSide::East, Point::new(30.0, 10.0))
            .unwrap();
        let inp = builder
            .add_port(
                to,
                format!("c{}.in", (i + 1) % 3),
                PortSide::West,
                Point::new(0.0, 10.0),
            )
            .unwrap();
        builder.add_edge(format!("e{}", i), out, inp).unwrap();
    }
    (builder.finish(), nodes)
}

/// A single 30x20 node with no edges.
pub fn single_node() -> (LayoutGraph, NodeId) {
    let mut builder = GraphBuilder::new();
    let node = builder.add_node("only", Size::new(30.0, 20.0));
    (builder.finish(), node)
}

/// Helper for tests that need a port id by name.
pub fn port_by_name(graph: &LayoutGraph, name: &str) -> Option<PortId> {
    graph.node_ids().find_map(|node| {
        graph
            .node(node)
            .ports()
            .iter()
            .copied()
            .find(|&port| graph.port(port).name() == name)
    })
}
