// Copyright (c) The laminate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered graph drawing with orthogonal edge routing.
//!
//! `laminate` computes drawings of directed graphs whose nodes carry sizes
//! and ports with side affinities: nodes are partitioned into layers, layers
//! are ordered to keep edge crossings low, and edges are routed as
//! horizontal and vertical runs through shared routing channels, with
//! junction points marking where hyperedges branch.
//!
//! # Examples
//!
//! Lay out a two-node graph and read back the result:
//!
//! ```
//! use laminate::geometry::{Point, Size};
//! use laminate::graph::{LayoutGraph, PortSide};
//! use laminate::layered::LayeredLayout;
//!
//! let mut builder = LayoutGraph::builder();
//! let a = builder.add_node("a", Size::new(30.0, 20.0));
//! let b = builder.add_node("b", Size::new(30.0, 20.0));
//! let out = builder
//!     .add_port(a, "a.out", PortSide::East, Point::new(30.0, 10.0))
//!     .unwrap();
//! let inp = builder
//!     .add_port(b, "b.in", PortSide::West, Point::new(0.0, 10.0))
//!     .unwrap();
//! let edge = builder.add_edge("e", out, inp).unwrap();
//! let mut graph = builder.finish();
//!
//! LayeredLayout::new().layout(&mut graph);
//!
//! // Both nodes have positions, and the edge has one routed section.
//! assert!(graph.node(b).position().x > graph.node(a).position().x);
//! assert_eq!(graph.edge(edge).sections().len(), 1);
//! ```
//!
//! Graphs can also be read from and written to JSON with
//! [`graph::LayoutGraph::from_json`] and [`graph::LayoutGraph::to_json`].

#![warn(missing_docs)]

pub mod errors;
pub mod geometry;
pub mod graph;
pub mod layered;

pub use errors::Error;
