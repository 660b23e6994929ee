// Copyright (c) The laminate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bend-point emission for west-to-east routing.
//!
//! Once every segment has its routing slot, each non-straight segment turns
//! into a vertical run at `start_pos + slot * edge_spacing`; every edge
//! incident to the segment receives the bend points connecting its source
//! anchor to that run and the run to its target anchor. Split segments
//! produce the two extra bend points of the connector detour.
//!
//! The strategy also owns the set of junction points created during one band
//! pass, so the same trunk coordinate is registered only once even when
//! several edges of a hyperedge pass through it.

use crate::geometry::Point;
use crate::layered::lgraph::{LEdgeIx, LGraph};
use crate::layered::route::segment::{SegmentGraph, SegmentIx};

/// Tolerance below which two coordinates count as equal.
pub(super) const TOLERANCE: f64 = 1e-3;

/// Bend-point generator for one band pass.
#[derive(Debug, Default)]
pub(super) struct OrthogonalRoutingStrategy {
    created_junction_points: Vec<Point>,
}

impl OrthogonalRoutingStrategy {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Emits bend points for every edge leaving a port of the given segment.
    pub(super) fn compute_bend_points(
        &mut self,
        graph: &mut LGraph,
        segments: &SegmentGraph,
        segment: SegmentIx,
        start_pos: f64,
        edge_spacing: f64,
    ) {
        // Split partners get their bend points when the original half is
        // processed.
        if segments.segment(segment).is_split_partner() {
            return;
        }

        let segment_x = start_pos + segments.segment(segment).routing_slot as f64 * edge_spacing;

        let ports = segments.segment(segment).ports.clone();
        for port in ports {
            let source_y = graph.port_absolute_anchor(port).y;

            let outgoing: Vec<LEdgeIx> = graph.port(port).outgoing.to_vec();
            for edge_ix in outgoing {
                if graph.is_self_loop(edge_ix) {
                    continue;
                }
                let target_y = graph.port_absolute_anchor(graph.edge(edge_ix).target).y;
                if (source_y - target_y).abs() <= TOLERANCE {
                    continue;
                }

                // An edge may have been reached through another segment
                // already; only the run through this segment's slot counts.
                let first_bend_x = graph.edge(edge_ix).bend_points.first().map(|p| p.x);
                if let Some(first_x) = first_bend_x {
                    if (first_x - segment_x).abs() > TOLERANCE {
                        graph.edge_mut(edge_ix).bend_points.clear();
                    } else {
                        continue;
                    }
                }

                let mut current_x = segment_x;
                let mut current_segment = segment;

                let bend = Point::new(current_x, source_y);
                graph.edge_mut(edge_ix).bend_points.push(bend);
                self.add_junction_point_if_necessary(graph, segments, edge_ix, current_segment, bend);

                // A split segment detours through its partner's slot at the
                // connector position.
                if let Some(partner) = segments.segment(segment).split_partner {
                    let split_y = segments
                        .segment(partner)
                        .incoming
                        .first()
                        .copied()
                        .expect("split partner carries its connector coordinate");

                    let bend = Point::new(current_x, split_y);
                    graph.edge_mut(edge_ix).bend_points.push(bend);
                    self.add_junction_point_if_necessary(
                        graph,
                        segments,
                        edge_ix,
                        current_segment,
                        bend,
                    );

                    current_x =
                        start_pos + segments.segment(partner).routing_slot as f64 * edge_spacing;
                    current_segment = partner;

                    let bend = Point::new(current_x, split_y);
                    graph.edge_mut(edge_ix).bend_points.push(bend);
                    self.add_junction_point_if_necessary(
                        graph,
                        segments,
                        edge_ix,
                        current_segment,
                        bend,
                    );
                }

                let bend = Point::new(current_x, target_y);
                graph.edge_mut(edge_ix).bend_points.push(bend);
                self.add_junction_point_if_necessary(graph, segments, edge_ix, current_segment, bend);
            }
        }
    }

    /// Registers `pos` as a junction point on the edge if it lies strictly
    /// inside the segment's extent, or coincides with both the first
    /// incoming and first outgoing connection (or both lasts) at the
    /// segment's boundary.
    fn add_junction_point_if_necessary(
        &mut self,
        graph: &mut LGraph,
        segments: &SegmentGraph,
        edge: LEdgeIx,
        segment: SegmentIx,
        pos: Point,
    ) {
        if self.created_junction_points.contains(&pos) {
            return;
        }

        let seg = segments.segment(segment);
        let p = pos.y;

        let inside_segment = p > seg.start && p < seg.end;

        let mut at_segment_boundary = false;
        if !seg.incoming.is_empty() && !seg.outgoing.is_empty() {
            // The bend joins another edge right at the segment's start...
            at_segment_boundary |= (p - seg.incoming[0]).abs() < TOLERANCE
                && (p - seg.outgoing[0]).abs() < TOLERANCE;
            // ...or right at its end.
            at_segment_boundary |= (p - seg.incoming[seg.incoming.len() - 1]).abs() < TOLERANCE
                && (p - seg.outgoing[seg.outgoing.len() - 1]).abs() < TOLERANCE;
        }

        if inside_segment || at_segment_boundary {
            graph.edge_mut(edge).junction_points.push(pos);
            self.created_junction_points.push(pos);
        }
    }
}
