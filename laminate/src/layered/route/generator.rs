// Copyright (c) The laminate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-band routing pass: segment construction, conflict analysis,
//! cycle breaking and slot assignment.

use crate::graph::{PortKind, PortSide};
use crate::layered::lgraph::{LGraph, LPortIx};
use crate::layered::route::cycles;
use crate::layered::route::segment::{DependencyKind, SegmentGraph, SegmentIx};
use crate::layered::route::splitter;
use crate::layered::route::strategy::{OrthogonalRoutingStrategy, TOLERANCE};
use indexmap::IndexMap;
use itertools::Itertools;
use log::trace;
use std::collections::VecDeque;

/// Non-critical conflicts are counted within this fraction of the edge
/// spacing.
const CONFLICT_THRESHOLD_FACTOR: f64 = 0.5;
/// The critical conflict threshold is this fraction of the minimum distance
/// between trunk connection coordinates.
const CRITICAL_CONFLICT_THRESHOLD_FACTOR: f64 = 0.2;
/// Weight of a non-critical conflict in the dependency penalty.
const CONFLICT_PENALTY: i32 = 1;
/// Weight of a crossing in the dependency penalty; crossings are deemed
/// worse than conflicts.
const CROSSING_PENALTY: i32 = 16;
/// Sentinel returned by the conflict counter once a critical conflict is
/// found.
const CRITICAL_CONFLICTS_DETECTED: i32 = i32::MAX;

/// The thresholds governing conflict classification for one band pass.
#[derive(Clone, Copy, Debug)]
pub(super) struct ConflictThresholds {
    pub(super) conflict: f64,
    pub(super) critical: f64,
}

/// Routes all edges between two adjacent layers (either may be absent at the
/// graph's ends) and returns the number of routing slots used.
///
/// `start_pos` is the left edge of the routing band; bend points are emitted
/// at `start_pos + slot * edge_edge_spacing`.
pub(super) fn route_band(
    graph: &mut LGraph,
    source_layer: Option<usize>,
    target_layer: Option<usize>,
    start_pos: f64,
) -> usize {
    let mut segments = SegmentGraph::new();
    let mut port_to_segment: IndexMap<LPortIx, SegmentIx> = IndexMap::new();

    // Hyperedge segments grow from the eastern output ports of the left
    // layer and the western output ports of the right layer.
    create_hyper_edge_segments(
        graph,
        source_layer,
        PortSide::East,
        &mut segments,
        &mut port_to_segment,
    );
    create_hyper_edge_segments(
        graph,
        target_layer,
        PortSide::West,
        &mut segments,
        &mut port_to_segment,
    );

    let thresholds = ConflictThresholds {
        conflict: CONFLICT_THRESHOLD_FACTOR * graph.edge_edge_spacing,
        critical: CRITICAL_CONFLICT_THRESHOLD_FACTOR
            * minimum_horizontal_segment_distance(&segments),
    };

    // Build the ordering graph over all segment pairs.
    let mut critical_dependency_count = 0;
    let segment_count = segments.segments.len();
    for first in 0..segment_count.saturating_sub(1) {
        for second in (first + 1)..segment_count {
            critical_dependency_count += create_dependency_if_necessary(
                &mut segments,
                &thresholds,
                SegmentIx::new(first),
                SegmentIx::new(second),
            );
        }
    }

    // Two or more critical dependencies may form critical cycles; those are
    // resolved by splitting segments.
    if critical_dependency_count >= 2 {
        let cycle_deps = cycles::detect_cycles(&mut segments, true, &mut graph.rng);
        splitter::split_segments(&mut segments, cycle_deps, &thresholds);
    }

    // Remaining cycles consist of regular dependencies, which may be removed
    // (two-cycles of weight zero) or reversed.
    let cycle_deps = cycles::detect_cycles(&mut segments, false, &mut graph.rng);
    for dep_ix in cycle_deps {
        if segments.dependency(dep_ix).weight == 0 {
            segments.remove_dependency(dep_ix);
        } else {
            segments.reverse_dependency(dep_ix);
        }
    }

    topological_numbering(&mut segments);

    // Emit bend points. Straight-line segments take no slot and need none.
    let edge_spacing = graph.edge_edge_spacing;
    let mut strategy = OrthogonalRoutingStrategy::new();
    let mut max_slot = -1;
    for ix in segments.segment_ixs() {
        {
            let seg = segments.segment(ix);
            if (seg.start - seg.end).abs() < TOLERANCE {
                continue;
            }
            max_slot = max_slot.max(seg.routing_slot);
        }
        strategy.compute_bend_points(graph, &segments, ix, start_pos, edge_spacing);
    }

    trace!(
        "band {:?}->{:?}: {} segments, {} slots",
        source_layer,
        target_layer,
        segment_count,
        max_slot + 1,
    );

    (max_slot + 1) as usize
}

/// Creates a segment for every not-yet-mapped output port on `side` of the
/// given layer and grows it over all transitively connected ports.
fn create_hyper_edge_segments(
    graph: &LGraph,
    layer: Option<usize>,
    side: PortSide,
    segments: &mut SegmentGraph,
    port_to_segment: &mut IndexMap<LPortIx, SegmentIx>,
) {
    let layer = match layer {
        Some(layer) => layer,
        None => return,
    };
    for &node in &graph.layers[layer].nodes {
        for &port in &graph.node(node).ports {
            let p = graph.port(port);
            if p.kind == PortKind::Output && p.side == side && !port_to_segment.contains_key(&port)
            {
                let segment = segments.add_segment();
                segments.add_port_positions(graph, segment, port, port_to_segment, PortSide::East);
            }
        }
    }
}

/// The smallest distance between two source-side coordinates or between two
/// target-side coordinates, across all segments. Returns `f64::MAX` when
/// fewer than two distinct coordinates exist on both sides.
fn minimum_horizontal_segment_distance(segments: &SegmentGraph) -> f64 {
    let incoming: Vec<f64> = segments
        .segments
        .iter()
        .flat_map(|seg| seg.incoming.iter().copied())
        .collect();
    let outgoing: Vec<f64> = segments
        .segments
        .iter()
        .flat_map(|seg| seg.outgoing.iter().copied())
        .collect();

    minimum_difference(incoming).min(minimum_difference(outgoing))
}

fn minimum_difference(mut coordinates: Vec<f64>) -> f64 {
    coordinates.sort_by(f64::total_cmp);
    coordinates.dedup();
    coordinates
        .iter()
        .tuple_windows()
        .map(|(a, b)| b - a)
        .fold(f64::MAX, f64::min)
}

/// Examines a pair of segments and adds the ordering dependencies between
/// them, if any. Returns the number of critical dependencies created.
pub(super) fn create_dependency_if_necessary(
    segments: &mut SegmentGraph,
    thresholds: &ConflictThresholds,
    first: SegmentIx,
    second: SegmentIx,
) -> usize {
    // Straight-line segments don't take up a slot and create no
    // dependencies.
    {
        let a = segments.segment(first);
        let b = segments.segment(second);
        if (a.start - a.end).abs() < TOLERANCE || (b.start - b.end).abs() < TOLERANCE {
            return 0;
        }
    }

    let (conflicts_first_left, conflicts_second_left) = {
        let a = segments.segment(first);
        let b = segments.segment(second);
        (
            count_conflicts(&a.outgoing, &b.incoming, thresholds),
            count_conflicts(&b.outgoing, &a.incoming, thresholds),
        )
    };

    let mut critical_count = 0;
    if conflicts_first_left == CRITICAL_CONFLICTS_DETECTED
        || conflicts_second_left == CRITICAL_CONFLICTS_DETECTED
    {
        if conflicts_first_left == CRITICAL_CONFLICTS_DETECTED {
            // The first segment must not end up left of the second.
            segments.add_critical_dependency(second, first);
            critical_count += 1;
        }
        if conflicts_second_left == CRITICAL_CONFLICTS_DETECTED {
            // The second segment must not end up left of the first.
            segments.add_critical_dependency(first, second);
            critical_count += 1;
        }
    } else {
        let (crossings_first_left, crossings_second_left) = {
            let a = segments.segment(first);
            let b = segments.segment(second);
            (
                count_crossings(&a.outgoing, b.start, b.end)
                    + count_crossings(&b.incoming, a.start, a.end),
                count_crossings(&b.outgoing, a.start, a.end)
                    + count_crossings(&a.incoming, b.start, b.end),
            )
        };

        let penalty_first_left =
            CONFLICT_PENALTY * conflicts_first_left + CROSSING_PENALTY * crossings_first_left;
        let penalty_second_left =
            CONFLICT_PENALTY * conflicts_second_left + CROSSING_PENALTY * crossings_second_left;

        if penalty_first_left < penalty_second_left {
            segments.add_dependency(
                DependencyKind::Regular,
                first,
                second,
                penalty_second_left - penalty_first_left,
            );
        } else if penalty_first_left > penalty_second_left {
            segments.add_dependency(
                DependencyKind::Regular,
                second,
                first,
                penalty_first_left - penalty_second_left,
            );
        } else if penalty_first_left > 0 && penalty_second_left > 0 {
            // A tie with actual cost: a removable two-cycle of zero weight.
            segments.add_dependency(DependencyKind::Regular, first, second, 0);
            segments.add_dependency(DependencyKind::Regular, second, first, 0);
        }
    }

    critical_count
}

/// Walks two ascending coordinate lists in lockstep and counts pairs closer
/// than the conflict threshold. Returns the critical sentinel as soon as a
/// pair is closer than the critical threshold.
pub(super) fn count_conflicts(
    positions_a: &[f64],
    positions_b: &[f64],
    thresholds: &ConflictThresholds,
) -> i32 {
    let mut conflicts = 0;

    if !positions_a.is_empty() && !positions_b.is_empty() {
        let mut ix_a = 0;
        let mut ix_b = 0;
        loop {
            let a = positions_a[ix_a];
            let b = positions_b[ix_b];

            if a > b - thresholds.critical && a < b + thresholds.critical {
                return CRITICAL_CONFLICTS_DETECTED;
            } else if a > b - thresholds.conflict && a < b + thresholds.conflict {
                conflicts += 1;
            }

            if a <= b && ix_a + 1 < positions_a.len() {
                ix_a += 1;
            } else if b <= a && ix_b + 1 < positions_b.len() {
                ix_b += 1;
            } else {
                break;
            }
        }
    }

    conflicts
}

/// Counts coordinates falling within `[start, end]`.
pub(super) fn count_crossings(positions: &[f64], start: f64, end: f64) -> i32 {
    let mut crossings = 0;
    for &pos in positions {
        if pos > end {
            break;
        }
        if pos >= start {
            crossings += 1;
        }
    }
    crossings
}

/// Assigns each segment the smallest routing slot exceeding the slots of all
/// of its dependency predecessors, then pushes segments whose horizontal
/// connections all point rightward as far right as possible so back edges
/// stay close to their target nodes.
fn topological_numbering(segments: &mut SegmentGraph) {
    let mut sources = VecDeque::new();
    let mut rightward_targets = Vec::new();

    for ix in segments.segment_ixs() {
        let seg = segments.segment_mut(ix);
        seg.in_weight = seg.incoming_deps.len() as i32;
        seg.out_weight = seg.outgoing_deps.len() as i32;

        if seg.in_weight == 0 {
            sources.push_back(ix);
        }
        if seg.out_weight == 0 && seg.incoming.is_empty() {
            rightward_targets.push(ix);
        }
    }

    let mut max_slot = -1;
    while let Some(node) = sources.pop_front() {
        let node_slot = segments.segment(node).routing_slot;
        let outgoing = segments.segment(node).outgoing_deps.clone();
        for dep_ix in outgoing {
            let target = match segments.dependency(dep_ix).target {
                Some(target) => target,
                None => continue,
            };
            let seg = segments.segment_mut(target);
            seg.routing_slot = seg.routing_slot.max(node_slot + 1);
            max_slot = max_slot.max(seg.routing_slot);

            seg.in_weight -= 1;
            if seg.in_weight == 0 {
                sources.push_back(target);
            }
        }
    }

    if max_slot > -1 {
        let mut queue: VecDeque<SegmentIx> = rightward_targets.iter().copied().collect();
        for &ix in &rightward_targets {
            segments.segment_mut(ix).routing_slot = max_slot;
        }

        while let Some(node) = queue.pop_front() {
            let node_slot = segments.segment(node).routing_slot;
            let incoming = segments.segment(node).incoming_deps.clone();
            for dep_ix in incoming {
                let source = match segments.dependency(dep_ix).source {
                    Some(source) => source,
                    None => continue,
                };
                if !segments.segment(source).incoming.is_empty() {
                    continue;
                }
                let seg = segments.segment_mut(source);
                seg.routing_slot = seg.routing_slot.min(node_slot - 1);
                seg.out_weight -= 1;
                if seg.out_weight == 0 {
                    queue.push_back(source);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> ConflictThresholds {
        ConflictThresholds {
            conflict: 5.0,
            critical: 2.0,
        }
    }

    fn seg(segments: &mut SegmentGraph, incoming: Vec<f64>, outgoing: Vec<f64>) -> SegmentIx {
        let ix = segments.add_segment();
        let s = segments.segment_mut(ix);
        s.incoming = incoming;
        s.outgoing = outgoing;
        s.recompute_extent();
        ix
    }

    #[test]
    fn count_crossings_respects_bounds() {
        assert_eq!(count_crossings(&[1.0, 5.0, 9.0, 14.0], 4.0, 10.0), 2);
        assert_eq!(count_crossings(&[1.0, 2.0], 4.0, 10.0), 0);
    }

    #[test]
    fn count_conflicts_detects_critical_pairs() {
        let t = thresholds();
        assert_eq!(
            count_conflicts(&[10.0], &[11.0], &t),
            CRITICAL_CONFLICTS_DETECTED
        );
        // Within the regular threshold but outside the critical one.
        assert_eq!(count_conflicts(&[10.0], &[14.0], &t), 1);
        assert_eq!(count_conflicts(&[10.0], &[20.0], &t), 0);
    }

    #[test]
    fn straight_segments_create_no_dependencies() {
        let mut segments = SegmentGraph::new();
        let a = seg(&mut segments, vec![10.0], vec![10.0]);
        let b = seg(&mut segments, vec![0.0], vec![30.0]);
        assert_eq!(
            create_dependency_if_necessary(&mut segments, &thresholds(), a, b),
            0
        );
        assert!(segments.dependencies.is_empty());
    }

    #[test]
    fn crossing_penalty_orders_segments() {
        let mut segments = SegmentGraph::new();
        // `a` leaves at 30.0, inside b's span; placing `a` left of `b`
        // crosses b's trunk.
        let a = seg(&mut segments, vec![0.0], vec![30.0]);
        let b = seg(&mut segments, vec![20.0], vec![45.0]);
        create_dependency_if_necessary(&mut segments, &thresholds(), a, b);
        assert_eq!(segments.dependencies.len(), 1);
        let dep = segments.dependency(crate::layered::route::segment::DepIx::new(0));
        // b wants to be left of a.
        assert_eq!(dep.source, Some(b));
        assert_eq!(dep.target, Some(a));
    }

    #[test]
    fn topological_numbering_respects_dependencies() {
        let mut segments = SegmentGraph::new();
        let a = seg(&mut segments, vec![0.0], vec![30.0]);
        let b = seg(&mut segments, vec![20.0], vec![45.0]);
        let c = seg(&mut segments, vec![40.0], vec![60.0]);
        segments.add_dependency(DependencyKind::Regular, a, b, 1);
        segments.add_dependency(DependencyKind::Regular, b, c, 1);
        topological_numbering(&mut segments);
        assert_eq!(segments.segment(a).routing_slot, 0);
        assert_eq!(segments.segment(b).routing_slot, 1);
        assert_eq!(segments.segment(c).routing_slot, 2);
    }

    #[test]
    fn rightward_only_segments_move_right() {
        let mut segments = SegmentGraph::new();
        let a = seg(&mut segments, vec![0.0], vec![30.0]);
        let b = seg(&mut segments, vec![20.0], vec![45.0]);
        // A segment with no source-side connections: all of its horizontal
        // pieces point toward the target layer.
        let back = seg(&mut segments, Vec::new(), vec![10.0, 50.0]);
        segments.add_dependency(DependencyKind::Regular, a, b, 1);
        topological_numbering(&mut segments);
        assert_eq!(segments.segment(back).routing_slot, 1);
    }
}
