// Copyright (c) The laminate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feedback-arc detection on the segment ordering graph.
//!
//! A variant of the Eades–Lin–Smyth linear-arrangement heuristic: sinks are
//! peeled to the right, sources to the left, and of the remaining segments
//! the one with the highest outflow is placed next, ties broken through the
//! graph's seeded RNG. Dependencies pointing backward in the resulting order
//! form the returned feedback set.
//!
//! The same routine serves two callers: restricted to critical dependencies
//! it finds the cycles that must be resolved by splitting segments, and on
//! the full dependency graph it finds the cycles broken by removing or
//! reversing regular dependencies.

use crate::layered::route::segment::{DepIx, DependencyKind, SegmentGraph, SegmentIx};
use fixedbitset::FixedBitSet;
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::VecDeque;

/// Returns the dependencies that point backward in the computed linear
/// ordering. With `critical_only`, regular dependencies are ignored
/// entirely.
pub(super) fn detect_cycles(
    segments: &mut SegmentGraph,
    critical_only: bool,
    rng: &mut StdRng,
) -> Vec<DepIx> {
    let mut sources = VecDeque::new();
    let mut sinks = VecDeque::new();

    initialize(segments, &mut sources, &mut sinks, critical_only);
    compute_linear_ordering_marks(segments, sources, sinks, critical_only, rng);

    // Everything that points leftward in the ordering is part of a cycle.
    let mut result = Vec::new();
    for source in segments.segment_ixs() {
        for &dep_ix in &segments.segment(source).outgoing_deps {
            let dep = segments.dependency(dep_ix);
            if critical_only && dep.kind != DependencyKind::Critical {
                continue;
            }
            if let Some(target) = dep.target {
                if segments.segment(source).mark > segments.segment(target).mark {
                    result.push(dep_ix);
                }
            }
        }
    }
    result
}

/// Assigns provisional negative marks and dependency weights, and fills the
/// initial source and sink queues.
fn initialize(
    segments: &mut SegmentGraph,
    sources: &mut VecDeque<SegmentIx>,
    sinks: &mut VecDeque<SegmentIx>,
    critical_only: bool,
) {
    let mut next_mark = -1;
    for ix in segments.segment_ixs() {
        let (critical_in, critical_out, total_in, total_out) = {
            let seg = segments.segment(ix);
            let sum = |deps: &[DepIx], critical: bool| -> i32 {
                deps.iter()
                    .map(|&d| {
                        let dep = segments.dependency(d);
                        if !critical || dep.kind == DependencyKind::Critical {
                            dep.weight
                        } else {
                            0
                        }
                    })
                    .sum()
            };
            (
                sum(&seg.incoming_deps, true),
                sum(&seg.outgoing_deps, true),
                sum(&seg.incoming_deps, false),
                sum(&seg.outgoing_deps, false),
            )
        };

        let (in_weight, out_weight) = if critical_only {
            (critical_in, critical_out)
        } else {
            (total_in, total_out)
        };

        let seg = segments.segment_mut(ix);
        seg.mark = next_mark;
        next_mark -= 1;
        seg.in_weight = in_weight;
        seg.out_weight = out_weight;
        seg.critical_in_weight = critical_in;
        seg.critical_out_weight = critical_out;

        if out_weight == 0 {
            sinks.push_back(ix);
        } else if in_weight == 0 {
            sources.push_back(ix);
        }
    }
}

fn compute_linear_ordering_marks(
    segments: &mut SegmentGraph,
    mut sources: VecDeque<SegmentIx>,
    mut sinks: VecDeque<SegmentIx>,
    critical_only: bool,
    rng: &mut StdRng,
) {
    let count = segments.segments.len();
    let mut processed = FixedBitSet::with_capacity(count);
    let mut remaining = count;

    // Sinks get marks below the base, sources marks above it; the sink marks
    // are shifted past the source marks afterwards so they reflect discovery
    // order while still ending up to the right.
    let mark_base = count as i32;
    let mut next_sink_mark = mark_base - 1;
    let mut next_source_mark = mark_base + 1;
    let mut max_segments: Vec<SegmentIx> = Vec::new();

    while remaining > 0 {
        while let Some(sink) = sinks.pop_front() {
            if processed.contains(sink.index()) {
                continue;
            }
            processed.insert(sink.index());
            remaining -= 1;
            segments.segment_mut(sink).mark = next_sink_mark;
            next_sink_mark -= 1;
            update_neighbors(segments, sink, &mut sources, &mut sinks, critical_only);
        }

        while let Some(source) = sources.pop_front() {
            if processed.contains(source.index()) {
                continue;
            }
            processed.insert(source.index());
            remaining -= 1;
            segments.segment_mut(source).mark = next_source_mark;
            next_source_mark += 1;
            update_neighbors(segments, source, &mut sources, &mut sinks, critical_only);
        }

        // The rest are neither source nor sink. Gather those with maximal
        // outflow to be placed among the sources. When looking at both kinds
        // of dependencies, a segment with critical outgoing but no critical
        // incoming dependencies must be taken immediately so the critical
        // dependency keeps pointing rightward.
        let mut max_outflow = i32::MIN;
        max_segments.clear();
        for ix in segments.segment_ixs() {
            if processed.contains(ix.index()) {
                continue;
            }
            let seg = segments.segment(ix);
            if !critical_only && seg.critical_out_weight > 0 && seg.critical_in_weight <= 0 {
                max_segments.clear();
                max_segments.push(ix);
                break;
            }
            let outflow = seg.out_weight - seg.in_weight;
            if outflow >= max_outflow {
                if outflow > max_outflow {
                    max_segments.clear();
                    max_outflow = outflow;
                }
                max_segments.push(ix);
            }
        }

        if !max_segments.is_empty() {
            let chosen = max_segments[rng.gen_range(0..max_segments.len())];
            processed.insert(chosen.index());
            remaining -= 1;
            segments.segment_mut(chosen).mark = next_source_mark;
            next_source_mark += 1;
            update_neighbors(segments, chosen, &mut sources, &mut sinks, critical_only);
        }
    }

    // Shift the sink marks so they end up higher than all source marks.
    let shift_base = count as i32 + 1;
    for ix in segments.segment_ixs() {
        let seg = segments.segment_mut(ix);
        if seg.mark < mark_base {
            seg.mark += shift_base;
        }
    }
}

/// Subtracts the processed segment's dependency weights from its neighbours
/// and queues any neighbour that becomes a source or sink.
fn update_neighbors(
    segments: &mut SegmentGraph,
    node: SegmentIx,
    sources: &mut VecDeque<SegmentIx>,
    sinks: &mut VecDeque<SegmentIx>,
    critical_only: bool,
) {
    let outgoing = segments.segment(node).outgoing_deps.clone();
    for dep_ix in outgoing {
        let dep = segments.dependency(dep_ix).clone();
        if critical_only && dep.kind != DependencyKind::Critical {
            continue;
        }
        let target = match dep.target {
            Some(target) => target,
            None => continue,
        };
        if segments.segment(target).mark < 0 && dep.weight > 0 {
            let seg = segments.segment_mut(target);
            seg.in_weight -= dep.weight;
            if dep.kind == DependencyKind::Critical {
                seg.critical_in_weight -= dep.weight;
            }
            if seg.in_weight <= 0 && seg.out_weight > 0 {
                sources.push_back(target);
            }
        }
    }

    let incoming = segments.segment(node).incoming_deps.clone();
    for dep_ix in incoming {
        let dep = segments.dependency(dep_ix).clone();
        if critical_only && dep.kind != DependencyKind::Critical {
            continue;
        }
        let source = match dep.source {
            Some(source) => source,
            None => continue,
        };
        if segments.segment(source).mark < 0 && dep.weight > 0 {
            let seg = segments.segment_mut(source);
            seg.out_weight -= dep.weight;
            if dep.kind == DependencyKind::Critical {
                seg.critical_out_weight -= dep.weight;
            }
            if seg.out_weight <= 0 && seg.in_weight > 0 {
                sinks.push_back(source);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn seg_with_extent(segments: &mut SegmentGraph, start: f64, end: f64) -> SegmentIx {
        let ix = segments.add_segment();
        let seg = segments.segment_mut(ix);
        seg.incoming = vec![start];
        seg.outgoing = vec![end];
        seg.recompute_extent();
        ix
    }

    #[test]
    fn acyclic_graph_has_empty_feedback_set() {
        let mut segments = SegmentGraph::new();
        let a = seg_with_extent(&mut segments, 0.0, 10.0);
        let b = seg_with_extent(&mut segments, 5.0, 15.0);
        let c = seg_with_extent(&mut segments, 10.0, 20.0);
        segments.add_dependency(DependencyKind::Regular, a, b, 2);
        segments.add_dependency(DependencyKind::Regular, b, c, 2);

        let mut rng = StdRng::seed_from_u64(1);
        assert!(detect_cycles(&mut segments, false, &mut rng).is_empty());
    }

    #[test]
    fn two_cycle_yields_one_feedback_arc() {
        let mut segments = SegmentGraph::new();
        let a = seg_with_extent(&mut segments, 0.0, 10.0);
        let b = seg_with_extent(&mut segments, 5.0, 15.0);
        segments.add_dependency(DependencyKind::Regular, a, b, 1);
        segments.add_dependency(DependencyKind::Regular, b, a, 3);

        let mut rng = StdRng::seed_from_u64(1);
        let feedback = detect_cycles(&mut segments, false, &mut rng);
        assert_eq!(feedback.len(), 1);
        // The lighter arc loses.
        assert_eq!(segments.dependency(feedback[0]).weight, 1);
    }

    #[test]
    fn critical_mode_ignores_regular_cycles() {
        let mut segments = SegmentGraph::new();
        let a = seg_with_extent(&mut segments, 0.0, 10.0);
        let b = seg_with_extent(&mut segments, 5.0, 15.0);
        segments.add_dependency(DependencyKind::Regular, a, b, 1);
        segments.add_dependency(DependencyKind::Regular, b, a, 1);

        let mut rng = StdRng::seed_from_u64(1);
        assert!(detect_cycles(&mut segments, true, &mut rng).is_empty());
    }

    #[test]
    fn critical_two_cycle_is_detected() {
        let mut segments = SegmentGraph::new();
        let a = seg_with_extent(&mut segments, 0.0, 10.0);
        let b = seg_with_extent(&mut segments, 5.0, 15.0);
        segments.add_critical_dependency(a, b);
        segments.add_critical_dependency(b, a);

        let mut rng = StdRng::seed_from_u64(1);
        let feedback = detect_cycles(&mut segments, true, &mut rng);
        assert_eq!(feedback.len(), 1);
    }
}
