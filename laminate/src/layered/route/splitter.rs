// Copyright (c) The laminate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolution of critical dependency cycles by splitting segments.
//!
//! A critical cycle cannot be fixed by reordering: whichever segment ends up
//! left, edges overlap. Instead, one segment of each offending dependency is
//! cut in two; the two halves are joined by a horizontal connector placed in
//! a free area between existing connection coordinates, and the segment that
//! caused the split is forced between the halves.

use crate::layered::route::generator::{
    count_crossings, create_dependency_if_necessary, ConflictThresholds,
};
use crate::layered::route::segment::{
    DepIx, HyperEdgeSegment, SegmentGraph, SegmentIx, SimulatedSegment,
};

/// A gap between existing connection coordinates that is wide enough to
/// house a horizontal connector without new conflicts.
#[derive(Clone, Copy, Debug, PartialEq)]
struct FreeArea {
    start: f64,
    end: f64,
}

impl FreeArea {
    fn new(start: f64, end: f64) -> Self {
        FreeArea { start, end }
    }

    fn size(&self) -> f64 {
        self.end - self.start
    }

    fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// How good a candidate free area is: fewer crossings first, then fewer
/// dependencies, then larger area.
#[derive(Clone, Copy, Debug, Default)]
struct AreaRating {
    dependencies: i32,
    crossings: i32,
}

/// Coordinate view of a segment, so arena segments and simulated split
/// halves rate identically.
#[derive(Clone, Copy, Debug)]
struct SegView<'a> {
    incoming: &'a [f64],
    outgoing: &'a [f64],
    start: f64,
    end: f64,
}

impl<'a> SegView<'a> {
    fn of(seg: &'a HyperEdgeSegment) -> Self {
        SegView {
            incoming: &seg.incoming,
            outgoing: &seg.outgoing,
            start: seg.start,
            end: seg.end,
        }
    }

    fn of_simulated(seg: &'a SimulatedSegment) -> Self {
        SegView {
            incoming: &seg.incoming,
            outgoing: &seg.outgoing,
            start: seg.start,
            end: seg.end,
        }
    }
}

/// Splits segments to resolve the given critical dependencies.
pub(super) fn split_segments(
    segments: &mut SegmentGraph,
    dependencies_to_resolve: Vec<DepIx>,
    thresholds: &ConflictThresholds,
) {
    if dependencies_to_resolve.is_empty() {
        return;
    }

    let mut free_areas = find_free_areas(segments, thresholds.critical);
    let mut segments_to_split = decide_which_segments_to_split(segments, &dependencies_to_resolve);

    // Split the shortest segments first; they have the fewest options for
    // placing their connector.
    segments_to_split
        .sort_by(|&a, &b| f64::total_cmp(&segments.segment(a).length(), &segments.segment(b).length()));

    for segment in segments_to_split {
        split(segments, segment, &mut free_areas, thresholds);
    }
}

/// Collects every gap between adjacent connection coordinates that is at
/// least twice the critical threshold wide, shrunk by the threshold on both
/// sides.
fn find_free_areas(segments: &SegmentGraph, critical_threshold: f64) -> Vec<FreeArea> {
    let mut coordinates: Vec<f64> = segments
        .segments
        .iter()
        .flat_map(|seg| seg.incoming.iter().chain(&seg.outgoing).copied())
        .collect();
    coordinates.sort_by(f64::total_cmp);

    let mut free_areas = Vec::new();
    for window in coordinates.windows(2) {
        if window[1] - window[0] >= 2.0 * critical_threshold {
            free_areas.push(FreeArea::new(
                window[0] + critical_threshold,
                window[1] - critical_threshold,
            ));
        }
    }
    free_areas
}

/// For each dependency, picks the segment to split and records the other as
/// the cause. Prefers splitting plain edges over hyperedges, which have a
/// higher chance of causing extra crossings.
fn decide_which_segments_to_split(
    segments: &mut SegmentGraph,
    dependencies: &[DepIx],
) -> Vec<SegmentIx> {
    let mut segments_to_split: Vec<SegmentIx> = Vec::new();

    for &dep_ix in dependencies {
        let (source, target) = {
            let dep = segments.dependency(dep_ix);
            match (dep.source, dep.target) {
                (Some(source), Some(target)) => (source, target),
                _ => continue,
            }
        };

        // If either involved segment is already selected because of another
        // dependency, that split resolves this dependency too.
        if segments_to_split.contains(&source) || segments_to_split.contains(&target) {
            continue;
        }

        let (mut to_split, mut causing) = (source, target);
        if segments.segment(source).represents_hyperedge()
            && !segments.segment(target).represents_hyperedge()
        {
            to_split = target;
            causing = source;
        }

        segments_to_split.push(to_split);
        segments.segment_mut(to_split).split_by = Some(causing);
    }

    segments_to_split
}

fn split(
    segments: &mut SegmentGraph,
    segment: SegmentIx,
    free_areas: &mut Vec<FreeArea>,
    thresholds: &ConflictThresholds,
) {
    let split_position =
        compute_position_to_split_and_update_free_areas(segments, segment, free_areas, thresholds);
    let partner = segments.split_at(segment, split_position);
    update_dependencies(segments, segment, partner, thresholds);
}

/// Re-links the split segment into the dependency graph: the cause is forced
/// between the two halves, and dependencies against every other segment are
/// recreated from scratch.
fn update_dependencies(
    segments: &mut SegmentGraph,
    segment: SegmentIx,
    partner: SegmentIx,
    thresholds: &ConflictThresholds,
) {
    let causing = segments
        .segment(segment)
        .split_by
        .expect("split segment must record the segment that caused the split");

    segments.add_critical_dependency(segment, causing);
    segments.add_critical_dependency(causing, partner);

    for other in segments.segment_ixs().collect::<Vec<_>>() {
        if other != segment && other != partner && other != causing {
            create_dependency_if_necessary(segments, thresholds, other, segment);
            create_dependency_if_necessary(segments, thresholds, other, partner);
        }
    }
}

/// Picks the best free area overlapping the segment's extent, removes it
/// from the list (re-inserting leftover halves), and returns its center.
/// Without any usable area the segment is split at its own center, which may
/// produce overlaps but keeps the layout going.
fn compute_position_to_split_and_update_free_areas(
    segments: &SegmentGraph,
    segment: SegmentIx,
    free_areas: &mut Vec<FreeArea>,
    thresholds: &ConflictThresholds,
) -> f64 {
    let seg = segments.segment(segment);
    let mut first_possible_area = None;
    let mut last_possible_area = None;

    for (ix, area) in free_areas.iter().enumerate() {
        if area.start > seg.end {
            break;
        }
        if area.end >= seg.start {
            if first_possible_area.is_none() {
                first_possible_area = Some(ix);
            }
            last_possible_area = Some(ix);
        }
    }

    match (first_possible_area, last_possible_area) {
        (Some(from), Some(to)) => {
            let best = choose_best_area_index(segments, segment, free_areas, from, to);
            let position = free_areas[best].center();
            use_area(free_areas, best, thresholds.critical);
            position
        }
        _ => (seg.start + seg.end) / 2.0,
    }
}

fn choose_best_area_index(
    segments: &SegmentGraph,
    segment: SegmentIx,
    free_areas: &[FreeArea],
    from_index: usize,
    to_index: usize,
) -> usize {
    let mut best_index = from_index;

    if from_index < to_index {
        // Rating a split position requires simulating the split so that
        // crossings can be counted for both halves.
        let (mut split_half, mut partner_half) = segments.simulate_split(segment);

        let mut best_rating = rate_area(
            segments,
            segment,
            &mut split_half,
            &mut partner_half,
            &free_areas[best_index],
        );

        for index in (from_index + 1)..=to_index {
            let rating = rate_area(
                segments,
                segment,
                &mut split_half,
                &mut partner_half,
                &free_areas[index],
            );
            if is_better(
                &free_areas[index],
                rating,
                &free_areas[best_index],
                best_rating,
            ) {
                best_rating = rating;
                best_index = index;
            }
        }
    }

    best_index
}

/// Counts the crossings and dependencies the split halves would cause if the
/// connector ended up at the center of `area`.
fn rate_area(
    segments: &SegmentGraph,
    segment: SegmentIx,
    split_half: &mut SimulatedSegment,
    partner_half: &mut SimulatedSegment,
    area: &FreeArea,
) -> AreaRating {
    let area_center = area.center();

    split_half.outgoing.clear();
    split_half.outgoing.push(area_center);
    split_half.recompute_extent();

    partner_half.incoming.clear();
    partner_half.incoming.push(area_center);
    partner_half.recompute_extent();

    let mut rating = AreaRating::default();
    let seg = segments.segment(segment);

    for &dep_ix in &seg.incoming_deps {
        if let Some(other) = segments.dependency(dep_ix).source {
            let other = SegView::of(segments.segment(other));
            update_considering_both_orderings(
                &mut rating,
                SegView::of_simulated(split_half),
                other,
            );
            update_considering_both_orderings(
                &mut rating,
                SegView::of_simulated(partner_half),
                other,
            );
        }
    }

    for &dep_ix in &seg.outgoing_deps {
        if let Some(other) = segments.dependency(dep_ix).target {
            let other = SegView::of(segments.segment(other));
            update_considering_both_orderings(
                &mut rating,
                SegView::of_simulated(split_half),
                other,
            );
            update_considering_both_orderings(
                &mut rating,
                SegView::of_simulated(partner_half),
                other,
            );
        }
    }

    // The split will add the two forced dependencies around the causing
    // segment, whose order with the halves is fixed; only their crossings
    // need counting.
    rating.dependencies += 2;
    if let Some(causing) = seg.split_by {
        let causing = SegView::of(segments.segment(causing));
        rating.crossings +=
            count_crossings_for_single_ordering(SegView::of_simulated(split_half), causing);
        rating.crossings +=
            count_crossings_for_single_ordering(causing, SegView::of_simulated(partner_half));
    }

    rating
}

fn update_considering_both_orderings(rating: &mut AreaRating, s1: SegView<'_>, s2: SegView<'_>) {
    let crossings_s1_left = count_crossings_for_single_ordering(s1, s2);
    let crossings_s2_left = count_crossings_for_single_ordering(s2, s1);

    if crossings_s1_left == crossings_s2_left {
        if crossings_s1_left > 0 {
            // Both orderings cost the same: a two-cycle.
            rating.dependencies += 2;
            rating.crossings += crossings_s1_left;
        }
    } else {
        rating.dependencies += 1;
        rating.crossings += crossings_s1_left.min(crossings_s2_left);
    }
}

fn count_crossings_for_single_ordering(left: SegView<'_>, right: SegView<'_>) -> i32 {
    count_crossings(left.outgoing, right.start, right.end)
        + count_crossings(right.incoming, left.start, left.end)
}

fn is_better(
    curr_area: &FreeArea,
    curr_rating: AreaRating,
    best_area: &FreeArea,
    best_rating: AreaRating,
) -> bool {
    if curr_rating.crossings < best_rating.crossings {
        return true;
    }
    if curr_rating.crossings == best_rating.crossings {
        if curr_rating.dependencies < best_rating.dependencies {
            return true;
        }
        if curr_rating.dependencies == best_rating.dependencies && curr_area.size() > best_area.size()
        {
            return true;
        }
    }
    false
}

/// Removes a used area and re-inserts whatever is left of its two halves
/// around the connector position.
fn use_area(free_areas: &mut Vec<FreeArea>, used_index: usize, critical_threshold: f64) {
    let old_area = free_areas.remove(used_index);

    if old_area.size() / 2.0 >= critical_threshold {
        let mut insert_index = used_index;
        let old_center = old_area.center();

        let new_end = old_center - critical_threshold;
        if old_area.start <= new_end {
            free_areas.insert(insert_index, FreeArea::new(old_area.start, new_end));
            insert_index += 1;
        }

        let new_start = old_center + critical_threshold;
        if new_start <= old_area.end {
            free_areas.insert(insert_index, FreeArea::new(new_start, old_area.end));
        }
    }
}
