// Copyright (c) The laminate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hyperedge segments and the ordering dependencies between them.
//!
//! A [`HyperEdgeSegment`] represents the trunk of a hyperedge within one
//! routing band: the vertical run shared by every edge of the hyperedge.
//! Each segment keeps two sorted coordinate lists describing where
//! connections enter (source side) and leave (target side) the trunk.
//!
//! Segments and dependencies live in a [`SegmentGraph`] arena scoped to a
//! single band pass; cross-references are index types, which keeps the
//! doubly-linked dependency lists trivial to rewire when dependencies are
//! removed or reversed.

use crate::graph::PortSide;
use crate::layered::lgraph::{LGraph, LPortIx};
use indexmap::IndexMap;
use std::collections::VecDeque;
use std::fmt;

/// Index of a segment within its band's [`SegmentGraph`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(super) struct SegmentIx(u32);

impl SegmentIx {
    #[inline]
    pub(super) fn new(ix: usize) -> Self {
        SegmentIx(ix as u32)
    }

    #[inline]
    pub(super) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SegmentIx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of a dependency within its band's [`SegmentGraph`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(super) struct DepIx(u32);

impl DepIx {
    #[inline]
    pub(super) fn new(ix: usize) -> Self {
        DepIx(ix as u32)
    }

    #[inline]
    pub(super) fn index(self) -> usize {
        self.0 as usize
    }
}

/// The two flavours of ordering constraints between segments.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum DependencyKind {
    /// Violating the constraint costs crossings, but is legal.
    Regular,
    /// Violating the constraint makes edges overlap; never reversed, only
    /// resolved by splitting a segment.
    Critical,
}

/// Weight carried by every critical dependency.
pub(super) const CRITICAL_DEPENDENCY_WEIGHT: i32 = 1;

/// The trunk of one or more edges within a routing band.
#[derive(Clone, Debug)]
pub(super) struct HyperEdgeSegment {
    /// Ports incident to this segment.
    pub(super) ports: Vec<LPortIx>,
    /// The routing slot determines the distance to the preceding layer.
    pub(super) routing_slot: i32,
    /// Smallest coordinate covered by this segment; NaN until a connection
    /// is added.
    pub(super) start: f64,
    /// Largest coordinate covered by this segment; NaN until a connection
    /// is added.
    pub(super) end: f64,
    /// Sorted coordinates where source-side connections enter.
    pub(super) incoming: Vec<f64>,
    /// Sorted coordinates where target-side connections leave.
    pub(super) outgoing: Vec<f64>,
    pub(super) outgoing_deps: Vec<DepIx>,
    pub(super) incoming_deps: Vec<DepIx>,
    pub(super) in_weight: i32,
    pub(super) out_weight: i32,
    pub(super) critical_in_weight: i32,
    pub(super) critical_out_weight: i32,
    /// Linear-ordering mark used by cycle detection.
    pub(super) mark: i32,
    /// The other half if this segment was split.
    pub(super) split_partner: Option<SegmentIx>,
    /// The segment that caused this one to be split; only set on one of the
    /// two partners.
    pub(super) split_by: Option<SegmentIx>,
}

impl HyperEdgeSegment {
    fn new() -> Self {
        HyperEdgeSegment {
            ports: Vec::new(),
            routing_slot: 0,
            start: f64::NAN,
            end: f64::NAN,
            incoming: Vec::new(),
            outgoing: Vec::new(),
            outgoing_deps: Vec::new(),
            incoming_deps: Vec::new(),
            in_weight: 0,
            out_weight: 0,
            critical_in_weight: 0,
            critical_out_weight: 0,
            mark: 0,
            split_partner: None,
            split_by: None,
        }
    }

    /// End coordinate minus start coordinate.
    pub(super) fn length(&self) -> f64 {
        self.end - self.start
    }

    /// True if this segment connects more than two ports; splitting such a
    /// segment tends to cause extra crossings.
    pub(super) fn represents_hyperedge(&self) -> bool {
        self.incoming.len() + self.outgoing.len() > 2
    }

    /// True if this segment was introduced while splitting another segment.
    /// Such segments get their bend points when their partner is processed.
    pub(super) fn is_split_partner(&self) -> bool {
        self.split_partner.is_some() && self.split_by.is_none()
    }

    /// Recomputes start and end from the connection coordinate lists.
    pub(super) fn recompute_extent(&mut self) {
        self.start = f64::NAN;
        self.end = f64::NAN;
        for coords in [&self.incoming, &self.outgoing] {
            if let (Some(&first), Some(&last)) = (coords.first(), coords.last()) {
                self.start = if self.start.is_nan() {
                    first
                } else {
                    self.start.min(first)
                };
                self.end = if self.end.is_nan() {
                    last
                } else {
                    self.end.max(last)
                };
            }
        }
    }
}

/// Inserts a value into an ascending coordinate list, skipping exact
/// duplicates.
pub(super) fn insert_sorted(list: &mut Vec<f64>, value: f64) {
    for (ix, &existing) in list.iter().enumerate() {
        if existing == value {
            return;
        }
        if existing > value {
            list.insert(ix, value);
            return;
        }
    }
    list.push(value);
}

/// An ordering constraint between two segments, stored on both endpoints.
#[derive(Clone, Debug)]
pub(super) struct SegmentDependency {
    pub(super) kind: DependencyKind,
    pub(super) weight: i32,
    /// Cleared when the dependency is removed.
    pub(super) source: Option<SegmentIx>,
    pub(super) target: Option<SegmentIx>,
}

/// Arena of segments and dependencies for one band pass.
#[derive(Debug, Default)]
pub(super) struct SegmentGraph {
    pub(super) segments: Vec<HyperEdgeSegment>,
    pub(super) dependencies: Vec<SegmentDependency>,
}

impl SegmentGraph {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn segment(&self, ix: SegmentIx) -> &HyperEdgeSegment {
        &self.segments[ix.index()]
    }

    pub(super) fn segment_mut(&mut self, ix: SegmentIx) -> &mut HyperEdgeSegment {
        &mut self.segments[ix.index()]
    }

    pub(super) fn dependency(&self, ix: DepIx) -> &SegmentDependency {
        &self.dependencies[ix.index()]
    }

    pub(super) fn segment_ixs(&self) -> impl Iterator<Item = SegmentIx> {
        (0..self.segments.len()).map(SegmentIx::new)
    }

    /// Creates an empty segment and returns its index.
    pub(super) fn add_segment(&mut self) -> SegmentIx {
        let ix = SegmentIx::new(self.segments.len());
        self.segments.push(HyperEdgeSegment::new());
        ix
    }

    /// Seeds a segment from `port` and grows it over every transitively
    /// connected port, recording each port's trunk coordinate on the side it
    /// belongs to.
    pub(super) fn add_port_positions(
        &mut self,
        graph: &LGraph,
        segment: SegmentIx,
        port: LPortIx,
        port_to_segment: &mut IndexMap<LPortIx, SegmentIx>,
        source_side: PortSide,
    ) {
        let mut queue = VecDeque::new();
        queue.push_back(port);

        while let Some(port) = queue.pop_front() {
            if port_to_segment.contains_key(&port) {
                continue;
            }
            port_to_segment.insert(port, segment);

            let position = port_position_on_segment(graph, port);
            let seg = self.segment_mut(segment);
            seg.ports.push(port);
            if graph.port(port).side == source_side {
                insert_sorted(&mut seg.incoming, position);
            } else {
                insert_sorted(&mut seg.outgoing, position);
            }
            seg.recompute_extent();

            for other in graph.connected_ports(port) {
                if !port_to_segment.contains_key(&other) {
                    queue.push_back(other);
                }
            }
        }
    }

    /// Creates a dependency and registers it on both endpoints.
    pub(super) fn add_dependency(
        &mut self,
        kind: DependencyKind,
        source: SegmentIx,
        target: SegmentIx,
        weight: i32,
    ) -> DepIx {
        let ix = DepIx::new(self.dependencies.len());
        self.dependencies.push(SegmentDependency {
            kind,
            weight,
            source: Some(source),
            target: Some(target),
        });
        self.segments[source.index()].outgoing_deps.push(ix);
        self.segments[target.index()].incoming_deps.push(ix);
        ix
    }

    pub(super) fn add_critical_dependency(&mut self, source: SegmentIx, target: SegmentIx) {
        self.add_dependency(
            DependencyKind::Critical,
            source,
            target,
            CRITICAL_DEPENDENCY_WEIGHT,
        );
    }

    /// Detaches a dependency from both endpoints.
    pub(super) fn remove_dependency(&mut self, dep: DepIx) {
        let (source, target) = {
            let d = &self.dependencies[dep.index()];
            (d.source, d.target)
        };
        if let Some(source) = source {
            self.segments[source.index()]
                .outgoing_deps
                .retain(|&d| d != dep);
        }
        if let Some(target) = target {
            self.segments[target.index()]
                .incoming_deps
                .retain(|&d| d != dep);
        }
        let d = &mut self.dependencies[dep.index()];
        d.source = None;
        d.target = None;
    }

    /// Flips the direction of a dependency, updating both endpoints.
    pub(super) fn reverse_dependency(&mut self, dep: DepIx) {
        let (source, target) = {
            let d = &self.dependencies[dep.index()];
            (d.source, d.target)
        };
        let (source, target) = match (source, target) {
            (Some(source), Some(target)) => (source, target),
            // Already removed; nothing to reverse.
            _ => return,
        };
        self.segments[source.index()]
            .outgoing_deps
            .retain(|&d| d != dep);
        self.segments[target.index()]
            .incoming_deps
            .retain(|&d| d != dep);
        self.segments[target.index()].outgoing_deps.push(dep);
        self.segments[source.index()].incoming_deps.push(dep);
        let d = &mut self.dependencies[dep.index()];
        d.source = Some(target);
        d.target = Some(source);
    }

    /// Splits a segment into two at `split_position` and returns the new
    /// partner. The original keeps all incoming connection coordinates; all
    /// outgoing coordinates move to the partner, and the two are linked by a
    /// connector at the split position. All dependencies of the original are
    /// cleared so they can be rebuilt against the new situation.
    pub(super) fn split_at(&mut self, segment: SegmentIx, split_position: f64) -> SegmentIx {
        let partner = self.add_segment();
        self.segments[partner.index()].split_partner = Some(segment);
        self.segments[segment.index()].split_partner = Some(partner);

        let outgoing = std::mem::take(&mut self.segments[segment.index()].outgoing);
        self.segments[partner.index()].outgoing = outgoing;

        self.segments[segment.index()].outgoing.push(split_position);
        self.segments[partner.index()].incoming.push(split_position);

        self.segments[segment.index()].recompute_extent();
        self.segments[partner.index()].recompute_extent();

        while let Some(&dep) = self.segments[segment.index()].incoming_deps.first() {
            self.remove_dependency(dep);
        }
        while let Some(&dep) = self.segments[segment.index()].outgoing_deps.first() {
            self.remove_dependency(dep);
        }

        partner
    }

    /// Simulates what a split of `segment` would produce: a view of the
    /// would-be left half and one of the would-be right half. Used to rate
    /// candidate split positions without mutating the arena.
    pub(super) fn simulate_split(&self, segment: SegmentIx) -> (SimulatedSegment, SimulatedSegment) {
        let seg = self.segment(segment);
        let mut left = SimulatedSegment {
            incoming: seg.incoming.clone(),
            outgoing: Vec::new(),
            start: f64::NAN,
            end: f64::NAN,
        };
        let mut right = SimulatedSegment {
            incoming: Vec::new(),
            outgoing: seg.outgoing.clone(),
            start: f64::NAN,
            end: f64::NAN,
        };
        left.recompute_extent();
        right.recompute_extent();
        (left, right)
    }
}

/// A split half used during split-position rating.
#[derive(Clone, Debug)]
pub(super) struct SimulatedSegment {
    pub(super) incoming: Vec<f64>,
    pub(super) outgoing: Vec<f64>,
    pub(super) start: f64,
    pub(super) end: f64,
}

impl SimulatedSegment {
    pub(super) fn recompute_extent(&mut self) {
        self.start = f64::NAN;
        self.end = f64::NAN;
        for coords in [&self.incoming, &self.outgoing] {
            if let (Some(&first), Some(&last)) = (coords.first(), coords.last()) {
                self.start = if self.start.is_nan() {
                    first
                } else {
                    self.start.min(first)
                };
                self.end = if self.end.is_nan() {
                    last
                } else {
                    self.end.max(last)
                };
            }
        }
    }
}

/// The coordinate of a port on a hyperedge trunk: for horizontal layouts the
/// absolute Y of the port's anchor.
pub(super) fn port_position_on_segment(graph: &LGraph, port: LPortIx) -> f64 {
    graph.port_absolute_anchor(port).y
}
