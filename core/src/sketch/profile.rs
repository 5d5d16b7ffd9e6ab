//! Wires, loops and faces, and the tessellation that turns a wire into a loop.

use crate::geometry::utils_2d;
use crate::sketch::graph::NodeIndex;
use crate::topo::EntityId;
use serde::{Deserialize, Serialize};

/// Loops with `|signed_area|` below this are degenerate.
pub const MIN_LOOP_AREA: f64 = 1e-6;

/// Number of samples used for a full circle.
pub const CIRCLE_SEGMENTS: usize = 32;

/// Angular step used when sampling arcs.
const ARC_STEP: f64 = std::f64::consts::PI / 8.0;

/// Minimum number of segments per sampled arc.
const MIN_ARC_SEGMENTS: usize = 8;

/// Identity of a wire endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireAnchor {
    /// A sketch entity: the point behind a graph node, or a standalone circle.
    Entity(EntityId),
    /// A graph node with no backing point entity (arc-only junctions).
    Node(NodeIndex),
}

/// Ordered chain of curve entities with per-edge direction flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wire {
    pub edges: Vec<EntityId>,
    /// `forward[i]` is true when `edges[i]` is walked from its start to its end.
    pub forward: Vec<bool>,
    pub start_point: WireAnchor,
    pub end_point: WireAnchor,
}

impl Wire {
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        !self.edges.is_empty() && self.edges.len() == self.forward.len() && self.start_point == self.end_point
    }

    /// Walk the wire the other way round.
    pub fn reverse(&mut self) {
        self.edges.reverse();
        self.forward.reverse();
        for f in &mut self.forward {
            *f = !*f;
        }
        std::mem::swap(&mut self.start_point, &mut self.end_point);
    }
}

/// Curve geometry needed to tessellate one wire edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WireCurve {
    Line { start: [f64; 2], end: [f64; 2] },
    Arc { center: [f64; 2], radius: f64, start_angle: f64, end_angle: f64 },
    Circle { center: [f64; 2], radius: f64 },
}

/// A closed wire tessellated into a flat polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loop {
    pub wire: Wire,
    /// Tessellated ring, without a trailing copy of the first point.
    pub polygon: Vec<[f64; 2]>,
    /// Positive for counter-clockwise rings.
    pub signed_area: f64,
    pub centroid: [f64; 2],
    pub bounds_min: [f64; 2],
    pub bounds_max: [f64; 2],
}

impl Loop {
    /// Tessellate `wire`, looking each edge's geometry up through `curve_of`.
    ///
    /// Edges whose geometry cannot be found contribute no points.
    pub fn from_wire<F>(wire: Wire, curve_of: F, tolerance: f64) -> Self
    where
        F: Fn(EntityId) -> Option<WireCurve>,
    {
        let mut raw: Vec<[f64; 2]> = Vec::new();

        for (&edge, &forward) in wire.edges.iter().zip(&wire.forward) {
            match curve_of(edge) {
                Some(WireCurve::Line { start, end }) => raw.push(if forward { start } else { end }),
                Some(WireCurve::Arc { center, radius, start_angle, end_angle }) => {
                    sample_arc(&mut raw, center, radius, start_angle, end_angle, forward);
                }
                Some(WireCurve::Circle { center, radius }) => {
                    let mut ring = utils_2d::discretize_circle(center, radius, CIRCLE_SEGMENTS);
                    if !forward {
                        ring.reverse();
                    }
                    raw.extend(ring);
                }
                None => {}
            }
        }

        let polygon = dedupe_ring(raw, tolerance);
        let mut lp = Loop {
            wire,
            polygon,
            signed_area: 0.0,
            centroid: [0.0, 0.0],
            bounds_min: [0.0, 0.0],
            bounds_max: [0.0, 0.0],
        };
        lp.update_properties();
        lp
    }

    /// Recompute area, centroid and bounds from `polygon`.
    pub fn update_properties(&mut self) {
        if self.polygon.len() < 3 {
            self.signed_area = 0.0;
            self.centroid = [0.0, 0.0];
            self.bounds_min = [0.0, 0.0];
            self.bounds_max = [0.0, 0.0];
            return;
        }
        self.signed_area = utils_2d::polygon_signed_area(&self.polygon);
        self.centroid = utils_2d::polygon_centroid(&self.polygon, self.signed_area, MIN_LOOP_AREA);
        let (min, max) = utils_2d::polygon_bounds(&self.polygon);
        self.bounds_min = min;
        self.bounds_max = max;
    }

    pub fn area(&self) -> f64 {
        self.signed_area.abs()
    }

    pub fn is_ccw(&self) -> bool {
        self.signed_area > 0.0
    }

    pub fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        (self.bounds_min, self.bounds_max)
    }

    /// Strict point-in-polygon query.
    pub fn contains(&self, point: [f64; 2]) -> bool {
        utils_2d::point_in_polygon(point, &self.polygon)
    }

    /// Reverse the ring orientation: wire, direction flags, polygon and area sign.
    pub fn reverse(&mut self) {
        self.wire.reverse();
        self.polygon.reverse();
        self.signed_area = -self.signed_area;
    }

    /// Force counter-clockwise (`ccw == true`) or clockwise orientation.
    /// Returns true if the loop had to be reversed.
    pub fn orient(&mut self, ccw: bool) -> bool {
        if self.signed_area != 0.0 && self.is_ccw() != ccw {
            self.reverse();
            true
        } else {
            false
        }
    }
}

/// Append an arc's start point and its interior samples, walking it in
/// `forward` direction.
fn sample_arc(out: &mut Vec<[f64; 2]>, center: [f64; 2], radius: f64, start_angle: f64, end_angle: f64, forward: bool) {
    let sweep = utils_2d::ccw_sweep(start_angle, end_angle);
    let (from, sweep) = if forward { (start_angle, sweep) } else { (end_angle, -sweep) };
    let segments = MIN_ARC_SEGMENTS.max((sweep.abs() / ARC_STEP).ceil() as usize);

    out.push(utils_2d::arc_point(center, radius, from));
    for k in 1..segments {
        let angle = from + sweep * (k as f64 / segments as f64);
        out.push(utils_2d::arc_point(center, radius, angle));
    }
}

/// Drop consecutive points within `tolerance` of their predecessor, then any
/// tail points that wrap onto the first point.
fn dedupe_ring(raw: Vec<[f64; 2]>, tolerance: f64) -> Vec<[f64; 2]> {
    let mut ring: Vec<[f64; 2]> = Vec::with_capacity(raw.len());
    for p in raw {
        match ring.last() {
            Some(&last) if utils_2d::points_coincide(last, p, tolerance) => {}
            _ => ring.push(p),
        }
    }
    while ring.len() > 1 && utils_2d::points_coincide(ring[0], ring[ring.len() - 1], tolerance) {
        ring.pop();
    }
    ring
}

/// An outer loop with the holes nested directly inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub outer_loop: Loop,
    pub inner_loops: Vec<Loop>,
}

impl Face {
    pub fn new(outer_loop: Loop) -> Self {
        Self { outer_loop, inner_loops: Vec::new() }
    }

    /// Outer and every hole are closed rings of at least three points, and
    /// the outer ring encloses a non-degenerate area.
    pub fn is_valid(&self) -> bool {
        let ring_ok = |l: &Loop| l.wire.is_closed() && l.polygon.len() >= 3;
        ring_ok(&self.outer_loop)
            && self.outer_loop.area() >= MIN_LOOP_AREA
            && self.inner_loops.iter().all(ring_ok)
    }

    /// Outer area minus hole areas.
    pub fn net_area(&self) -> f64 {
        self.outer_loop.area() - self.inner_loops.iter().map(Loop::area).sum::<f64>()
    }

    pub fn loops(&self) -> impl Iterator<Item = &Loop> {
        std::iter::once(&self.outer_loop).chain(self.inner_loops.iter())
    }
}
