//! 2D geometry utilities for sketch topology.
//!
//! Pure functions over `[f64; 2]` points used by the loop detector:
//! distances, orientation tests, segment and polygon intersection,
//! containment, and the shoelace area/centroid formulas.

use std::f64::consts::PI;

/// Tolerance for floating-point comparisons
pub const EPSILON: f64 = 1e-6;

// =============================================================================
// Point Operations
// =============================================================================

/// Check if two 2D points lie within `tolerance` of each other.
#[inline]
pub fn points_coincide(p1: [f64; 2], p2: [f64; 2], tolerance: f64) -> bool {
    distance_squared(p1, p2) <= tolerance * tolerance
}

/// Compute squared distance between two 2D points.
#[inline]
pub fn distance_squared(p1: [f64; 2], p2: [f64; 2]) -> f64 {
    let dx = p2[0] - p1[0];
    let dy = p2[1] - p1[1];
    dx * dx + dy * dy
}

/// Compute distance between two 2D points.
#[inline]
pub fn distance(p1: [f64; 2], p2: [f64; 2]) -> f64 {
    distance_squared(p1, p2).sqrt()
}

// =============================================================================
// Vector Operations
// =============================================================================

#[inline]
pub fn sub_2d(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [a[0] - b[0], a[1] - b[1]]
}

/// 2D cross product (z-component of 3D cross product).
/// Positive if v2 is counter-clockwise from v1.
#[inline]
pub fn cross_2d(v1: [f64; 2], v2: [f64; 2]) -> f64 {
    v1[0] * v2[1] - v1[1] * v2[0]
}

/// Orientation of the triple (a, b, c): > 0 for a left turn, < 0 for a right turn.
#[inline]
pub fn orientation(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    cross_2d(sub_2d(b, a), sub_2d(c, a))
}

// =============================================================================
// Segment Operations
// =============================================================================

/// Distance from a point to the closed segment `start..end`.
pub fn distance_point_to_segment(start: [f64; 2], end: [f64; 2], point: [f64; 2]) -> f64 {
    let d = sub_2d(end, start);
    let len_sq = d[0] * d[0] + d[1] * d[1];
    if len_sq == 0.0 {
        return distance(start, point);
    }
    let p = sub_2d(point, start);
    let t = ((p[0] * d[0] + p[1] * d[1]) / len_sq).clamp(0.0, 1.0);
    distance(point, [start[0] + t * d[0], start[1] + t * d[1]])
}

/// `p` is collinear with `a..b` and inside its bounding box.
#[inline]
fn within_segment_box(a: [f64; 2], b: [f64; 2], p: [f64; 2]) -> bool {
    p[0] >= a[0].min(b[0])
        && p[0] <= a[0].max(b[0])
        && p[1] >= a[1].min(b[1])
        && p[1] <= a[1].max(b[1])
}

/// Orientation-sign segment intersection test.
///
/// Touching configurations (an endpoint on the other segment, collinear
/// overlap) count as intersecting.
pub fn segments_intersect(a1: [f64; 2], a2: [f64; 2], b1: [f64; 2], b2: [f64; 2]) -> bool {
    let d1 = orientation(b1, b2, a1);
    let d2 = orientation(b1, b2, a2);
    let d3 = orientation(a1, a2, b1);
    let d4 = orientation(a1, a2, b2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && within_segment_box(b1, b2, a1))
        || (d2 == 0.0 && within_segment_box(b1, b2, a2))
        || (d3 == 0.0 && within_segment_box(a1, a2, b1))
        || (d4 == 0.0 && within_segment_box(a1, a2, b2))
}

// =============================================================================
// Polygon Operations
// =============================================================================

/// Compute signed area of a polygon using the Shoelace formula.
/// Positive = CCW winding, Negative = CW winding.
pub fn polygon_signed_area(vertices: &[[f64; 2]]) -> f64 {
    let n = vertices.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += vertices[i][0] * vertices[j][1];
        area -= vertices[j][0] * vertices[i][1];
    }
    area / 2.0
}

/// Area-weighted polygon centroid.
///
/// Falls back to the arithmetic mean of the vertices when `|signed_area|`
/// is below `min_area`.
pub fn polygon_centroid(vertices: &[[f64; 2]], signed_area: f64, min_area: f64) -> [f64; 2] {
    let n = vertices.len();
    if n == 0 {
        return [0.0, 0.0];
    }

    if signed_area.abs() < min_area {
        let cx = vertices.iter().map(|p| p[0]).sum::<f64>() / n as f64;
        let cy = vertices.iter().map(|p| p[1]).sum::<f64>() / n as f64;
        return [cx, cy];
    }

    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        let cross = vertices[i][0] * vertices[j][1] - vertices[j][0] * vertices[i][1];
        cx += (vertices[i][0] + vertices[j][0]) * cross;
        cy += (vertices[i][1] + vertices[j][1]) * cross;
    }

    [cx / (6.0 * signed_area), cy / (6.0 * signed_area)]
}

/// Axis-aligned bounds `(min, max)` of a point set. Empty input yields zeros.
pub fn polygon_bounds(vertices: &[[f64; 2]]) -> ([f64; 2], [f64; 2]) {
    if vertices.is_empty() {
        return ([0.0, 0.0], [0.0, 0.0]);
    }

    let mut min = [f64::INFINITY, f64::INFINITY];
    let mut max = [f64::NEG_INFINITY, f64::NEG_INFINITY];
    for p in vertices {
        min[0] = min[0].min(p[0]);
        min[1] = min[1].min(p[1]);
        max[0] = max[0].max(p[0]);
        max[1] = max[1].max(p[1]);
    }
    (min, max)
}

/// Test if a point is inside a polygon using the winding number algorithm.
/// Works for both convex and concave polygons.
pub fn point_in_polygon(point: [f64; 2], polygon: &[[f64; 2]]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut winding: i32 = 0;

    for i in 0..n {
        let p1 = polygon[i];
        let p2 = polygon[(i + 1) % n];

        if p1[1] <= point[1] {
            if p2[1] > point[1] && orientation(p1, p2, point) > 0.0 {
                // Upward crossing
                winding += 1;
            }
        } else if p2[1] <= point[1] && orientation(p1, p2, point) < 0.0 {
            // Downward crossing
            winding -= 1;
        }
    }

    winding != 0
}

/// True if `point` lies within `tolerance` of any edge of the closed ring.
pub fn point_on_polygon_boundary(point: [f64; 2], polygon: &[[f64; 2]], tolerance: f64) -> bool {
    let n = polygon.len();
    (0..n).any(|i| distance_point_to_segment(polygon[i], polygon[(i + 1) % n], point) <= tolerance)
}

/// Point-in-polygon test that also accepts points on the boundary.
pub fn point_in_or_on_polygon(point: [f64; 2], polygon: &[[f64; 2]], tolerance: f64) -> bool {
    point_in_polygon(point, polygon) || point_on_polygon_boundary(point, polygon, tolerance)
}

/// True if any edge of ring `a` intersects (or touches) any edge of ring `b`.
pub fn polygons_intersect(a: &[[f64; 2]], b: &[[f64; 2]]) -> bool {
    let (na, nb) = (a.len(), b.len());
    if na < 2 || nb < 2 {
        return false;
    }

    let (a_min, a_max) = polygon_bounds(a);
    let (b_min, b_max) = polygon_bounds(b);
    if a_max[0] < b_min[0] || b_max[0] < a_min[0] || a_max[1] < b_min[1] || b_max[1] < a_min[1] {
        return false;
    }

    for i in 0..na {
        let (a1, a2) = (a[i], a[(i + 1) % na]);
        for j in 0..nb {
            if segments_intersect(a1, a2, b[j], b[(j + 1) % nb]) {
                return true;
            }
        }
    }
    false
}

/// `inner` bounds lie inside `outer` bounds, expanded by `tolerance`.
#[inline]
pub fn bounds_contain(
    outer: ([f64; 2], [f64; 2]),
    inner: ([f64; 2], [f64; 2]),
    tolerance: f64,
) -> bool {
    inner.0[0] >= outer.0[0] - tolerance
        && inner.0[1] >= outer.0[1] - tolerance
        && inner.1[0] <= outer.1[0] + tolerance
        && inner.1[1] <= outer.1[1] + tolerance
}

// =============================================================================
// Arc Utilities
// =============================================================================

/// Compute a point on an arc given center, radius, and angle (radians).
#[inline]
pub fn arc_point(center: [f64; 2], radius: f64, angle: f64) -> [f64; 2] {
    [
        center[0] + radius * angle.cos(),
        center[1] + radius * angle.sin(),
    ]
}

/// Counter-clockwise sweep from `start_angle` to `end_angle`, normalized to `[0, 2π)`.
pub fn ccw_sweep(start_angle: f64, end_angle: f64) -> f64 {
    (end_angle - start_angle).rem_euclid(2.0 * PI)
}

/// Discretize a full circle into `segments` points, counter-clockwise from angle 0.
pub fn discretize_circle(center: [f64; 2], radius: f64, segments: usize) -> Vec<[f64; 2]> {
    let segments = segments.max(3);
    (0..segments)
        .map(|i| arc_point(center, radius, (i as f64 / segments as f64) * 2.0 * PI))
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
