//! Loop validation: closure, size, area and self-intersection checks.

use crate::geometry::utils_2d;
use crate::sketch::profile::{Loop, MIN_LOOP_AREA};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reason a loop failed validation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopDefect {
    #[error("wire is not closed")]
    NotClosed,

    #[error("polygon has fewer than 3 points")]
    TooFewPoints,

    #[error("enclosed area is below the minimum")]
    ZeroArea,

    #[error("polygon intersects itself")]
    SelfIntersecting,
}

/// Check a loop against every validity rule, reporting the first failure.
pub fn validate_loop(lp: &Loop) -> Result<(), LoopDefect> {
    if !lp.wire.is_closed() {
        return Err(LoopDefect::NotClosed);
    }
    if lp.polygon.len() < 3 {
        return Err(LoopDefect::TooFewPoints);
    }
    if lp.area() < MIN_LOOP_AREA {
        return Err(LoopDefect::ZeroArea);
    }
    if lp.polygon.len() >= 4 && has_self_intersection(&lp.polygon) {
        return Err(LoopDefect::SelfIntersecting);
    }
    Ok(())
}

/// True if two non-adjacent edges of the closed ring intersect.
///
/// Edges `i` and `i + 1` share a vertex, as do the last and the first edge;
/// those pairs are not tested.
pub fn has_self_intersection(polygon: &[[f64; 2]]) -> bool {
    let n = polygon.len();
    for i in 0..n {
        let (a1, a2) = (polygon[i], polygon[(i + 1) % n]);
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            if utils_2d::segments_intersect(a1, a2, polygon[j], polygon[(j + 1) % n]) {
                return true;
            }
        }
    }
    false
}

impl Loop {
    pub fn is_valid(&self) -> bool {
        validate_loop(self).is_ok()
    }
}
