//! Stable region identity for detected loops.
//!
//! A region is named by the sorted ids of the entities bounding it, so the
//! name survives any movement of those entities that keeps the topology.
//! Features store only that name and re-resolve it against the sketch each
//! time they regenerate.

use crate::sketch::detector::{LoopDetectionResult, LoopDetector, LoopDetectorConfig};
use crate::sketch::hierarchy::containment_tree;
use crate::sketch::profile::{Face, Loop};
use crate::sketch::types::Sketch;
use crate::topo::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

/// Regions at or below this area are not emitted.
pub const GEOMETRY_EPSILON: f64 = 1e-9;

const KEY_SEPARATOR: &str = "|";

/// Sorted, joined textual form of an edge-id set.
pub fn edge_set_key(edges: &[EntityId]) -> String {
    let mut parts: Vec<String> = edges.iter().map(ToString::to_string).collect();
    parts.sort();
    parts.join(KEY_SEPARATOR)
}

/// Stable identity of a loop, independent of where its entities sit.
pub fn region_key(lp: &Loop) -> String {
    edge_set_key(&lp.wire.edges)
}

/// A named region: an outer loop and the loops directly inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionDefinition {
    pub id: String,
    pub outer_loop: Loop,
    pub holes: Vec<Loop>,
}

impl RegionDefinition {
    /// Convert into a face with the outer loop CCW and every hole CW.
    pub fn into_face(self) -> Face {
        let mut outer_loop = self.outer_loop;
        outer_loop.orient(true);
        let inner_loops = self
            .holes
            .into_iter()
            .map(|mut hole| {
                hole.orient(false);
                hole
            })
            .collect();
        Face { outer_loop, inner_loops }
    }
}

/// One region per distinct loop of `result`, each carrying its direct children as holes.
///
/// Loops are deduplicated by [`region_key`] (first occurrence wins) and
/// re-nested independently of the face structure in `result`.
pub fn build_region_definitions(result: &LoopDetectionResult, tolerance: f64) -> Vec<RegionDefinition> {
    let mut seen = HashSet::new();
    let loops: Vec<Loop> = result
        .loops()
        .filter(|lp| seen.insert(region_key(lp)))
        .cloned()
        .collect();

    let tree = containment_tree(&loops, tolerance);

    loops
        .iter()
        .enumerate()
        .filter(|(_, lp)| lp.area() > GEOMETRY_EPSILON)
        .map(|(i, lp)| RegionDefinition {
            id: region_key(lp),
            outer_loop: lp.clone(),
            holes: tree
                .parent
                .iter()
                .enumerate()
                .filter(|(_, &p)| p == Some(i))
                .map(|(j, _)| loops[j].clone())
                .collect(),
        })
        .collect()
}

pub fn find_region_definition(
    result: &LoopDetectionResult,
    region_id: &str,
    tolerance: f64,
) -> Option<RegionDefinition> {
    build_region_definitions(result, tolerance)
        .into_iter()
        .find(|def| def.id == region_id)
}

/// Re-run detection on `sketch` with the default configuration and resolve `region_id`.
pub fn resolve_region_face(sketch: &Sketch, region_id: &str) -> Option<Face> {
    resolve_region_face_with(sketch, region_id, &LoopDetectorConfig::default())
}

/// Re-run detection on `sketch` and resolve `region_id` into a face.
///
/// Returns `None` when detection fails or the entities that formed the
/// region no longer bound a loop.
pub fn resolve_region_face_with(sketch: &Sketch, region_id: &str, config: &LoopDetectorConfig) -> Option<Face> {
    let result = LoopDetector::new(config.clone()).detect(sketch);
    if !result.success {
        warn!("Cannot resolve region {}: {}", region_id, result.error_message);
        return None;
    }

    match find_region_definition(&result, region_id, config.coincidence_tolerance) {
        Some(def) => Some(def.into_face()),
        None => {
            warn!("Region {} no longer resolves to a loop", region_id);
            None
        }
    }
}
