//! Boundary to the collaborator that turns resolved faces into kernel geometry.
//!
//! Every call across this boundary returns a [`KernelResult`]; a face that
//! cannot be built is a per-operation failure, never a panic.

pub mod types;

pub use types::*;

use crate::geometry::{Vector3, EPSILON};
use crate::sketch::detector::LoopDetectorConfig;
use crate::sketch::profile::{Face, Loop};
use crate::sketch::regions::resolve_region_face_with;
use crate::sketch::types::{Sketch, SketchPlane};
use thiserror::Error;

/// Errors that can occur while building kernel geometry from a face.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KernelOpError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Region not found: {0}")]
    RegionNotFound(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for kernel operations.
pub type KernelResult<T> = Result<T, KernelOpError>;

/// Converts a resolved sketch face into kernel geometry on a plane.
pub trait FaceBuilder {
    type Output;

    fn build_face(&self, face: &Face, plane: &SketchPlane) -> KernelResult<Self::Output>;
}

/// Builds [`PlanarProfile`]s: the face's rings mapped onto the sketch plane.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanarProfileBuilder;

impl PlanarProfileBuilder {
    fn plane_frame(plane: &SketchPlane) -> KernelResult<(Vector3, Vector3, Vector3)> {
        let x = plane.x_axis;
        let y = plane.y_axis;
        let n = x.cross(&y);
        if x.norm() < EPSILON || y.norm() < EPSILON || n.norm() < EPSILON {
            return Err(KernelOpError::InvalidGeometry("degenerate sketch plane axes".to_string()));
        }
        Ok((x, y, n.normalize()))
    }
}

impl FaceBuilder for PlanarProfileBuilder {
    type Output = PlanarProfile;

    fn build_face(&self, face: &Face, plane: &SketchPlane) -> KernelResult<PlanarProfile> {
        if !face.is_valid() {
            return Err(KernelOpError::InvalidGeometry("face has a degenerate or open loop".to_string()));
        }
        let (x_axis, y_axis, normal) = Self::plane_frame(plane)?;

        let to_world = |lp: &Loop| -> Vec<Point3D> {
            lp.polygon
                .iter()
                .map(|p| {
                    let w = plane.origin + x_axis * p[0] + y_axis * p[1];
                    Point3D::new(w.x, w.y, w.z)
                })
                .collect()
        };

        Ok(PlanarProfile {
            exterior: to_world(&face.outer_loop),
            interiors: face.inner_loops.iter().map(to_world).collect(),
            normal: [normal.x, normal.y, normal.z],
        })
    }
}

/// Resolve a stored region id against the current sketch and build it.
///
/// This is the regeneration path for features that persist only a region
/// id: a region that no longer exists becomes [`KernelOpError::RegionNotFound`].
pub fn build_region<B: FaceBuilder>(
    builder: &B,
    sketch: &Sketch,
    region_id: &str,
    config: &LoopDetectorConfig,
) -> KernelResult<B::Output> {
    let face = resolve_region_face_with(sketch, region_id, config)
        .ok_or_else(|| KernelOpError::RegionNotFound(region_id.to_string()))?;
    builder.build_face(&face, &sketch.plane)
}
