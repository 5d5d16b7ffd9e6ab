//! Common geometry types for the face-builder boundary.
//!
//! These types are kernel-agnostic and used to hand resolved faces to
//! whatever builds solids from them.

use crate::sketch::profile::Face;
use serde::{Deserialize, Serialize};

/// A 2D point in sketch space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn from_array(arr: [f64; 2]) -> Self {
        Self { x: arr[0], y: arr[1] }
    }

    pub fn to_array(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl From<[f64; 2]> for Point2D {
    fn from(arr: [f64; 2]) -> Self {
        Self::from_array(arr)
    }
}

/// A 3D point in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// A 2D polygon with optional holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon2D {
    /// Outer boundary (counter-clockwise winding).
    pub exterior: Vec<Point2D>,
    /// Inner holes (clockwise winding).
    pub interiors: Vec<Vec<Point2D>>,
}

impl Polygon2D {
    /// Create from raw coordinate arrays.
    pub fn from_arrays(exterior: &[[f64; 2]], interiors: &[&[[f64; 2]]]) -> Self {
        Self {
            exterior: exterior.iter().map(|p| Point2D::from_array(*p)).collect(),
            interiors: interiors
                .iter()
                .map(|hole| hole.iter().map(|p| Point2D::from_array(*p)).collect())
                .collect(),
        }
    }
}

/// A face laid onto its sketch plane in world coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanarProfile {
    pub exterior: Vec<Point3D>,
    pub interiors: Vec<Vec<Point3D>>,
    /// Unit plane normal; the exterior winds counter-clockwise around it.
    pub normal: [f64; 3],
}

impl Face {
    /// Sketch-space polygon: exterior from the outer loop, one interior per hole.
    pub fn to_polygon_2d(&self) -> Polygon2D {
        let holes: Vec<&[[f64; 2]]> = self.inner_loops.iter().map(|l| l.polygon.as_slice()).collect();
        Polygon2D::from_arrays(&self.outer_loop.polygon, &holes)
    }
}
