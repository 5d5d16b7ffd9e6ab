use crate::geometry::utils_2d;
use crate::geometry::{Point3, Vector3};
use crate::topo::EntityId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchPlane {
    pub origin: Point3,
    pub normal: Vector3,
    pub x_axis: Vector3,
    pub y_axis: Vector3,
}

impl Default for SketchPlane {
    fn default() -> Self {
        Self {
            origin: Point3::origin(),
            normal: Vector3::z_axis().into_inner(),
            x_axis: Vector3::x_axis().into_inner(),
            y_axis: Vector3::y_axis().into_inner(),
        }
    }
}

/// Geometry of a sketch entity. Curves reference their defining points by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SketchGeometry {
    Point { pos: [f64; 2] },
    Line { start: EntityId, end: EntityId },
    /// Counter-clockwise arc from `start_angle` to `end_angle` (radians).
    Arc { center: EntityId, radius: f64, start_angle: f64, end_angle: f64 },
    Circle { center: EntityId, radius: f64 },
}

impl SketchGeometry {
    /// Point entities this geometry depends on.
    pub fn referenced_points(&self) -> Vec<EntityId> {
        match self {
            SketchGeometry::Point { .. } => Vec::new(),
            SketchGeometry::Line { start, end } => vec![*start, *end],
            SketchGeometry::Arc { center, .. } | SketchGeometry::Circle { center, .. } => vec![*center],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchEntity {
    pub id: EntityId,
    pub geometry: SketchGeometry,
    #[serde(default)]
    pub is_construction: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sketch {
    pub plane: SketchPlane,
    // Vec keeps iteration order stable, which keeps detection deterministic.
    pub entities: Vec<SketchEntity>,
}

impl Default for Sketch {
    fn default() -> Self {
        Self::new(SketchPlane::default())
    }
}

impl Sketch {
    pub fn new(plane: SketchPlane) -> Self {
        Self {
            plane,
            entities: Vec::new(),
        }
    }

    pub fn add_entity(&mut self, geometry: SketchGeometry) -> EntityId {
        self.add_entity_with_id(EntityId::new(), geometry)
    }

    /// Add an entity under a caller-chosen id (restoration, deterministic tests).
    pub fn add_entity_with_id(&mut self, id: EntityId, geometry: SketchGeometry) -> EntityId {
        self.entities.push(SketchEntity { id, geometry, is_construction: false });
        id
    }

    pub fn add_point(&mut self, pos: [f64; 2]) -> EntityId {
        self.add_entity(SketchGeometry::Point { pos })
    }

    pub fn add_line(&mut self, start: EntityId, end: EntityId) -> EntityId {
        self.add_entity(SketchGeometry::Line { start, end })
    }

    pub fn add_arc(&mut self, center: EntityId, radius: f64, start_angle: f64, end_angle: f64) -> EntityId {
        self.add_entity(SketchGeometry::Arc { center, radius, start_angle, end_angle })
    }

    pub fn add_circle(&mut self, center: EntityId, radius: f64) -> EntityId {
        self.add_entity(SketchGeometry::Circle { center, radius })
    }

    /// Add a closed polyline through `corners`, creating one point per corner.
    /// Returns the line ids in order.
    pub fn add_polygon(&mut self, corners: &[[f64; 2]]) -> Vec<EntityId> {
        let points: Vec<EntityId> = corners.iter().map(|&c| self.add_point(c)).collect();
        let n = points.len();
        (0..n).map(|i| self.add_line(points[i], points[(i + 1) % n])).collect()
    }

    pub fn entity(&self, id: EntityId) -> Option<&SketchEntity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn point_position(&self, id: EntityId) -> Option<[f64; 2]> {
        match self.entity(id)?.geometry {
            SketchGeometry::Point { pos } => Some(pos),
            _ => None,
        }
    }

    /// Move a point entity. Returns false if `id` is not a point.
    pub fn set_point_position(&mut self, id: EntityId, new_pos: [f64; 2]) -> bool {
        match self.entities.iter_mut().find(|e| e.id == id) {
            Some(SketchEntity { geometry: SketchGeometry::Point { pos }, .. }) => {
                *pos = new_pos;
                true
            }
            _ => false,
        }
    }

    pub fn set_construction(&mut self, id: EntityId, is_construction: bool) -> bool {
        match self.entities.iter_mut().find(|e| e.id == id) {
            Some(entity) => {
                entity.is_construction = is_construction;
                true
            }
            None => false,
        }
    }

    pub fn remove_entity(&mut self, id: EntityId) -> Option<SketchEntity> {
        let index = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.remove(index))
    }

    /// Start and end points of an arc entity, derived from its center point.
    pub fn arc_endpoints(&self, id: EntityId) -> Option<([f64; 2], [f64; 2])> {
        match self.entity(id)?.geometry {
            SketchGeometry::Arc { center, radius, start_angle, end_angle } => {
                let c = self.point_position(center)?;
                Some((
                    utils_2d::arc_point(c, radius, start_angle),
                    utils_2d::arc_point(c, radius, end_angle),
                ))
            }
            _ => None,
        }
    }
}
