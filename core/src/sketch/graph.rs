//! Adjacency graph over sketch curves.
//!
//! Nodes are coincidence-clustered curve endpoints, edges are the line and
//! arc entities joining them. Everything is stored in flat vectors and
//! cross-referenced by index.

use crate::geometry::utils_2d;
use crate::sketch::detector::DetectionError;
use crate::sketch::profile::{WireAnchor, WireCurve};
use crate::sketch::types::{Sketch, SketchGeometry};
use crate::topo::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub type NodeIndex = usize;
pub type EdgeIndex = usize;

/// Sweeps below this (radians) are treated as degenerate arcs.
const MIN_SWEEP: f64 = 1e-9;

/// Why an entity was left out of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SkipReason {
    /// A referenced point id does not resolve to a point entity.
    MissingPoint(EntityId),
    /// Line endpoints coincide.
    ZeroLength,
    /// Arc start and end angles coincide.
    ZeroSweep,
    /// Arc or circle radius is within tolerance of zero.
    ZeroRadius,
}

/// A sketch entity resolved once into the fields needed for topology.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedEntity {
    Point { id: EntityId, pos: [f64; 2] },
    Line { id: EntityId, start_id: EntityId, end_id: EntityId, start: [f64; 2], end: [f64; 2] },
    Arc { id: EntityId, center: [f64; 2], radius: f64, start_angle: f64, end_angle: f64 },
    Circle { id: EntityId, center: [f64; 2], radius: f64 },
}

impl ResolvedEntity {
    pub fn id(&self) -> EntityId {
        match self {
            ResolvedEntity::Point { id, .. }
            | ResolvedEntity::Line { id, .. }
            | ResolvedEntity::Arc { id, .. }
            | ResolvedEntity::Circle { id, .. } => *id,
        }
    }
}

/// Resolved, filtered view of a sketch plus the entities that were skipped.
#[derive(Debug, Clone, Default)]
pub struct ResolvedSketch {
    pub entities: Vec<ResolvedEntity>,
    pub skipped: Vec<(EntityId, SkipReason)>,
}

fn ensure_finite(id: EntityId, values: &[f64]) -> Result<(), DetectionError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(DetectionError::NonFiniteGeometry(id))
    }
}

/// Resolve every non-construction entity (restricted to `filter` when it is
/// non-empty) into a [`ResolvedEntity`].
///
/// Degenerate entities are skipped and reported; non-finite coordinates abort.
pub fn resolve_entities(
    sketch: &Sketch,
    filter: &HashSet<EntityId>,
    tolerance: f64,
) -> Result<ResolvedSketch, DetectionError> {
    let mut resolved = ResolvedSketch::default();

    for entity in &sketch.entities {
        if entity.is_construction || (!filter.is_empty() && !filter.contains(&entity.id)) {
            continue;
        }
        let id = entity.id;

        let point = |pid: EntityId| sketch.point_position(pid).ok_or(SkipReason::MissingPoint(pid));

        let outcome = match &entity.geometry {
            SketchGeometry::Point { pos } => {
                ensure_finite(id, pos)?;
                Ok(ResolvedEntity::Point { id, pos: *pos })
            }
            SketchGeometry::Line { start, end } => match (point(*start), point(*end)) {
                (Ok(s), Ok(e)) => {
                    ensure_finite(id, &[s[0], s[1], e[0], e[1]])?;
                    if utils_2d::points_coincide(s, e, tolerance) {
                        Err(SkipReason::ZeroLength)
                    } else {
                        Ok(ResolvedEntity::Line { id, start_id: *start, end_id: *end, start: s, end: e })
                    }
                }
                (Err(reason), _) | (_, Err(reason)) => Err(reason),
            },
            SketchGeometry::Arc { center, radius, start_angle, end_angle } => match point(*center) {
                Ok(c) => {
                    let (radius, start_angle, end_angle) = (*radius, *start_angle, *end_angle);
                    ensure_finite(id, &[c[0], c[1], radius, start_angle, end_angle])?;
                    if radius <= tolerance {
                        Err(SkipReason::ZeroRadius)
                    } else if utils_2d::ccw_sweep(start_angle, end_angle) < MIN_SWEEP {
                        Err(SkipReason::ZeroSweep)
                    } else {
                        Ok(ResolvedEntity::Arc { id, center: c, radius, start_angle, end_angle })
                    }
                }
                Err(reason) => Err(reason),
            },
            SketchGeometry::Circle { center, radius } => match point(*center) {
                Ok(c) => {
                    ensure_finite(id, &[c[0], c[1], *radius])?;
                    if *radius <= tolerance {
                        Err(SkipReason::ZeroRadius)
                    } else {
                        Ok(ResolvedEntity::Circle { id, center: c, radius: *radius })
                    }
                }
                Err(reason) => Err(reason),
            },
        };

        match outcome {
            Ok(r) => resolved.entities.push(r),
            Err(reason) => resolved.skipped.push((id, reason)),
        }
    }

    Ok(resolved)
}

/// A vertex of the adjacency graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub position: [f64; 2],
    /// Point entity backing this node. Arc-derived nodes start without one.
    pub origin_id: Option<EntityId>,
    pub incident_edges: Vec<EdgeIndex>,
}

/// Shape of the curve carried by a graph edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EdgeCurve {
    Line,
    Arc { center: [f64; 2], radius: f64, start_angle: f64, end_angle: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub entity_id: EntityId,
    pub start_node: NodeIndex,
    pub end_node: NodeIndex,
    pub start_pos: [f64; 2],
    pub end_pos: [f64; 2],
    pub curve: EdgeCurve,
}

impl GraphEdge {
    pub fn is_arc(&self) -> bool {
        matches!(self.curve, EdgeCurve::Arc { .. })
    }

    /// Geometry used to tessellate this edge inside a wire.
    pub fn wire_curve(&self) -> WireCurve {
        match self.curve {
            EdgeCurve::Line => WireCurve::Line { start: self.start_pos, end: self.end_pos },
            EdgeCurve::Arc { center, radius, start_angle, end_angle } => {
                WireCurve::Arc { center, radius, start_angle, end_angle }
            }
        }
    }

    /// The node at the other end of this edge, seen from `node`.
    pub fn other_end(&self, node: NodeIndex) -> NodeIndex {
        if self.start_node == node {
            self.end_node
        } else {
            self.start_node
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdjacencyGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl AdjacencyGraph {
    /// Build the graph from resolved entities. Points and circles contribute no edges.
    pub fn from_resolved(entities: &[ResolvedEntity], tolerance: f64) -> Self {
        let mut graph = Self::default();

        for entity in entities {
            match *entity {
                ResolvedEntity::Line { id, start_id, end_id, start, end } => {
                    let s = graph.find_or_create_node(start, Some(start_id), tolerance);
                    let e = graph.find_or_create_node(end, Some(end_id), tolerance);
                    graph.push_edge(id, s, e, EdgeCurve::Line);
                }
                ResolvedEntity::Arc { id, center, radius, start_angle, end_angle } => {
                    let start = utils_2d::arc_point(center, radius, start_angle);
                    let end = utils_2d::arc_point(center, radius, end_angle);
                    let s = graph.find_or_create_node(start, None, tolerance);
                    let e = graph.find_or_create_node(end, None, tolerance);
                    graph.push_edge(id, s, e, EdgeCurve::Arc { center, radius, start_angle, end_angle });
                }
                ResolvedEntity::Point { .. } | ResolvedEntity::Circle { .. } => {}
            }
        }

        graph
    }

    /// Merge `pos` into the first node within `tolerance`, or append a new node.
    pub fn find_or_create_node(&mut self, pos: [f64; 2], origin_id: Option<EntityId>, tolerance: f64) -> NodeIndex {
        if let Some(index) = self
            .nodes
            .iter()
            .position(|n| utils_2d::points_coincide(n.position, pos, tolerance))
        {
            let node = &mut self.nodes[index];
            if node.origin_id.is_none() {
                node.origin_id = origin_id;
            }
            return index;
        }

        self.nodes.push(GraphNode { position: pos, origin_id, incident_edges: Vec::new() });
        self.nodes.len() - 1
    }

    fn push_edge(&mut self, entity_id: EntityId, start_node: NodeIndex, end_node: NodeIndex, curve: EdgeCurve) {
        let index = self.edges.len();
        self.edges.push(GraphEdge {
            entity_id,
            start_node,
            end_node,
            start_pos: self.nodes[start_node].position,
            end_pos: self.nodes[end_node].position,
            curve,
        });
        self.nodes[start_node].incident_edges.push(index);
        if end_node != start_node {
            self.nodes[end_node].incident_edges.push(index);
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn degree(&self, node: NodeIndex) -> usize {
        self.nodes[node].incident_edges.len()
    }

    pub fn edge_index_of(&self, entity_id: EntityId) -> Option<EdgeIndex> {
        self.edges.iter().position(|e| e.entity_id == entity_id)
    }

    /// Wire endpoint identity of a node: its point entity when it has one.
    pub fn node_anchor(&self, node: NodeIndex) -> WireAnchor {
        self.nodes[node]
            .origin_id
            .map(WireAnchor::Entity)
            .unwrap_or(WireAnchor::Node(node))
    }
}

/// Resolve `sketch` and build its adjacency graph in one step.
pub fn build_graph(
    sketch: &Sketch,
    filter: &HashSet<EntityId>,
    tolerance: f64,
) -> Result<AdjacencyGraph, DetectionError> {
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(DetectionError::InvalidTolerance(tolerance));
    }
    let resolved = resolve_entities(sketch, filter, tolerance)?;
    Ok(AdjacencyGraph::from_resolved(&resolved.entities, tolerance))
}
