//! Geometry left over once loops are known: standalone circles, open
//! polylines, unused edges and isolated points.

use crate::sketch::graph::{AdjacencyGraph, ResolvedEntity};
use crate::sketch::profile::{Face, Loop, Wire, WireAnchor, WireCurve};
use crate::sketch::types::{Sketch, SketchGeometry};
use crate::topo::EntityId;
use std::collections::HashSet;

/// Every circle becomes its own closed one-edge loop.
pub fn standalone_circle_loops(entities: &[ResolvedEntity], tolerance: f64) -> Vec<Loop> {
    entities
        .iter()
        .filter_map(|entity| match *entity {
            ResolvedEntity::Circle { id, center, radius } => {
                let wire = Wire {
                    edges: vec![id],
                    forward: vec![true],
                    start_point: WireAnchor::Entity(id),
                    end_point: WireAnchor::Entity(id),
                };
                Some(Loop::from_wire(wire, |_| Some(WireCurve::Circle { center, radius }), tolerance))
            }
            _ => None,
        })
        .collect()
}

/// Per-edge usage flags, seeded with every graph edge that appears in `faces`.
pub fn edges_used_by_faces(graph: &AdjacencyGraph, faces: &[Face]) -> Vec<bool> {
    let mut used = vec![false; graph.edge_count()];
    for lp in faces.iter().flat_map(Face::loops) {
        for &id in &lp.wire.edges {
            if let Some(index) = graph.edge_index_of(id) {
                used[index] = true;
            }
        }
    }
    used
}

/// Trace open polylines from every dangling (degree-1) node through unused
/// edges. Traced edges are marked in `used`.
pub fn trace_open_wires(graph: &AdjacencyGraph, used: &mut [bool]) -> Vec<Wire> {
    let mut wires = Vec::new();

    for start in 0..graph.node_count() {
        if graph.degree(start) != 1 || used[graph.nodes[start].incident_edges[0]] {
            continue;
        }

        let mut edges = Vec::new();
        let mut forward = Vec::new();
        let mut current = start;

        while let Some(&edge_index) = graph.nodes[current].incident_edges.iter().find(|&&e| !used[e]) {
            used[edge_index] = true;
            let edge = &graph.edges[edge_index];
            edges.push(edge.entity_id);
            forward.push(edge.start_node == current);
            current = edge.other_end(current);
        }

        wires.push(Wire {
            edges,
            forward,
            start_point: graph.node_anchor(start),
            end_point: graph.node_anchor(current),
        });
    }

    wires
}

/// Entity ids of graph edges still unused.
pub fn unused_edges(graph: &AdjacencyGraph, used: &[bool]) -> Vec<EntityId> {
    graph
        .edges
        .iter()
        .zip(used)
        .filter(|(_, u)| !**u)
        .map(|(e, _)| e.entity_id)
        .collect()
}

/// Point entities no non-construction line, arc or circle refers to.
///
/// With a non-empty `filter`, only entities inside it are considered.
pub fn isolated_points(sketch: &Sketch, filter: &HashSet<EntityId>) -> Vec<EntityId> {
    let in_scope = |id: &EntityId| filter.is_empty() || filter.contains(id);

    let referenced: HashSet<EntityId> = sketch
        .entities
        .iter()
        .filter(|e| !e.is_construction && in_scope(&e.id))
        .flat_map(|e| e.geometry.referenced_points())
        .collect();

    sketch
        .entities
        .iter()
        .filter(|e| matches!(e.geometry, SketchGeometry::Point { .. }))
        .filter(|e| !e.is_construction && in_scope(&e.id) && !referenced.contains(&e.id))
        .map(|e| e.id)
        .collect()
}
