use super::detector::{LoopDetector, LoopDetectorConfig};
use super::regions::{
    build_region_definitions, edge_set_key, find_region_definition, region_key, resolve_region_face,
    resolve_region_face_with, GEOMETRY_EPSILON,
};
use super::types::{Sketch, SketchGeometry};
use crate::topo::EntityId;
use std::collections::HashSet;

fn rect(sketch: &mut Sketch, x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<EntityId> {
    sketch.add_polygon(&[[x0, y0], [x1, y0], [x1, y1], [x0, y1]])
}

fn start_point(sketch: &Sketch, line: EntityId) -> EntityId {
    match sketch.entity(line).map(|e| &e.geometry) {
        Some(SketchGeometry::Line { start, .. }) => *start,
        _ => panic!("expected a line"),
    }
}

#[test]
fn test_region_definitions_cover_outer_and_hole() {
    let mut sketch = Sketch::default();
    let outer = rect(&mut sketch, 0.0, 0.0, 10.0, 10.0);
    let inner = rect(&mut sketch, 3.0, 3.0, 7.0, 7.0);

    let result = LoopDetector::default().detect(&sketch);
    let defs = build_region_definitions(&result, GEOMETRY_EPSILON);
    assert_eq!(defs.len(), 2);

    let outer_key = edge_set_key(&outer);
    let inner_key = edge_set_key(&inner);

    let outer_def = defs.iter().find(|d| d.id == outer_key).expect("outer region");
    assert_eq!(outer_def.holes.len(), 1);
    assert_eq!(region_key(&outer_def.holes[0]), inner_key);

    // The hole is also selectable as a region of its own.
    let inner_def = defs.iter().find(|d| d.id == inner_key).expect("inner region");
    assert!(inner_def.holes.is_empty());
}

#[test]
fn test_find_region_definition_by_id() {
    let mut sketch = Sketch::default();
    rect(&mut sketch, 0.0, 0.0, 4.0, 4.0);
    let second = rect(&mut sketch, 10.0, 0.0, 12.0, 2.0);

    let result = LoopDetector::default().detect(&sketch);
    let id = edge_set_key(&second);

    let def = find_region_definition(&result, &id, GEOMETRY_EPSILON).expect("region");
    assert!((def.outer_loop.area() - 4.0).abs() < 1e-9);
    assert!(find_region_definition(&result, "no-such-region", GEOMETRY_EPSILON).is_none());
}

#[test]
fn test_resolved_face_is_oriented() {
    let mut sketch = Sketch::default();
    let outer = rect(&mut sketch, 0.0, 0.0, 10.0, 10.0);
    rect(&mut sketch, 3.0, 3.0, 7.0, 7.0);

    let id = edge_set_key(&outer);
    let face = resolve_region_face(&sketch, &id).expect("face");
    assert!(face.outer_loop.is_ccw());
    assert_eq!(face.inner_loops.len(), 1);
    assert!(!face.inner_loops[0].is_ccw());
    assert!((face.net_area() - 84.0).abs() < 1e-9);
}

#[test]
fn test_region_survives_point_drag() {
    let mut sketch = Sketch::default();
    let lines = rect(&mut sketch, 0.0, 0.0, 10.0, 10.0);

    let before = LoopDetector::default().detect(&sketch);
    let id = region_key(&before.faces[0].outer_loop);
    let before_polygon = before.faces[0].outer_loop.polygon.clone();

    let corner = start_point(&sketch, lines[2]);
    assert!(sketch.set_point_position(corner, [12.0, 14.0]));

    let face = resolve_region_face(&sketch, &id).expect("region after drag");
    assert_eq!(region_key(&face.outer_loop), id);
    assert_ne!(face.outer_loop.polygon, before_polygon);

    let edges: HashSet<EntityId> = face.outer_loop.wire.edges.iter().copied().collect();
    assert_eq!(edges, lines.into_iter().collect());
}

#[test]
fn test_region_disappears_with_its_entity() {
    let mut sketch = Sketch::default();
    let lines = rect(&mut sketch, 0.0, 0.0, 10.0, 10.0);
    let id = edge_set_key(&lines);

    assert!(resolve_region_face(&sketch, &id).is_some());
    sketch.remove_entity(lines[0]);
    assert!(resolve_region_face(&sketch, &id).is_none());
}

#[test]
fn test_region_key_changes_with_topology() {
    let mut sketch = Sketch::default();
    let lines = rect(&mut sketch, 0.0, 0.0, 10.0, 10.0);
    let id = edge_set_key(&lines);

    // Split the bottom edge in two: same shape, different bounding entities.
    let bottom = lines[0];
    let (a, b) = match sketch.entity(bottom).map(|e| e.geometry.clone()) {
        Some(SketchGeometry::Line { start, end }) => (start, end),
        _ => panic!("expected a line"),
    };
    sketch.remove_entity(bottom);
    let mid = sketch.add_point([5.0, 0.0]);
    sketch.add_line(a, mid);
    sketch.add_line(mid, b);

    assert!(resolve_region_face(&sketch, &id).is_none());
    let result = LoopDetector::default().detect(&sketch);
    assert_eq!(result.faces.len(), 1);
    assert_ne!(region_key(&result.faces[0].outer_loop), id);
}

#[test]
fn test_failed_detection_resolves_nothing() {
    let mut sketch = Sketch::default();
    let lines = rect(&mut sketch, 0.0, 0.0, 10.0, 10.0);
    let id = edge_set_key(&lines);

    let config = LoopDetectorConfig {
        coincidence_tolerance: f64::NAN,
        ..LoopDetectorConfig::default()
    };
    assert!(resolve_region_face_with(&sketch, &id, &config).is_none());
}

#[test]
fn test_circle_region_is_keyed_by_circle_id() {
    let mut sketch = Sketch::default();
    let center = sketch.add_point([0.0, 0.0]);
    let circle = sketch.add_circle(center, 2.0);

    let face = resolve_region_face(&sketch, &circle.to_string()).expect("circle region");
    assert_eq!(face.outer_loop.wire.edges, vec![circle]);
    assert_eq!(face.outer_loop.polygon.len(), 32);
}
