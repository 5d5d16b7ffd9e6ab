use super::detector::{DetectionDiagnostic, LoopDetectionResult, LoopDetector, LoopDetectorConfig};
use super::graph::SkipReason;
use super::profile::WireAnchor;
use super::types::Sketch;
use super::validate::LoopDefect;
use crate::geometry::{utils_2d, ApproxEq};
use crate::topo::EntityId;
use std::collections::HashSet;
use std::f64::consts::PI;

fn rect(sketch: &mut Sketch, x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<EntityId> {
    sketch.add_polygon(&[[x0, y0], [x1, y0], [x1, y1], [x0, y1]])
}

fn detect(sketch: &Sketch) -> LoopDetectionResult {
    LoopDetector::default().detect(sketch)
}

/// Outer boundaries are CCW, holes CW, and every hole sits inside its outer loop.
fn assert_face_invariants(result: &LoopDetectionResult) {
    for face in &result.faces {
        assert!(face.outer_loop.is_ccw(), "outer loop must be CCW");
        for hole in &face.inner_loops {
            assert!(!hole.is_ccw(), "hole must be CW");
            for &p in &hole.polygon {
                assert!(utils_2d::point_in_or_on_polygon(p, &face.outer_loop.polygon, 1e-9));
            }
        }
    }
}

#[test]
fn test_unit_square_forms_one_face() {
    let mut sketch = Sketch::default();
    let lines = rect(&mut sketch, 0.0, 0.0, 10.0, 10.0);

    let result = detect(&sketch);
    assert!(result.success);
    assert_eq!(result.faces.len(), 1);
    assert_eq!(result.total_loops_found, 1);
    assert_eq!(result.faces_with_holes, 0);

    let outer = &result.faces[0].outer_loop;
    assert!(outer.signed_area.approx_eq(&100.0));
    assert!(outer.is_ccw());
    assert_eq!(outer.polygon.len(), 4);
    assert!(outer.centroid.approx_eq(&[5.0, 5.0]));

    let used: HashSet<EntityId> = outer.wire.edges.iter().copied().collect();
    assert_eq!(used, lines.into_iter().collect());
    assert!(result.open_wires.is_empty());
    assert!(result.unused_edges.is_empty());
    assert!(result.isolated_points.is_empty());
}

#[test]
fn test_clockwise_drawing_is_reoriented() {
    let mut sketch = Sketch::default();
    sketch.add_polygon(&[[0.0, 0.0], [0.0, 10.0], [10.0, 10.0], [10.0, 0.0]]);

    let result = detect(&sketch);
    assert_eq!(result.faces.len(), 1);
    assert!((result.faces[0].outer_loop.signed_area - 100.0).abs() < 1e-9);
}

#[test]
fn test_concentric_squares_form_face_with_hole() {
    let mut sketch = Sketch::default();
    rect(&mut sketch, 0.0, 0.0, 10.0, 10.0);
    let inner = rect(&mut sketch, 3.0, 3.0, 7.0, 7.0);

    let result = detect(&sketch);
    assert_eq!(result.faces.len(), 1);
    assert_eq!(result.faces_with_holes, 1);
    assert_eq!(result.total_loops_found, 2);

    let face = &result.faces[0];
    assert_eq!(face.inner_loops.len(), 1);
    let hole = &face.inner_loops[0];
    assert!(hole.signed_area < 0.0);
    assert!((hole.area() - 16.0).abs() < 1e-9);
    assert!((face.net_area() - 84.0).abs() < 1e-9);

    let hole_edges: HashSet<EntityId> = hole.wire.edges.iter().copied().collect();
    assert_eq!(hole_edges, inner.into_iter().collect());
    assert_face_invariants(&result);
}

#[test]
fn test_island_inside_hole_is_its_own_face() {
    let mut sketch = Sketch::default();
    rect(&mut sketch, 0.0, 0.0, 20.0, 20.0);
    rect(&mut sketch, 5.0, 5.0, 15.0, 15.0);
    rect(&mut sketch, 8.0, 8.0, 12.0, 12.0);

    let result = detect(&sketch);
    assert_eq!(result.faces.len(), 2);
    assert_eq!(result.faces_with_holes, 1);

    let island = result
        .faces
        .iter()
        .find(|f| f.inner_loops.is_empty())
        .expect("island face");
    assert!((island.outer_loop.area() - 16.0).abs() < 1e-9);
    assert_face_invariants(&result);
}

#[test]
fn test_standalone_circle_is_one_face() {
    let mut sketch = Sketch::default();
    let center = sketch.add_point([1.0, 2.0]);
    let circle = sketch.add_circle(center, 3.0);

    let result = detect(&sketch);
    assert_eq!(result.faces.len(), 1);

    let outer = &result.faces[0].outer_loop;
    assert_eq!(outer.wire.edges, vec![circle]);
    assert_eq!(outer.polygon.len(), 32);
    assert_eq!(outer.wire.start_point, WireAnchor::Entity(circle));
    assert!(outer.is_ccw());
    assert!(result.unused_edges.is_empty());
    // The center is referenced by the circle.
    assert!(result.isolated_points.is_empty());
}

#[test]
fn test_circle_inside_square_is_hole() {
    let mut sketch = Sketch::default();
    rect(&mut sketch, 0.0, 0.0, 10.0, 10.0);
    let center = sketch.add_point([5.0, 5.0]);
    let circle = sketch.add_circle(center, 2.0);

    let result = detect(&sketch);
    assert_eq!(result.faces.len(), 1);
    assert_eq!(result.faces[0].inner_loops.len(), 1);
    assert_eq!(result.faces[0].inner_loops[0].wire.edges, vec![circle]);
    assert_face_invariants(&result);
}

#[test]
fn test_single_line_is_open_wire() {
    let mut sketch = Sketch::default();
    let a = sketch.add_point([0.0, 0.0]);
    let b = sketch.add_point([5.0, 0.0]);
    let line = sketch.add_line(a, b);

    let result = detect(&sketch);
    assert!(result.success);
    assert!(result.faces.is_empty());
    assert_eq!(result.open_wires.len(), 1);
    assert_eq!(result.open_wires[0].edges, vec![line]);
    assert!(result.unused_edges.is_empty());
}

#[test]
fn test_dangling_tail_does_not_break_face() {
    let mut sketch = Sketch::default();
    let square = rect(&mut sketch, 0.0, 0.0, 10.0, 10.0);
    let corner = match sketch.entity(square[1]).map(|e| e.geometry.referenced_points()) {
        Some(points) => points[0],
        None => panic!("missing square line"),
    };
    let tip = sketch.add_point([15.0, -5.0]);
    let tail = sketch.add_line(corner, tip);

    let result = detect(&sketch);
    assert_eq!(result.faces.len(), 1);
    assert_eq!(result.open_wires.len(), 1);
    assert_eq!(result.open_wires[0].edges, vec![tail]);
}

#[test]
fn test_unreferenced_point_is_isolated() {
    let mut sketch = Sketch::default();
    let a = sketch.add_point([0.0, 0.0]);
    let b = sketch.add_point([5.0, 0.0]);
    sketch.add_line(a, b);
    let lonely = sketch.add_point([9.0, 9.0]);

    let result = detect(&sketch);
    assert_eq!(result.isolated_points, vec![lonely]);
}

#[test]
fn test_construction_geometry_is_ignored() {
    let mut sketch = Sketch::default();
    let lines = rect(&mut sketch, 0.0, 0.0, 10.0, 10.0);
    sketch.set_construction(lines[2], true);
    let helper = sketch.add_point([3.0, 3.0]);
    sketch.set_construction(helper, true);

    let result = detect(&sketch);
    assert!(result.faces.is_empty());
    assert_eq!(result.open_wires.len(), 1);
    assert_eq!(result.open_wires[0].len(), 3);
    assert!(result.isolated_points.is_empty());
}

#[test]
fn test_semicircle_with_chord_forms_face() {
    let mut sketch = Sketch::default();
    let center = sketch.add_point([0.0, 0.0]);
    let right = sketch.add_point([5.0, 0.0]);
    let left = sketch.add_point([-5.0, 0.0]);
    let arc = sketch.add_arc(center, 5.0, 0.0, PI);
    let chord = sketch.add_line(left, right);

    let result = detect(&sketch);
    assert_eq!(result.faces.len(), 1);

    let outer = &result.faces[0].outer_loop;
    let edges: HashSet<EntityId> = outer.wire.edges.iter().copied().collect();
    assert_eq!(edges, [arc, chord].into_iter().collect());
    assert!(outer.is_ccw());
    // Sampled half disc lies just under the exact area.
    assert!(outer.area() > 35.0 && outer.area() < 25.0 * PI / 2.0);
    assert!(outer.polygon.iter().all(|p| p[1] >= -1e-9));
    assert!(result.isolated_points.is_empty());
}

#[test]
fn test_shared_edge_yields_every_elementary_cycle() {
    let mut sketch = Sketch::default();
    let p: Vec<EntityId> = [[0.0, 0.0], [10.0, 0.0], [20.0, 0.0], [20.0, 10.0], [10.0, 10.0], [0.0, 10.0]]
        .iter()
        .map(|&c| sketch.add_point(c))
        .collect();
    for (a, b) in [(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0), (1, 4)] {
        sketch.add_line(p[a], p[b]);
    }

    let result = detect(&sketch);
    assert_eq!(result.total_loops_found, 3);
    assert_eq!(result.faces.len(), 3);
    let mut areas: Vec<f64> = result.faces.iter().map(|f| f.outer_loop.area()).collect();
    areas.sort_by(f64::total_cmp);
    assert!((areas[0] - 100.0).abs() < 1e-9);
    assert!((areas[1] - 100.0).abs() < 1e-9);
    assert!((areas[2] - 200.0).abs() < 1e-9);
    assert_face_invariants(&result);
}

#[test]
fn test_no_hole_resolution_keeps_loops_separate() {
    let mut sketch = Sketch::default();
    rect(&mut sketch, 0.0, 0.0, 10.0, 10.0);
    rect(&mut sketch, 3.0, 3.0, 7.0, 7.0);

    let config = LoopDetectorConfig {
        resolve_holes: false,
        ..LoopDetectorConfig::default()
    };
    let result = LoopDetector::new(config).detect(&sketch);
    assert_eq!(result.faces.len(), 2);
    assert_eq!(result.faces_with_holes, 0);
    assert!(result.faces.iter().all(|f| f.inner_loops.is_empty() && f.outer_loop.is_ccw()));
}

#[test]
fn test_self_intersecting_loop_is_dropped_or_kept() {
    let mut sketch = Sketch::default();
    sketch.add_polygon(&[[0.0, 0.0], [10.0, 10.0], [10.0, 0.0], [0.0, 4.0]]);

    let result = detect(&sketch);
    assert!(result.faces.is_empty());
    assert_eq!(result.unused_edges.len(), 4);
    assert!(result.diagnostics.iter().any(|d| matches!(
        d,
        DetectionDiagnostic::InvalidLoop { defect: LoopDefect::SelfIntersecting, kept: false, .. }
    )));

    let config = LoopDetectorConfig {
        find_all_loops: true,
        ..LoopDetectorConfig::default()
    };
    let result = LoopDetector::new(config).detect(&sketch);
    assert_eq!(result.faces.len(), 1);
    assert!(!result.faces[0].is_valid());
    assert!(result
        .diagnostics
        .iter()
        .any(|d| matches!(d, DetectionDiagnostic::InvalidLoop { kept: true, .. })));

    let config = LoopDetectorConfig {
        validate: false,
        ..LoopDetectorConfig::default()
    };
    let result = LoopDetector::new(config).detect(&sketch);
    assert_eq!(result.faces.len(), 1);
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_loop_cap_truncates_and_reports() {
    let mut sketch = Sketch::default();
    rect(&mut sketch, 0.0, 0.0, 1.0, 1.0);
    rect(&mut sketch, 5.0, 0.0, 6.0, 1.0);
    rect(&mut sketch, 10.0, 0.0, 11.0, 1.0);

    let config = LoopDetectorConfig {
        max_loops: 2,
        ..LoopDetectorConfig::default()
    };
    let result = LoopDetector::new(config).detect(&sketch);
    assert_eq!(result.total_loops_found, 2);
    assert_eq!(result.faces.len(), 2);
    assert!(result
        .diagnostics
        .contains(&DetectionDiagnostic::LoopCapReached { cap: 2, found: 3 }));
    assert_eq!(result.unused_edges.len(), 4);
}

#[test]
fn test_search_budget_is_reported() {
    let mut sketch = Sketch::default();
    rect(&mut sketch, 0.0, 0.0, 10.0, 10.0);

    let config = LoopDetectorConfig {
        max_search_steps: 1,
        ..LoopDetectorConfig::default()
    };
    let result = LoopDetector::new(config).detect(&sketch);
    assert!(result.success);
    assert!(result
        .diagnostics
        .iter()
        .any(|d| matches!(d, DetectionDiagnostic::SearchBudgetExhausted { .. })));
}

#[test]
fn test_selection_restricts_detection() {
    let mut sketch = Sketch::default();
    let first = rect(&mut sketch, 0.0, 0.0, 10.0, 10.0);
    rect(&mut sketch, 20.0, 0.0, 30.0, 10.0);

    let mut selection: HashSet<EntityId> = first.iter().copied().collect();
    for line in &first {
        if let Some(entity) = sketch.entity(*line) {
            selection.extend(entity.geometry.referenced_points());
        }
    }

    let result = LoopDetector::default().detect_selection(&sketch, &selection);
    assert_eq!(result.faces.len(), 1);
    assert!(result.faces[0].outer_loop.wire.edges.iter().all(|e| selection.contains(e)));
    assert!(result.isolated_points.is_empty());
    assert_eq!(detect(&sketch).faces.len(), 2);
}

#[test]
fn test_degenerate_entities_are_skipped() {
    let mut sketch = Sketch::default();
    rect(&mut sketch, 0.0, 0.0, 10.0, 10.0);
    let a = sketch.add_point([20.0, 20.0]);
    let b = sketch.add_point([20.0, 20.0]);
    let stub = sketch.add_line(a, b);
    let center = sketch.add_point([30.0, 30.0]);
    let dot = sketch.add_circle(center, 0.0);

    let result = detect(&sketch);
    assert!(result.success);
    assert_eq!(result.faces.len(), 1);
    assert!(result
        .diagnostics
        .contains(&DetectionDiagnostic::SkippedEntity { id: stub, reason: SkipReason::ZeroLength }));
    assert!(result
        .diagnostics
        .contains(&DetectionDiagnostic::SkippedEntity { id: dot, reason: SkipReason::ZeroRadius }));
}

#[test]
fn test_non_finite_geometry_fails_detection() {
    let mut sketch = Sketch::default();
    let ids = rect(&mut sketch, 0.0, 0.0, 10.0, 10.0);
    let corner = match sketch.entity(ids[0]).map(|e| e.geometry.referenced_points()) {
        Some(points) => points[0],
        None => panic!("missing square line"),
    };
    sketch.set_point_position(corner, [f64::NAN, 0.0]);

    let result = detect(&sketch);
    assert!(!result.success);
    assert!(!result.error_message.is_empty());
    assert!(result.faces.is_empty());
}

#[test]
fn test_invalid_tolerance_fails_detection() {
    let mut sketch = Sketch::default();
    rect(&mut sketch, 0.0, 0.0, 10.0, 10.0);

    let config = LoopDetectorConfig {
        coincidence_tolerance: -1.0,
        ..LoopDetectorConfig::default()
    };
    let result = LoopDetector::new(config).detect(&sketch);
    assert!(!result.success);
    assert!(result.error_message.contains("tolerance"));
}

#[test]
fn test_detection_is_deterministic() {
    let mut sketch = Sketch::default();
    rect(&mut sketch, 0.0, 0.0, 10.0, 10.0);
    rect(&mut sketch, 2.0, 2.0, 4.0, 4.0);
    rect(&mut sketch, 20.0, 0.0, 25.0, 5.0);
    let center = sketch.add_point([7.0, 7.0]);
    sketch.add_circle(center, 1.0);

    let first = detect(&sketch);
    let second = detect(&sketch);
    assert_eq!(first, second);

    let json = serde_json::to_string(&first).expect("serialize result");
    let restored: LoopDetectionResult = serde_json::from_str(&json).expect("deserialize result");
    assert_eq!(restored.faces.len(), first.faces.len());
    assert_eq!(restored.faces_with_holes, 1);
    assert_face_invariants(&first);
}

#[test]
fn test_config_from_partial_json() {
    let config = LoopDetectorConfig::from_json(r#"{ "max_loops": 5, "resolve_holes": false }"#).expect("config");
    assert_eq!(config.max_loops, 5);
    assert!(!config.resolve_holes);
    assert!(config.validate);
    assert!((config.coincidence_tolerance - 1e-9).abs() < 1e-15);
}
