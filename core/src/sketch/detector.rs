//! Loop detection for 2D sketch geometry.
//!
//! Computes closed faces from sketch entities by:
//! 1. Resolving entities and welding coincident endpoints into a graph
//! 2. Enumerating every elementary cycle of that graph
//! 3. Tessellating and validating each cycle (plus standalone circles)
//! 4. Nesting loops into faces with holes
//! 5. Reporting open wires, unused edges and isolated points

use crate::sketch::cycles::enumerate_cycles;
use crate::sketch::graph::{resolve_entities, AdjacencyGraph, SkipReason};
use crate::sketch::hierarchy::resolve_faces;
use crate::sketch::profile::{Face, Loop, Wire, WireCurve};
use crate::sketch::regions::region_key;
use crate::sketch::residual;
use crate::sketch::types::Sketch;
use crate::sketch::validate::{validate_loop, LoopDefect};
use crate::topo::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that abort a detection run.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DetectionError {
    #[error("Invalid coincidence tolerance: {0}")]
    InvalidTolerance(f64),

    #[error("Non-finite geometry on entity {0}")]
    NonFiniteGeometry(EntityId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopDetectorConfig {
    /// Distance under which endpoints weld into one node and ring points dedupe.
    pub coincidence_tolerance: f64,
    /// Maximum number of loops kept after validation (0 = unbounded).
    pub max_loops: usize,
    /// Keep loops that fail validation, for diagnostic overlays.
    pub find_all_loops: bool,
    /// Nest loops into outer boundaries with holes. When false every loop is its own face.
    pub resolve_holes: bool,
    /// Run loop validation.
    pub validate: bool,
    /// Maximum DFS edge expansions during cycle enumeration (0 = unbounded).
    pub max_search_steps: usize,
}

impl Default for LoopDetectorConfig {
    fn default() -> Self {
        Self {
            coincidence_tolerance: 1e-9,
            max_loops: 0,
            find_all_loops: false,
            resolve_holes: true,
            validate: true,
            max_search_steps: 0,
        }
    }
}

impl LoopDetectorConfig {
    /// Parse a (possibly partial) JSON config; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Non-fatal events recorded during detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DetectionDiagnostic {
    SkippedEntity { id: EntityId, reason: SkipReason },
    InvalidLoop { region_key: String, defect: LoopDefect, kept: bool },
    /// A hole with no enclosing outer boundary; dropped from the faces.
    OrphanHole { region_key: String },
    LoopCapReached { cap: usize, found: usize },
    SearchBudgetExhausted { steps: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoopDetectionResult {
    pub success: bool,
    pub error_message: String,
    pub faces: Vec<Face>,
    pub open_wires: Vec<Wire>,
    pub unused_edges: Vec<EntityId>,
    pub isolated_points: Vec<EntityId>,
    pub total_loops_found: usize,
    pub faces_with_holes: usize,
    #[serde(default)]
    pub diagnostics: Vec<DetectionDiagnostic>,
}

impl LoopDetectionResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: message.into(),
            ..Self::default()
        }
    }

    /// Every loop of every face, outer boundaries and holes alike.
    pub fn loops(&self) -> impl Iterator<Item = &Loop> {
        self.faces.iter().flat_map(Face::loops)
    }
}

/// Runs loop detection over sketches with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct LoopDetector {
    config: LoopDetectorConfig,
}

impl LoopDetector {
    pub fn new(config: LoopDetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoopDetectorConfig {
        &self.config
    }

    /// Detect faces over every non-construction entity of `sketch`.
    pub fn detect(&self, sketch: &Sketch) -> LoopDetectionResult {
        self.detect_selection(sketch, &HashSet::new())
    }

    /// Detect faces using only the entities in `selection` (empty = all).
    ///
    /// Lines and curves resolve their positions through point entities, so a
    /// selection needs to carry those points as well.
    pub fn detect_selection(&self, sketch: &Sketch, selection: &HashSet<EntityId>) -> LoopDetectionResult {
        let config = &self.config;
        let tolerance = config.coincidence_tolerance;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return LoopDetectionResult::failure(DetectionError::InvalidTolerance(tolerance).to_string());
        }

        let resolved = match resolve_entities(sketch, selection, tolerance) {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!("Loop detection failed: {}", e);
                return LoopDetectionResult::failure(e.to_string());
            }
        };

        let mut diagnostics: Vec<DetectionDiagnostic> = resolved
            .skipped
            .iter()
            .map(|&(id, reason)| DetectionDiagnostic::SkippedEntity { id, reason })
            .collect();

        let graph = AdjacencyGraph::from_resolved(&resolved.entities, tolerance);
        let enumeration = enumerate_cycles(&graph, config.max_search_steps);
        if enumeration.budget_exhausted {
            diagnostics.push(DetectionDiagnostic::SearchBudgetExhausted { steps: enumeration.steps });
        }
        let cycle_count = enumeration.wires.len();

        let curves: HashMap<EntityId, WireCurve> =
            graph.edges.iter().map(|e| (e.entity_id, e.wire_curve())).collect();
        let cycle_loops = enumeration
            .wires
            .into_iter()
            .map(|wire| Loop::from_wire(wire, |id| curves.get(&id).copied(), tolerance));
        let circle_loops = residual::standalone_circle_loops(&resolved.entities, tolerance);

        let mut loops = Vec::new();
        for lp in cycle_loops.chain(circle_loops) {
            if config.validate {
                if let Err(defect) = validate_loop(&lp) {
                    diagnostics.push(DetectionDiagnostic::InvalidLoop {
                        region_key: region_key(&lp),
                        defect,
                        kept: config.find_all_loops,
                    });
                    if !config.find_all_loops {
                        continue;
                    }
                }
            }
            loops.push(lp);
        }

        if config.max_loops > 0 && loops.len() > config.max_loops {
            warn!("Loop cap {} reached, discarding {} loops", config.max_loops, loops.len() - config.max_loops);
            diagnostics.push(DetectionDiagnostic::LoopCapReached { cap: config.max_loops, found: loops.len() });
            loops.truncate(config.max_loops);
        }
        let total_loops_found = loops.len();

        let faces = if config.resolve_holes {
            let hierarchy = resolve_faces(loops, tolerance);
            diagnostics.extend(
                hierarchy
                    .orphans
                    .iter()
                    .map(|lp| DetectionDiagnostic::OrphanHole { region_key: region_key(lp) }),
            );
            hierarchy.faces
        } else {
            loops
                .into_iter()
                .map(|mut lp| {
                    lp.orient(true);
                    Face::new(lp)
                })
                .collect()
        };

        let mut used = residual::edges_used_by_faces(&graph, &faces);
        let open_wires = residual::trace_open_wires(&graph, &mut used);
        let unused_edges = residual::unused_edges(&graph, &used);
        let isolated_points = residual::isolated_points(sketch, selection);
        let faces_with_holes = faces.iter().filter(|f| !f.inner_loops.is_empty()).count();

        debug!(
            "Loop detection: {} nodes, {} edges, {} cycles, {} loops, {} faces ({} with holes), {} open wires",
            graph.node_count(),
            graph.edge_count(),
            cycle_count,
            total_loops_found,
            faces.len(),
            faces_with_holes,
            open_wires.len()
        );

        LoopDetectionResult {
            success: true,
            error_message: String::new(),
            faces,
            open_wires,
            unused_edges,
            isolated_points,
            total_loops_found,
            faces_with_holes,
            diagnostics,
        }
    }
}
