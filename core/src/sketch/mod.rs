pub mod types;
pub mod graph;
pub mod cycles;
pub mod profile;
pub mod validate;
pub mod hierarchy;
pub mod residual;
pub mod detector;
pub mod regions;

pub use detector::{
    DetectionDiagnostic, DetectionError, LoopDetectionResult, LoopDetector, LoopDetectorConfig,
};
pub use profile::{Face, Loop, Wire, WireAnchor};
pub use regions::{
    build_region_definitions, find_region_definition, region_key, resolve_region_face,
    resolve_region_face_with, RegionDefinition,
};
pub use types::{Sketch, SketchEntity, SketchGeometry, SketchPlane};

#[cfg(test)]
mod tests_detection;

#[cfg(test)]
mod tests_regions;
