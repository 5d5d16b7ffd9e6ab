pub mod geometry;
pub mod kernel;
pub mod sketch;
pub mod topo;

pub fn version() -> &'static str {
    "0.1.0"
}
