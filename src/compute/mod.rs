//! Compute module - Genomes, Voronoi rendering, fitness and evolution.

mod fitness;
mod gene;
mod genome;
mod render;
mod voronoi;

pub mod evolution;

pub use fitness::*;
pub use gene::*;
pub use genome::*;
pub use render::*;
pub use voronoi::*;
