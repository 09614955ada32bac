//! Voronoi painting - evolve Voronoi-seeded images toward a target raster.
//!
//! Each genome is an ordered list of seed points, each carrying a color.
//! A genome renders as the Voronoi tessellation of its seeds, every bounded
//! cell filled with its seed's color over a fixed background. A generational
//! genetic algorithm with rank-weighted selection, uniform crossover and
//! annealed mutation drives the population toward the target image.
//!
//! # Architecture
//!
//! - `schema`: Run configuration, structural schedule and text encodings
//! - `compute`: Genes, genomes, Voronoi rasterization, fitness and the GA
//! - `persistence`: Checkpoints, snapshots and the progress log
//!
//! # Example
//!
//! ```rust,no_run
//! use voronoi_evolve::{
//!     compute::{Canvas, Genome, Rgb},
//!     compute::evolution::EvolutionEngine,
//!     persistence::MemoryCheckpointStore,
//!     schema::EvolutionConfig,
//! };
//!
//! let canvas = Canvas::new(64, 64);
//! let mut config = EvolutionConfig::default();
//! config.population.max_generations = 100;
//!
//! // Any `Fn(&Genome) -> f64` can score genomes.
//! let warmth = |g: &Genome| g.genes.iter().map(|x| x.color.r as f64).sum::<f64>();
//! let store = MemoryCheckpointStore::new(canvas, Rgb::BLACK);
//!
//! let mut engine = EvolutionEngine::new(config, canvas, warmth, store).unwrap();
//! let summary = engine.run().unwrap();
//! println!("Finished generation {}", summary.last_generation);
//! ```

pub mod compute;
pub mod persistence;
pub mod schema;

// Re-export commonly used types
pub use compute::evolution::{EvolutionEngine, EvolutionError, Population};
pub use compute::{Canvas, Gene, Genome, ImageSimilarity, Rgb};
pub use persistence::{FileCheckpointStore, MemoryCheckpointStore};
pub use schema::EvolutionConfig;
