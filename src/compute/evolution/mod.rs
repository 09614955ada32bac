//! Genetic algorithm over Voronoi genomes.
//!
//! # Overview
//!
//! Each generation:
//!
//! 1. Every genome is scored by a [`FitnessEvaluator`](crate::compute::FitnessEvaluator), in parallel.
//! 2. The population is ranked ascending by fitness (stable for ties).
//! 3. Parents are drawn with replacement, the genome at rank `i` with weight `i`.
//! 4. Each parent pair yields two children by uniform crossover, then both
//!    children are mutated at the generation's annealed rate.
//! 5. Children replace the whole population.
//!
//! Scheduled structural edits run after replacement, preceded by a snapshot.
//! Every `checkpoint_interval` generations the population is saved and a
//! progress record appended.
//!
//! # Example
//!
//! ```rust,no_run
//! use voronoi_evolve::compute::evolution::EvolutionEngine;
//! use voronoi_evolve::compute::ImageSimilarity;
//! use voronoi_evolve::persistence::FileCheckpointStore;
//! use voronoi_evolve::schema::EvolutionConfig;
//!
//! let config = EvolutionConfig::default();
//! let target = image::open(&config.target_image).unwrap().to_rgba8();
//! let evaluator = ImageSimilarity::new(target);
//! let canvas = evaluator.canvas();
//! let store = FileCheckpointStore::new(&config.storage, canvas, config.background.into());
//!
//! let mut engine = EvolutionEngine::new(config, canvas, evaluator, store).unwrap();
//! let summary = engine.run_with_callback(|report| {
//!     println!("Generation {}: best fitness = {:.3}",
//!         report.generation, report.best_fitness);
//! }).unwrap();
//! println!("Stopped at generation {}", summary.last_generation);
//! ```

mod operators;
mod population;
mod search;

pub use operators::{crossover, reproduce_pair};
pub use population::{Population, RankedPopulation};
pub use search::{
    EnginePhase, EvolutionEngine, EvolutionError, GenerationReport, RunSummary, StopReason,
};
