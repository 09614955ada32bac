//! Generational evolution engine with checkpoint/resume.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use log::{debug, info, warn};
use rand::prelude::*;
use rayon::prelude::*;

use super::operators::reproduce_pair;
use super::population::Population;
use crate::compute::{Canvas, FitnessError, FitnessEvaluator, Genome, Rgb};
use crate::persistence::{CheckpointError, CheckpointStore, ProgressRecord};
use crate::schema::{ConfigError, EvolutionConfig, StructuralAction};

/// Errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum EvolutionError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Fitness evaluation failed: {0}")]
    Fitness(#[from] FitnessError),
    #[error("Checkpoint store failed: {0}")]
    Checkpoint(#[from] CheckpointError),
    #[error("Population size mismatch: expected {expected}, found {found}")]
    PopulationSizeMismatch { expected: usize, found: usize },
    #[error("Crossover parents differ in gene count: {left} vs {right}")]
    GeneCountMismatch { left: usize, right: usize },
    #[error("Parent selection needs at least two ranked genomes, found {0}")]
    SelectionUnavailable(usize),
}

/// Where the engine is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    /// Population not yet loaded or created.
    Idle,
    /// Evaluating and reproducing `generation`.
    Running { generation: u64 },
    /// Persisting the population produced by `generation`.
    Checkpointing { generation: u64 },
    /// `generation` is complete.
    Advancing { generation: u64 },
    Done,
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    MaxGenerations,
    Cancelled,
}

/// Statistics of one completed generation, taken from the ranked
/// population before reproduction.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub generation: u64,
    pub mean_fitness: f64,
    pub best_fitness: f64,
    /// Encoding of the best genome.
    pub best_genome: String,
    /// Genes per genome after any structural edit of this generation.
    pub gene_count: usize,
    /// Whether a checkpoint was written for this generation.
    pub checkpointed: bool,
}

/// Outcome of [`EvolutionEngine::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Generation the run started from (0 for a fresh run).
    pub resumed_from: u64,
    /// Last completed generation.
    pub last_generation: u64,
    pub generations_run: u64,
    pub stop_reason: StopReason,
    /// Report of the last completed generation of this run, if any ran.
    pub last_report: Option<GenerationReport>,
    pub elapsed_seconds: f64,
}

/// Drives the population through generations, persisting progress to a
/// [`CheckpointStore`].
pub struct EvolutionEngine<E, S> {
    config: EvolutionConfig,
    canvas: Canvas,
    background: Rgb,
    evaluator: E,
    store: S,
    rng: StdRng,
    population: Population,
    /// Last completed generation.
    generation: u64,
    last_saved: Option<u64>,
    phase: EnginePhase,
    cancelled: Arc<AtomicBool>,
}

impl<E: FitnessEvaluator, S: CheckpointStore> EvolutionEngine<E, S> {
    /// Create an engine. Fails on an invalid configuration.
    pub fn new(
        config: EvolutionConfig,
        canvas: Canvas,
        evaluator: E,
        store: S,
    ) -> Result<Self, EvolutionError> {
        config.validate()?;
        let seed = config.random_seed.unwrap_or_else(rand::random);
        debug!("Engine RNG seed: {}", seed);

        Ok(Self {
            background: config.background.into(),
            config,
            canvas,
            evaluator,
            store,
            rng: StdRng::seed_from_u64(seed),
            population: Population::default(),
            generation: 0,
            last_saved: None,
            phase: EnginePhase::Idle,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Get cancellation handle. Setting it stops the run after the current
    /// generation.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    /// Last completed generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Load the population from the store's checkpoint, or create a random
    /// one when no checkpoint exists. Resuming continues at the generation
    /// after the checkpointed one.
    pub fn resume_or_initialize(&mut self) -> Result<(), EvolutionError> {
        let expected = self.config.population.size;

        match self.store.load()? {
            Some(checkpoint) => {
                if checkpoint.population.len() != expected {
                    return Err(EvolutionError::PopulationSizeMismatch {
                        expected,
                        found: checkpoint.population.len(),
                    });
                }
                info!(
                    "Resuming from generation {} ({} genomes)",
                    checkpoint.generation,
                    checkpoint.population.len()
                );
                self.generation = checkpoint.generation;
                self.last_saved = Some(checkpoint.generation);
                self.population = checkpoint.population;
            }
            None => {
                info!(
                    "No checkpoint found, creating {} genomes of {} genes",
                    expected, self.config.population.gene_count
                );
                self.population = Population::random(
                    expected,
                    self.config.population.gene_count,
                    self.canvas,
                    self.background,
                    &mut self.rng,
                );
                self.generation = 0;
                self.last_saved = None;
            }
        }

        self.phase = EnginePhase::Advancing {
            generation: self.generation,
        };
        Ok(())
    }

    /// Run the next generation: evaluate, rank, reproduce, replace, then
    /// apply scheduled structural edits and checkpoint when due.
    pub fn step(&mut self) -> Result<GenerationReport, EvolutionError> {
        if self.phase == EnginePhase::Idle {
            self.resume_or_initialize()?;
        }

        let generation = self.generation + 1;
        self.phase = EnginePhase::Running { generation };

        let fitness = self.population.evaluate(&self.evaluator)?;

        let pairs = self.config.population.size / 2;
        let rate = self.config.mutation.rate_for(generation);
        let seeds: Vec<u64> = (0..pairs).map(|_| self.rng.next_u64()).collect();

        let (children, mean_fitness, best_fitness, best_genome) = {
            let ranked = self.population.rank(&fitness);
            let (best, best_fitness) = ranked
                .best()
                .ok_or(EvolutionError::SelectionUnavailable(0))?;

            let children = seeds
                .into_par_iter()
                .map(|seed| reproduce_pair(&ranked, rate, &mut StdRng::seed_from_u64(seed)))
                .collect::<Result<Vec<[Genome; 2]>, EvolutionError>>()?;

            (children, ranked.mean_fitness(), best_fitness, best.encode())
        };

        let next: Population = children.into_iter().flatten().collect();
        if next.len() != self.config.population.size {
            return Err(EvolutionError::PopulationSizeMismatch {
                expected: self.config.population.size,
                found: next.len(),
            });
        }
        self.population = next;

        let due: Vec<StructuralAction> =
            self.config.structural_schedule.due_at(generation).collect();
        if !due.is_empty() {
            self.phase = EnginePhase::Checkpointing { generation };
            self.store.snapshot(generation, &self.population)?;
            for action in due {
                info!("Generation {}: applying {:?}", generation, action);
                self.population.apply(action, &mut self.rng);
            }
        }

        let checkpointed = generation % self.config.checkpoint_interval == 0;
        if checkpointed {
            self.phase = EnginePhase::Checkpointing { generation };
            self.store.save(generation, &self.population)?;
            self.last_saved = Some(generation);
            self.store.append_progress(&ProgressRecord {
                generation,
                mean_fitness,
                best_fitness,
                best_genome: best_genome.clone(),
            })?;
        }

        self.generation = generation;
        self.phase = EnginePhase::Advancing { generation };

        let gene_count = self.population.iter().next().map_or(0, Genome::len);
        debug!(
            "Generation {}: mean {:.4}, best {:.4}",
            generation, mean_fitness, best_fitness
        );

        Ok(GenerationReport {
            generation,
            mean_fitness,
            best_fitness,
            best_genome,
            gene_count,
            checkpointed,
        })
    }

    /// Check if evolution should stop.
    fn should_stop(&self) -> Option<StopReason> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Some(StopReason::Cancelled);
        }
        if self.generation >= self.config.population.max_generations {
            return Some(StopReason::MaxGenerations);
        }
        None
    }

    /// Run evolution with progress callback.
    pub fn run_with_callback<F>(&mut self, mut callback: F) -> Result<RunSummary, EvolutionError>
    where
        F: FnMut(&GenerationReport),
    {
        let start_time = Instant::now();

        if self.phase == EnginePhase::Idle {
            self.resume_or_initialize()?;
        }
        let resumed_from = self.generation;
        let mut last_report = None;

        let stop_reason = loop {
            if let Some(reason) = self.should_stop() {
                break reason;
            }
            let report = self.step()?;
            callback(&report);
            last_report = Some(report);
        };

        if stop_reason == StopReason::Cancelled && self.last_saved != Some(self.generation) {
            warn!(
                "Cancelled, saving checkpoint for generation {}",
                self.generation
            );
            self.phase = EnginePhase::Checkpointing {
                generation: self.generation,
            };
            self.store.save(self.generation, &self.population)?;
            self.last_saved = Some(self.generation);
        }

        self.phase = EnginePhase::Done;
        let elapsed_seconds = start_time.elapsed().as_secs_f64();
        info!(
            "Stopped at generation {} ({:?}) after {:.1}s",
            self.generation, stop_reason, elapsed_seconds
        );

        Ok(RunSummary {
            resumed_from,
            last_generation: self.generation,
            generations_run: self.generation - resumed_from,
            stop_reason,
            last_report,
            elapsed_seconds,
        })
    }

    /// Run evolution without callback.
    pub fn run(&mut self) -> Result<RunSummary, EvolutionError> {
        self.run_with_callback(|_| {})
    }
}
