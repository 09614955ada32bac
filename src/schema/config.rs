//! Configuration types for a Voronoi painting evolution run.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{ScheduledAction, StructuralSchedule};

/// Top-level evolution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Path of the target raster the population evolves toward.
    #[serde(default = "default_target_image")]
    pub target_image: PathBuf,
    /// Population and generation settings.
    #[serde(default)]
    pub population: PopulationConfig,
    /// Background color of every genome, fixed at creation.
    #[serde(default)]
    pub background: [u8; 3],
    /// Annealed per-gene mutation rate.
    #[serde(default)]
    pub mutation: MutationSchedule,
    /// Structural edits applied to the whole population at given generations.
    #[serde(default)]
    pub structural_schedule: StructuralSchedule,
    /// Write a checkpoint and a progress record every N generations.
    #[serde(default = "default_checkpoint_interval")]
    pub checkpoint_interval: u64,
    /// Where checkpoints, snapshots and the progress log live.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Seed for the engine RNG. Seeded from entropy when absent.
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Number of worker threads (0 = auto-detect).
    #[serde(default)]
    pub parallel_workers: usize,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            target_image: default_target_image(),
            population: PopulationConfig::default(),
            background: [0, 0, 0],
            mutation: MutationSchedule::default(),
            structural_schedule: StructuralSchedule::default(),
            checkpoint_interval: default_checkpoint_interval(),
            storage: StorageConfig::default(),
            random_seed: None,
            parallel_workers: 0,
        }
    }
}

fn default_target_image() -> PathBuf {
    PathBuf::from("original_image.png")
}
fn default_checkpoint_interval() -> u64 {
    10
}

/// Population size and run length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of genomes. Must be even: reproduction emits children in pairs.
    #[serde(default = "default_population_size")]
    pub size: usize,
    /// Genes per genome at initialization.
    #[serde(default = "default_gene_count")]
    pub gene_count: usize,
    /// Last generation to run (inclusive).
    #[serde(default = "default_max_generations")]
    pub max_generations: u64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: default_population_size(),
            gene_count: default_gene_count(),
            max_generations: default_max_generations(),
        }
    }
}

fn default_population_size() -> usize {
    200
}
fn default_gene_count() -> usize {
    500
}
fn default_max_generations() -> u64 {
    12000
}

/// Per-gene mutation probability, lowered once the run is far enough along.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MutationSchedule {
    /// Probability used before `anneal_at`.
    #[serde(default = "default_mutation_rate")]
    pub rate: f64,
    /// Probability used from `anneal_at` onward.
    #[serde(default = "default_annealed_rate")]
    pub annealed_rate: f64,
    /// First generation that uses `annealed_rate`.
    #[serde(default = "default_anneal_at")]
    pub anneal_at: u64,
}

impl Default for MutationSchedule {
    fn default() -> Self {
        Self {
            rate: default_mutation_rate(),
            annealed_rate: default_annealed_rate(),
            anneal_at: default_anneal_at(),
        }
    }
}

impl MutationSchedule {
    /// Mutation probability in effect for `generation`.
    #[inline]
    pub fn rate_for(&self, generation: u64) -> f64 {
        if generation >= self.anneal_at {
            self.annealed_rate
        } else {
            self.rate
        }
    }
}

fn default_mutation_rate() -> f64 {
    0.005
}
fn default_annealed_rate() -> f64 {
    0.001
}
fn default_anneal_at() -> u64 {
    4500
}

/// File locations used by the file-backed checkpoint store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_checkpoint_path")]
    pub checkpoint_path: PathBuf,
    #[serde(default = "default_progress_log")]
    pub progress_log: PathBuf,
    /// Directory for generation-tagged snapshots taken before structural edits.
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            checkpoint_path: default_checkpoint_path(),
            progress_log: default_progress_log(),
            snapshot_dir: default_snapshot_dir(),
        }
    }
}

fn default_checkpoint_path() -> PathBuf {
    PathBuf::from("checkpoint.txt")
}
fn default_progress_log() -> PathBuf {
    PathBuf::from("GAOutput.txt")
}
fn default_snapshot_dir() -> PathBuf {
    PathBuf::from("saved_checkpoints")
}

impl EvolutionConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population.size < 2 {
            return Err(ConfigError::PopulationTooSmall(self.population.size));
        }
        if self.population.size % 2 != 0 {
            return Err(ConfigError::OddPopulation(self.population.size));
        }
        if self.checkpoint_interval == 0 {
            return Err(ConfigError::InvalidCheckpointInterval);
        }
        for (name, rate) in [
            ("rate", self.mutation.rate),
            ("annealed_rate", self.mutation.annealed_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ConfigError::InvalidMutationRate { name, rate });
            }
        }
        if let Some(ScheduledAction { generation, .. }) = self
            .structural_schedule
            .entries()
            .iter()
            .find(|e| e.generation == 0)
        {
            return Err(ConfigError::InvalidScheduleGeneration(*generation));
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Population size must be at least 2, got {0}")]
    PopulationTooSmall(usize),
    #[error("Population size must be even, got {0}")]
    OddPopulation(usize),
    #[error("Checkpoint interval must be positive")]
    InvalidCheckpointInterval,
    #[error("Mutation {name} must lie in [0, 1], got {rate}")]
    InvalidMutationRate { name: &'static str, rate: f64 },
    #[error("Structural actions cannot be scheduled at generation {0}")]
    InvalidScheduleGeneration(u64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::StructuralAction;

    #[test]
    fn test_default_config_valid() {
        let config = EvolutionConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.structural_schedule.is_empty());
    }

    #[test]
    fn test_odd_population_rejected() {
        let config = EvolutionConfig {
            population: PopulationConfig {
                size: 5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OddPopulation(5))
        ));
    }

    #[test]
    fn test_schedule_at_zero_rejected() {
        let config = EvolutionConfig {
            structural_schedule: StructuralSchedule::new(vec![ScheduledAction {
                generation: 0,
                action: StructuralAction::DuplicateGenes,
            }]),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_annealed_rate() {
        let schedule = MutationSchedule::default();
        assert_eq!(schedule.rate_for(1), 0.005);
        assert_eq!(schedule.rate_for(4499), 0.005);
        assert_eq!(schedule.rate_for(4500), 0.001);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EvolutionConfig =
            serde_json::from_str(r#"{"population": {"size": 4, "gene_count": 3}}"#).unwrap();
        assert_eq!(config.population.size, 4);
        assert_eq!(config.population.max_generations, 12000);
        assert_eq!(config.checkpoint_interval, 10);
        assert_eq!(config.background, [0, 0, 0]);
    }

    #[test]
    fn test_serialization() {
        let config = EvolutionConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: EvolutionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.population.size, config.population.size);
        assert_eq!(parsed.mutation, config.mutation);
    }
}
