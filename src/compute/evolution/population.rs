//! Population storage, ranking and rank-weighted parent selection.

use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rayon::prelude::*;

use crate::compute::{Canvas, FitnessError, FitnessEvaluator, Genome, Rgb};
use crate::schema::StructuralAction;

/// An ordered collection of genomes sharing one canvas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Population {
    genomes: Vec<Genome>,
}

impl Population {
    pub fn new(genomes: Vec<Genome>) -> Self {
        Self { genomes }
    }

    /// `size` random genomes of `gene_count` genes each.
    pub fn random<R: Rng + ?Sized>(
        size: usize,
        gene_count: usize,
        canvas: Canvas,
        background: Rgb,
        rng: &mut R,
    ) -> Self {
        let genomes = (0..size)
            .map(|_| Genome::random(gene_count, canvas, background, rng))
            .collect();
        Self { genomes }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Genome> {
        self.genomes.iter()
    }

    pub fn into_genomes(self) -> Vec<Genome> {
        self.genomes
    }

    /// Fitness of every genome in population order, evaluated in parallel.
    pub fn evaluate<E: FitnessEvaluator + ?Sized>(
        &self,
        evaluator: &E,
    ) -> Result<Vec<f64>, FitnessError> {
        self.genomes
            .par_iter()
            .map(|genome| evaluator.evaluate(genome))
            .collect()
    }

    /// Order genomes ascending by fitness.
    ///
    /// The sort is stable, so genomes with equal fitness keep their
    /// population order. `fitness` must be parallel to the population.
    pub fn rank<'a>(&'a self, fitness: &[f64]) -> RankedPopulation<'a> {
        debug_assert_eq!(fitness.len(), self.genomes.len());

        let mut members: Vec<(&Genome, f64)> =
            self.genomes.iter().zip(fitness.iter().copied()).collect();
        members.sort_by(|a, b| a.1.total_cmp(&b.1));

        // Rank i is drawn with weight i, so the worst genome is never a parent.
        let selector = WeightedIndex::new(0..members.len()).ok();

        RankedPopulation { members, selector }
    }

    /// Apply a structural edit to every genome.
    pub fn apply<R: Rng + ?Sized>(&mut self, action: StructuralAction, rng: &mut R) {
        for genome in &mut self.genomes {
            genome.apply(action, rng);
        }
    }
}

impl FromIterator<Genome> for Population {
    fn from_iter<I: IntoIterator<Item = Genome>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A population view sorted ascending by fitness.
#[derive(Debug, Clone)]
pub struct RankedPopulation<'a> {
    members: Vec<(&'a Genome, f64)>,
    selector: Option<WeightedIndex<usize>>,
}

impl<'a> RankedPopulation<'a> {
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Genome and fitness at `rank` (0 = worst).
    pub fn get(&self, rank: usize) -> Option<(&'a Genome, f64)> {
        self.members.get(rank).copied()
    }

    /// Highest-fitness genome and its fitness.
    pub fn best(&self) -> Option<(&'a Genome, f64)> {
        self.members.last().copied()
    }

    /// Mean fitness, 0 for an empty population.
    pub fn mean_fitness(&self) -> f64 {
        if self.members.is_empty() {
            return 0.0;
        }
        self.members.iter().map(|(_, f)| f).sum::<f64>() / self.members.len() as f64
    }

    /// Draw two parents with replacement, rank-weighted.
    ///
    /// `None` when fewer than two genomes are ranked.
    pub fn select_parents<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(&'a Genome, &'a Genome)> {
        let selector = self.selector.as_ref()?;
        let first = self.members[selector.sample(rng)].0;
        let second = self.members[selector.sample(rng)].0;
        Some((first, second))
    }
}
