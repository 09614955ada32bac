//! Reproduction operators.

use rand::prelude::*;

use super::population::RankedPopulation;
use super::search::EvolutionError;
use crate::compute::Genome;

/// Uniform crossover with a shared swap probability.
///
/// One probability `p` is drawn per call; each gene index is then swapped
/// between the two children with probability `p`. Children start as copies
/// of `a` and `b` respectively and never alias parent genes.
pub fn crossover<R: Rng + ?Sized>(
    a: &Genome,
    b: &Genome,
    rng: &mut R,
) -> Result<(Genome, Genome), EvolutionError> {
    if a.len() != b.len() {
        return Err(EvolutionError::GeneCountMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut first = a.clone();
    let mut second = b.clone();
    let p: f64 = rng.r#gen();
    for (x, y) in first.genes.iter_mut().zip(second.genes.iter_mut()) {
        if rng.r#gen::<f64>() < p {
            std::mem::swap(x, y);
        }
    }

    Ok((first, second))
}

/// Select two parents, cross them over and mutate both children.
pub fn reproduce_pair<R: Rng + ?Sized>(
    ranked: &RankedPopulation<'_>,
    mutation_rate: f64,
    rng: &mut R,
) -> Result<[Genome; 2], EvolutionError> {
    let (a, b) = ranked
        .select_parents(rng)
        .ok_or(EvolutionError::SelectionUnavailable(ranked.len()))?;
    let (mut first, mut second) = crossover(a, b, rng)?;
    first.mutate(mutation_rate, rng);
    second.mutate(mutation_rate, rng);
    Ok([first, second])
}
