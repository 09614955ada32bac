//! Genome: an ordered list of Voronoi seed genes over a fixed canvas.

use std::fmt;

use image::RgbaImage;
use rand::prelude::*;
use rand::seq::index;

use super::gene::{Canvas, Gene, Rgb};
use super::render::render_genome;
use crate::schema::{GENE_TERMINATOR, ParseError, StructuralAction};

/// An individual of the population.
///
/// Canvas and background are fixed at creation; only the genes evolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genome {
    pub genes: Vec<Gene>,
    pub canvas: Canvas,
    pub background: Rgb,
}

impl Genome {
    pub fn new(genes: Vec<Gene>, canvas: Canvas, background: Rgb) -> Self {
        Self {
            genes,
            canvas,
            background,
        }
    }

    /// `gene_count` independent random genes.
    pub fn random<R: Rng + ?Sized>(
        gene_count: usize,
        canvas: Canvas,
        background: Rgb,
        rng: &mut R,
    ) -> Self {
        let genes = (0..gene_count).map(|_| Gene::random(canvas, rng)).collect();
        Self::new(genes, canvas, background)
    }

    /// Decode a concatenation of gene records. An empty string is a genome
    /// with no genes.
    pub fn decode(encoding: &str, canvas: Canvas, background: Rgb) -> Result<Self, ParseError> {
        Ok(Self::new(Self::decode_genes(encoding)?, canvas, background))
    }

    /// Decode only the gene sequence of an encoding.
    pub fn decode_genes(encoding: &str) -> Result<Vec<Gene>, ParseError> {
        let mut records: Vec<&str> = encoding.split(GENE_TERMINATOR).collect();
        if records.last() == Some(&"") {
            records.pop();
        }

        records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                if record.is_empty() {
                    Err(ParseError::EmptyRecord { index })
                } else {
                    Gene::decode(record)
                }
            })
            .collect()
    }

    /// Concatenated gene encodings, in gene order.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Rasterize the Voronoi tessellation of this genome.
    pub fn render(&self) -> RgbaImage {
        render_genome(self)
    }

    /// Mutate each gene independently with probability `rate`.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rate: f64, rng: &mut R) {
        let canvas = self.canvas;
        for gene in &mut self.genes {
            if rng.r#gen::<f64>() < rate {
                gene.mutate(canvas, rng);
            }
        }
    }

    /// Remove `count` distinct genes chosen uniformly at random.
    ///
    /// Does nothing when `count` exceeds the gene count.
    pub fn remove_genes<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) {
        let len = self.genes.len();
        if count > len {
            return;
        }

        let mut doomed = vec![false; len];
        for i in index::sample(rng, len, count).iter() {
            doomed[i] = true;
        }
        let mut doomed = doomed.into_iter();
        self.genes.retain(|_| !doomed.next().unwrap_or(false));
    }

    /// Append a copy of every gene, then shuffle the gene order.
    pub fn duplicate_genes<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.genes.extend_from_within(..);
        self.genes.shuffle(rng);
    }

    /// Apply a scheduled structural edit.
    pub fn apply<R: Rng + ?Sized>(&mut self, action: StructuralAction, rng: &mut R) {
        match action {
            StructuralAction::DuplicateGenes => self.duplicate_genes(rng),
            StructuralAction::RemoveGenes { count } => self.remove_genes(count, rng),
        }
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for gene in &self.genes {
            write!(f, "{gene}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn canvas() -> Canvas {
        Canvas::new(40, 30)
    }

    fn sample_genome(n: usize, seed: u64) -> Genome {
        let mut rng = StdRng::seed_from_u64(seed);
        Genome::random(n, canvas(), Rgb::BLACK, &mut rng)
    }

    fn multiset(genes: &[Gene]) -> HashMap<Gene, usize> {
        let mut counts = HashMap::new();
        for gene in genes {
            *counts.entry(*gene).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_random_genome() {
        let genome = sample_genome(25, 1);
        assert_eq!(genome.len(), 25);
        assert_eq!(genome.canvas, canvas());
        assert_eq!(genome.background, Rgb::BLACK);
    }

    #[test]
    fn test_decode_encode() {
        let encoding = "1,2,3,4,5;6,7,8,9,10;";
        let genome = Genome::decode(encoding, canvas(), Rgb::BLACK).unwrap();
        assert_eq!(genome.len(), 2);
        assert_eq!(genome.genes[1], Gene::new(6, 7, Rgb::new(8, 9, 10)));
        assert_eq!(genome.encode(), encoding);
    }

    #[test]
    fn test_decode_without_trailing_terminator() {
        let genome = Genome::decode("1,2,3,4,5;6,7,8,9,10", canvas(), Rgb::BLACK).unwrap();
        assert_eq!(genome.len(), 2);
    }

    #[test]
    fn test_empty_genome() {
        let genome = Genome::decode("", canvas(), Rgb::BLACK).unwrap();
        assert!(genome.is_empty());
        assert_eq!(genome.encode(), "");
    }

    #[test]
    fn test_decode_rejects_empty_record() {
        let err = Genome::decode("1,2,3,4,5;;6,7,8,9,10;", canvas(), Rgb::BLACK).unwrap_err();
        assert_eq!(err, ParseError::EmptyRecord { index: 1 });
    }

    #[test]
    fn test_mutate_rate_zero_is_identity() {
        let mut genome = sample_genome(50, 2);
        let before = genome.clone();
        let mut rng = StdRng::seed_from_u64(9);
        genome.mutate(0.0, &mut rng);
        assert_eq!(genome, before);
    }

    #[test]
    fn test_mutate_rate_one_touches_every_gene() {
        let mut genome = sample_genome(200, 3);
        let before = genome.clone();
        let mut rng = StdRng::seed_from_u64(10);
        genome.mutate(1.0, &mut rng);

        // A draw of zero jitter leaves a gene unchanged, so most but not all move.
        let changed = genome
            .genes
            .iter()
            .zip(&before.genes)
            .filter(|(a, b)| a != b)
            .count();
        assert!(changed > 150);
    }

    #[test]
    fn test_remove_genes() {
        let mut genome = sample_genome(20, 4);
        let before = multiset(&genome.genes);
        let mut rng = StdRng::seed_from_u64(11);
        genome.remove_genes(5, &mut rng);

        assert_eq!(genome.len(), 15);
        for (gene, count) in multiset(&genome.genes) {
            assert!(before.get(&gene).copied().unwrap_or(0) >= count);
        }
    }

    #[test]
    fn test_remove_more_than_available_is_noop() {
        let mut genome = sample_genome(3, 5);
        let before = genome.clone();
        let mut rng = StdRng::seed_from_u64(12);
        genome.remove_genes(4, &mut rng);
        assert_eq!(genome, before);

        genome.remove_genes(3, &mut rng);
        assert!(genome.is_empty());
    }

    #[test]
    fn test_duplicate_genes() {
        let mut genome = sample_genome(30, 6);
        let before = multiset(&genome.genes);
        let mut rng = StdRng::seed_from_u64(13);
        genome.duplicate_genes(&mut rng);

        assert_eq!(genome.len(), 60);
        let after = multiset(&genome.genes);
        for (gene, count) in &before {
            assert_eq!(after[gene], count * 2);
        }
    }

    #[test]
    fn test_clone_is_deep() {
        let original = sample_genome(10, 7);
        let mut copy = original.clone();
        copy.genes[0].x += 1;
        copy.genes.pop();
        assert_eq!(original.len(), 10);
        assert_ne!(original.genes[0], copy.genes[0]);
    }
}
