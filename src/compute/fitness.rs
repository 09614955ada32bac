//! Fitness evaluation against a target raster.
//!
//! Fitness lives on `[0, 100]`, higher is better: 100 means a pixel-exact
//! match on the RGB channels.

use image::RgbaImage;

use super::gene::Canvas;
use super::genome::Genome;

/// Fitness evaluation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FitnessError {
    #[error("Image dimensions differ: {left:?} vs {right:?}")]
    DimensionMismatch { left: (u32, u32), right: (u32, u32) },
}

/// Scores a genome. Evaluation runs concurrently across the population.
pub trait FitnessEvaluator: Sync {
    fn evaluate(&self, genome: &Genome) -> Result<f64, FitnessError>;
}

impl<F> FitnessEvaluator for F
where
    F: Fn(&Genome) -> f64 + Sync,
{
    fn evaluate(&self, genome: &Genome) -> Result<f64, FitnessError> {
        Ok(self(genome))
    }
}

/// Mean absolute RGB difference as a percentage of the maximum possible
/// difference. Alpha is ignored.
pub fn percent_difference(a: &RgbaImage, b: &RgbaImage) -> Result<f64, FitnessError> {
    if a.dimensions() != b.dimensions() {
        return Err(FitnessError::DimensionMismatch {
            left: a.dimensions(),
            right: b.dimensions(),
        });
    }

    let (width, height) = a.dimensions();
    let worst = 255 * 3 * width as u64 * height as u64;
    if worst == 0 {
        return Ok(0.0);
    }

    let total: u64 = a
        .pixels()
        .zip(b.pixels())
        .map(|(p, q)| {
            (0..3)
                .map(|c| p.0[c].abs_diff(q.0[c]) as u64)
                .sum::<u64>()
        })
        .sum();

    Ok(total as f64 / worst as f64 * 100.0)
}

/// Similarity of a rendered genome to a fixed target image.
#[derive(Debug, Clone)]
pub struct ImageSimilarity {
    target: RgbaImage,
}

impl ImageSimilarity {
    pub fn new(target: RgbaImage) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &RgbaImage {
        &self.target
    }

    /// Canvas matching the target dimensions.
    pub fn canvas(&self) -> Canvas {
        let (width, height) = self.target.dimensions();
        Canvas::new(width, height)
    }

    /// `100 - percent_difference(target, image)`.
    pub fn similarity(&self, image: &RgbaImage) -> Result<f64, FitnessError> {
        Ok(100.0 - percent_difference(&self.target, image)?)
    }
}

impl FitnessEvaluator for ImageSimilarity {
    fn evaluate(&self, genome: &Genome) -> Result<f64, FitnessError> {
        let canvas = self.canvas();
        if genome.canvas != canvas {
            return Err(FitnessError::DimensionMismatch {
                left: (canvas.width, canvas.height),
                right: (genome.canvas.width, genome.canvas.height),
            });
        }
        self.similarity(&genome.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{Gene, Rgb};
    use image::Rgba;

    #[test]
    fn test_identical_images() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([12, 200, 7, 255]));
        assert_eq!(percent_difference(&img, &img.clone()).unwrap(), 0.0);
    }

    #[test]
    fn test_opposite_images() {
        let black = RgbaImage::from_pixel(4, 3, Rgba([0, 0, 0, 255]));
        let white = RgbaImage::from_pixel(4, 3, Rgba([255, 255, 255, 0]));
        assert_eq!(percent_difference(&black, &white).unwrap(), 100.0);
    }

    #[test]
    fn test_alpha_ignored() {
        let a = RgbaImage::from_pixel(2, 2, Rgba([50, 60, 70, 255]));
        let b = RgbaImage::from_pixel(2, 2, Rgba([50, 60, 70, 0]));
        assert_eq!(percent_difference(&a, &b).unwrap(), 0.0);
    }

    #[test]
    fn test_partial_difference() {
        let a = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 255]));
        let mut b = a.clone();
        b.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        // 255 out of 255 * 3 * 2
        let diff = percent_difference(&a, &b).unwrap();
        assert!((diff - 100.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = RgbaImage::new(4, 4);
        let b = RgbaImage::new(4, 5);
        assert_eq!(
            percent_difference(&a, &b),
            Err(FitnessError::DimensionMismatch {
                left: (4, 4),
                right: (4, 5)
            })
        );
    }

    #[test]
    fn test_background_genome_scores_perfectly_on_matching_target() {
        let target = RgbaImage::from_pixel(20, 10, Rgba([9, 8, 7, 255]));
        let evaluator = ImageSimilarity::new(target);
        let genome = Genome::new(
            vec![Gene::new(3, 3, Rgb::new(255, 255, 255))],
            evaluator.canvas(),
            Rgb::new(9, 8, 7),
        );
        assert_eq!(evaluator.evaluate(&genome).unwrap(), 100.0);
    }

    #[test]
    fn test_genome_canvas_mismatch() {
        let evaluator = ImageSimilarity::new(RgbaImage::new(20, 10));
        let genome = Genome::new(Vec::new(), Canvas::new(10, 10), Rgb::BLACK);
        assert!(evaluator.evaluate(&genome).is_err());
    }

    #[test]
    fn test_closure_evaluator() {
        let evaluator = |g: &Genome| g.len() as f64;
        let genome = Genome::new(Vec::new(), Canvas::new(1, 1), Rgb::BLACK);
        assert_eq!(evaluator.evaluate(&genome).unwrap(), 0.0);
    }
}
