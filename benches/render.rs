//! Benchmarks for genome rendering and fitness evaluation.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use image::{Rgba, RgbaImage};
use rand::prelude::*;

use voronoi_evolve::{
    compute::{Canvas, FitnessEvaluator, Genome, ImageSimilarity, Rgb, voronoi_cells},
    compute::evolution::Population,
};

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let canvas = Canvas::new(256, 256);

    for genes in [50, 200, 500, 1000] {
        let mut rng = StdRng::seed_from_u64(7);
        let genome = Genome::random(genes, canvas, Rgb::BLACK, &mut rng);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_genes", genes)),
            &genes,
            |b, _| {
                b.iter(|| black_box(&genome).render());
            },
        );
    }

    group.finish();
}

fn bench_tessellation(c: &mut Criterion) {
    let mut group = c.benchmark_group("voronoi_cells");

    for sites in [100, 500, 1000] {
        let mut rng = StdRng::seed_from_u64(11);
        let points: Vec<(f64, f64)> = (0..sites)
            .map(|_| (rng.gen_range(0..=256) as f64, rng.gen_range(0..=256) as f64))
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_sites", sites)),
            &sites,
            |b, _| {
                b.iter(|| voronoi_cells(black_box(&points)));
            },
        );
    }

    group.finish();
}

fn bench_population_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("population_evaluation");
    group.sample_size(10);

    let target = RgbaImage::from_fn(128, 128, |x, y| Rgba([x as u8 * 2, y as u8 * 2, 128, 255]));
    let evaluator = ImageSimilarity::new(target);

    for size in [20, 100, 200] {
        let mut rng = StdRng::seed_from_u64(13);
        let population = Population::random(size, 500, evaluator.canvas(), Rgb::BLACK, &mut rng);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_genomes", size)),
            &size,
            |b, _| {
                b.iter(|| population.evaluate(black_box(&evaluator)));
            },
        );
    }

    group.finish();
}

fn bench_single_evaluation(c: &mut Criterion) {
    let target = RgbaImage::from_pixel(200, 150, Rgba([90, 140, 200, 255]));
    let evaluator = ImageSimilarity::new(target);
    let mut rng = StdRng::seed_from_u64(17);
    let genome = Genome::random(500, evaluator.canvas(), Rgb::BLACK, &mut rng);

    c.bench_function("evaluate_500_genes", |b| {
        b.iter(|| evaluator.evaluate(black_box(&genome)));
    });
}

criterion_group!(
    benches,
    bench_render,
    bench_tessellation,
    bench_population_evaluation,
    bench_single_evaluation
);
criterion_main!(benches);
