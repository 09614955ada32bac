//! CPU rasterizer for genomes.
//!
//! Fills the background, then paints each bounded Voronoi cell with its
//! gene's color in gene order. Cells are clipped to the canvas before
//! filling; unbounded cells are never painted.

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point as PixelPoint;

use super::genome::Genome;
use super::voronoi::{Point, clip_to_rect, voronoi_cells};

/// Render `genome` onto a fresh canvas-sized RGBA image.
pub fn render_genome(genome: &Genome) -> RgbaImage {
    let canvas = genome.canvas;
    let mut image = RgbaImage::from_pixel(canvas.width, canvas.height, genome.background.to_rgba());
    if canvas.width == 0 || canvas.height == 0 {
        return image;
    }

    let sites: Vec<Point> = genome
        .genes
        .iter()
        .map(|g| (g.x as f64, g.y as f64))
        .collect();

    let max_x = (canvas.width - 1) as f64;
    let max_y = (canvas.height - 1) as f64;
    for (gene, cell) in genome.genes.iter().zip(voronoi_cells(&sites)) {
        let Some(cell) = cell else { continue };
        let clipped = clip_to_rect(&cell, max_x, max_y);
        fill_polygon(&mut image, &clipped, gene.color.to_rgba());
    }

    image
}

/// Fill a polygon already clipped to the image bounds.
fn fill_polygon(image: &mut RgbaImage, polygon: &[Point], color: Rgba<u8>) {
    let mut pixels: Vec<PixelPoint<i32>> = polygon
        .iter()
        .map(|&(x, y)| PixelPoint::new(x.round() as i32, y.round() as i32))
        .collect();
    pixels.dedup();
    // The polygon filler rejects an explicitly closed ring.
    while pixels.len() > 1 && pixels.first() == pixels.last() {
        pixels.pop();
    }

    match pixels.as_slice() {
        [] => {}
        [only] => image.put_pixel(only.x as u32, only.y as u32, color),
        _ => draw_polygon_mut(image, &pixels, color),
    }
}
