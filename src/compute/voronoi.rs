//! Voronoi cells from a Bowyer-Watson Delaunay triangulation.
//!
//! Each Voronoi vertex is the circumcenter of a Delaunay triangle, and the
//! cell of a site is the polygon through the circumcenters of the triangles
//! incident to it. Triangles touching the enclosing super-triangle mark
//! their sites as hull sites; hull cells are unbounded and yield `None`.

use std::collections::HashMap;

/// A point in canvas space.
pub type Point = (f64, f64);

/// Distance of the super-triangle vertices, in multiples of the site extent.
const SUPER_SCALE: f64 = 1.0e4;

/// Relative tolerance below which a triangle is treated as degenerate.
const DEGENERACY_EPSILON: f64 = 1.0e-12;

/// Vertices closer than this are merged when building a cell polygon.
const VERTEX_EPSILON: f64 = 1.0e-9;

#[derive(Debug, Clone, Copy)]
struct Triangle {
    vertices: [usize; 3],
    /// `None` for collinear vertices.
    circumcenter: Option<Point>,
    radius_sq: f64,
}

impl Triangle {
    fn new(vertices: [usize; 3], points: &[Point]) -> Self {
        let [a, b, c] = vertices.map(|v| points[v]);
        match circumcenter(a, b, c) {
            Some(center) => Self {
                vertices,
                circumcenter: Some(center),
                radius_sq: distance_sq(center, a),
            },
            None => Self {
                vertices,
                circumcenter: None,
                radius_sq: f64::NAN,
            },
        }
    }

    /// Whether `p` lies strictly inside the circumcircle.
    #[inline]
    fn encloses(&self, p: Point) -> bool {
        match self.circumcenter {
            Some(center) => distance_sq(center, p) < self.radius_sq,
            None => false,
        }
    }

    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [edge(a, b), edge(b, c), edge(c, a)]
    }
}

#[inline]
fn edge(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

#[inline]
fn distance_sq(a: Point, b: Point) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    dx * dx + dy * dy
}

fn circumcenter(a: Point, b: Point, c: Point) -> Option<Point> {
    let d = 2.0 * (a.0 * (b.1 - c.1) + b.0 * (c.1 - a.1) + c.0 * (a.1 - b.1));
    let scale = distance_sq(a, b).max(distance_sq(b, c)).max(distance_sq(c, a));
    if !d.is_finite() || d.abs() <= DEGENERACY_EPSILON * scale {
        return None;
    }

    let a2 = a.0 * a.0 + a.1 * a.1;
    let b2 = b.0 * b.0 + b.1 * b.1;
    let c2 = c.0 * c.0 + c.1 * c.1;
    let x = (a2 * (b.1 - c.1) + b2 * (c.1 - a.1) + c2 * (a.1 - b.1)) / d;
    let y = (a2 * (c.0 - b.0) + b2 * (a.0 - c.0) + c2 * (b.0 - a.0)) / d;

    (x.is_finite() && y.is_finite()).then_some((x, y))
}

/// Delaunay triangulation of distinct `sites`.
///
/// Returned vertex indices `>= sites.len()` refer to the three super-triangle
/// vertices.
fn triangulate(sites: &[Point]) -> Vec<Triangle> {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for &(x, y) in sites {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    let extent = (max_x - min_x).max(max_y - min_y).max(1.0) * SUPER_SCALE;
    let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);

    let n = sites.len();
    let mut points = Vec::with_capacity(n + 3);
    points.extend_from_slice(sites);
    points.push((cx - extent, cy - extent));
    points.push((cx + extent, cy - extent));
    points.push((cx, cy + extent));

    let mut triangles = vec![Triangle::new([n, n + 1, n + 2], &points)];
    let mut boundary: HashMap<(usize, usize), usize> = HashMap::new();

    for (i, &p) in sites.iter().enumerate() {
        boundary.clear();
        triangles.retain(|t| {
            if !t.encloses(p) {
                return true;
            }
            for e in t.edges() {
                *boundary.entry(e).or_insert(0) += 1;
            }
            false
        });

        for (&(a, b), _) in boundary.iter().filter(|(_, count)| **count == 1) {
            triangles.push(Triangle::new([a, b, i], &points));
        }
    }

    triangles
}

/// Voronoi cell polygon of every site, in input order.
///
/// A cell is `None` when its site lies on the convex hull, when it repeats
/// the position of an earlier site, or when fewer than three distinct
/// non-collinear sites exist. Bounded cells list their vertices in angular
/// order around the site.
pub fn voronoi_cells(sites: &[Point]) -> Vec<Option<Vec<Point>>> {
    let mut cells = vec![None; sites.len()];

    // First occurrence of a position owns its cell.
    let mut owner_of: HashMap<(u64, u64), usize> = HashMap::new();
    let mut distinct = Vec::new();
    let mut owners = Vec::new();
    for (i, &(x, y)) in sites.iter().enumerate() {
        if !(x.is_finite() && y.is_finite()) {
            continue;
        }
        if let std::collections::hash_map::Entry::Vacant(slot) =
            owner_of.entry((x.to_bits(), y.to_bits()))
        {
            slot.insert(i);
            distinct.push((x, y));
            owners.push(i);
        }
    }

    if distinct.len() < 3 {
        return cells;
    }

    let n = distinct.len();
    let mut incident: Vec<Vec<Point>> = vec![Vec::new(); n];
    let mut on_hull = vec![false; n];

    for triangle in triangulate(&distinct) {
        let touches_super = triangle.vertices.iter().any(|&v| v >= n);
        match triangle.circumcenter {
            Some(center) if !touches_super => {
                for &v in &triangle.vertices {
                    incident[v].push(center);
                }
            }
            _ => {
                for &v in triangle.vertices.iter().filter(|&&v| v < n) {
                    on_hull[v] = true;
                }
            }
        }
    }

    for (slot, vertices) in incident.into_iter().enumerate() {
        if on_hull[slot] || vertices.len() < 3 {
            continue;
        }
        cells[owners[slot]] = Some(order_around(distinct[slot], vertices));
    }

    cells
}

/// Sort vertices by angle around `site` and merge coincident neighbours.
fn order_around(site: Point, mut vertices: Vec<Point>) -> Vec<Point> {
    vertices.sort_by(|a, b| {
        let ta = (a.1 - site.1).atan2(a.0 - site.0);
        let tb = (b.1 - site.1).atan2(b.0 - site.0);
        ta.total_cmp(&tb)
    });
    vertices.dedup_by(|a, b| distance_sq(*a, *b) <= VERTEX_EPSILON);
    if vertices.len() > 1
        && let (Some(&first), Some(&last)) = (vertices.first(), vertices.last())
        && distance_sq(first, last) <= VERTEX_EPSILON
    {
        vertices.pop();
    }
    vertices
}

/// Clip a convex polygon to the axis-aligned rectangle `[0, max_x] x [0, max_y]`.
///
/// Sutherland-Hodgman, one rectangle edge at a time.
pub fn clip_to_rect(polygon: &[Point], max_x: f64, max_y: f64) -> Vec<Point> {
    let planes: [(fn(Point, f64) -> bool, fn(Point, Point, f64) -> Point, f64); 4] = [
        (|p: Point, v: f64| p.0 >= v, intersect_vertical, 0.0),
        (|p: Point, v: f64| p.0 <= v, intersect_vertical, max_x),
        (|p: Point, v: f64| p.1 >= v, intersect_horizontal, 0.0),
        (|p: Point, v: f64| p.1 <= v, intersect_horizontal, max_y),
    ];

    let mut output = polygon.to_vec();
    for (inside, intersect, value) in planes {
        if output.is_empty() {
            break;
        }
        let input = std::mem::take(&mut output);
        let mut prev = input[input.len() - 1];
        for &curr in &input {
            match (inside(prev, value), inside(curr, value)) {
                (true, true) => output.push(curr),
                (true, false) => output.push(intersect(prev, curr, value)),
                (false, true) => {
                    output.push(intersect(prev, curr, value));
                    output.push(curr);
                }
                (false, false) => {}
            }
            prev = curr;
        }
    }
    output
}

fn intersect_vertical(a: Point, b: Point, x: f64) -> Point {
    let t = (x - a.0) / (b.0 - a.0);
    (x, a.1 + t * (b.1 - a.1))
}

fn intersect_horizontal(a: Point, b: Point, y: f64) -> Point {
    let t = (y - a.1) / (b.1 - a.1);
    (a.0 + t * (b.0 - a.0), y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains(polygon: &[Point], p: Point) -> bool {
        // Convex polygon in angular order: p is inside if it is on the same
        // side of every edge.
        let mut sign = 0.0;
        for i in 0..polygon.len() {
            let a = polygon[i];
            let b = polygon[(i + 1) % polygon.len()];
            let cross = (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0);
            if cross.abs() < 1e-9 {
                continue;
            }
            if sign == 0.0 {
                sign = cross.signum();
            } else if cross.signum() != sign {
                return false;
            }
        }
        true
    }

    #[test]
    fn test_too_few_sites() {
        assert!(voronoi_cells(&[]).is_empty());
        assert_eq!(voronoi_cells(&[(1.0, 1.0), (5.0, 5.0)]), vec![None, None]);
    }

    #[test]
    fn test_collinear_sites_unbounded() {
        let sites = [(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)];
        assert!(voronoi_cells(&sites).iter().all(Option::is_none));
    }

    #[test]
    fn test_center_site_bounded() {
        let sites = [
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (5.0, 5.0),
        ];
        let cells = voronoi_cells(&sites);

        for cell in &cells[..4] {
            assert!(cell.is_none());
        }
        let center = cells[4].as_ref().unwrap();
        assert!(center.len() >= 4);
        assert!(contains(center, (5.0, 5.0)));
        for &(x, y) in center {
            assert!((0.0..=10.0).contains(&x) && (0.0..=10.0).contains(&y));
        }
    }

    #[test]
    fn test_duplicate_site_owned_by_first() {
        let sites = [
            (0.0, 0.0),
            (10.0, 0.0),
            (5.0, 4.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (5.0, 4.0),
        ];
        let cells = voronoi_cells(&sites);
        assert!(cells[2].is_some());
        assert!(cells[5].is_none());
    }

    #[test]
    fn test_interior_cells_contain_their_site() {
        let mut sites = Vec::new();
        for i in 0..6 {
            for j in 0..6 {
                // Slight offsets keep the lattice away from cocircular quadruples.
                sites.push((
                    i as f64 * 10.0 + j as f64 * 0.37,
                    j as f64 * 10.0 + i as f64 * 0.21,
                ));
            }
        }
        let cells = voronoi_cells(&sites);
        let bounded: Vec<_> = cells
            .iter()
            .zip(&sites)
            .filter_map(|(cell, site)| cell.as_ref().map(|c| (c, *site)))
            .collect();

        assert!(bounded.len() >= 16);
        for (cell, site) in bounded {
            assert!(contains(cell, site));
        }
    }

    #[test]
    fn test_clip_to_rect() {
        let square = [(-5.0, -5.0), (5.0, -5.0), (5.0, 5.0), (-5.0, 5.0)];
        let clipped = clip_to_rect(&square, 10.0, 10.0);
        assert_eq!(clipped.len(), 4);
        for &(x, y) in &clipped {
            assert!((0.0..=5.0).contains(&x) && (0.0..=5.0).contains(&y));
        }

        let outside = [(20.0, 20.0), (30.0, 20.0), (25.0, 30.0)];
        assert!(clip_to_rect(&outside, 10.0, 10.0).is_empty());
    }
}
