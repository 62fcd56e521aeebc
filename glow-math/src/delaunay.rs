//! Delaunay triangulation of 2D point sets.
//!
//! The glow estimator only needs one thing from a triangulation: which points
//! share a triangle with which. That need is expressed through the narrow
//! [`Triangulator`] trait so any triangulation backend can be swapped in.
//! [`BowyerWatson`] is the bundled incremental implementation.
//!
//! # Degenerate input
//!
//! Exact duplicate points are inserted once; the first occurrence owns the
//! vertex and later duplicates never appear in any triangle. Fully collinear
//! input has no triangles and is reported as
//! [`TriangulationError::Degenerate`]. Tie-breaking for cocircular points is
//! implementation-defined.

use log::debug;
use nalgebra::Point2;
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during triangulation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TriangulationError {
    #[error("Triangulation requires at least 3 points, got {0}")]
    NotEnoughPoints(usize),

    #[error("Point {0} has non-finite coordinates")]
    NonFinite(usize),

    #[error("Points are degenerate (collinear or coincident), no triangles can be formed")]
    Degenerate,
}

/// A triangle referencing three vertices by index into the triangulated point slice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Triangle {
    pub a: usize,
    pub b: usize,
    pub c: usize,
}

impl Triangle {
    pub fn new(a: usize, b: usize, c: usize) -> Self {
        Self { a, b, c }
    }

    /// Vertex indices in counter-clockwise order
    pub fn vertices(&self) -> [usize; 3] {
        [self.a, self.b, self.c]
    }

    /// Check whether `vertex` is a corner of this triangle
    pub fn has_vertex(&self, vertex: usize) -> bool {
        self.a == vertex || self.b == vertex || self.c == vertex
    }

    fn edges(&self) -> [(usize, usize); 3] {
        [(self.a, self.b), (self.b, self.c), (self.c, self.a)]
    }
}

/// Narrow triangulation interface used by anchor adjacency lookups.
pub trait Triangulator: Send + Sync {
    /// Triangulate `points`, returning triangles that index into `points`.
    fn triangulate(&self, points: &[Point2<f64>]) -> Result<Vec<Triangle>, TriangulationError>;
}

/// Incremental Bowyer–Watson Delaunay triangulation.
///
/// Inserts points one at a time into a super-triangle enclosing all input,
/// removing every triangle whose circumcircle contains the new point and
/// re-triangulating the resulting cavity. Triangles that touch the
/// super-triangle are discarded at the end.
///
/// Time complexity: O(n²) for n points, which is ample for anchor sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct BowyerWatson;

impl Triangulator for BowyerWatson {
    fn triangulate(&self, points: &[Point2<f64>]) -> Result<Vec<Triangle>, TriangulationError> {
        let n = points.len();
        if n < 3 {
            return Err(TriangulationError::NotEnoughPoints(n));
        }
        if let Some(i) = points
            .iter()
            .position(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(TriangulationError::NonFinite(i));
        }

        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let delta_max = (max_x - min_x).max(max_y - min_y).max(1.0);
        let mid_x = (min_x + max_x) / 2.0;
        let mid_y = (min_y + max_y) / 2.0;

        let mut vertices: Vec<Point2<f64>> = points.to_vec();
        vertices.push(Point2::new(mid_x - 20.0 * delta_max, mid_y - delta_max));
        vertices.push(Point2::new(mid_x + 20.0 * delta_max, mid_y - delta_max));
        vertices.push(Point2::new(mid_x, mid_y + 20.0 * delta_max));

        let mut triangles = vec![Triangle::new(n, n + 1, n + 2)];
        let mut seen: HashSet<(u64, u64)> = HashSet::with_capacity(n);

        for (i, p) in points.iter().enumerate() {
            if !seen.insert((p.x.to_bits(), p.y.to_bits())) {
                debug!("Skipping duplicate triangulation point {i} at ({}, {})", p.x, p.y);
                continue;
            }

            let (bad, good): (Vec<Triangle>, Vec<Triangle>) = triangles
                .into_iter()
                .partition(|t| in_circumcircle(&vertices, t, p));

            // Cavity boundary: edges of bad triangles not shared with another bad triangle
            let mut boundary = Vec::new();
            for t in &bad {
                for (u, v) in t.edges() {
                    let shared = bad
                        .iter()
                        .any(|other| other != t && other.edges().contains(&(v, u)));
                    if !shared {
                        boundary.push((u, v));
                    }
                }
            }

            triangles = good;
            triangles.extend(boundary.into_iter().map(|(u, v)| Triangle::new(u, v, i)));
        }

        let result: Vec<Triangle> = triangles
            .into_iter()
            .filter(|t| t.a < n && t.b < n && t.c < n)
            .filter(|t| orientation(&vertices[t.a], &vertices[t.b], &vertices[t.c]) != 0.0)
            .collect();

        if result.is_empty() {
            return Err(TriangulationError::Degenerate);
        }

        debug!("Triangulated {n} points into {} triangles", result.len());
        Ok(result)
    }
}

/// Twice the signed area of (a, b, c); positive when counter-clockwise
fn orientation(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Strict in-circle test for a counter-clockwise triangle
fn in_circumcircle(vertices: &[Point2<f64>], t: &Triangle, d: &Point2<f64>) -> bool {
    let (a, b, c) = (&vertices[t.a], &vertices[t.b], &vertices[t.c]);
    let (adx, ady) = (a.x - d.x, a.y - d.y);
    let (bdx, bdy) = (b.x - d.x, b.y - d.y);
    let (cdx, cdy) = (c.x - d.x, c.y - d.y);

    let det = (adx * adx + ady * ady) * (bdx * cdy - cdx * bdy)
        - (bdx * bdx + bdy * bdy) * (adx * cdy - cdx * ady)
        + (cdx * cdx + cdy * cdy) * (adx * bdy - bdx * ady);

    det > 0.0
}
