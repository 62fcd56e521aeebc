//! Strategies choosing which anchors contribute to a pixel's glow.
//!
//! Every selector is indexed once per anchor set with
//! [`PointSelector::set_anchors`] and then queried read-only, so a single
//! selector can serve all rows of a parallel estimation pass.

use std::fmt;

use glow_math::{find_closest_point, BowyerWatson, Triangulator};
use log::{debug, warn};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::anchors::Point;

/// Chooses the anchors relevant to a query pixel
pub trait PointSelector: Send + Sync + fmt::Debug {
    /// Replace the indexed anchor set
    fn set_anchors(&mut self, anchors: &[Point]);

    /// Anchors that should contribute to the glow at `point`
    fn relevant_anchors(&self, point: Point) -> Vec<Point>;
}

/// Every anchor contributes everywhere
#[derive(Debug, Clone, Default)]
pub struct AllPoints {
    anchors: Vec<Point>,
}

impl AllPoints {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PointSelector for AllPoints {
    fn set_anchors(&mut self, anchors: &[Point]) {
        self.anchors = anchors.to_vec();
    }

    fn relevant_anchors(&self, _point: Point) -> Vec<Point> {
        self.anchors.clone()
    }
}

/// The `k` anchors closest to the query pixel, nearest first
#[derive(Debug, Clone)]
pub struct NearestPoints {
    k: usize,
    anchors: Vec<Point>,
}

impl NearestPoints {
    /// Create a selector returning up to `k` anchors; `k` is raised to at least 1
    pub fn new(k: usize) -> Self {
        Self {
            k: k.max(1),
            anchors: Vec::new(),
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }
}

impl PointSelector for NearestPoints {
    fn set_anchors(&mut self, anchors: &[Point]) {
        self.anchors = anchors.to_vec();
    }

    fn relevant_anchors(&self, point: Point) -> Vec<Point> {
        let mut candidates = self.anchors.clone();
        candidates.sort_by(|a, b| {
            point
                .distance_squared(a)
                .total_cmp(&point.distance_squared(b))
        });
        candidates.truncate(self.k);
        candidates
    }
}

/// Anchors sharing a Delaunay triangle with the anchor nearest the query
///
/// With three or fewer anchors, or when the anchors cannot be triangulated
/// (all collinear), every anchor is returned.
#[derive(Debug, Clone)]
pub struct VoronoiPoints<T: Triangulator = BowyerWatson> {
    triangulator: T,
    anchors: Vec<Point>,
    vertices: Vec<Point2<f64>>,
    /// For each anchor, itself and every anchor sharing a triangle with it
    neighbours: Option<Vec<Vec<usize>>>,
}

impl VoronoiPoints<BowyerWatson> {
    pub fn new() -> Self {
        Self::with_triangulator(BowyerWatson)
    }
}

impl Default for VoronoiPoints<BowyerWatson> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Triangulator> VoronoiPoints<T> {
    pub fn with_triangulator(triangulator: T) -> Self {
        Self {
            triangulator,
            anchors: Vec::new(),
            vertices: Vec::new(),
            neighbours: None,
        }
    }

    /// Whether queries currently use the triangulation
    pub fn is_triangulated(&self) -> bool {
        self.neighbours.is_some()
    }

    fn rebuild(&mut self) {
        self.neighbours = None;
        if self.anchors.len() < 3 {
            return;
        }

        let triangles = match self.triangulator.triangulate(&self.vertices) {
            Ok(triangles) => triangles,
            Err(e) => {
                warn!(
                    "Cannot triangulate {} anchors ({e}), using all anchors",
                    self.anchors.len()
                );
                return;
            }
        };

        let mut neighbours = vec![Vec::new(); self.anchors.len()];
        for triangle in &triangles {
            for vertex in triangle.vertices() {
                neighbours[vertex].extend(triangle.vertices());
            }
        }
        for list in &mut neighbours {
            list.sort_unstable();
            list.dedup();
        }

        debug!(
            "Triangulated {} anchors into {} triangles",
            self.anchors.len(),
            triangles.len()
        );
        self.neighbours = Some(neighbours);
    }
}

impl<T: Triangulator + fmt::Debug> PointSelector for VoronoiPoints<T> {
    fn set_anchors(&mut self, anchors: &[Point]) {
        self.anchors = anchors.to_vec();
        self.vertices = anchors.iter().map(Point::to_point2).collect();
        self.rebuild();
    }

    fn relevant_anchors(&self, point: Point) -> Vec<Point> {
        if self.anchors.len() <= 3 {
            return self.anchors.clone();
        }
        let Some(neighbours) = &self.neighbours else {
            return self.anchors.clone();
        };
        let Some(closest) = find_closest_point(&self.vertices, &point.to_point2()) else {
            return self.anchors.clone();
        };

        let cell = &neighbours[closest];
        if cell.is_empty() {
            // Duplicate anchors never own triangles
            return self.anchors.clone();
        }
        cell.iter().map(|&i| self.anchors[i]).collect()
    }
}

/// Serializable choice of point selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PointSelectionStrategy {
    #[default]
    All,
    Nearest {
        k: usize,
    },
    Voronoi,
}

impl PointSelectionStrategy {
    /// Create an empty selector of this kind
    pub fn build(&self) -> Box<dyn PointSelector> {
        match *self {
            PointSelectionStrategy::All => Box::new(AllPoints::new()),
            PointSelectionStrategy::Nearest { k } => Box::new(NearestPoints::new(k)),
            PointSelectionStrategy::Voronoi => Box::new(VoronoiPoints::new()),
        }
    }
}
