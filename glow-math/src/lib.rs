//! Numeric primitives for sky glow estimation
//!
//! This crate holds the leaf algorithms the glow pipeline is built on:
//! monotone cubic splines for tone correction, Delaunay triangulation for
//! anchor adjacency, and brute-force nearest-point search.

pub mod delaunay;
pub mod nearest;
pub mod spline;

pub use delaunay::{BowyerWatson, Triangle, TriangulationError, Triangulator};
pub use nearest::find_closest_point;
pub use spline::{MonotoneCubicSpline, SplineError};
