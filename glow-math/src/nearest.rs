//! Nearest-point lookup via brute-force search.

use nalgebra::Point2;

/// Finds the index of the point closest to `query` using brute-force search.
///
/// Ties resolve to the earliest point in `points`. Returns `None` when
/// `points` is empty.
///
/// Time complexity: O(n).
// TODO: accelerate with a KD-tree once anchor sets grow beyond a few hundred points
pub fn find_closest_point(points: &[Point2<f64>], query: &Point2<f64>) -> Option<usize> {
    let mut min_dist = f64::INFINITY;
    let mut closest_idx = None;

    for (i, point) in points.iter().enumerate() {
        let dist = (point - query).norm_squared();

        if closest_idx.is_none() || dist < min_dist {
            min_dist = dist;
            closest_idx = Some(i);
        }
    }

    closest_idx
}
