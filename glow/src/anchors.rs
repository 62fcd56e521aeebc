//! Anchor points and the store that holds their sampled colors.
//!
//! An anchor is an image location believed to show only background sky. Its
//! color is sampled from a small window around it, either supplied by the
//! user or picked automatically from three fixed image-relative regions.

use std::collections::HashMap;
use std::fmt;

use log::{debug, warn};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use shared::{Clipping, Color, ColorModel, CroppedView, ImageSize, PixelSource};

use crate::error::{GlowError, Result};

/// Integer pixel coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: &Point) -> f64 {
        let dx = (other.x - self.x) as f64;
        let dy = (other.y - self.y) as f64;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &Point) -> f64 {
        self.distance_squared(other).sqrt()
    }

    pub fn to_point2(&self) -> Point2<f64> {
        Point2::new(self.x as f64, self.y as f64)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// An anchor location with its sampled RGB color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub point: Point,
    pub color: Color,
}

/// Statistic used to reduce a sample window to one color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SampleMode {
    #[default]
    Average,
    Median,
    Darkest,
}

/// Reduce the window of side `2 * radius + 1` centered on `point` to one RGB color
///
/// Window pixels that fall off the image are ignored.
pub fn sample_color(image: &dyn PixelSource, point: Point, radius: usize, mode: SampleMode) -> Result<Color> {
    let view = CroppedView::centered(image, point.x as i64, point.y as i64, radius, Clipping::Strict);
    reduce_window(&view, mode).ok_or(GlowError::EmptySampleWindow(point))
}

fn reduce_window(view: &dyn PixelSource, mode: SampleMode) -> Option<Color> {
    match mode {
        SampleMode::Average => view.average_pixel(ColorModel::Rgb),
        SampleMode::Median => view.median_pixel(ColorModel::Rgb),
        SampleMode::Darkest => view.darkest_pixel(ColorModel::Rgb),
    }
}

/// Reinterpret negative coordinates as offsets from the far edge
///
/// `x < 0` becomes `width + x` and `y < 0` becomes `height + y`; each axis
/// is corrected independently.
pub fn correct_fix_points(points: &[Point], size: ImageSize) -> Vec<Point> {
    points
        .iter()
        .map(|p| {
            let x = if p.x < 0 { size.width as i32 + p.x } else { p.x };
            let y = if p.y < 0 { size.height as i32 + p.y } else { p.y };
            Point::new(x, y)
        })
        .collect()
}

/// The three automatic sample windows for an image of `size`
///
/// Windows are one fifth of the image in each dimension (at least one
/// pixel) and placed at the top center, bottom left and bottom right. Each
/// entry is the anchor point, which is also the window's top-left corner,
/// and the window size.
pub fn auto_sample_windows(size: ImageSize) -> [(Point, ImageSize); 3] {
    let sample = ImageSize::from_width_height((size.width / 5).max(1), (size.height / 5).max(1));
    let (w, h) = (size.width as i32, size.height as i32);
    let (sw, sh) = (sample.width as i32, sample.height as i32);
    [
        (Point::new(w / 2, sh / 2), sample),
        (Point::new(sw / 2, h - sh / 2), sample),
        (Point::new(w - sw / 2, h - sh / 2), sample),
    ]
}

/// Anchor points keyed by location
///
/// Anchors keep insertion order. Supplying the same point twice keeps the
/// first position and the last color.
#[derive(Debug, Clone, Default)]
pub struct AnchorStore {
    anchors: Vec<Anchor>,
    index: HashMap<Point, usize>,
}

impl AnchorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    pub fn points(&self) -> Vec<Point> {
        self.anchors.iter().map(|a| a.point).collect()
    }

    /// Sampled color of the anchor at `point`, if any
    pub fn color(&self, point: &Point) -> Option<Color> {
        self.index.get(point).map(|&i| self.anchors[i].color)
    }

    pub fn clear(&mut self) {
        self.anchors.clear();
        self.index.clear();
    }

    /// Replace all anchors, sampling each color as the window average
    ///
    /// # Arguments
    /// * `points` - Anchor locations; negative coordinates count from the far edge
    /// * `image` - Image to sample
    /// * `sample_radius` - Half-width of the square sample window
    pub fn set_fix_points(&mut self, points: &[Point], image: &dyn PixelSource, sample_radius: usize) -> Result<()> {
        let corrected = correct_fix_points(points, image.size());
        let colors = corrected
            .iter()
            .map(|&p| sample_color(image, p, sample_radius, SampleMode::Average))
            .collect::<Result<Vec<_>>>()?;
        debug!(
            "Sampled {} fix points with radius {sample_radius}",
            corrected.len()
        );
        self.set_fix_points_with_colors(&corrected, &colors)
    }

    /// Replace all anchors with explicit colors
    pub fn set_fix_points_with_colors(&mut self, points: &[Point], colors: &[Color]) -> Result<()> {
        if points.len() != colors.len() {
            return Err(GlowError::MismatchedAnchors {
                points: points.len(),
                colors: colors.len(),
            });
        }

        self.clear();
        for (&point, &color) in points.iter().zip(colors) {
            match self.index.get(&point) {
                Some(&i) => {
                    debug!("Fix point {point} given twice, keeping the later color");
                    self.anchors[i].color = color;
                }
                None => {
                    self.index.insert(point, self.anchors.len());
                    self.anchors.push(Anchor { point, color });
                }
            }
        }
        Ok(())
    }

    /// Replace all anchors with three automatically placed samples
    ///
    /// Each window is reduced with the median so that stars inside it have
    /// little influence.
    pub fn auto_sample(&mut self, image: &dyn PixelSource) -> Result<()> {
        let mut points = Vec::with_capacity(3);
        let mut colors = Vec::with_capacity(3);
        for (point, window) in auto_sample_windows(image.size()) {
            let view = CroppedView::new(
                image,
                point.x as i64,
                point.y as i64,
                window.width,
                window.height,
                Clipping::Strict,
            );
            let Some(color) = view.median_pixel(ColorModel::Rgb) else {
                warn!("Auto sample window at {point} of size {window} lies outside the image");
                return Err(GlowError::EmptySampleWindow(point));
            };
            debug!("Auto median pixel at {point}: {color:?}");
            points.push(point);
            colors.push(color);
        }
        self.set_fix_points_with_colors(&points, &colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use shared::{ArrayImage, PixelBuffer};

    fn horizontal_ramp(width: usize, height: usize) -> ArrayImage {
        let mut image = ArrayImage::new(width, height, ColorModel::Rgb);
        for y in 0..height {
            for x in 0..width {
                let v = x as f64 / width as f64;
                image.set_native_pixel(x, y, [v, v, v]);
            }
        }
        image
    }

    #[test]
    fn test_point_distance() {
        let a = Point::new(1, 2);
        let b = Point::new(4, 6);
        assert_eq!(a.distance_squared(&b), 25.0);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(b.distance(&a), 5.0);
        assert_eq!(a.to_string(), "(1, 2)");
    }

    #[test]
    fn test_correct_fix_points() {
        let size = ImageSize::from_width_height(100, 50);
        let corrected = correct_fix_points(
            &[Point::new(-10, 5), Point::new(3, -1), Point::new(-1, -1), Point::new(7, 8)],
            size,
        );
        assert_eq!(
            corrected,
            vec![Point::new(90, 5), Point::new(3, 49), Point::new(99, 49), Point::new(7, 8)]
        );
    }

    #[test]
    fn test_set_fix_points_averages_window() {
        let image = horizontal_ramp(10, 10);
        let mut store = AnchorStore::new();
        store.set_fix_points(&[Point::new(5, 5)], &image, 1).unwrap();
        let color = store.color(&Point::new(5, 5)).unwrap();
        assert_abs_diff_eq!(color[0], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_sample_window_ignores_pixels_off_image() {
        let image = horizontal_ramp(10, 10);
        let mut store = AnchorStore::new();
        store.set_fix_points(&[Point::new(0, 0)], &image, 1).unwrap();
        // Only columns 0 and 1 are inside
        let color = store.color(&Point::new(0, 0)).unwrap();
        assert_abs_diff_eq!(color[0], 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_negative_fix_points_sampled_from_far_edge() {
        let image = horizontal_ramp(10, 10);
        let mut store = AnchorStore::new();
        store.set_fix_points(&[Point::new(-1, -1)], &image, 0).unwrap();
        assert_eq!(store.points(), vec![Point::new(9, 9)]);
        assert_abs_diff_eq!(store.anchors()[0].color[0], 0.9, epsilon = 1e-12);
    }

    #[test]
    fn test_fix_point_outside_image_is_an_error() {
        let image = horizontal_ramp(10, 10);
        let mut store = AnchorStore::new();
        let result = store.set_fix_points(&[Point::new(50, 50)], &image, 2);
        assert!(matches!(result, Err(GlowError::EmptySampleWindow(p)) if p == Point::new(50, 50)));
    }

    #[test]
    fn test_mismatched_colors_rejected() {
        let mut store = AnchorStore::new();
        let result = store.set_fix_points_with_colors(&[Point::new(0, 0)], &[]);
        assert!(matches!(
            result,
            Err(GlowError::MismatchedAnchors { points: 1, colors: 0 })
        ));
    }

    #[test]
    fn test_duplicates_keep_last_color() {
        let mut store = AnchorStore::new();
        store
            .set_fix_points_with_colors(
                &[Point::new(1, 1), Point::new(2, 2), Point::new(1, 1)],
                &[[0.1; 3], [0.2; 3], [0.3; 3]],
            )
            .unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.points(), vec![Point::new(1, 1), Point::new(2, 2)]);
        assert_eq!(store.color(&Point::new(1, 1)), Some([0.3; 3]));
    }

    #[test]
    fn test_auto_sample_windows() {
        let windows = auto_sample_windows(ImageSize::from_width_height(100, 50));
        let sample = ImageSize::from_width_height(20, 10);
        assert_eq!(windows[0], (Point::new(50, 5), sample));
        assert_eq!(windows[1], (Point::new(10, 45), sample));
        assert_eq!(windows[2], (Point::new(90, 45), sample));
    }

    #[test]
    fn test_auto_sample_uses_median() {
        let mut image = ArrayImage::filled(100, 100, ColorModel::Rgb, &[0.1, 0.1, 0.1]);
        // A bright star inside the top window does not move its median
        image.set_pixel(52, 12, ColorModel::Rgb, &[1.0, 1.0, 1.0]);
        let mut store = AnchorStore::new();
        store.auto_sample(&image).unwrap();
        assert_eq!(store.len(), 3);
        for anchor in store.anchors() {
            assert_abs_diff_eq!(anchor.color[0], 0.1, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_sample_modes() {
        let image = horizontal_ramp(10, 1);
        let p = Point::new(4, 0);
        let avg = sample_color(&image, p, 2, SampleMode::Average).unwrap();
        let median = sample_color(&image, p, 2, SampleMode::Median).unwrap();
        let darkest = sample_color(&image, p, 2, SampleMode::Darkest).unwrap();
        assert_abs_diff_eq!(avg[0], 0.4, epsilon = 1e-12);
        assert_abs_diff_eq!(median[0], 0.4, epsilon = 1e-12);
        assert_abs_diff_eq!(darkest[0], 0.2, epsilon = 1e-12);
    }
}
