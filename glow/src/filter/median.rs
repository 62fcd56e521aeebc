//! Rank filters: true windowed median and the separable pseudo-median.
//!
//! All medians order samples by HSV value, then saturation, then hue,
//! whatever color model the filter outputs in. Window samples that fall off
//! the source are skipped rather than replicated, so windows near the
//! border hold fewer samples.

use log::debug;
use shared::color::convert;
use shared::image_proc::pixel::compare_hsv;
use shared::{ArrayImage, Clipping, Color, ColorModel, CroppedView, PixelSource};

use super::{apply_per_pixel, Filter};

/// True 2D median over the `(2 * radius + 1)²` window around each pixel
///
/// Even sample counts average the two samples at sorted indices `n/2` and
/// `n/2 + 1` (upper index clamped), matching
/// [`PixelSource::median_pixel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MedianFilter {
    radius: usize,
    color_model: ColorModel,
}

impl MedianFilter {
    pub fn new(radius: usize, color_model: ColorModel) -> Self {
        Self {
            radius,
            color_model,
        }
    }
}

impl Filter for MedianFilter {
    fn filter(&self, source: &dyn PixelSource, width: usize, height: usize) -> ArrayImage {
        let model = self.color_model;
        let radius = self.radius;
        debug!("Median filter radius={radius} on {width}x{height}");

        apply_per_pixel(width, height, model, |x, y| {
            let (x, y) = (x as i64, y as i64);
            CroppedView::centered(source, x, y, radius, Clipping::Strict)
                .median_pixel(model)
                .unwrap_or_else(|| source.pixel(x, y, model))
        })
    }
}

/// Direction of a one-dimensional median window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Horizontal,
    Vertical,
}

/// Median of the in-bounds samples along a line through (x, y)
///
/// Returns the sample at sorted index `n/2` without averaging.
fn line_median(
    source: &dyn PixelSource,
    x: i64,
    y: i64,
    radius: usize,
    direction: Direction,
    model: ColorModel,
) -> Color {
    let r = radius as i64;
    let mut samples: Vec<(Color, Color)> = Vec::with_capacity(2 * radius + 1);
    for d in -r..=r {
        let (xx, yy) = match direction {
            Direction::Horizontal => (x + d, y),
            Direction::Vertical => (x, y + d),
        };
        if source.is_really_inside(xx, yy) {
            let sample = source.pixel(xx, yy, model);
            let key = convert(&sample, model, ColorModel::Hsv);
            samples.push((key, sample));
        }
    }

    if samples.is_empty() {
        return source.pixel(x, y, model);
    }
    samples.sort_by(|a, b| compare_hsv(&a.0, &b.0));
    samples[samples.len() / 2].1
}

/// Median over a row window of `2 * radius + 1` pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalMedianFilter {
    radius: usize,
    color_model: ColorModel,
}

impl HorizontalMedianFilter {
    pub fn new(radius: usize, color_model: ColorModel) -> Self {
        Self {
            radius,
            color_model,
        }
    }
}

impl Filter for HorizontalMedianFilter {
    fn filter(&self, source: &dyn PixelSource, width: usize, height: usize) -> ArrayImage {
        let (radius, model) = (self.radius, self.color_model);
        apply_per_pixel(width, height, model, |x, y| {
            line_median(source, x as i64, y as i64, radius, Direction::Horizontal, model)
        })
    }
}

/// Median over a column window of `2 * radius + 1` pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalMedianFilter {
    radius: usize,
    color_model: ColorModel,
}

impl VerticalMedianFilter {
    pub fn new(radius: usize, color_model: ColorModel) -> Self {
        Self {
            radius,
            color_model,
        }
    }
}

impl Filter for VerticalMedianFilter {
    fn filter(&self, source: &dyn PixelSource, width: usize, height: usize) -> ArrayImage {
        let (radius, model) = (self.radius, self.color_model);
        apply_per_pixel(width, height, model, |x, y| {
            line_median(source, x as i64, y as i64, radius, Direction::Vertical, model)
        })
    }
}

/// Column median followed by row median
///
/// A cheap stand-in for the 2D median that is good enough to remove stars
/// before blurring. It is not equal to the true median in general.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PseudoMedianFilter {
    vertical: VerticalMedianFilter,
    horizontal: HorizontalMedianFilter,
}

impl PseudoMedianFilter {
    pub fn new(radius: usize, color_model: ColorModel) -> Self {
        Self {
            vertical: VerticalMedianFilter::new(radius, color_model),
            horizontal: HorizontalMedianFilter::new(radius, color_model),
        }
    }
}

impl Filter for PseudoMedianFilter {
    fn filter(&self, source: &dyn PixelSource, width: usize, height: usize) -> ArrayImage {
        debug!(
            "Pseudo-median filter radius={} on {width}x{height}",
            self.horizontal.radius
        );
        let columns = self.vertical.filter(source, width, height);
        self.horizontal.filter(&columns, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::test_util::{assert_uniform, speck, uniform};
    use shared::PixelBuffer;

    #[test]
    fn test_median_removes_isolated_speck() {
        let image = speck(9, 9, 4, 4, 0.1);
        let filtered = MedianFilter::new(1, ColorModel::Rgb).filter_same_size(&image);
        assert_uniform(&filtered, [0.1, 0.1, 0.1], 1e-12);
    }

    #[test]
    fn test_median_on_uniform_window_returns_that_color() {
        let color = [0.25, 0.5, 0.75];
        let image = uniform(6, 4, color);
        for radius in [0, 1, 2, 5] {
            let filtered = MedianFilter::new(radius, ColorModel::Rgb).filter_same_size(&image);
            assert_uniform(&filtered, color, 1e-12);
        }
    }

    #[test]
    fn test_median_border_windows_skip_missing_samples() {
        // Corner window holds 4 samples; indices 2 and 3 of the sorted list are averaged
        let mut image = uniform(3, 3, [0.0, 0.0, 0.0]);
        image.set_native_pixel(0, 0, [0.2, 0.2, 0.2]);
        image.set_native_pixel(1, 0, [0.4, 0.4, 0.4]);
        image.set_native_pixel(0, 1, [0.6, 0.6, 0.6]);
        image.set_native_pixel(1, 1, [0.8, 0.8, 0.8]);
        let filtered = MedianFilter::new(1, ColorModel::Rgb).filter_same_size(&image);
        let corner = filtered.native_pixel(0, 0);
        assert!((corner[0] - 0.7).abs() < 1e-12, "corner median {corner:?}");
    }

    #[test]
    fn test_horizontal_median_only_looks_along_rows() {
        let mut image = uniform(5, 3, [0.0, 0.0, 0.0]);
        for x in 0..5 {
            image.set_native_pixel(x, 1, [1.0, 1.0, 1.0]);
        }
        let filtered = HorizontalMedianFilter::new(1, ColorModel::Rgb).filter_same_size(&image);
        assert_eq!(filtered.native_pixel(2, 1), [1.0, 1.0, 1.0]);
        assert_eq!(filtered.native_pixel(2, 0), [0.0, 0.0, 0.0]);

        let filtered = VerticalMedianFilter::new(1, ColorModel::Rgb).filter_same_size(&image);
        assert_eq!(filtered.native_pixel(2, 1), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_line_median_returns_existing_sample() {
        let mut image = uniform(4, 1, [0.0, 0.0, 0.0]);
        image.set_native_pixel(0, 0, [0.9, 0.1, 0.1]);
        image.set_native_pixel(1, 0, [0.1, 0.5, 0.1]);
        image.set_native_pixel(2, 0, [0.2, 0.2, 0.3]);
        let filtered = HorizontalMedianFilter::new(1, ColorModel::Rgb).filter_same_size(&image);
        // brightness 0.5 is the middle of 0.9, 0.5, 0.3
        assert_eq!(filtered.native_pixel(1, 0), [0.1, 0.5, 0.1]);
    }

    #[test]
    fn test_pseudo_median_is_idempotent_on_flat_image() {
        let color = [0.12, 0.34, 0.56];
        let image = uniform(11, 7, color);
        let filtered = PseudoMedianFilter::new(3, ColorModel::Rgb).filter_same_size(&image);
        assert_eq!(filtered, image);
    }

    #[test]
    fn test_pseudo_median_removes_star() {
        let mut image = uniform(15, 15, [0.05, 0.05, 0.05]);
        for y in 6..=8 {
            for x in 6..=8 {
                image.set_native_pixel(x, y, [1.0, 1.0, 1.0]);
            }
        }
        let filtered = PseudoMedianFilter::new(3, ColorModel::Rgb).filter_same_size(&image);
        assert_uniform(&filtered, [0.05, 0.05, 0.05], 1e-12);
    }

    #[test]
    fn test_hsv_output_model() {
        let image = uniform(3, 3, [0.0, 0.0, 0.5]);
        let filtered = PseudoMedianFilter::new(1, ColorModel::Hsv).filter_same_size(&image);
        assert_eq!(filtered.color_model(), ColorModel::Hsv);
        let hsv = filtered.native_pixel(1, 1);
        assert!((hsv[0] - 240.0).abs() < 1e-9);
        assert_eq!(&hsv[1..], &[1.0, 0.5]);
    }
}
