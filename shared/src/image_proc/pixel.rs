//! Pixel access traits shared by every filter and estimator.
//!
//! [`PixelSource`] is the read side of the pixel buffer contract: logical
//! dimensions, a native color model and clamped, model-converting reads.
//! [`PixelBuffer`] adds writes that silently drop out-of-bounds coordinates.
//!
//! Region aggregates (average, median, darkest, brightest) only visit pixels
//! for which [`PixelSource::is_really_inside`] holds. Plain buffers treat every
//! logical pixel as really inside; a strictly clipped
//! [`CroppedView`](super::cropped::CroppedView) excludes pixels that fall off
//! the underlying image so that sample counts stay honest near borders.

use std::cmp::Ordering;

use crate::color::{convert, Color, ColorModel};
use crate::image_size::ImageSize;

/// Read access to a 2D grid of three-channel samples
pub trait PixelSource: Sync {
    /// Logical width in pixels
    fn width(&self) -> usize;

    /// Logical height in pixels
    fn height(&self) -> usize;

    /// Color model the samples are stored in
    fn color_model(&self) -> ColorModel;

    /// Read a sample in the native color model
    ///
    /// Callers guarantee `x < width()` and `y < height()`.
    fn native_pixel(&self, x: usize, y: usize) -> Color;

    fn size(&self) -> ImageSize {
        ImageSize::from_width_height(self.width(), self.height())
    }

    /// Check whether a coordinate lies within the logical bounds
    fn is_inside(&self, x: i64, y: i64) -> bool {
        self.size().contains(x, y)
    }

    /// Check whether a coordinate maps to real image data
    ///
    /// Only differs from [`is_inside`](Self::is_inside) for strictly clipped views.
    fn is_really_inside(&self, x: i64, y: i64) -> bool {
        self.is_inside(x, y)
    }

    /// Read a sample converted to `model`, clamping the coordinate to the nearest valid pixel
    ///
    /// An empty buffer has no nearest pixel and reads as black.
    fn pixel(&self, x: i64, y: i64, model: ColorModel) -> Color {
        if self.width() == 0 || self.height() == 0 {
            return [0.0; 3];
        }
        let (xx, yy) = self.size().clamp(x, y);
        convert(&self.native_pixel(xx, yy), self.color_model(), model)
    }

    /// Mean of all really-inside samples, averaged in `model`
    ///
    /// Returns `None` when no pixel is really inside.
    fn average_pixel(&self, model: ColorModel) -> Option<Color> {
        let mut sum = [0.0; 3];
        let mut n = 0usize;
        for_each_really_inside(self, |x, y| {
            let color = self.pixel(x, y, model);
            for c in 0..3 {
                sum[c] += color[c];
            }
            n += 1;
        });

        if n == 0 {
            return None;
        }
        Some(sum.map(|s| s / n as f64))
    }

    /// Median of all really-inside samples ordered by HSV value, saturation, hue
    ///
    /// See [`median_hsv`] for the even-count convention. Returns `None` when
    /// no pixel is really inside.
    fn median_pixel(&self, model: ColorModel) -> Option<Color> {
        let mut samples = Vec::with_capacity(self.size().pixel_count());
        for_each_really_inside(self, |x, y| samples.push(self.pixel(x, y, ColorModel::Hsv)));
        median_hsv(&mut samples).map(|hsv| convert(&hsv, ColorModel::Hsv, model))
    }

    /// Channel-wise median of all really-inside samples in `model`
    ///
    /// Each channel is sorted independently, so the result need not be a
    /// color that occurs in the region.
    fn median_pixel_per_sample(&self, model: ColorModel) -> Option<Color> {
        let mut channels: [Vec<f64>; 3] = Default::default();
        for_each_really_inside(self, |x, y| {
            let color = self.pixel(x, y, model);
            for c in 0..3 {
                channels[c].push(color[c]);
            }
        });

        if channels[0].is_empty() {
            return None;
        }
        let mut result = [0.0; 3];
        for c in 0..3 {
            channels[c].sort_by(f64::total_cmp);
            result[c] = median_of_sorted(&channels[c]);
        }
        Some(result)
    }

    /// Really-inside sample with the lowest HSV value, returned in `model`
    fn darkest_pixel(&self, model: ColorModel) -> Option<Color> {
        extreme_by_value(self, model, Ordering::Less)
    }

    /// Really-inside sample with the highest HSV value, returned in `model`
    fn brightest_pixel(&self, model: ColorModel) -> Option<Color> {
        extreme_by_value(self, model, Ordering::Greater)
    }
}

/// Write access on top of [`PixelSource`]
pub trait PixelBuffer: PixelSource {
    /// Write a sample in the native color model
    ///
    /// Callers guarantee `x < width()` and `y < height()`.
    fn set_native_pixel(&mut self, x: usize, y: usize, color: Color);

    /// Write a sample given in `model`; out-of-bounds writes are ignored
    fn set_pixel(&mut self, x: i64, y: i64, model: ColorModel, color: &Color) {
        if self.is_inside(x, y) {
            let native = convert(color, model, self.color_model());
            self.set_native_pixel(x as usize, y as usize, native);
        }
    }

    /// Set every pixel to `color` given in `model`
    fn fill(&mut self, model: ColorModel, color: &Color) {
        let native = convert(color, model, self.color_model());
        for y in 0..self.height() {
            for x in 0..self.width() {
                self.set_native_pixel(x, y, native);
            }
        }
    }

    /// Copy `source` pixel by pixel, converting through `model`
    ///
    /// Reads from `source` clamp at its borders. When `outside_color` is given,
    /// pixels outside the source bounds take that color instead.
    fn copy_from<S: PixelSource + ?Sized>(
        &mut self,
        source: &S,
        model: ColorModel,
        outside_color: Option<&Color>,
    ) where
        Self: Sized,
    {
        for y in 0..self.height() as i64 {
            for x in 0..self.width() as i64 {
                let color = match outside_color {
                    Some(outside) if !source.is_inside(x, y) => *outside,
                    _ => source.pixel(x, y, model),
                };
                self.set_pixel(x, y, model, &color);
            }
        }
    }
}

/// Ordering used by every color median: HSV value first, then saturation, then hue
pub fn compare_hsv(a: &Color, b: &Color) -> Ordering {
    a[ColorModel::V]
        .total_cmp(&b[ColorModel::V])
        .then(a[ColorModel::S].total_cmp(&b[ColorModel::S]))
        .then(a[ColorModel::H].total_cmp(&b[ColorModel::H]))
}

/// Indices averaged for the median of `n` sorted samples
///
/// Odd counts use the single middle index. Even counts pair `n/2` with
/// `n/2 + 1`, which sits one above the textbook pair; the upper index is
/// clamped to `n - 1` so two samples never read past the end.
pub fn median_indices(n: usize) -> (usize, usize) {
    let half = n / 2;
    if n % 2 == 1 {
        (half, half)
    } else {
        (half, (half + 1).min(n.saturating_sub(1)))
    }
}

/// Sort HSV samples with [`compare_hsv`] and return their median in HSV
pub fn median_hsv(samples: &mut [Color]) -> Option<Color> {
    if samples.is_empty() {
        return None;
    }
    samples.sort_by(compare_hsv);

    let (lo, hi) = median_indices(samples.len());
    let (a, b) = (samples[lo], samples[hi]);
    Some([
        (a[0] + b[0]) / 2.0,
        (a[1] + b[1]) / 2.0,
        (a[2] + b[2]) / 2.0,
    ])
}

fn median_of_sorted(values: &[f64]) -> f64 {
    let (lo, hi) = median_indices(values.len());
    (values[lo] + values[hi]) / 2.0
}

fn for_each_really_inside<S, F>(source: &S, mut f: F)
where
    S: PixelSource + ?Sized,
    F: FnMut(i64, i64),
{
    for y in 0..source.height() as i64 {
        for x in 0..source.width() as i64 {
            if source.is_really_inside(x, y) {
                f(x, y);
            }
        }
    }
}

fn extreme_by_value<S>(source: &S, model: ColorModel, wanted: Ordering) -> Option<Color>
where
    S: PixelSource + ?Sized,
{
    let mut best: Option<(f64, i64, i64)> = None;
    for_each_really_inside(source, |x, y| {
        let v = source.pixel(x, y, ColorModel::Hsv)[ColorModel::V];
        let better = match best {
            None => true,
            Some((best_v, _, _)) => v.total_cmp(&best_v) == wanted,
        };
        if better {
            best = Some((v, x, y));
        }
    });
    best.map(|(_, x, y)| source.pixel(x, y, model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_proc::array_image::ArrayImage;
    use approx::assert_abs_diff_eq;

    fn gray_ramp(width: usize, height: usize) -> ArrayImage {
        let mut image = ArrayImage::new(width, height, ColorModel::Rgb);
        for y in 0..height {
            for x in 0..width {
                let v = (y * width + x) as f64 / (width * height) as f64;
                image.set_native_pixel(x, y, [v, v, v]);
            }
        }
        image
    }

    #[test]
    fn test_reads_clamp_to_edges() {
        let image = gray_ramp(4, 3);
        assert_eq!(image.pixel(-3, -3, ColorModel::Rgb), image.native_pixel(0, 0));
        assert_eq!(image.pixel(10, 1, ColorModel::Rgb), image.native_pixel(3, 1));
        assert_eq!(image.pixel(2, 99, ColorModel::Rgb), image.native_pixel(2, 2));
    }

    #[test]
    fn test_out_of_bounds_writes_are_ignored() {
        let mut image = ArrayImage::new(2, 2, ColorModel::Rgb);
        image.set_pixel(-1, 0, ColorModel::Rgb, &[1.0, 1.0, 1.0]);
        image.set_pixel(2, 1, ColorModel::Rgb, &[1.0, 1.0, 1.0]);
        assert_eq!(image.average_pixel(ColorModel::Rgb), Some([0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_reads_convert_color_model() {
        let mut image = ArrayImage::new(1, 1, ColorModel::Rgb);
        image.set_pixel(0, 0, ColorModel::Hsv, &[120.0, 1.0, 0.5]);
        let rgb = image.pixel(0, 0, ColorModel::Rgb);
        assert_abs_diff_eq!(rgb[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rgb[1], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(rgb[2], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_average_pixel() {
        let mut image = ArrayImage::new(2, 1, ColorModel::Rgb);
        image.set_native_pixel(0, 0, [0.2, 0.4, 0.0]);
        image.set_native_pixel(1, 0, [0.4, 0.0, 1.0]);
        let avg = image.average_pixel(ColorModel::Rgb).unwrap();
        assert_abs_diff_eq!(avg[0], 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(avg[1], 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(avg[2], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_median_odd_count_picks_middle() {
        let mut image = ArrayImage::new(3, 1, ColorModel::Rgb);
        image.set_native_pixel(0, 0, [0.9, 0.9, 0.9]);
        image.set_native_pixel(1, 0, [0.1, 0.1, 0.1]);
        image.set_native_pixel(2, 0, [0.5, 0.5, 0.5]);
        let median = image.median_pixel(ColorModel::Rgb).unwrap();
        assert_abs_diff_eq!(median[0], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_median_even_count_uses_upper_pair() {
        let mut image = ArrayImage::new(4, 1, ColorModel::Rgb);
        for (x, v) in [0.1, 0.2, 0.3, 0.4].into_iter().enumerate() {
            image.set_native_pixel(x, 0, [v, v, v]);
        }
        // indices 2 and 3 of the sorted samples
        let median = image.median_pixel(ColorModel::Rgb).unwrap();
        assert_abs_diff_eq!(median[0], 0.35, epsilon = 1e-12);
    }

    #[test]
    fn test_median_of_two_stays_in_bounds() {
        assert_eq!(median_indices(2), (1, 1));
        assert_eq!(median_indices(1), (0, 0));
        assert_eq!(median_indices(6), (3, 4));
    }

    #[test]
    fn test_median_per_sample_is_channel_independent() {
        let mut image = ArrayImage::new(3, 1, ColorModel::Rgb);
        image.set_native_pixel(0, 0, [0.9, 0.1, 0.5]);
        image.set_native_pixel(1, 0, [0.1, 0.5, 0.9]);
        image.set_native_pixel(2, 0, [0.5, 0.9, 0.1]);
        assert_eq!(
            image.median_pixel_per_sample(ColorModel::Rgb),
            Some([0.5, 0.5, 0.5])
        );
    }

    #[test]
    fn test_darkest_and_brightest() {
        let image = gray_ramp(3, 3);
        assert_eq!(image.darkest_pixel(ColorModel::Rgb), Some([0.0, 0.0, 0.0]));
        let bright = image.brightest_pixel(ColorModel::Rgb).unwrap();
        assert_abs_diff_eq!(bright[0], 8.0 / 9.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_buffer_has_no_aggregates() {
        let image = ArrayImage::new(0, 0, ColorModel::Rgb);
        assert_eq!(image.average_pixel(ColorModel::Rgb), None);
        assert_eq!(image.median_pixel(ColorModel::Rgb), None);
        assert_eq!(image.darkest_pixel(ColorModel::Rgb), None);
        assert_eq!(image.pixel(0, 0, ColorModel::Rgb), [0.0; 3]);
    }

    #[test]
    fn test_copy_from_fills_outside() {
        let source = gray_ramp(2, 2);
        let mut target = ArrayImage::new(3, 3, ColorModel::Rgb);
        target.copy_from(&source, ColorModel::Rgb, Some(&[1.0, 0.0, 0.0]));
        assert_eq!(target.native_pixel(1, 1), source.native_pixel(1, 1));
        assert_eq!(target.native_pixel(2, 0), [1.0, 0.0, 0.0]);
        assert_eq!(target.native_pixel(0, 2), [1.0, 0.0, 0.0]);
    }
}
