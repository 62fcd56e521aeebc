//! Image filters used to estimate glow or to pre-filter before estimation.
//!
//! Every filter reads a [`PixelSource`] and produces a new [`ArrayImage`] of
//! the requested target size in the filter's color model. Reads outside the
//! source clamp to its borders unless a filter documents otherwise.
//!
//! Filters that compute each output pixel independently are written as a
//! plain per-pixel function handed to [`apply_per_pixel`], which fills rows
//! in parallel.

pub mod box_blur;
pub mod copy;
pub mod gaussian;
pub mod median;

use shared::{ArrayImage, Color, ColorModel, PixelSource};

pub use box_blur::BoxBlurFilter;
pub use copy::CopyFilter;
pub use gaussian::{box_sizes_for_gauss, GaussianBlurFilter};
pub use median::{HorizontalMedianFilter, MedianFilter, PseudoMedianFilter, VerticalMedianFilter};

/// An operation producing a new image from a source image
pub trait Filter: Send + Sync {
    /// Filter `source` into a new image of `width` x `height`
    fn filter(&self, source: &dyn PixelSource, width: usize, height: usize) -> ArrayImage;

    /// Filter `source` into a new image of the same size
    fn filter_same_size(&self, source: &dyn PixelSource) -> ArrayImage {
        self.filter(source, source.width(), source.height())
    }
}

/// Build an image by evaluating `pixel_fn` at every coordinate
///
/// # Arguments
/// * `width`, `height` - Output dimensions
/// * `color_model` - Model of the colors returned by `pixel_fn`
/// * `pixel_fn` - Computes the output color at (x, y)
///
/// # Returns
/// A new image in `color_model`
pub fn apply_per_pixel<F>(width: usize, height: usize, color_model: ColorModel, pixel_fn: F) -> ArrayImage
where
    F: Fn(usize, usize) -> Color + Send + Sync,
{
    let mut target = ArrayImage::new(width, height, color_model);
    target.par_fill_with(pixel_fn);
    target
}
