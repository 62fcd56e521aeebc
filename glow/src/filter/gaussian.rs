//! Gaussian blur approximated by three successive box blurs.
//!
//! Three box filters of carefully chosen widths converge closely on a
//! Gaussian kernel with a given standard deviation. Each box pass is
//! separable: a horizontal moving average followed by a vertical one. Both
//! replicate the first and last sample of a line at the borders, so a
//! uniform image passes through unchanged.
//!
//! Each moving average costs O(1) per sample regardless of radius, which
//! keeps glow-sized blurs (radius in the hundreds of pixels) practical.

use log::debug;
use ndarray::{ArrayView1, ArrayView3, ArrayViewMut1, ArrayViewMut3, Axis, Zip};
use shared::{ArrayImage, ColorModel, ImageSize, PixelSource};

use super::{apply_per_pixel, Filter};

/// Number of box passes used to approximate the Gaussian
const BOX_PASSES: usize = 3;

/// Fast Gaussian blur filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianBlurFilter {
    radius: usize,
    color_model: ColorModel,
}

impl GaussianBlurFilter {
    /// Create a blur whose `radius` is the standard deviation of the Gaussian in pixels
    pub fn new(radius: usize, color_model: ColorModel) -> Self {
        Self {
            radius,
            color_model,
        }
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Box radii of the passes that approximate this blur
    pub fn box_radii(&self) -> Vec<usize> {
        box_sizes_for_gauss(self.radius as f64, BOX_PASSES)
            .into_iter()
            .map(|size| size.saturating_sub(1) / 2)
            .collect()
    }
}

impl Filter for GaussianBlurFilter {
    fn filter(&self, source: &dyn PixelSource, width: usize, height: usize) -> ArrayImage {
        let model = self.color_model;

        let mut image = apply_per_pixel(width, height, model, |x, y| source.pixel(x as i64, y as i64, model));
        let mut scratch = ImageSize::from_width_height(width, height).zeros_rgb();

        let radii = self.box_radii();
        debug!(
            "Gaussian blur sigma={} on {}x{} using box radii {:?}",
            self.radius, width, height, radii
        );

        for radius in radii {
            // Horizontal pass into scratch, vertical pass back into the image
            blur_lines(image.data(), scratch.view_mut(), Axis(1), radius);
            blur_lines(scratch.view(), image.data_mut(), Axis(0), radius);
        }

        image
    }
}

/// Box widths whose successive application approximates a Gaussian
///
/// # Arguments
/// * `sigma` - Standard deviation of the target Gaussian
/// * `passes` - Number of box filters to apply
///
/// # Returns
/// `passes` odd box widths; the first ones are the narrower width
pub fn box_sizes_for_gauss(sigma: f64, passes: usize) -> Vec<usize> {
    let sigma = sigma.max(0.0);
    let n = passes.max(1) as f64;
    let variance12 = 12.0 * sigma * sigma;

    let w_ideal = (variance12 / n + 1.0).sqrt();
    let mut wl = w_ideal.floor();
    if wl % 2.0 == 0.0 {
        wl -= 1.0;
    }
    let wu = wl + 2.0;

    let m_ideal = (variance12 - n * wl * wl - 4.0 * n * wl - 3.0 * n) / (-4.0 * wl - 4.0);
    let m = m_ideal.round();

    (0..passes)
        .map(|i| if (i as f64) < m { wl as usize } else { wu as usize })
        .collect()
}

/// Moving average of width `2 * radius + 1` along every line of `axis`
fn blur_lines(src: ArrayView3<f64>, mut dst: ArrayViewMut3<f64>, axis: Axis, radius: usize) {
    Zip::from(dst.lanes_mut(axis))
        .and(src.lanes(axis))
        .par_for_each(|out, input| box_blur_line(input, out, radius));
}

/// Clamped-edge moving average of one line
fn box_blur_line(input: ArrayView1<f64>, mut out: ArrayViewMut1<f64>, radius: usize) {
    let n = input.len();
    if n == 0 {
        return;
    }
    let last = n as i64 - 1;
    let at = |i: i64| input[i.clamp(0, last) as usize];

    let r = radius as i64;
    let kernel_size = (2 * radius + 1) as f64;
    let mut sum: f64 = (-r..=r).map(at).sum();

    for x in 0..n as i64 {
        out[x as usize] = sum / kernel_size;
        sum += at(x + r + 1) - at(x - r);
    }
}
