//! Direct box blur over a square window.

use shared::{ArrayImage, ColorModel, PixelSource};

use super::{apply_per_pixel, Filter};

/// Mean of the `(2 * radius + 1)²` window around each pixel
///
/// Window reads clamp to the source borders, so edge pixels are weighted
/// more heavily near the image boundary. Costs O(radius²) per pixel; the
/// separable passes of [`GaussianBlurFilter`](super::GaussianBlurFilter)
/// are the better choice for large radii.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxBlurFilter {
    radius: usize,
    color_model: ColorModel,
}

impl BoxBlurFilter {
    pub fn new(radius: usize, color_model: ColorModel) -> Self {
        Self {
            radius,
            color_model,
        }
    }
}

impl Filter for BoxBlurFilter {
    fn filter(&self, source: &dyn PixelSource, width: usize, height: usize) -> ArrayImage {
        let model = self.color_model;
        let r = self.radius as i64;
        let kernel_size = ((2 * r + 1) * (2 * r + 1)) as f64;

        apply_per_pixel(width, height, model, |x, y| {
            let (x, y) = (x as i64, y as i64);
            let mut sum = [0.0; 3];
            for ky in y - r..=y + r {
                for kx in x - r..=x + r {
                    let color = source.pixel(kx, ky, model);
                    for c in 0..3 {
                        sum[c] += color[c];
                    }
                }
            }
            sum.map(|s| s / kernel_size)
        })
    }
}
