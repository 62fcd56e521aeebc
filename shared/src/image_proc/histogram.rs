//! Per-channel sample histograms.

use ndarray::{Array1, Array2};

use crate::color::ColorModel;
use crate::image_proc::pixel::PixelSource;

/// Bin counts of the three channels of an image region
///
/// Samples are binned by `floor(value * bin_count)` clamped to the valid bin
/// range. HSV hue is divided by 360 first so every channel spans [0, 1].
#[derive(Debug, Clone)]
pub struct Histogram {
    color_model: ColorModel,
    bins: Array2<u64>,
    sample_count: u64,
    max_bin_count: u64,
}

impl Histogram {
    /// Create an empty histogram
    ///
    /// # Arguments
    /// * `color_model` - Model samples are read in
    /// * `bin_count` - Number of bins per channel, at least one
    pub fn new(color_model: ColorModel, bin_count: usize) -> Self {
        Self {
            color_model,
            bins: Array2::zeros((3, bin_count.max(1))),
            sample_count: 0,
            max_bin_count: 0,
        }
    }

    pub fn color_model(&self) -> ColorModel {
        self.color_model
    }

    pub fn bin_count(&self) -> usize {
        self.bins.ncols()
    }

    /// Number of pixels added since the last reset
    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    /// Replace the contents with the samples of the whole image
    pub fn sample_image<S: PixelSource + ?Sized>(&mut self, image: &S) {
        self.sample_region(image, 0, 0, image.width(), image.height());
    }

    /// Replace the contents with the samples of a region
    ///
    /// Pixels of the region outside the image are skipped.
    pub fn sample_region<S: PixelSource + ?Sized>(
        &mut self,
        image: &S,
        x: i64,
        y: i64,
        width: usize,
        height: usize,
    ) {
        self.clear();
        for iy in 0..height as i64 {
            for ix in 0..width as i64 {
                let (px, py) = (x + ix, y + iy);
                if !image.is_inside(px, py) {
                    continue;
                }
                let pixel = image.pixel(px, py, self.color_model);
                for (channel, value) in pixel.into_iter().enumerate() {
                    let bin = self.bin_index(channel, value);
                    self.bins[[channel, bin]] += 1;
                }
                self.sample_count += 1;
            }
        }
        self.max_bin_count = self.bins.iter().copied().max().unwrap_or(0);
    }

    pub fn clear(&mut self) {
        self.bins.fill(0);
        self.sample_count = 0;
        self.max_bin_count = 0;
    }

    /// Raw counts of one channel
    pub fn raw_bins(&self, channel: usize) -> Array1<u64> {
        self.bins.row(channel).to_owned()
    }

    /// Bin of one channel relative to the fullest bin of any channel
    ///
    /// An empty histogram reports 0 for every bin.
    pub fn bin(&self, channel: usize, bin: usize) -> f64 {
        if self.max_bin_count == 0 {
            return 0.0;
        }
        self.bins[[channel, bin]] as f64 / self.max_bin_count as f64
    }

    /// All normalized bins of one channel
    pub fn normalized_bins(&self, channel: usize) -> Array1<f64> {
        (0..self.bin_count()).map(|b| self.bin(channel, b)).collect()
    }

    fn bin_index(&self, channel: usize, value: f64) -> usize {
        let value = if self.color_model == ColorModel::Hsv && channel == ColorModel::H {
            value / 360.0
        } else {
            value
        };
        let last = self.bin_count() as i64 - 1;
        ((value * self.bin_count() as f64) as i64).clamp(0, last) as usize
    }
}
