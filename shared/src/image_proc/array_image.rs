//! In-memory image backed by an ndarray sample array.

use ndarray::{Array3, ArrayView3, ArrayViewMut3, Axis};

use crate::algo::process_rows_in_parallel;

use crate::color::{Color, ColorModel};
use crate::image_proc::pixel::{PixelBuffer, PixelSource};
use crate::image_size::ImageSize;

/// Image stored as a (height, width, 3) array of samples in one color model
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayImage {
    data: Array3<f64>,
    color_model: ColorModel,
}

impl ArrayImage {
    /// Create a black image
    pub fn new(width: usize, height: usize, color_model: ColorModel) -> Self {
        Self {
            data: ImageSize::from_width_height(width, height).zeros_rgb(),
            color_model,
        }
    }

    /// Create an image filled with one color given in `color_model`
    pub fn filled(width: usize, height: usize, color_model: ColorModel, color: &Color) -> Self {
        let mut image = Self::new(width, height, color_model);
        image.fill(color_model, color);
        image
    }

    /// Wrap an existing sample array
    ///
    /// # Arguments
    /// * `data` - Samples with shape (height, width, channels)
    /// * `color_model` - Model the samples are stored in
    ///
    /// # Returns
    /// `None` if the last axis does not hold exactly three channels
    pub fn from_array(data: Array3<f64>, color_model: ColorModel) -> Option<Self> {
        if data.dim().2 != 3 {
            return None;
        }
        Some(Self { data, color_model })
    }

    /// Copy any pixel source into a new array image in the source's native model
    pub fn from_source<S: PixelSource + ?Sized>(source: &S) -> Self {
        let mut image = Self::new(source.width(), source.height(), source.color_model());
        for y in 0..source.height() {
            for x in 0..source.width() {
                image.set_native_pixel(x, y, source.native_pixel(x, y));
            }
        }
        image
    }

    /// Overwrite every pixel with `f(x, y)`, computing rows in parallel
    ///
    /// Colors returned by `f` are stored as-is in the native color model.
    pub fn par_fill_with<F>(&mut self, f: F)
    where
        F: Fn(usize, usize) -> Color + Send + Sync,
    {
        let data = std::mem::take(&mut self.data);
        self.data = process_rows_in_parallel(data, None, |y0, chunk: &mut ArrayViewMut3<f64>| {
            for (dy, mut row) in chunk.axis_iter_mut(Axis(0)).enumerate() {
                for (x, mut pixel) in row.axis_iter_mut(Axis(0)).enumerate() {
                    let color = f(x, y0 + dy);
                    pixel[0] = color[0];
                    pixel[1] = color[1];
                    pixel[2] = color[2];
                }
            }
        });
    }

    pub fn data(&self) -> ArrayView3<'_, f64> {
        self.data.view()
    }

    pub fn data_mut(&mut self) -> ArrayViewMut3<'_, f64> {
        self.data.view_mut()
    }
}

impl PixelSource for ArrayImage {
    fn width(&self) -> usize {
        self.data.dim().1
    }

    fn height(&self) -> usize {
        self.data.dim().0
    }

    fn color_model(&self) -> ColorModel {
        self.color_model
    }

    fn native_pixel(&self, x: usize, y: usize) -> Color {
        [
            self.data[[y, x, 0]],
            self.data[[y, x, 1]],
            self.data[[y, x, 2]],
        ]
    }
}

impl PixelBuffer for ArrayImage {
    fn set_native_pixel(&mut self, x: usize, y: usize, color: Color) {
        for (c, value) in color.into_iter().enumerate() {
            self.data[[y, x, c]] = value;
        }
    }
}
