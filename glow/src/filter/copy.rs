//! Plain copy into a target of arbitrary size.

use shared::{ArrayImage, ColorModel, PixelBuffer, PixelSource};

use super::Filter;

/// Copies the source; target pixels outside the source become black
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CopyFilter {
    color_model: ColorModel,
}

impl CopyFilter {
    pub fn new(color_model: ColorModel) -> Self {
        Self { color_model }
    }
}

impl Filter for CopyFilter {
    fn filter(&self, source: &dyn PixelSource, width: usize, height: usize) -> ArrayImage {
        let mut target = ArrayImage::new(width, height, self.color_model);
        target.copy_from(source, self.color_model, Some(&[0.0; 3]));
        target
    }
}
