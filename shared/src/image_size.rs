//! Image dimensions and size utilities

use ndarray::Array3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Image dimensions structure
///
/// Represents the width and height of an image or view.
/// Provides convenience methods for bounds checks and array creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    /// Image width in pixels
    pub width: usize,
    /// Image height in pixels
    pub height: usize,
}

impl ImageSize {
    /// Create a new ImageSize
    pub fn from_width_height(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Create a zeroed three-channel sample array with this size
    ///
    /// Returns an ndarray Array3 with shape (height, width, 3).
    /// Note the row-major ordering convention: rows (height) come first.
    pub fn zeros_rgb(&self) -> Array3<f64> {
        Array3::zeros((self.height, self.width, 3))
    }

    /// Get total number of pixels
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Check whether a signed coordinate lies within these dimensions
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Clamp a signed coordinate to the nearest valid pixel
    ///
    /// Must not be called on an empty size.
    pub fn clamp(&self, x: i64, y: i64) -> (usize, usize) {
        let xx = x.clamp(0, self.width as i64 - 1) as usize;
        let yy = y.clamp(0, self.height as i64 - 1) as usize;
        (xx, yy)
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
