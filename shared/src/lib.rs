//! Shared components and utilities for sky glow processing.
//!
//! This crate contains the pixel buffer contract consumed by every filter:
//! color models and conversions, read/write pixel access traits, an
//! ndarray-backed image, cropped views with strict or lenient clipping,
//! channel histograms and the row-parallel driver used by per-pixel
//! operations.

pub mod algo;
pub mod color;
pub mod image_proc;
pub mod image_size;

pub use color::{Color, ColorModel};
pub use image_proc::array_image::ArrayImage;
pub use image_proc::cropped::{Clipping, CroppedView};
pub use image_proc::histogram::Histogram;
pub use image_proc::pixel::{PixelBuffer, PixelSource};
pub use image_size::ImageSize;
