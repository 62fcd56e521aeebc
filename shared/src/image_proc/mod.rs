pub mod array_image;
pub mod cropped;
pub mod histogram;
pub mod pixel;

pub use array_image::ArrayImage;
pub use cropped::{Clipping, CroppedView};
pub use histogram::Histogram;
pub use pixel::{compare_hsv, median_hsv, median_indices, PixelBuffer, PixelSource};
