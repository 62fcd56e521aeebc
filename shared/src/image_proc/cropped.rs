//! Rectangular sub-views of a pixel source.
//!
//! A view may extend past the underlying image. Reads always clamp to the
//! nearest underlying pixel; the [`Clipping`] mode decides whether those
//! clamped pixels count towards region aggregates.

use crate::color::{Color, ColorModel};
use crate::image_proc::pixel::PixelSource;

/// How a view treats coordinates that fall off the underlying image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clipping {
    /// Pixels off the underlying image are excluded from aggregates
    Strict,
    /// Pixels off the underlying image read as the nearest valid pixel
    Lenient,
}

/// Read-only window onto another pixel source
pub struct CroppedView<'a, S: PixelSource + ?Sized> {
    image: &'a S,
    offset_x: i64,
    offset_y: i64,
    width: usize,
    height: usize,
    clipping: Clipping,
}

impl<'a, S: PixelSource + ?Sized> CroppedView<'a, S> {
    /// Create a view whose origin sits at (`x`, `y`) of `image`
    ///
    /// The origin may be negative and the extent may exceed the image.
    pub fn new(image: &'a S, x: i64, y: i64, width: usize, height: usize, clipping: Clipping) -> Self {
        Self {
            image,
            offset_x: x,
            offset_y: y,
            width,
            height,
            clipping,
        }
    }

    /// Square view of side `2 * radius + 1` centered on (`x`, `y`)
    pub fn centered(image: &'a S, x: i64, y: i64, radius: usize, clipping: Clipping) -> Self {
        let r = radius as i64;
        let side = 2 * radius + 1;
        Self::new(image, x - r, y - r, side, side, clipping)
    }
}

impl<S: PixelSource + ?Sized> PixelSource for CroppedView<'_, S> {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn color_model(&self) -> ColorModel {
        self.image.color_model()
    }

    fn native_pixel(&self, x: usize, y: usize) -> Color {
        self.image.pixel(
            x as i64 + self.offset_x,
            y as i64 + self.offset_y,
            self.image.color_model(),
        )
    }

    fn is_really_inside(&self, x: i64, y: i64) -> bool {
        match self.clipping {
            Clipping::Lenient => self.is_inside(x, y),
            Clipping::Strict => {
                self.is_inside(x, y) && self.image.is_inside(x + self.offset_x, y + self.offset_y)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_proc::array_image::ArrayImage;
    use crate::image_proc::pixel::PixelBuffer;
    use approx::assert_abs_diff_eq;

    fn corner_image() -> ArrayImage {
        // 3x3 dark image with one bright top-left pixel
        let mut image = ArrayImage::filled(3, 3, ColorModel::Rgb, &[0.0, 0.0, 0.0]);
        image.set_native_pixel(0, 0, [0.9, 0.9, 0.9]);
        image
    }

    #[test]
    fn test_reads_are_offset_and_clamped() {
        let image = corner_image();
        let view = CroppedView::new(&image, -2, -2, 3, 3, Clipping::Lenient);
        assert_eq!(view.native_pixel(0, 0), [0.9, 0.9, 0.9]);
        assert_eq!(view.native_pixel(2, 2), [0.9, 0.9, 0.9]);
        assert_eq!(view.pixel(5, 5, ColorModel::Rgb), image.native_pixel(0, 0));
    }

    #[test]
    fn test_lenient_counts_replicated_pixels() {
        let image = corner_image();
        let view = CroppedView::centered(&image, 0, 0, 1, Clipping::Lenient);
        // Four of nine window pixels clamp onto the bright corner
        let avg = view.average_pixel(ColorModel::Rgb).unwrap();
        assert_abs_diff_eq!(avg[0], 0.9 * 4.0 / 9.0, epsilon = 1e-12);
    }

    #[test]
    fn test_strict_excludes_pixels_off_the_image() {
        let image = corner_image();
        let view = CroppedView::centered(&image, 0, 0, 1, Clipping::Strict);
        assert!(!view.is_really_inside(0, 0));
        assert!(view.is_really_inside(1, 1));
        let avg = view.average_pixel(ColorModel::Rgb).unwrap();
        assert_abs_diff_eq!(avg[0], 0.9 / 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_strict_view_fully_outside_is_empty() {
        let image = corner_image();
        let view = CroppedView::new(&image, 10, 10, 2, 2, Clipping::Strict);
        assert_eq!(view.median_pixel(ColorModel::Rgb), None);
    }
}
