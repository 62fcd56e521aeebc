//! False-color view of the difference between an image and its glow.
//!
//! The chosen sample channel of `input - glow` is amplified by a gain factor.
//! Negative deltas (glow brighter than input) are shown in red, positive
//! deltas in blue, each saturating at 1.

use log::debug;
use shared::color::{convert, sample_distance, SampleChannel};
use shared::{ArrayImage, Color, ColorModel, PixelSource};

use crate::error::{GlowError, Result};
use crate::filter::apply_per_pixel;

/// Default gain for delta images
pub const DEFAULT_DELTA_FACTOR: f64 = 5.0;

/// Tint for a signed, normalized delta
pub fn delta_color(delta: f64, factor: f64) -> Color {
    if delta < 0.0 {
        let strength = -delta * factor;
        [strength.min(1.0), (strength * 0.5).min(1.0), (strength * 0.5).min(1.0)]
    } else {
        let strength = delta * factor;
        [(strength * 0.5).min(1.0), (strength * 0.5).min(1.0), strength.min(1.0)]
    }
}

/// Signed difference of one sample channel between two RGB colors
///
/// Hue differences wrap into [-180, 180] degrees and are divided by 180.
pub fn channel_delta(input: &Color, glow: &Color, channel: SampleChannel) -> f64 {
    let model = channel.color_model();
    let a = convert(input, ColorModel::Rgb, model);
    let b = convert(glow, ColorModel::Rgb, model);
    let difference = [a[0] - b[0], a[1] - b[1], a[2] - b[2]];
    sample_distance(&difference, model, channel.sample_index(), true)
}

/// Render the delta image of `input` against `glow`
///
/// # Arguments
/// * `input` - Original image
/// * `glow` - Estimated glow of the same size
/// * `channel` - Sample channel to compare
/// * `factor` - Gain applied before saturating
///
/// # Returns
/// An RGB image of the same size
pub fn delta_image(
    input: &dyn PixelSource,
    glow: &dyn PixelSource,
    channel: SampleChannel,
    factor: f64,
) -> Result<ArrayImage> {
    if input.size() != glow.size() {
        return Err(GlowError::SizeMismatch(input.size(), glow.size()));
    }
    debug!("Delta image of {:?} with factor {factor}", channel);

    Ok(apply_per_pixel(input.width(), input.height(), ColorModel::Rgb, |x, y| {
        let (x, y) = (x as i64, y as i64);
        let delta = channel_delta(
            &input.pixel(x, y, ColorModel::Rgb),
            &glow.pixel(x, y, ColorModel::Rgb),
            channel,
        );
        delta_color(delta, factor)
    }))
}
