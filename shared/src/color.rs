//! Color models and conversions.
//!
//! Pixels are carried as three `f64` samples whose meaning depends on the
//! [`ColorModel`]. RGB samples are nominally in [0, 1] but never clamped.
//! HSV stores hue in degrees [0, 360), saturation and value in [0, 1].

use serde::{Deserialize, Serialize};

/// Three channel samples in some color model
pub type Color = [f64; 3];

/// Color model tag for pixel samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorModel {
    #[default]
    Rgb,
    Hsv,
}

impl ColorModel {
    pub const R: usize = 0;
    pub const G: usize = 1;
    pub const B: usize = 2;

    pub const H: usize = 0;
    pub const S: usize = 1;
    pub const V: usize = 2;
}

/// A single sample channel within a color model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleChannel {
    Red,
    Green,
    Blue,
    Hue,
    Saturation,
    Brightness,
}

impl SampleChannel {
    /// Color model the channel belongs to
    pub fn color_model(&self) -> ColorModel {
        match self {
            SampleChannel::Red | SampleChannel::Green | SampleChannel::Blue => ColorModel::Rgb,
            _ => ColorModel::Hsv,
        }
    }

    /// Index of the channel within its color model
    pub fn sample_index(&self) -> usize {
        match self {
            SampleChannel::Red => ColorModel::R,
            SampleChannel::Green => ColorModel::G,
            SampleChannel::Blue => ColorModel::B,
            SampleChannel::Hue => ColorModel::H,
            SampleChannel::Saturation => ColorModel::S,
            SampleChannel::Brightness => ColorModel::V,
        }
    }
}

/// Convert RGB samples to HSV (hue in degrees)
pub fn rgb_to_hsv(rgb: &Color) -> Color {
    let [r, g, b] = *rgb;
    let cmax = r.max(g).max(b);
    let cmin = r.min(g).min(b);

    let v = cmax;
    let s = if cmax != 0.0 { (cmax - cmin) / cmax } else { 0.0 };

    let h = if s == 0.0 {
        0.0
    } else {
        let redc = (cmax - r) / (cmax - cmin);
        let greenc = (cmax - g) / (cmax - cmin);
        let bluec = (cmax - b) / (cmax - cmin);
        let mut h = if r == cmax {
            bluec - greenc
        } else if g == cmax {
            2.0 + redc - bluec
        } else {
            4.0 + greenc - redc
        } / 6.0;
        if h < 0.0 {
            h += 1.0;
        }
        h
    };

    [h * 360.0, s, v]
}

/// Convert HSV samples (hue in degrees, any range) to RGB
pub fn hsv_to_rgb(hsv: &Color) -> Color {
    let [h, s, v] = *hsv;
    if s == 0.0 {
        return [v, v, v];
    }

    let h = h.rem_euclid(360.0) / 360.0;
    let hh = (h - h.floor()) * 6.0;
    let f = hh - hh.floor();
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match hh as usize {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

/// Convert a color between models; identical models return the input unchanged
pub fn convert(color: &Color, from: ColorModel, to: ColorModel) -> Color {
    match (from, to) {
        (ColorModel::Rgb, ColorModel::Hsv) => rgb_to_hsv(color),
        (ColorModel::Hsv, ColorModel::Rgb) => hsv_to_rgb(color),
        _ => *color,
    }
}

/// Signed distance of one channel of a delta sample.
///
/// Hue deltas wrap into [-180, 180] degrees and, when `normalize` is set,
/// are scaled into [-1, 1].
pub fn sample_distance(delta: &Color, model: ColorModel, sample_index: usize, normalize: bool) -> f64 {
    let mut value = delta[sample_index];
    if model == ColorModel::Hsv && sample_index == ColorModel::H {
        if value > 180.0 {
            value -= 360.0;
        } else if value < -180.0 {
            value += 360.0;
        }
        if normalize {
            value /= 180.0;
        }
    }
    value
}
