//! Per-channel subtraction of an estimated glow from the input.
//!
//! Three variants turn an (input, glow) sample pair into a corrected sample:
//!
//! - [`Subtract`]: `input - glow`
//! - [`SubtractLinear`]: `(input - glow) / (1 - glow)`, stretching the
//!   remaining range back to [0, 1]
//! - [`SubtractSpline`]: a monotone spline through `(0, 0)`,
//!   `(glow, glow * factor)`, optional extra pairs and `(1, 1)`
//!
//! [`SampleSubtraction::subtract`] is numerically transparent: a glow of
//! exactly 1 makes the linear variant divide by zero and the resulting
//! infinity or NaN is returned as-is. [`SampleSubtraction::checked_subtract`]
//! reports the same conditions as errors instead.

use std::fmt;

use glow_math::MonotoneCubicSpline;
use log::info;
use serde::{Deserialize, Serialize};
use shared::{ArrayImage, Color, ColorModel, PixelSource};

use crate::error::{GlowError, Result};
use crate::filter::apply_per_pixel;

/// Spline factor of the gentle spline presets
pub const SPLINE_FACTOR_1: f64 = 0.01;

/// Spline factor of the strong spline preset
pub const SPLINE_FACTOR_10: f64 = 0.1;

/// Extra control pair of the stretching spline preset
pub const STRETCH_PAIR: (f64, f64) = (0.7, 0.9);

/// Combines one input sample with one glow sample
pub trait SampleSubtraction: Send + Sync + fmt::Debug {
    /// Corrected sample; may be negative, above one or not finite
    fn subtract(&self, sample: f64, glow: f64) -> f64;

    /// Corrected sample, failing instead of returning a non-finite value
    fn checked_subtract(&self, sample: f64, glow: f64) -> Result<f64> {
        let result = self.subtract(sample, glow);
        if result.is_finite() {
            Ok(result)
        } else {
            Err(GlowError::NonFiniteResult { sample, glow })
        }
    }

    /// Apply [`subtract`](Self::subtract) to each channel independently
    fn subtract_color(&self, sample: &Color, glow: &Color) -> Color {
        [
            self.subtract(sample[0], glow[0]),
            self.subtract(sample[1], glow[1]),
            self.subtract(sample[2], glow[2]),
        ]
    }
}

/// Plain difference
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Subtract;

impl SampleSubtraction for Subtract {
    fn subtract(&self, sample: f64, glow: f64) -> f64 {
        sample - glow
    }
}

/// Difference rescaled so that `glow` maps to 0 and 1 stays at 1
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SubtractLinear;

impl SampleSubtraction for SubtractLinear {
    fn subtract(&self, sample: f64, glow: f64) -> f64 {
        (sample - glow) / (1.0 - glow)
    }

    fn checked_subtract(&self, sample: f64, glow: f64) -> Result<f64> {
        if 1.0 - glow == 0.0 {
            return Err(GlowError::DivisionByZero { glow });
        }
        let result = self.subtract(sample, glow);
        if result.is_finite() {
            Ok(result)
        } else {
            Err(GlowError::NonFiniteResult { sample, glow })
        }
    }
}

/// Monotone spline compressing the glow level toward zero
///
/// The control set for a glow `g > 0` is `(0, 0)`, `(g, g * factor)`, the
/// extra pairs and `(1, 1)`. Extra pairs and the top anchor at or left of
/// `g` are left out so that the breakpoints stay strictly increasing. A glow
/// of zero or less passes the sample through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtractSpline {
    factor: f64,
    xy_pairs: Vec<(f64, f64)>,
}

impl SubtractSpline {
    /// Create a spline subtraction
    ///
    /// # Arguments
    /// * `factor` - Output level of the glow relative to the glow, positive and finite
    /// * `xy_pairs` - Extra control points inside (0, 1), strictly increasing in x and y
    pub fn new(factor: f64, xy_pairs: Vec<(f64, f64)>) -> Result<Self> {
        validate_spline_parameters(factor, &xy_pairs)?;
        Ok(Self { factor, xy_pairs })
    }

    /// Gentle compression (factor 0.01)
    pub fn spline_1() -> Self {
        Self {
            factor: SPLINE_FACTOR_1,
            xy_pairs: Vec::new(),
        }
    }

    /// Gentle compression that also lifts the upper mid-tones
    pub fn spline_1_stretch() -> Self {
        Self {
            factor: SPLINE_FACTOR_1,
            xy_pairs: vec![STRETCH_PAIR],
        }
    }

    /// Strong compression (factor 0.1)
    pub fn spline_10() -> Self {
        Self {
            factor: SPLINE_FACTOR_10,
            xy_pairs: Vec::new(),
        }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn xy_pairs(&self) -> &[(f64, f64)] {
        &self.xy_pairs
    }

    /// Control points for a given glow level
    pub fn control_points(&self, glow: f64) -> (Vec<f64>, Vec<f64>) {
        let mut xs = vec![0.0, glow];
        let mut ys = vec![0.0, glow * self.factor];
        for &(x, y) in self.xy_pairs.iter().chain(std::iter::once(&(1.0, 1.0))) {
            if x > glow {
                xs.push(x);
                ys.push(y);
            }
        }
        (xs, ys)
    }

    /// Spline for a given positive glow level
    pub fn spline(&self, glow: f64) -> Result<MonotoneCubicSpline> {
        let (xs, ys) = self.control_points(glow);
        Ok(MonotoneCubicSpline::new(xs, ys)?)
    }
}

impl SampleSubtraction for SubtractSpline {
    fn subtract(&self, sample: f64, glow: f64) -> f64 {
        if glow <= 0.0 {
            return sample;
        }
        match self.spline(glow) {
            Ok(spline) => spline.interpolate(sample),
            Err(_) => f64::NAN,
        }
    }

    fn checked_subtract(&self, sample: f64, glow: f64) -> Result<f64> {
        if glow <= 0.0 {
            return Ok(sample);
        }
        let result = self.spline(glow)?.interpolate(sample);
        if result.is_finite() {
            Ok(result)
        } else {
            Err(GlowError::NonFiniteResult { sample, glow })
        }
    }
}

/// Check spline subtraction parameters
pub fn validate_spline_parameters(factor: f64, xy_pairs: &[(f64, f64)]) -> Result<()> {
    if !(factor.is_finite() && factor > 0.0) {
        return Err(GlowError::InvalidConfig(format!(
            "spline factor must be positive and finite, got {factor}"
        )));
    }
    let mut previous = (0.0, 0.0);
    for &(x, y) in xy_pairs {
        let inside = x > 0.0 && x < 1.0 && y > 0.0 && y < 1.0;
        if !inside {
            return Err(GlowError::InvalidConfig(format!(
                "spline pair ({x}, {y}) must lie inside (0, 1)"
            )));
        }
        if x <= previous.0 || y <= previous.1 {
            return Err(GlowError::InvalidConfig(format!(
                "spline pair ({x}, {y}) must follow ({}, {}) in both x and y",
                previous.0, previous.1
            )));
        }
        previous = (x, y);
    }
    Ok(())
}

/// Serializable choice of subtraction
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum SubtractionStrategy {
    Subtract,
    #[default]
    SubtractLinear,
    SubtractSpline { factor: f64, xy_pairs: Vec<(f64, f64)> },
}

impl SubtractionStrategy {
    pub fn spline_1() -> Self {
        SubtractionStrategy::SubtractSpline {
            factor: SPLINE_FACTOR_1,
            xy_pairs: Vec::new(),
        }
    }

    pub fn spline_1_stretch() -> Self {
        SubtractionStrategy::SubtractSpline {
            factor: SPLINE_FACTOR_1,
            xy_pairs: vec![STRETCH_PAIR],
        }
    }

    pub fn spline_10() -> Self {
        SubtractionStrategy::SubtractSpline {
            factor: SPLINE_FACTOR_10,
            xy_pairs: Vec::new(),
        }
    }

    /// Create the subtraction this strategy describes
    pub fn build(&self) -> Result<Box<dyn SampleSubtraction>> {
        Ok(match self {
            SubtractionStrategy::Subtract => Box::new(Subtract),
            SubtractionStrategy::SubtractLinear => Box::new(SubtractLinear),
            SubtractionStrategy::SubtractSpline { factor, xy_pairs } => {
                Box::new(SubtractSpline::new(*factor, xy_pairs.clone())?)
            }
        })
    }
}

/// Image-level application of a [`SampleSubtraction`] on RGB channels
#[derive(Debug)]
pub struct SubtractionOperation {
    subtraction: Box<dyn SampleSubtraction>,
}

impl SubtractionOperation {
    pub fn new(subtraction: Box<dyn SampleSubtraction>) -> Self {
        Self { subtraction }
    }

    pub fn from_strategy(strategy: &SubtractionStrategy) -> Result<Self> {
        Ok(Self::new(strategy.build()?))
    }

    pub fn subtraction(&self) -> &dyn SampleSubtraction {
        self.subtraction.as_ref()
    }

    /// Subtract `glow` from `input` pixel by pixel
    ///
    /// Out-of-range and non-finite results are kept.
    ///
    /// # Errors
    /// [`GlowError::SizeMismatch`] when the images differ in size
    pub fn apply(&self, input: &dyn PixelSource, glow: &dyn PixelSource) -> Result<ArrayImage> {
        if input.size() != glow.size() {
            return Err(GlowError::SizeMismatch(input.size(), glow.size()));
        }
        info!("Subtracting glow from {} image", input.size());

        let subtraction = self.subtraction.as_ref();
        Ok(apply_per_pixel(input.width(), input.height(), ColorModel::Rgb, |x, y| {
            let (x, y) = (x as i64, y as i64);
            subtraction.subtract_color(
                &input.pixel(x, y, ColorModel::Rgb),
                &glow.pixel(x, y, ColorModel::Rgb),
            )
        }))
    }

    /// Like [`apply`](Self::apply) but fails on the first non-finite sample
    pub fn apply_checked(&self, input: &dyn PixelSource, glow: &dyn PixelSource) -> Result<ArrayImage> {
        let output = self.apply(input, glow)?;
        for y in 0..output.height() {
            for x in 0..output.width() {
                let result = output.native_pixel(x, y);
                if result.iter().all(|v| v.is_finite()) {
                    continue;
                }
                let sample = input.pixel(x as i64, y as i64, ColorModel::Rgb);
                let glow_sample = glow.pixel(x as i64, y as i64, ColorModel::Rgb);
                for c in 0..3 {
                    self.subtraction.checked_subtract(sample[c], glow_sample[c])?;
                }
                return Err(GlowError::NonFiniteResult {
                    sample: sample[0],
                    glow: glow_sample[0],
                });
            }
        }
        Ok(output)
    }
}
