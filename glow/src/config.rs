//! Glow removal settings.
//!
//! [`GlowConfig`] carries every option of the pipeline and is persisted as
//! pretty-printed JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};
use shared::{Color, ColorModel};

use crate::anchors::Point;
use crate::error::{GlowError, Result};
use crate::gradient::{validate_interpolation_power, DEFAULT_INTERPOLATION_POWER};
use crate::points::PointSelectionStrategy;
use crate::subtract::{validate_spline_parameters, SubtractionStrategy};

pub const DEFAULT_SAMPLE_RADIUS: usize = 5;
pub const DEFAULT_DESPECKLE_RADIUS: usize = 5;
pub const DEFAULT_BLUR_RADIUS: usize = 100;
pub const DEFAULT_REMOVAL_FACTOR: f64 = 1.0;

/// How the glow image is estimated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GlowStrategy {
    /// A uniform glow of one RGB color
    SingleColor { color: Color },
    /// Pseudo-median despeckle followed by a Gaussian blur
    Blur {
        despeckle_radius: usize,
        blur_radius: usize,
    },
    /// Inverse-distance interpolation between anchors
    ///
    /// With no fix points the anchors are sampled automatically.
    Gradient {
        sample_radius: usize,
        interpolation_power: f64,
        point_selection: PointSelectionStrategy,
        fix_points: Vec<Point>,
    },
}

impl GlowStrategy {
    pub fn blur() -> Self {
        GlowStrategy::Blur {
            despeckle_radius: DEFAULT_DESPECKLE_RADIUS,
            blur_radius: DEFAULT_BLUR_RADIUS,
        }
    }

    pub fn gradient() -> Self {
        GlowStrategy::Gradient {
            sample_radius: DEFAULT_SAMPLE_RADIUS,
            interpolation_power: DEFAULT_INTERPOLATION_POWER,
            point_selection: PointSelectionStrategy::All,
            fix_points: Vec::new(),
        }
    }
}

impl Default for GlowStrategy {
    fn default() -> Self {
        Self::gradient()
    }
}

/// Complete glow removal configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlowConfig {
    pub glow_strategy: GlowStrategy,
    pub subtraction: SubtractionStrategy,
    /// Model the filters order and blur samples in
    pub color_model: ColorModel,
    /// Scale applied to the estimated glow before subtraction
    pub removal_factor: f64,
}

impl Default for GlowConfig {
    fn default() -> Self {
        Self {
            glow_strategy: GlowStrategy::default(),
            subtraction: SubtractionStrategy::default(),
            color_model: ColorModel::Rgb,
            removal_factor: DEFAULT_REMOVAL_FACTOR,
        }
    }
}

impl GlowConfig {
    /// Gradient estimation with the given anchors
    pub fn gradient_with_fix_points(fix_points: Vec<Point>) -> Self {
        Self {
            glow_strategy: GlowStrategy::Gradient {
                sample_radius: DEFAULT_SAMPLE_RADIUS,
                interpolation_power: DEFAULT_INTERPOLATION_POWER,
                point_selection: PointSelectionStrategy::All,
                fix_points,
            },
            ..Self::default()
        }
    }

    /// Blur estimation with default radii
    pub fn blur() -> Self {
        Self {
            glow_strategy: GlowStrategy::blur(),
            ..Self::default()
        }
    }

    /// Uniform glow of one color
    pub fn single_color(color: Color) -> Self {
        Self {
            glow_strategy: GlowStrategy::SingleColor { color },
            ..Self::default()
        }
    }

    pub fn with_subtraction(mut self, subtraction: SubtractionStrategy) -> Self {
        self.subtraction = subtraction;
        self
    }

    pub fn with_removal_factor(mut self, removal_factor: f64) -> Self {
        self.removal_factor = removal_factor;
        self
    }

    /// Check every option for values the pipeline cannot use
    pub fn validate(&self) -> Result<()> {
        if !(self.removal_factor.is_finite() && self.removal_factor >= 0.0) {
            return Err(GlowError::InvalidConfig(format!(
                "removal factor must be finite and non-negative, got {}",
                self.removal_factor
            )));
        }

        match &self.glow_strategy {
            GlowStrategy::SingleColor { color } => {
                if color.iter().any(|c| !c.is_finite()) {
                    return Err(GlowError::InvalidConfig(format!(
                        "single glow color must be finite, got {color:?}"
                    )));
                }
            }
            GlowStrategy::Blur { .. } => {}
            GlowStrategy::Gradient {
                interpolation_power,
                point_selection,
                ..
            } => {
                validate_interpolation_power(*interpolation_power)?;
                if let PointSelectionStrategy::Nearest { k: 0 } = point_selection {
                    return Err(GlowError::InvalidConfig(
                        "nearest point selection needs k >= 1".to_string(),
                    ));
                }
            }
        }

        if let SubtractionStrategy::SubtractSpline { factor, xy_pairs } = &self.subtraction {
            validate_spline_parameters(*factor, xy_pairs)?;
        }
        Ok(())
    }

    /// Save as pretty JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from JSON and validate
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}
