//! Glow removal pipeline.
//!
//! Runs the configured glow strategy on the input, scales the resulting glow
//! by the removal factor and subtracts it channel by channel. Both the glow
//! and the corrected output are returned as RGB images.

use log::{debug, info};
use shared::color::SampleChannel;
use shared::{ArrayImage, ColorModel, PixelSource};

use crate::config::{GlowConfig, GlowStrategy};
use crate::delta::{delta_image, DEFAULT_DELTA_FACTOR};
use crate::error::Result;
use crate::filter::{apply_per_pixel, Filter, GaussianBlurFilter, PseudoMedianFilter};
use crate::gradient::GradientInterpolation;
use crate::subtract::SubtractionOperation;

/// Result of a glow removal run
#[derive(Debug, Clone, PartialEq)]
pub struct GlowRemoval {
    /// Estimated glow after scaling by the removal factor
    pub glow: ArrayImage,
    /// Input with the glow subtracted; not clipped to [0, 1]
    pub output: ArrayImage,
}

impl GlowRemoval {
    /// False-color difference between `input` and the removed glow
    pub fn delta(&self, input: &dyn PixelSource, channel: SampleChannel, factor: f64) -> Result<ArrayImage> {
        delta_image(input, &self.glow, channel, factor)
    }

    /// [`delta`](Self::delta) with [`DEFAULT_DELTA_FACTOR`]
    pub fn default_delta(&self, input: &dyn PixelSource, channel: SampleChannel) -> Result<ArrayImage> {
        self.delta(input, channel, DEFAULT_DELTA_FACTOR)
    }
}

/// Removes sky glow according to a [`GlowConfig`]
#[derive(Debug)]
pub struct GlowRemover {
    config: GlowConfig,
    subtraction: SubtractionOperation,
}

impl GlowRemover {
    /// Validate `config` and prepare its subtraction
    pub fn new(config: GlowConfig) -> Result<Self> {
        config.validate()?;
        let subtraction = SubtractionOperation::from_strategy(&config.subtraction)?;
        Ok(Self { config, subtraction })
    }

    pub fn config(&self) -> &GlowConfig {
        &self.config
    }

    /// Estimate the unscaled glow of `input` as an RGB image
    pub fn estimate_glow(&self, input: &dyn PixelSource) -> Result<ArrayImage> {
        let (width, height) = (input.width(), input.height());
        let model = self.config.color_model;

        match &self.config.glow_strategy {
            GlowStrategy::SingleColor { color } => {
                info!("Using single glow color {color:?}");
                Ok(ArrayImage::filled(width, height, ColorModel::Rgb, color))
            }
            GlowStrategy::Blur {
                despeckle_radius,
                blur_radius,
            } => {
                info!("Despeckling with radius {despeckle_radius}");
                let despeckled = PseudoMedianFilter::new(*despeckle_radius, model).filter_same_size(input);
                info!("Blurring with radius {blur_radius}");
                let blurred = GaussianBlurFilter::new(*blur_radius, model).filter_same_size(&despeckled);
                Ok(to_rgb(blurred))
            }
            GlowStrategy::Gradient {
                sample_radius,
                interpolation_power,
                point_selection,
                fix_points,
            } => {
                let mut gradient = GradientInterpolation::new(point_selection.build(), *interpolation_power)?;
                if fix_points.is_empty() {
                    info!("No fix points given, sampling automatically");
                    gradient.auto_sample(input)?;
                } else {
                    info!("Sampling {} fix points", fix_points.len());
                    gradient.set_fix_points(fix_points, input, *sample_radius)?;
                }
                gradient.estimate(width, height)
            }
        }
    }

    /// Estimate the glow of `input` and subtract it
    ///
    /// Out-of-range and non-finite output samples are kept as computed.
    pub fn remove(&self, input: &dyn PixelSource) -> Result<GlowRemoval> {
        let glow = self.scaled_glow(input)?;
        let output = self.subtraction.apply(input, &glow)?;
        info!("Removed glow from {} image", input.size());
        Ok(GlowRemoval { glow, output })
    }

    /// Like [`remove`](Self::remove) but fails on non-finite output samples
    pub fn remove_checked(&self, input: &dyn PixelSource) -> Result<GlowRemoval> {
        let glow = self.scaled_glow(input)?;
        let output = self.subtraction.apply_checked(input, &glow)?;
        Ok(GlowRemoval { glow, output })
    }

    fn scaled_glow(&self, input: &dyn PixelSource) -> Result<ArrayImage> {
        let mut glow = self.estimate_glow(input)?;
        let factor = self.config.removal_factor;
        if factor != 1.0 {
            debug!("Scaling glow by {factor}");
            glow.data_mut().mapv_inplace(|v| v * factor);
        }
        Ok(glow)
    }
}

fn to_rgb(image: ArrayImage) -> ArrayImage {
    if image.color_model() == ColorModel::Rgb {
        return image;
    }
    apply_per_pixel(image.width(), image.height(), ColorModel::Rgb, |x, y| {
        image.pixel(x as i64, y as i64, ColorModel::Rgb)
    })
}
