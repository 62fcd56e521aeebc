//! Inverse-distance-weighted glow interpolation between anchors.
//!
//! For a pixel with relevant anchors at distances `d_i`, each anchor gets
//! the raw weight `(1 - d_i / Σd)^p` with `p` the interpolation power. The
//! weights are normalized to sum to one and the glow is the weighted sum of
//! the anchor colors. A single relevant anchor always has weight one.
//!
//! [`GradientInterpolation`] owns the anchor store together with the active
//! point selector, so replacing the anchors always re-indexes the selector.

use log::{debug, info};
use shared::{ArrayImage, Color, ColorModel, PixelSource};

use crate::anchors::{AnchorStore, Point};
use crate::error::{GlowError, Result};
use crate::filter::apply_per_pixel;
use crate::points::{AllPoints, PointSelector};

/// Default interpolation power
pub const DEFAULT_INTERPOLATION_POWER: f64 = 3.0;

/// Reject interpolation powers that are negative or not finite
pub fn validate_interpolation_power(power: f64) -> Result<()> {
    if power.is_finite() && power >= 0.0 {
        Ok(())
    } else {
        Err(GlowError::InvalidConfig(format!(
            "interpolation power must be finite and non-negative, got {power}"
        )))
    }
}

/// Normalized IDW weights for anchors at `distances`
///
/// # Arguments
/// * `distances` - Distance from the query pixel to each relevant anchor
/// * `power` - Interpolation power; larger values favor nearer anchors
///
/// # Returns
/// One factor per distance, summing to 1 (empty for empty input)
pub fn idw_factors(distances: &[f64], power: f64) -> Vec<f64> {
    match distances.len() {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let total_distance: f64 = distances.iter().sum();
            let raw: Vec<f64> = distances
                .iter()
                .map(|d| (1.0 - d / total_distance).powf(power))
                .collect();
            let total_factor: f64 = raw.iter().sum();
            raw.into_iter().map(|w| w / total_factor).collect()
        }
    }
}

/// Glow estimator interpolating anchor colors across the image
#[derive(Debug)]
pub struct GradientInterpolation {
    store: AnchorStore,
    selector: Box<dyn PointSelector>,
    interpolation_power: f64,
}

impl Default for GradientInterpolation {
    fn default() -> Self {
        Self {
            store: AnchorStore::new(),
            selector: Box::new(AllPoints::new()),
            interpolation_power: DEFAULT_INTERPOLATION_POWER,
        }
    }
}

impl GradientInterpolation {
    /// Estimator with no anchors
    ///
    /// Fails if `interpolation_power` is negative or not finite.
    pub fn new(selector: Box<dyn PointSelector>, interpolation_power: f64) -> Result<Self> {
        validate_interpolation_power(interpolation_power)?;
        Ok(Self {
            store: AnchorStore::new(),
            selector,
            interpolation_power,
        })
    }

    pub fn interpolation_power(&self) -> f64 {
        self.interpolation_power
    }

    pub fn set_interpolation_power(&mut self, power: f64) -> Result<()> {
        validate_interpolation_power(power)?;
        self.interpolation_power = power;
        Ok(())
    }

    pub fn anchors(&self) -> &AnchorStore {
        &self.store
    }

    /// Swap the point selector and index the current anchors with it
    pub fn set_point_selector(&mut self, mut selector: Box<dyn PointSelector>) {
        selector.set_anchors(&self.store.points());
        self.selector = selector;
    }

    /// Replace the anchors, sampling colors from `image`
    ///
    /// See [`AnchorStore::set_fix_points`].
    pub fn set_fix_points(&mut self, points: &[Point], image: &dyn PixelSource, sample_radius: usize) -> Result<()> {
        self.store.set_fix_points(points, image, sample_radius)?;
        self.reindex();
        Ok(())
    }

    /// Replace the anchors with explicit RGB colors
    pub fn set_fix_points_with_colors(&mut self, points: &[Point], colors: &[Color]) -> Result<()> {
        self.store.set_fix_points_with_colors(points, colors)?;
        self.reindex();
        Ok(())
    }

    /// Replace the anchors with the three automatic median samples of `image`
    pub fn auto_sample(&mut self, image: &dyn PixelSource) -> Result<()> {
        self.store.auto_sample(image)?;
        self.reindex();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.store.clear();
        self.reindex();
    }

    fn reindex(&mut self) {
        self.selector.set_anchors(&self.store.points());
        debug!("Indexed {} anchors", self.store.len());
    }

    /// Interpolated RGB glow at one pixel
    pub fn glow_at(&self, point: Point) -> Result<Color> {
        self.blend(point).ok_or(GlowError::NoAnchors)
    }

    fn blend(&self, point: Point) -> Option<Color> {
        let relevant = self.selector.relevant_anchors(point);
        if relevant.is_empty() {
            return None;
        }

        let distances: Vec<f64> = relevant.iter().map(|a| point.distance(a)).collect();
        let factors = idw_factors(&distances, self.interpolation_power);

        let mut glow = [0.0; 3];
        for (anchor, factor) in relevant.iter().zip(factors) {
            let color = self.store.color(anchor)?;
            for c in 0..3 {
                glow[c] += color[c] * factor;
            }
        }
        Some(glow)
    }

    /// Interpolate the glow over a `width` x `height` RGB image
    ///
    /// Fails with [`GlowError::NoAnchors`] when no anchors are configured.
    pub fn estimate(&self, width: usize, height: usize) -> Result<ArrayImage> {
        if self.store.is_empty() {
            return Err(GlowError::NoAnchors);
        }
        info!(
            "Interpolating glow over {width}x{height} from {} anchors (power {})",
            self.store.len(),
            self.interpolation_power
        );

        Ok(apply_per_pixel(width, height, ColorModel::Rgb, |x, y| {
            self.blend(Point::new(x as i32, y as i32))
                .unwrap_or([0.0; 3])
        }))
    }
}
