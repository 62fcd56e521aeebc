//! Testing infrastructure for the glow workspace.
//!
//! Provides workspace root discovery, a shared output directory for test
//! artifacts and deterministic synthetic sky images with a known glow.
//!
//! # Synthetic skies
//!
//! A [`SyntheticSky`] is the sum of three layers:
//! - a smooth glow, bilinear between four corner colors
//! - Gaussian star profiles at random positions
//! - zero-mean Gaussian read noise
//!
//! The glow layer is returned separately so tests can compare an estimate
//! against the truth.
//!
//! ```rust
//! use shared::PixelSource;
//! use test_helpers::SyntheticSky;
//!
//! let sky = SyntheticSky::new(64, 48).with_stars(10).with_seed(7).generate();
//! assert_eq!(sky.image.width(), 64);
//! assert_eq!(sky.stars.len(), 10);
//! ```

use ndarray::Zip;
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use shared::{ArrayImage, Color, ColorModel};
use std::env;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum TestHelperError {
    /// No parent directory holds a workspace `Cargo.toml`
    #[error("Failed to find project root: {0}")]
    ProjectRootNotFound(String),
}

/// Find the workspace root by walking up from the current directory
///
/// # Returns
/// The first ancestor whose `Cargo.toml` contains a `[workspace]` section
pub fn find_project_root() -> Result<PathBuf, TestHelperError> {
    let mut current_dir = env::current_dir().map_err(|e| {
        TestHelperError::ProjectRootNotFound(format!("Failed to get current directory: {}", e))
    })?;

    loop {
        let cargo_toml = current_dir.join("Cargo.toml");
        if cargo_toml.exists() {
            let content = std::fs::read_to_string(&cargo_toml).map_err(|e| {
                TestHelperError::ProjectRootNotFound(format!("Failed to read Cargo.toml: {}", e))
            })?;

            if content.contains("[workspace]") {
                return Ok(current_dir);
            }
        }

        if !current_dir.pop() {
            break;
        }
    }

    Err(TestHelperError::ProjectRootNotFound(
        "Workspace root not found".to_string(),
    ))
}

static PROJECT_ROOT: Lazy<PathBuf> =
    Lazy::new(|| find_project_root().expect("Failed to find project root directory"));

/// `<project_root>/test_output`, created on first use
pub fn get_output_dir() -> PathBuf {
    let output_dir = PROJECT_ROOT.join("test_output");

    if !output_dir.exists() {
        std::fs::create_dir_all(&output_dir).expect("Failed to create output directory");
    }

    output_dir
}

/// Path of an artifact inside the test output directory
pub fn output_path<P: AsRef<Path>>(path: P) -> PathBuf {
    get_output_dir().join(path)
}

/// A generated sky together with its ground truth
#[derive(Debug, Clone)]
pub struct SkyImage {
    /// Glow plus stars plus noise
    pub image: ArrayImage,
    /// The glow layer alone
    pub glow: ArrayImage,
    /// Star centers
    pub stars: Vec<(usize, usize)>,
}

/// Builder for deterministic synthetic sky images
#[derive(Debug, Clone)]
pub struct SyntheticSky {
    pub width: usize,
    pub height: usize,
    /// Glow colors at top-left, top-right, bottom-left and bottom-right
    pub corners: [Color; 4],
    pub star_count: usize,
    /// Star profile standard deviation in pixels
    pub star_sigma: f64,
    /// Peak star brightness added on top of the glow
    pub star_peak: f64,
    pub noise_sigma: f64,
    pub seed: u64,
}

impl SyntheticSky {
    /// A sky with a mild orange-to-blue glow, no stars and no noise
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            corners: [
                [0.30, 0.22, 0.12],
                [0.20, 0.18, 0.14],
                [0.12, 0.12, 0.16],
                [0.08, 0.09, 0.14],
            ],
            star_count: 0,
            star_sigma: 1.0,
            star_peak: 0.6,
            noise_sigma: 0.0,
            seed: 42,
        }
    }

    pub fn with_corners(mut self, corners: [Color; 4]) -> Self {
        self.corners = corners;
        self
    }

    pub fn with_uniform_glow(mut self, color: Color) -> Self {
        self.corners = [color; 4];
        self
    }

    pub fn with_stars(mut self, star_count: usize) -> Self {
        self.star_count = star_count;
        self
    }

    pub fn with_noise(mut self, noise_sigma: f64) -> Self {
        self.noise_sigma = noise_sigma;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Glow color at (x, y)
    pub fn glow_at(&self, x: usize, y: usize) -> Color {
        let u = if self.width > 1 {
            x as f64 / (self.width - 1) as f64
        } else {
            0.0
        };
        let v = if self.height > 1 {
            y as f64 / (self.height - 1) as f64
        } else {
            0.0
        };
        let [tl, tr, bl, br] = self.corners;
        let mut color = [0.0; 3];
        for c in 0..3 {
            let top = tl[c] + (tr[c] - tl[c]) * u;
            let bottom = bl[c] + (br[c] - bl[c]) * u;
            color[c] = top + (bottom - top) * v;
        }
        color
    }

    /// Render the sky
    pub fn generate(&self) -> SkyImage {
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut glow = ArrayImage::new(self.width, self.height, ColorModel::Rgb);
        glow.par_fill_with(|x, y| self.glow_at(x, y));

        let mut image = glow.clone();
        let mut stars = Vec::with_capacity(self.star_count);
        if self.width > 0 && self.height > 0 {
            for _ in 0..self.star_count {
                let center = (rng.random_range(0..self.width), rng.random_range(0..self.height));
                self.add_star(&mut image, center);
                stars.push(center);
            }
        }

        if self.noise_sigma > 0.0 {
            let normal = Normal::new(0.0, self.noise_sigma).expect("noise sigma must be finite");
            image
                .data_mut()
                .iter_mut()
                .for_each(|v| *v += normal.sample(&mut rng));
        }

        SkyImage { image, glow, stars }
    }

    fn add_star(&self, image: &mut ArrayImage, (cx, cy): (usize, usize)) {
        let reach = (self.star_sigma * 4.0).ceil() as i64;
        let two_sigma_sq = 2.0 * self.star_sigma * self.star_sigma;
        let mut data = image.data_mut();
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let (x, y) = (cx as i64 + dx, cy as i64 + dy);
                if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
                    continue;
                }
                let weight = (-((dx * dx + dy * dy) as f64) / two_sigma_sq).exp();
                for c in 0..3 {
                    data[[y as usize, x as usize, c]] += self.star_peak * weight;
                }
            }
        }
    }
}

/// Largest per-sample absolute difference between two images of equal size
pub fn max_abs_difference(a: &ArrayImage, b: &ArrayImage) -> f64 {
    let mut max = 0.0_f64;
    Zip::from(a.data()).and(b.data()).for_each(|x, y| {
        max = max.max((x - y).abs());
    });
    max
}

/// Mean per-sample absolute difference between two images of equal size
pub fn mean_abs_difference(a: &ArrayImage, b: &ArrayImage) -> f64 {
    let mut total = 0.0;
    Zip::from(a.data()).and(b.data()).for_each(|x, y| {
        total += (x - y).abs();
    });
    let count = a.data().len();
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use shared::PixelSource;

    #[test]
    fn test_project_root_exists() {
        let root = find_project_root().expect("Failed to find project root");
        assert!(root.exists());
        assert!(root.join("Cargo.toml").exists());
    }

    #[test]
    fn test_output_path() {
        let path = output_path("sky.json");
        assert_eq!(path, get_output_dir().join("sky.json"));
    }

    #[test]
    fn test_glow_hits_corners() {
        let sky = SyntheticSky::new(10, 5);
        assert_eq!(sky.glow_at(0, 0), sky.corners[0]);
        assert_eq!(sky.glow_at(9, 0), sky.corners[1]);
        assert_eq!(sky.glow_at(0, 4), sky.corners[2]);
        let br = sky.glow_at(9, 4);
        for c in 0..3 {
            assert_abs_diff_eq!(br[c], sky.corners[3][c], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = SyntheticSky::new(32, 24).with_stars(5).with_noise(0.01).with_seed(3).generate();
        let b = SyntheticSky::new(32, 24).with_stars(5).with_noise(0.01).with_seed(3).generate();
        assert_eq!(a.image, b.image);
        assert_eq!(a.stars, b.stars);
    }

    #[test]
    fn test_stars_brighten_the_image() {
        let sky = SyntheticSky::new(32, 32).with_stars(1).generate();
        let (x, y) = sky.stars[0];
        let star = sky.image.native_pixel(x, y);
        let glow = sky.glow.native_pixel(x, y);
        assert_abs_diff_eq!(star[0] - glow[0], 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_noise_free_sky_equals_glow() {
        let sky = SyntheticSky::new(16, 8).generate();
        assert_eq!(max_abs_difference(&sky.image, &sky.glow), 0.0);
    }
}
