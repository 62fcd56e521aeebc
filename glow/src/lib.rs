//! Sky glow estimation and removal for astronomical images.
//!
//! The crate estimates a smooth background (light pollution, vignetting)
//! and subtracts it while keeping faint nebulosity and stars.
//!
//! # Glow estimation
//!
//! - **Gradient**: inverse-distance-weighted interpolation between anchor
//!   points whose colors are sampled from the image ([`gradient`]). Which
//!   anchors contribute to a pixel is decided by a [`points::PointSelector`].
//! - **Blur**: a pseudo-median despeckle to remove stars followed by a wide
//!   Gaussian blur ([`filter`]).
//! - **Single color**: a uniform glow.
//!
//! # Subtraction
//!
//! The estimated glow is scaled by a removal factor and subtracted channel
//! by channel using one of the variants in [`subtract`].
//!
//! ```no_run
//! use glow::{GlowConfig, GlowRemover};
//! use shared::{ArrayImage, ColorModel};
//!
//! let input = ArrayImage::filled(64, 48, ColorModel::Rgb, &[0.3, 0.25, 0.2]);
//! let remover = GlowRemover::new(GlowConfig::default())?;
//! let removal = remover.remove(&input)?;
//! println!("glow at center: {:?}", removal.glow.data()[[24, 32, 0]]);
//! # Ok::<(), glow::GlowError>(())
//! ```

pub mod anchors;
pub mod config;
pub mod delta;
pub mod error;
pub mod filter;
pub mod gradient;
pub mod points;
pub mod remover;
pub mod subtract;

pub use anchors::{Anchor, AnchorStore, Point, SampleMode};
pub use config::{GlowConfig, GlowStrategy};
pub use error::{GlowError, Result};
pub use filter::Filter;
pub use gradient::GradientInterpolation;
pub use points::{AllPoints, NearestPoints, PointSelectionStrategy, PointSelector, VoronoiPoints};
pub use remover::{GlowRemoval, GlowRemover};
pub use subtract::{
    SampleSubtraction, Subtract, SubtractLinear, SubtractSpline, SubtractionOperation, SubtractionStrategy,
};
