//! Error type for glow estimation and removal.

use glow_math::SplineError;
use shared::ImageSize;
use thiserror::Error;

use crate::anchors::Point;

/// Errors raised while configuring or running the glow pipeline
#[derive(Error, Debug)]
pub enum GlowError {
    #[error("No anchor points configured")]
    NoAnchors,

    #[error("Sample window at {0} contains no pixels")]
    EmptySampleWindow(Point),

    #[error("Got {points} anchor points but {colors} colors")]
    MismatchedAnchors { points: usize, colors: usize },

    #[error("Image size mismatch: expected {0}, got {1}")]
    SizeMismatch(ImageSize, ImageSize),

    #[error("Linear subtraction divides by zero for glow {glow}")]
    DivisionByZero { glow: f64 },

    #[error("Subtraction of glow {glow} from {sample} is not finite")]
    NonFiniteResult { sample: f64, glow: f64 },

    #[error("Spline construction failed: {0}")]
    Spline(#[from] SplineError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GlowError>;
