//! Monotone cubic spline interpolation.
//!
//! Builds a C¹ piecewise-cubic Hermite interpolant through a set of control
//! points using the Fritsch–Carlson tangent limiter, which guarantees that the
//! curve never overshoots between monotone control points. This is the curve
//! used by spline-based glow subtraction to compress the glow level toward zero
//! while keeping the top of the dynamic range fixed.
//!
//! Outside the control range the spline extrapolates flat: values left of the
//! first breakpoint evaluate to the first y-value and values right of the last
//! breakpoint evaluate to the last y-value.

use thiserror::Error;

/// Errors that can occur while constructing a spline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SplineError {
    #[error("Control point vectors must have at least 2 points")]
    InsufficientData,
    #[error("Control point vectors must have the same length ({0} x-values, {1} y-values)")]
    MismatchedLengths(usize, usize),
    #[error("X values must be strictly increasing (x[{0}] = {1} follows {2})")]
    UnsortedData(usize, f64, f64),
    #[error("Y values must be monotonic (y[{0}] = {1} follows {2})")]
    NonMonotonicData(usize, f64, f64),
    #[error("Control points must be finite")]
    NonFinite,
}

/// Monotone cubic Hermite spline through strictly increasing breakpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct MonotoneCubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    tangents: Vec<f64>,
}

impl MonotoneCubicSpline {
    /// Build a monotone spline through `(xs[i], ys[i])`.
    ///
    /// # Arguments
    /// * `xs` - Breakpoints, strictly increasing
    /// * `ys` - Values at the breakpoints, monotonic (non-decreasing or non-increasing)
    ///
    /// # Errors
    /// * `SplineError::MismatchedLengths` - `xs` and `ys` differ in length
    /// * `SplineError::InsufficientData` - fewer than 2 control points
    /// * `SplineError::UnsortedData` - breakpoints not strictly increasing
    /// * `SplineError::NonMonotonicData` - values change direction
    /// * `SplineError::NonFinite` - a control point is NaN or infinite
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Result<Self, SplineError> {
        if xs.len() != ys.len() {
            return Err(SplineError::MismatchedLengths(xs.len(), ys.len()));
        }
        if xs.len() < 2 {
            return Err(SplineError::InsufficientData);
        }
        if xs.iter().chain(ys.iter()).any(|v| !v.is_finite()) {
            return Err(SplineError::NonFinite);
        }
        for i in 1..xs.len() {
            if xs[i] <= xs[i - 1] {
                return Err(SplineError::UnsortedData(i, xs[i], xs[i - 1]));
            }
        }

        let n = xs.len();
        let secants: Vec<f64> = (0..n - 1)
            .map(|i| (ys[i + 1] - ys[i]) / (xs[i + 1] - xs[i]))
            .collect();

        let rising = secants.iter().any(|&d| d > 0.0);
        let falling = secants.iter().any(|&d| d < 0.0);
        if rising && falling {
            let i = (1..n)
                .find(|&i| (ys[i] - ys[i - 1]) * (ys[n - 1] - ys[0]) < 0.0)
                .unwrap_or(n - 1);
            return Err(SplineError::NonMonotonicData(i, ys[i], ys[i - 1]));
        }

        // Initial tangents: one-sided at the ends, secant average inside
        let mut tangents = vec![0.0; n];
        tangents[0] = secants[0];
        tangents[n - 1] = secants[n - 2];
        for i in 1..n - 1 {
            tangents[i] = (secants[i - 1] + secants[i]) * 0.5;
        }

        // Fritsch–Carlson limiter
        for i in 0..n - 1 {
            if secants[i] == 0.0 {
                tangents[i] = 0.0;
                tangents[i + 1] = 0.0;
            } else {
                let alpha = tangents[i] / secants[i];
                let beta = tangents[i + 1] / secants[i];
                let magnitude = alpha.hypot(beta);
                if magnitude > 3.0 {
                    let tau = 3.0 / magnitude;
                    tangents[i] = tau * alpha * secants[i];
                    tangents[i + 1] = tau * beta * secants[i];
                }
            }
        }

        Ok(Self { xs, ys, tangents })
    }

    /// Evaluate the spline at `x`, extrapolating flat outside the breakpoints.
    ///
    /// NaN input is returned unchanged.
    pub fn interpolate(&self, x: f64) -> f64 {
        let n = self.xs.len();
        if x.is_nan() {
            return x;
        }
        if x <= self.xs[0] {
            return self.ys[0];
        }
        if x >= self.xs[n - 1] {
            return self.ys[n - 1];
        }

        let i = match self
            .xs
            .binary_search_by(|probe| probe.total_cmp(&x))
        {
            Ok(exact_idx) => return self.ys[exact_idx],
            Err(insert_idx) => insert_idx - 1,
        };

        let h = self.xs[i + 1] - self.xs[i];
        let t = (x - self.xs[i]) / h;
        let t2 = t * t;
        let t3 = t2 * t;

        // Cubic Hermite basis
        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        h00 * self.ys[i]
            + h10 * h * self.tangents[i]
            + h01 * self.ys[i + 1]
            + h11 * h * self.tangents[i + 1]
    }

    /// Breakpoints of the spline
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    /// Values at the breakpoints
    pub fn ys(&self) -> &[f64] {
        &self.ys
    }
}
