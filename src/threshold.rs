//! Bright-Pass Threshold Filter
//!
//! Converts a linear HDR sample into its bloom contribution. Brightness is
//! the maximum RGB channel; samples below the threshold contribute nothing,
//! samples above it contribute their excess while preserving hue, and a
//! quadratic "soft knee" region around the threshold blends the two so the
//! cutoff never shows as a hard band.
//!
//! The curve is the standard bright-pass formulation: with
//! `knee = threshold * soft_knee`, the response is
//!
//! ```text
//! b <= threshold - knee   ->  0
//! b >= threshold + knee   ->  b - threshold
//! otherwise               ->  (b - threshold + knee)^2 / (4 * knee)
//! ```
//!
//! which is continuous at both region boundaries. The final sample is
//! scaled by `response / b`, so the output is always a non-negative scalar
//! multiple of the input color.

use glam::Vec4;

/// Soft-knee bright-pass filter.
///
/// Parameters are captured at construction; the pipeline rebuilds the
/// filter each frame from the current settings, so there is no cross-frame
/// state here.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdFilter {
    threshold: f32,
    knee: f32,
    /// Lower knee boundary, `threshold - knee`.
    lower: f32,
    /// Quadratic coefficient, `0.25 / knee` (guarded).
    curve_scale: f32,
}

impl ThresholdFilter {
    /// Denominator guard. Keeps `b = 0` (and a degenerate knee) from
    /// dividing by zero; a black sample always yields exactly zero.
    const EPSILON: f32 = 1e-5;

    /// Creates a filter for the given threshold and knee width.
    ///
    /// `soft_knee` is a fraction of the threshold in `[0, 1]`; zero
    /// degenerates to a hard cutoff at `threshold`.
    #[must_use]
    pub fn new(threshold: f32, soft_knee: f32) -> Self {
        let threshold = threshold.max(0.0);
        let knee = threshold * soft_knee.clamp(0.0, 1.0);
        Self {
            threshold,
            knee,
            lower: threshold - knee,
            curve_scale: 0.25 / knee.max(Self::EPSILON),
        }
    }

    /// The configured threshold.
    #[inline]
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// The absolute knee width, `threshold * soft_knee`.
    #[inline]
    #[must_use]
    pub fn knee(&self) -> f32 {
        self.knee
    }

    /// Extracts the bloom contribution of a single sample.
    #[inline]
    #[must_use]
    pub fn extract(&self, sample: Vec4) -> Vec4 {
        let brightness = sample.x.max(sample.y).max(sample.z);

        let mut response = (brightness - self.lower).clamp(0.0, 2.0 * self.knee);
        response = self.curve_scale * response * response;
        response = response.max(brightness - self.threshold);

        sample * (response / brightness.max(Self::EPSILON))
    }
}
