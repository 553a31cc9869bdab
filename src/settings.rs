//! Bloom Configuration
//!
//! Pure-data settings structs for the bloom pipeline and the host's display
//! pass. Out-of-range values are never an error: [`BloomSettings::sanitized`]
//! clamps to the supported ranges because the pipeline runs every frame and
//! must never interrupt rendering. The pipeline itself takes settings as
//! given, so edge values (like zero iterations) remain expressible at that
//! boundary.

use crate::buffer::ColorBuffer;

/// Bloom pipeline parameters.
///
/// All four values must be set before a pass runs; `Default` provides the
/// customary starting point. The host may mutate settings freely between
/// frames — the pipeline is stateless across frames apart from its pool.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BloomSettings {
    /// Pyramid depth. More iterations widen the glow; sanitized range is
    /// [`Self::MIN_ITERATIONS`]..=[`Self::MAX_ITERATIONS`].
    pub iterations: u32,
    /// Output gain applied to the final bloom buffer. Non-negative.
    pub intensity: f32,
    /// Brightness level where the bright-pass starts extracting.
    /// Non-negative.
    pub threshold: f32,
    /// Knee width as a fraction of `threshold`, in `[0, 1]`. Zero is a
    /// hard cutoff.
    pub soft_knee: f32,
}

impl BloomSettings {
    pub const MIN_ITERATIONS: u32 = 2;
    pub const MAX_ITERATIONS: u32 = 10;
    pub const MAX_INTENSITY: f32 = 10.0;
    pub const MAX_THRESHOLD: f32 = 10.0;

    /// Returns a copy with every field clamped to its supported range.
    ///
    /// Out-of-range values clamp and log; rendering never stops for a bad
    /// config.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let clamped = Self {
            iterations: self
                .iterations
                .clamp(Self::MIN_ITERATIONS, Self::MAX_ITERATIONS),
            intensity: self.intensity.clamp(0.0, Self::MAX_INTENSITY),
            threshold: self.threshold.clamp(0.0, Self::MAX_THRESHOLD),
            soft_knee: self.soft_knee.clamp(0.0, 1.0),
        };
        if clamped != *self {
            log::debug!("bloom settings clamped: {self:?} -> {clamped:?}");
        }
        clamped
    }
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            iterations: 10,
            intensity: 0.8,
            threshold: 0.6,
            soft_knee: 0.7,
        }
    }
}

/// Host-side configuration that stays fixed across frames.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HostConfig {
    /// Requested working size for the longer axis; clamped to
    /// the [`crate::pyramid::Resolution`] supported range (256–1024).
    /// Independent of the display resolution.
    pub target_size: u32,
    /// Optional cap on the scratch pool's total buffer count. `None`
    /// means unbounded.
    pub pool_capacity: Option<usize>,
    /// Free buffers idle for more than this many frames are dropped.
    pub trim_after_frames: u32,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            target_size: 512,
            pool_capacity: None,
            trim_after_frames: 60,
        }
    }
}

/// Tone mapping applied by the display pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ToneMapping {
    /// No tone mapping (linear passthrough).
    Linear,
    /// Reinhard operator (classic, soft highlight rolloff).
    #[default]
    Reinhard,
}

/// Typed parameters for the display-compositing pass.
///
/// Replaces name-based shader property lookup: everything the composite
/// step needs travels in this struct.
#[derive(Debug, Clone, Copy)]
pub struct DisplayParams<'a> {
    /// Exposure multiplier applied before tone mapping.
    pub exposure: f32,
    /// Tone mapping operator.
    pub tone_mapping: ToneMapping,
    /// Optional host-supplied noise buffer for dithering, tiled over the
    /// output. The pipeline itself never produces or consumes noise.
    pub noise: Option<&'a ColorBuffer>,
    /// Amplitude of the dither contribution. A fraction of a display
    /// quantization step, e.g. `1.0 / 255.0`.
    pub dither_strength: f32,
}

impl Default for DisplayParams<'_> {
    fn default() -> Self {
        Self {
            exposure: 1.0,
            tone_mapping: ToneMapping::default(),
            noise: None,
            dither_strength: 1.0 / 255.0,
        }
    }
}
