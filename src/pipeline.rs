//! Bloom Pipeline
//!
//! Orchestrates one frame's bloom computation over the scratch pool:
//!
//! 1. **Prefilter** — bright-pass the source through the
//!    [`ThresholdFilter`] into the first pyramid level (bilinear
//!    resampling to the working resolution happens here, once).
//! 2. **Downsample leg** — blur each level into the next, smaller planned
//!    resolution, retaining every level's buffer for the up-leg.
//! 3. **Upsample leg** — from the coarsest level back up, tent-filter the
//!    accumulated result onto the down-leg buffer captured at each level
//!    (additive, never replacing).
//! 4. Scale the level-0 result by `intensity` and hand it back.
//!
//! The pass sequence within a frame is strictly ordered; each step consumes
//! the previous step's output. `apply` takes `&mut self` so a second pass
//! cannot begin until the prior one has released its buffers.
//!
//! # Resource discipline
//!
//! Every buffer acquired from the pool is released on **all** exit paths —
//! including mid-chain acquisition failure — except the single returned
//! output, which the caller owns until it recycles it via
//! [`BloomPipeline::recycle`].

use crate::blur;
use crate::buffer::ColorBuffer;
use crate::errors::{BloomError, Result};
use crate::pool::BufferPool;
use crate::pyramid::{PyramidPlan, Resolution};
use crate::settings::BloomSettings;
use crate::threshold::ThresholdFilter;

/// Multi-pass bloom executor owning the scratch-buffer pool.
pub struct BloomPipeline {
    pool: BufferPool,
}

impl BloomPipeline {
    /// Creates a pipeline with an unbounded scratch pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pool: BufferPool::new(),
        }
    }

    /// Creates a pipeline over a caller-configured pool (e.g. one with a
    /// capacity limit).
    #[must_use]
    pub fn with_pool(pool: BufferPool) -> Self {
        Self { pool }
    }

    /// The scratch pool, for accounting and maintenance.
    #[inline]
    #[must_use]
    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    /// Mutable pool access (trim, clear).
    #[inline]
    pub fn pool_mut(&mut self) -> &mut BufferPool {
        &mut self.pool
    }

    /// Returns a previously returned output buffer to the pool.
    ///
    /// The host calls this when a new frame's output replaces the old one.
    pub fn recycle(&mut self, buffer: ColorBuffer) {
        self.pool.release(buffer);
    }

    /// Computes the bloom contribution of `source` at `target` resolution.
    ///
    /// Settings are taken as given; out-of-range values are the host's
    /// concern (see [`BloomSettings::sanitized`]). `iterations == 0` yields
    /// an all-zero buffer of the requested resolution rather than an error.
    ///
    /// # Errors
    ///
    /// [`BloomError::DegenerateSource`] if `source` or `target` has zero
    /// area; [`BloomError::PoolExhausted`] if the pool refuses an
    /// acquisition mid-pass. In both cases no scratch buffers remain
    /// outstanding.
    pub fn apply(
        &mut self,
        source: &ColorBuffer,
        target: Resolution,
        settings: &BloomSettings,
    ) -> Result<ColorBuffer> {
        if source.resolution().is_degenerate() {
            return Err(BloomError::DegenerateSource {
                width: source.width(),
                height: source.height(),
            });
        }
        if target.is_degenerate() {
            return Err(BloomError::DegenerateSource {
                width: target.width,
                height: target.height,
            });
        }

        if settings.iterations == 0 {
            // No pyramid to walk; the contribution is defined as black.
            return self.pool.acquire(target);
        }

        let plan = PyramidPlan::new(target, settings.iterations);
        let filter = ThresholdFilter::new(settings.threshold, settings.soft_knee);
        log::debug!(
            "bloom pass: target {target}, {} levels, threshold {} knee {}",
            plan.len(),
            filter.threshold(),
            filter.knee(),
        );

        // ── Prefilter + downsample leg ────────────────────────────────────
        // `levels[i]` holds the down-leg result at plan level i; all of
        // them are needed again on the way back up.
        let mut levels: Vec<ColorBuffer> = Vec::with_capacity(plan.len());

        let mut first = self.pool.acquire(plan.level(0))?;
        prefilter_into(&filter, source, &mut first);
        levels.push(first);

        for i in 1..plan.len() {
            let mut next = match self.pool.acquire(plan.level(i)) {
                Ok(buffer) => buffer,
                Err(err) => {
                    self.release_all(levels);
                    return Err(err);
                }
            };
            blur::downsample(&levels[i - 1], &mut next);
            levels.push(next);
        }

        // ── Upsample leg ──────────────────────────────────────────────────
        // Walk from the coarsest level upward, adding the accumulated blur
        // onto each finer down-leg buffer, releasing each spent level.
        let mut accumulated = levels.pop().expect("plan has at least one level");
        while let Some(mut finer) = levels.pop() {
            blur::upsample_add(&accumulated, &mut finer);
            self.pool.release(accumulated);
            accumulated = finer;
        }

        accumulated.scale(settings.intensity);
        Ok(accumulated)
    }

    fn release_all(&mut self, buffers: Vec<ColorBuffer>) {
        for buffer in buffers {
            self.pool.release(buffer);
        }
    }
}

impl Default for BloomPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Bright-passes `source` into `dst`, bilinearly resampling to `dst`'s
/// resolution in the same sweep.
fn prefilter_into(filter: &ThresholdFilter, source: &ColorBuffer, dst: &mut ColorBuffer) {
    let (dw, dh) = (dst.width(), dst.height());
    for y in 0..dh {
        let v = (y as f32 + 0.5) / dh as f32;
        for x in 0..dw {
            let u = (x as f32 + 0.5) / dw as f32;
            dst.set_texel(x, y, filter.extract(source.sample(u, v)));
        }
    }
}
