//! Effect Host
//!
//! The external-facing adapter around [`BloomPipeline`]. The host owns the
//! user-visible parameters, feeds the pipeline one source buffer per frame,
//! and composites the result over the scene with the display pass (bloom
//! add, optional noise dithering, exposure, tone mapping).
//!
//! Lifecycle is explicit: [`initialize`](EffectHost::initialize) and
//! [`teardown`](EffectHost::teardown) are plain entry points invoked by
//! whatever render-loop driver hosts the effect — the core pipeline carries
//! no coupling to any particular runtime. Both are idempotent;
//! `render_frame` initializes lazily if the driver never called
//! `initialize` itself.
//!
//! # Degradation policy
//!
//! A failed bloom pass (exhausted pool, degenerate source) is never fatal:
//! the host logs a warning and substitutes a zero contribution for that
//! frame. Rendering continues; there is nothing to retry.

use glam::Vec4;

use crate::buffer::ColorBuffer;
use crate::pipeline::BloomPipeline;
use crate::pool::BufferPool;
use crate::pyramid::Resolution;
use crate::settings::{BloomSettings, DisplayParams, HostConfig, ToneMapping};

/// Per-frame driver and compositor for the bloom effect.
pub struct EffectHost {
    settings: BloomSettings,
    config: HostConfig,
    pipeline: BloomPipeline,
    /// Last frame's bloom output. Replaced (not mutated) each frame; the
    /// replaced buffer is recycled into the pool.
    output: Option<ColorBuffer>,
    /// Zero buffer returned while no valid output exists (first frame
    /// failed, or torn down).
    fallback: ColorBuffer,
    initialized: bool,
}

impl EffectHost {
    /// Creates a host with the given settings and configuration.
    #[must_use]
    pub fn new(settings: BloomSettings, config: HostConfig) -> Self {
        let pool = match config.pool_capacity {
            Some(capacity) => BufferPool::with_capacity_limit(capacity),
            None => BufferPool::new(),
        };
        let fallback_res = Resolution::from_target_size(config.target_size, 1.0);
        Self {
            settings,
            config,
            pipeline: BloomPipeline::with_pool(pool),
            output: None,
            fallback: ColorBuffer::new(fallback_res),
            initialized: false,
        }
    }

    /// Marks the host ready. Idempotent; safe to call every frame.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        log::debug!(
            "effect host initialized: target size {}, pool capacity {:?}",
            self.config.target_size,
            self.config.pool_capacity,
        );
    }

    /// Releases everything the host holds: the current output and all
    /// pooled scratch buffers. Idempotent; the host may be initialized
    /// again afterwards.
    pub fn teardown(&mut self) {
        if let Some(output) = self.output.take() {
            self.pipeline.recycle(output);
        }
        self.pipeline.pool_mut().clear();
        self.initialized = false;
        log::debug!("effect host torn down");
    }

    /// Current settings.
    #[inline]
    #[must_use]
    pub fn settings(&self) -> &BloomSettings {
        &self.settings
    }

    /// Mutable settings access; the host re-sanitizes every frame, so
    /// callers may write freely between frames.
    #[inline]
    pub fn settings_mut(&mut self) -> &mut BloomSettings {
        &mut self.settings
    }

    /// The pipeline's scratch pool, for diagnostics.
    #[inline]
    #[must_use]
    pub fn pool(&self) -> &BufferPool {
        self.pipeline.pool()
    }

    /// Runs one frame's bloom computation and returns the contribution
    /// buffer (all-zero when the pass degraded).
    pub fn render_frame(&mut self, source: &ColorBuffer) -> &ColorBuffer {
        self.initialize();

        let settings = self.settings.sanitized();
        let target = Resolution::from_target_size(
            self.config.target_size,
            source.resolution().aspect(),
        );

        // Replace, never mutate: the previous output goes back to the pool
        // before this frame's buffers are drawn from it.
        if let Some(previous) = self.output.take() {
            self.pipeline.recycle(previous);
        }

        match self.pipeline.apply(source, target, &settings) {
            Ok(output) => {
                self.output = Some(output);
            }
            Err(err) => {
                log::warn!("bloom skipped this frame: {err}");
                if self.fallback.resolution() != target {
                    self.fallback = ColorBuffer::new(target);
                }
                self.output = None;
            }
        }

        self.pipeline.pool_mut().trim(self.config.trim_after_frames);

        self.bloom_output()
    }

    /// The most recent bloom contribution (zero buffer if none).
    #[must_use]
    pub fn bloom_output(&self) -> &ColorBuffer {
        self.output.as_ref().unwrap_or(&self.fallback)
    }

    /// Display pass: composites the bloom contribution over `scene`.
    ///
    /// The bloom buffer is bilinearly resampled to the scene resolution and
    /// added; a host-supplied noise buffer (if any) dithers the result;
    /// exposure and the selected tone-map finish the frame. Alpha follows
    /// the scene.
    #[must_use]
    pub fn composite(&self, scene: &ColorBuffer, params: &DisplayParams<'_>) -> ColorBuffer {
        let bloom = self.bloom_output();
        let resolution = scene.resolution();
        let mut out = ColorBuffer::new(resolution);
        let (w, h) = (resolution.width, resolution.height);

        for y in 0..h {
            let v = (y as f32 + 0.5) / h.max(1) as f32;
            for x in 0..w {
                let u = (x as f32 + 0.5) / w.max(1) as f32;
                let base = scene.texel(x, y);
                let mut color = base + bloom.sample(u, v);

                if let Some(noise) = params.noise {
                    // Tile the noise over the output and center it on zero
                    // so the dither adds no net energy.
                    let n = sample_tiled(noise, x, y);
                    color += (n - Vec4::splat(0.5)) * params.dither_strength;
                }

                color *= params.exposure;
                let mapped = match params.tone_mapping {
                    ToneMapping::Linear => color,
                    ToneMapping::Reinhard => {
                        Vec4::new(
                            color.x / (1.0 + color.x.max(0.0)),
                            color.y / (1.0 + color.y.max(0.0)),
                            color.z / (1.0 + color.z.max(0.0)),
                            color.w,
                        )
                    }
                };
                out.set_texel(x, y, Vec4::new(mapped.x, mapped.y, mapped.z, base.w));
            }
        }
        out
    }
}

/// Nearest-texel fetch of `noise` tiled across the output grid, regardless
/// of the buffer's own address mode.
fn sample_tiled(noise: &ColorBuffer, x: u32, y: u32) -> Vec4 {
    noise.texel(x % noise.width().max(1), y % noise.height().max(1))
}
