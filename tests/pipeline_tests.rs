//! Bloom Pipeline Tests
//!
//! Tests for:
//! - PyramidPlan: the documented halving sequence
//! - BloomPipeline::apply: zero-iteration short circuit, intensity
//!   linearity, sub-threshold rejection, bright-pixel glow spread
//! - Resource discipline: round-trip pool accounting on success and on
//!   every failure path

use glam::Vec4;

use afterglow::pool::BufferPool;
use afterglow::prelude::*;

const EPSILON: f32 = 1e-5;

fn uniform_source(size: u32, value: Vec4) -> ColorBuffer {
    let mut buf = ColorBuffer::new(Resolution::new(size, size));
    buf.fill(value);
    buf
}

fn settings(iterations: u32, intensity: f32) -> BloomSettings {
    BloomSettings {
        iterations,
        intensity,
        threshold: 1.0,
        soft_knee: 0.5,
    }
}

// ============================================================================
// Pyramid Plan
// ============================================================================

#[test]
fn plan_512_by_4_iterations() {
    let plan = PyramidPlan::new(Resolution::new(512, 512), 4);
    assert_eq!(
        plan.levels(),
        &[
            Resolution::new(512, 512),
            Resolution::new(256, 256),
            Resolution::new(128, 128),
            Resolution::new(64, 64),
        ]
    );
}

// ============================================================================
// Zero / Degenerate Paths
// ============================================================================

#[test]
fn zero_iterations_yields_black_buffer() {
    let mut pipeline = BloomPipeline::new();
    let source = uniform_source(32, Vec4::new(5.0, 5.0, 5.0, 1.0));
    let target = Resolution::new(32, 32);

    let out = pipeline
        .apply(&source, target, &settings(0, 1.0))
        .expect("zero iterations is not an error");
    assert_eq!(out.resolution(), target);
    assert!(out.pixels().iter().all(|p| *p == Vec4::ZERO));
}

#[test]
fn degenerate_source_is_rejected_without_leaking() {
    let mut pipeline = BloomPipeline::new();
    let source = ColorBuffer::new(Resolution::new(0, 0));

    let err = pipeline
        .apply(&source, Resolution::new(32, 32), &settings(3, 1.0))
        .unwrap_err();
    assert!(matches!(err, afterglow::BloomError::DegenerateSource { .. }));
    assert_eq!(pipeline.pool().outstanding(), 0);
}

#[test]
fn pool_exhaustion_releases_everything_acquired() {
    // Two buffers of headroom, but a 4-level pyramid needs four.
    let mut pipeline = BloomPipeline::with_pool(BufferPool::with_capacity_limit(2));
    let source = uniform_source(64, Vec4::splat(2.0));

    let err = pipeline
        .apply(&source, Resolution::new(64, 64), &settings(4, 1.0))
        .unwrap_err();
    assert!(matches!(err, afterglow::BloomError::PoolExhausted { .. }));
    assert_eq!(pipeline.pool().outstanding(), 0, "mid-pass failure must not leak");
}

// ============================================================================
// Resource Accounting
// ============================================================================

#[test]
fn apply_leaves_exactly_one_buffer_outstanding() {
    let mut pipeline = BloomPipeline::new();
    let source = uniform_source(64, Vec4::splat(2.0));

    let out = pipeline
        .apply(&source, Resolution::new(64, 64), &settings(4, 1.0))
        .unwrap();

    assert_eq!(pipeline.pool().outstanding(), 1, "only the returned output");
    assert_eq!(
        pipeline.pool().acquired_total() - pipeline.pool().released_total(),
        1
    );

    pipeline.recycle(out);
    assert_eq!(pipeline.pool().outstanding(), 0);
    assert_eq!(
        pipeline.pool().acquired_total(),
        pipeline.pool().released_total()
    );
}

#[test]
fn repeated_applies_reuse_pool_buffers() {
    let mut pipeline = BloomPipeline::new();
    let source = uniform_source(64, Vec4::splat(2.0));
    let target = Resolution::new(64, 64);

    let out = pipeline.apply(&source, target, &settings(4, 1.0)).unwrap();
    let created = pipeline.pool().total_buffer_count();
    pipeline.recycle(out);

    let out = pipeline.apply(&source, target, &settings(4, 1.0)).unwrap();
    assert_eq!(
        pipeline.pool().total_buffer_count(),
        created,
        "second frame allocates nothing fresh"
    );
    pipeline.recycle(out);
}

// ============================================================================
// End-to-End Numeric Behavior
// ============================================================================

#[test]
fn sub_threshold_scene_produces_no_bloom() {
    // Uniform mid-gray below the knee's lower bound: no contribution, no
    // matter how many iterations or how much intensity.
    let source = uniform_source(32, Vec4::new(0.35, 0.35, 0.35, 1.0));

    for iterations in [2, 3, 5] {
        for intensity in [0.5, 1.0, 8.0] {
            let mut pipeline = BloomPipeline::new();
            let out = pipeline
                .apply(
                    &source,
                    Resolution::new(32, 32),
                    &settings(iterations, intensity),
                )
                .unwrap();
            assert!(
                out.pixels().iter().all(|p| *p == Vec4::ZERO),
                "iterations {iterations}, intensity {intensity}"
            );
        }
    }
}

#[test]
fn intensity_scales_output_linearly() {
    let mut source = uniform_source(64, Vec4::ZERO);
    source.set_texel(20, 40, Vec4::new(6.0, 3.0, 1.5, 1.0));
    source.set_texel(44, 12, Vec4::new(2.0, 2.0, 2.0, 1.0));
    let target = Resolution::new(64, 64);

    let mut pipeline = BloomPipeline::new();
    let base = pipeline.apply(&source, target, &settings(3, 0.4)).unwrap();
    let doubled = pipeline.apply(&source, target, &settings(3, 0.8)).unwrap();

    for (a, b) in base.pixels().iter().zip(doubled.pixels()) {
        let expected = *a * 2.0;
        assert!(
            expected.abs_diff_eq(*b, EPSILON * (1.0 + b.length())),
            "{a:?} doubled should be {b:?}"
        );
    }
}

#[test]
fn bright_pixel_spreads_into_decaying_glow() {
    // A single bright pixel on a dark field: energy must spread over a
    // radius on the order of 2^iterations texels and fall off
    // monotonically with distance from the source.
    let mut source = uniform_source(64, Vec4::ZERO);
    source.set_texel(32, 32, Vec4::new(10.0, 10.0, 10.0, 1.0));
    let target = Resolution::new(64, 64);

    let mut pipeline = BloomPipeline::new();
    let out = pipeline.apply(&source, target, &settings(3, 1.0)).unwrap();

    let radial = |d: u32| out.texel(32 + d, 32).x;

    assert!(radial(0) > 0.0, "glow center is lit");
    assert!(radial(0) > radial(3), "decay 0 -> 3");
    assert!(radial(3) > radial(6), "decay 3 -> 6");
    assert!(radial(6) > radial(9), "decay 6 -> 9");
    assert!(radial(9) > 0.0, "glow still alive near 2^iterations");

    // Far outside the widest kernel footprint nothing remains.
    assert_eq!(out.texel(48, 32), Vec4::ZERO);
    assert_eq!(out.texel(32, 48), Vec4::ZERO);
    assert_eq!(out.texel(32, 16), Vec4::ZERO);

    // The same falloff holds along the vertical axis.
    let vertical = |d: u32| out.texel(32, 32 + d).x;
    assert!(vertical(0) > vertical(3));
    assert!(vertical(3) > vertical(6));
}

#[test]
fn glow_widens_with_iterations() {
    let mut source = uniform_source(64, Vec4::ZERO);
    source.set_texel(32, 32, Vec4::splat(10.0));
    let target = Resolution::new(64, 64);

    let lit_count = |iterations: u32| {
        let mut pipeline = BloomPipeline::new();
        let out = pipeline
            .apply(&source, target, &settings(iterations, 1.0))
            .unwrap();
        out.pixels().iter().filter(|p| p.x > 0.0).count()
    };

    assert!(lit_count(2) < lit_count(3));
    assert!(lit_count(3) < lit_count(4));
}

#[test]
fn deep_pyramid_on_small_source_stays_within_bounds() {
    // 16x16 cannot support 10 distinct levels; the plan clamps instead of
    // underflowing to zero-sized buffers.
    let mut source = uniform_source(16, Vec4::ZERO);
    source.set_texel(8, 8, Vec4::splat(4.0));

    let mut pipeline = BloomPipeline::new();
    let out = pipeline
        .apply(&source, Resolution::new(16, 16), &settings(10, 1.0))
        .unwrap();
    assert_eq!(out.resolution(), Resolution::new(16, 16));
    assert!(out.texel(8, 8).x > 0.0);
    assert_eq!(pipeline.pool().outstanding(), 1);
}
