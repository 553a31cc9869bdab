//! Pyramid Blur Kernels
//!
//! The two resampling filters the pipeline applies while walking the
//! pyramid, in the dual-filter style (Marius Bjorge, "Bandwidth-Efficient
//! Rendering", SIGGRAPH 2015):
//!
//! - [`downsample`]: a 4-tap box of bilinear samples at one-source-texel
//!   offsets around the destination center. Feeds the next, smaller level.
//! - [`upsample_add`]: a 3x3 tent (1-2-1 binomial per axis, normalized to
//!   one) of bilinear samples, **added** onto the destination — the
//!   additive accumulation is what turns the chain into a multi-scale glow
//!   instead of a single-scale blur.
//!
//! Both kernels have weights summing to one, sample with clamp-to-edge
//! addressing (no wrap, no zero padding, so borders never darken), and are
//! fully deterministic.

use glam::Vec4;

use crate::buffer::ColorBuffer;

/// 3x3 tent weights, `(1 2 1) x (1 2 1) / 16`, flattened row-major with
/// texel offsets.
const TENT_TAPS: [(f32, f32, f32); 9] = [
    (-1.0, -1.0, 1.0 / 16.0),
    (0.0, -1.0, 2.0 / 16.0),
    (1.0, -1.0, 1.0 / 16.0),
    (-1.0, 0.0, 2.0 / 16.0),
    (0.0, 0.0, 4.0 / 16.0),
    (1.0, 0.0, 2.0 / 16.0),
    (-1.0, 1.0, 1.0 / 16.0),
    (0.0, 1.0, 2.0 / 16.0),
    (1.0, 1.0, 1.0 / 16.0),
];

/// Low-pass filters `src` into `dst` at `dst`'s (smaller) resolution.
///
/// Each destination texel averages four bilinear taps placed one source
/// texel diagonally around the mapped center, which widens the footprint
/// just enough to leave no source texel unsampled when halving.
pub fn downsample(src: &ColorBuffer, dst: &mut ColorBuffer) {
    let (dw, dh) = (dst.width(), dst.height());
    let texel_u = 1.0 / src.width() as f32;
    let texel_v = 1.0 / src.height() as f32;

    for y in 0..dh {
        let v = (y as f32 + 0.5) / dh as f32;
        for x in 0..dw {
            let u = (x as f32 + 0.5) / dw as f32;
            let sum = src.sample(u - texel_u, v - texel_v)
                + src.sample(u + texel_u, v - texel_v)
                + src.sample(u - texel_u, v + texel_v)
                + src.sample(u + texel_u, v + texel_v);
            dst.set_texel(x, y, sum * 0.25);
        }
    }
}

/// Tent-filters `src` up to `dst`'s (larger) resolution and adds the result
/// onto `dst`'s existing contents.
pub fn upsample_add(src: &ColorBuffer, dst: &mut ColorBuffer) {
    let (dw, dh) = (dst.width(), dst.height());
    let texel_u = 1.0 / src.width() as f32;
    let texel_v = 1.0 / src.height() as f32;

    for y in 0..dh {
        let v = (y as f32 + 0.5) / dh as f32;
        for x in 0..dw {
            let u = (x as f32 + 0.5) / dw as f32;
            let mut sum = Vec4::ZERO;
            for (ox, oy, weight) in TENT_TAPS {
                sum += src.sample(u + ox * texel_u, v + oy * texel_v) * weight;
            }
            dst.set_texel(x, y, dst.texel(x, y) + sum);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pyramid::Resolution;

    const EPSILON: f32 = 1e-4;

    fn total_energy(buf: &ColorBuffer) -> f32 {
        buf.pixels().iter().map(|p| p.x + p.y + p.z).sum()
    }

    #[test]
    fn downsample_of_uniform_is_uniform() {
        let mut src = ColorBuffer::new(Resolution::new(16, 16));
        src.fill(Vec4::new(0.25, 0.5, 0.75, 1.0));
        let mut dst = ColorBuffer::new(Resolution::new(8, 8));
        downsample(&src, &mut dst);
        for p in dst.pixels() {
            assert!(p.abs_diff_eq(Vec4::new(0.25, 0.5, 0.75, 1.0), EPSILON));
        }
    }

    #[test]
    fn downsample_preserves_interior_energy() {
        // Energy concentrated away from borders, so edge clamping does not
        // enter the comparison.
        let mut src = ColorBuffer::new(Resolution::new(32, 32));
        for y in 12..20 {
            for x in 12..20 {
                src.set_texel(x, y, Vec4::new(2.0, 1.0, 0.5, 1.0));
            }
        }
        let mut dst = ColorBuffer::new(Resolution::new(16, 16));
        downsample(&src, &mut dst);
        // Integrating over the frame scales with the resolution change:
        // quarter the texels, so quarter the summed energy.
        let ratio = total_energy(&dst) * 4.0 / total_energy(&src);
        assert!((ratio - 1.0).abs() < 1e-3, "energy ratio {ratio}");
    }

    #[test]
    fn upsample_preserves_interior_energy() {
        let mut src = ColorBuffer::new(Resolution::new(16, 16));
        for y in 6..10 {
            for x in 6..10 {
                src.set_texel(x, y, Vec4::new(1.0, 2.0, 3.0, 1.0));
            }
        }
        let mut dst = ColorBuffer::new(Resolution::new(32, 32));
        upsample_add(&src, &mut dst);
        let ratio = total_energy(&dst) / (total_energy(&src) * 4.0);
        assert!((ratio - 1.0).abs() < 1e-3, "energy ratio {ratio}");
    }

    #[test]
    fn upsample_adds_instead_of_replacing() {
        let mut src = ColorBuffer::new(Resolution::new(4, 4));
        src.fill(Vec4::splat(1.0));
        let mut dst = ColorBuffer::new(Resolution::new(8, 8));
        dst.fill(Vec4::splat(0.5));
        upsample_add(&src, &mut dst);
        for p in dst.pixels() {
            assert!(p.abs_diff_eq(Vec4::splat(1.5), EPSILON));
        }
    }

    #[test]
    fn kernels_are_deterministic() {
        let mut src = ColorBuffer::new(Resolution::new(16, 16));
        src.set_texel(7, 7, Vec4::splat(5.0));
        let mut a = ColorBuffer::new(Resolution::new(8, 8));
        let mut b = ColorBuffer::new(Resolution::new(8, 8));
        downsample(&src, &mut a);
        downsample(&src, &mut b);
        assert_eq!(a.pixels(), b.pixels());
    }

    #[test]
    fn edge_taps_clamp_rather_than_darken() {
        // A uniform field must stay uniform right up to the border; zero
        // padding would show as dark fringing.
        let mut src = ColorBuffer::new(Resolution::new(8, 8));
        src.fill(Vec4::splat(1.0));
        let mut dst = ColorBuffer::new(Resolution::new(4, 4));
        downsample(&src, &mut dst);
        assert!(dst.texel(0, 0).abs_diff_eq(Vec4::splat(1.0), EPSILON));
        assert!(dst.texel(3, 3).abs_diff_eq(Vec4::splat(1.0), EPSILON));
    }
}
