//! HDR Color Buffers
//!
//! [`ColorBuffer`] is the unit of data the bloom pipeline moves around: a 2D
//! array of linear RGBA samples at 32 bits per channel, together with the
//! sampling attributes the pipeline depends on (bilinear filtering,
//! clamp-to-edge addressing).
//!
//! Buffers are plain owned data. Scratch buffers are recycled through
//! [`BufferPool`](crate::pool::BufferPool) rather than reallocated per pass.

use glam::Vec4;

use crate::pyramid::Resolution;

/// Texel filtering mode used by [`ColorBuffer::sample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    /// Nearest-texel lookup.
    Nearest,
    /// Bilinear interpolation of the four nearest texels.
    #[default]
    Linear,
}

/// Addressing mode for sample coordinates outside `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressMode {
    /// Coordinates clamp to the edge texel. This is what every bloom pass
    /// uses; wrapping would bleed the opposite border into the glow.
    #[default]
    ClampToEdge,
    /// Coordinates wrap around (tiling). Used for host-supplied noise.
    Repeat,
}

/// A 2D buffer of linear RGBA `f32` color samples.
///
/// Texel `(0, 0)` is the top-left corner. UV coordinates place texel centers
/// at `((x + 0.5) / width, (y + 0.5) / height)`, matching GPU sampling rules.
#[derive(Debug, Clone)]
pub struct ColorBuffer {
    width: u32,
    height: u32,
    filter: FilterMode,
    address: AddressMode,
    pixels: Vec<Vec4>,
}

impl ColorBuffer {
    /// Creates a zero-filled buffer with bilinear filtering and
    /// clamp-to-edge addressing.
    #[must_use]
    pub fn new(resolution: Resolution) -> Self {
        Self {
            width: resolution.width,
            height: resolution.height,
            filter: FilterMode::default(),
            address: AddressMode::default(),
            pixels: vec![Vec4::ZERO; resolution.area()],
        }
    }

    /// Creates a buffer from existing pixel data.
    ///
    /// # Panics
    ///
    /// Panics if `pixels.len() != resolution.area()`.
    #[must_use]
    pub fn from_pixels(resolution: Resolution, pixels: Vec<Vec4>) -> Self {
        assert_eq!(
            pixels.len(),
            resolution.area(),
            "pixel count must match resolution"
        );
        Self {
            width: resolution.width,
            height: resolution.height,
            filter: FilterMode::default(),
            address: AddressMode::default(),
            pixels,
        }
    }

    /// Buffer width in texels.
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Buffer height in texels.
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Buffer resolution.
    #[inline]
    #[must_use]
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    /// Sets the filtering mode used by [`sample`](Self::sample).
    pub fn set_filter(&mut self, filter: FilterMode) {
        self.filter = filter;
    }

    /// Sets the addressing mode used by [`sample`](Self::sample).
    pub fn set_address(&mut self, address: AddressMode) {
        self.address = address;
    }

    /// Raw pixel access, row-major.
    #[inline]
    #[must_use]
    pub fn pixels(&self) -> &[Vec4] {
        &self.pixels
    }

    /// Mutable raw pixel access, row-major.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Vec4] {
        &mut self.pixels
    }

    /// The buffer contents as raw bytes (e.g. for export).
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Reads the texel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of range.
    #[inline]
    #[must_use]
    pub fn texel(&self, x: u32, y: u32) -> Vec4 {
        debug_assert!(x < self.width && y < self.height);
        self.pixels[(y * self.width + x) as usize]
    }

    /// Writes the texel at `(x, y)`.
    #[inline]
    pub fn set_texel(&mut self, x: u32, y: u32, value: Vec4) {
        debug_assert!(x < self.width && y < self.height);
        self.pixels[(y * self.width + x) as usize] = value;
    }

    /// Fills every texel with `value`.
    pub fn fill(&mut self, value: Vec4) {
        self.pixels.fill(value);
    }

    /// Multiplies every texel by `factor`.
    pub fn scale(&mut self, factor: f32) {
        for p in &mut self.pixels {
            *p *= factor;
        }
    }

    /// Samples the buffer at UV coordinates using the buffer's filter and
    /// address modes.
    ///
    /// With [`FilterMode::Linear`] this is a bilinear blend of the four
    /// nearest texel centers; out-of-range taps resolve per the address
    /// mode, so edge samples clamp rather than wrap or read zero.
    #[must_use]
    pub fn sample(&self, u: f32, v: f32) -> Vec4 {
        debug_assert!(self.width > 0 && self.height > 0);
        match self.filter {
            FilterMode::Nearest => {
                let x = (u * self.width as f32).floor() as i64;
                let y = (v * self.height as f32).floor() as i64;
                self.texel_addressed(x, y)
            }
            FilterMode::Linear => {
                // Texel-center space: the sample position relative to the
                // grid of texel centers.
                let x = u * self.width as f32 - 0.5;
                let y = v * self.height as f32 - 0.5;
                let x0 = x.floor();
                let y0 = y.floor();
                let fx = x - x0;
                let fy = y - y0;
                let x0 = x0 as i64;
                let y0 = y0 as i64;

                let p00 = self.texel_addressed(x0, y0);
                let p10 = self.texel_addressed(x0 + 1, y0);
                let p01 = self.texel_addressed(x0, y0 + 1);
                let p11 = self.texel_addressed(x0 + 1, y0 + 1);

                let top = p00 * (1.0 - fx) + p10 * fx;
                let bottom = p01 * (1.0 - fx) + p11 * fx;
                top * (1.0 - fy) + bottom * fy
            }
        }
    }

    /// Texel fetch with the address mode applied to out-of-range indices.
    #[inline]
    fn texel_addressed(&self, x: i64, y: i64) -> Vec4 {
        let (x, y) = match self.address {
            AddressMode::ClampToEdge => (
                x.clamp(0, i64::from(self.width) - 1),
                y.clamp(0, i64::from(self.height) - 1),
            ),
            AddressMode::Repeat => (
                x.rem_euclid(i64::from(self.width)),
                y.rem_euclid(i64::from(self.height)),
            ),
        };
        self.pixels[(y * i64::from(self.width) + x) as usize]
    }
}
