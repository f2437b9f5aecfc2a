use bytemuck::{Pod, Zeroable};

/// 8-bit straight-alpha RGBA colour.
///
/// `#[repr(C)]` so a slice of colours can be handed to a presenter as raw
/// RGBA8 bytes (see `PixelBuffer::as_bytes`).
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque colour.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Parses `0xRRGGBBAA`.
    #[inline]
    pub const fn from_u32(v: u32) -> Self {
        Self::rgba((v >> 24) as u8, (v >> 16) as u8, (v >> 8) as u8, v as u8)
    }

    #[inline]
    pub const fn to_u32(self) -> u32 {
        (self.r as u32) << 24 | (self.g as u32) << 16 | (self.b as u32) << 8 | self.a as u32
    }

    #[inline]
    pub const fn is_opaque(self) -> bool {
        self.a == 255
    }

    /// Returns the colour with its alpha scaled by `coverage` (0–255).
    #[inline]
    pub fn with_coverage(self, coverage: u8) -> Self {
        Self { a: mul_u8(self.a, coverage), ..self }
    }

    /// Source-over composite of `self` onto `dst`.
    pub fn over(self, dst: Color) -> Color {
        match self.a {
            0 => return dst,
            255 => return self,
            _ => {}
        }

        let sa = self.a as u32;
        let inv = 255 - sa;
        let da = mul_u8(dst.a, inv as u8) as u32;
        let out_a = sa + da;
        if out_a == 0 {
            return Color::TRANSPARENT;
        }

        let ch = |s: u8, d: u8| ((s as u32 * sa + d as u32 * da + out_a / 2) / out_a) as u8;
        Color {
            r: ch(self.r, dst.r),
            g: ch(self.g, dst.g),
            b: ch(self.b, dst.b),
            a: out_a as u8,
        }
    }
}

/// How a filled box combines with the pixels already on the surface.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum BlendMode {
    /// Overwrite destination pixels.
    #[default]
    Replace,
    /// Source-over alpha blend.
    Over,
}

impl BlendMode {
    #[inline]
    pub fn apply(self, src: Color, dst: Color) -> Color {
        match self {
            BlendMode::Replace => src,
            BlendMode::Over => src.over(dst),
        }
    }
}

/// `a * b / 255`, rounded.
#[inline]
fn mul_u8(a: u8, b: u8) -> u8 {
    let t = a as u32 * b as u32 + 128;
    ((t + (t >> 8)) >> 8) as u8
}
