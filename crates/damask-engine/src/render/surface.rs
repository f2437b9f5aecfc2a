use crate::coords::{LineSeg, Point, Rect};
use crate::paint::{BlendMode, Color};

/// Borrowed RGBA image, rows packed without padding.
#[derive(Debug, Copy, Clone)]
pub struct Image<'a> {
    pub width: i32,
    pub height: i32,
    pub pixels: &'a [Color],
}

impl<'a> Image<'a> {
    /// Returns `None` if `pixels` is shorter than `width * height`.
    pub fn new(width: i32, height: i32, pixels: &'a [Color]) -> Option<Self> {
        let needed = width.max(0) as usize * height.max(0) as usize;
        (pixels.len() >= needed).then_some(Self { width, height, pixels })
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::with_size(0, 0, self.width, self.height)
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }
}

/// Borrowed 8-bit coverage mask (a rasterized glyph), rows packed without padding.
#[derive(Debug, Copy, Clone)]
pub struct Mask<'a> {
    pub width: i32,
    pub height: i32,
    pub coverage: &'a [u8],
}

impl<'a> Mask<'a> {
    /// Returns `None` if `coverage` is shorter than `width * height`.
    pub fn new(width: i32, height: i32, coverage: &'a [u8]) -> Option<Self> {
        let needed = width.max(0) as usize * height.max(0) as usize;
        (coverage.len() >= needed).then_some(Self { width, height, coverage })
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::with_size(0, 0, self.width, self.height)
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> u8 {
        self.coverage[(y * self.width + x) as usize]
    }
}

/// Pixel backend consumed by `Canvas`.
///
/// Every call receives absolute coordinates that have already been translated
/// and clipped: `dest` rectangles are non-empty and inside `size()`, and
/// `src` is the top-left source pixel that maps onto `dest`'s top-left corner.
pub trait Surface {
    /// Surface size in pixels as `(width, height)`.
    fn size(&self) -> (i32, i32);

    /// Fills `rect` with `color`.
    fn fill_box(&mut self, rect: Rect, color: Color, blend: BlendMode);

    /// Draws a one-pixel-wide horizontal or vertical line.
    fn draw_span(&mut self, line: LineSeg, color: Color);

    /// Copies the `dest`-sized region of `image` starting at `src` onto `dest`.
    fn blit(&mut self, dest: Rect, image: &Image<'_>, src: Point, blend: BlendMode);

    /// Blends `color` through the `dest`-sized region of `mask` starting at `src`.
    fn blend_mask(&mut self, dest: Rect, mask: &Mask<'_>, src: Point, color: Color);
}
