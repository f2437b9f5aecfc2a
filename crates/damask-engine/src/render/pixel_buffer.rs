use crate::coords::{LineSeg, Orientation, Point, Rect};
use crate::paint::{BlendMode, Color};

use super::surface::{Image, Mask, Surface};

/// In-memory RGBA surface.
///
/// Used headless (tests, the studio demo) or as a CPU framebuffer whose bytes
/// are presented by the platform layer.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    width: i32,
    height: i32,
    pixels: Vec<Color>,
}

impl PixelBuffer {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            pixels: vec![Color::TRANSPARENT; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::with_size(0, 0, self.width, self.height)
    }

    /// Colour at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.bounds()
            .contains(Point::new(x, y))
            .then(|| self.pixels[self.index(x, y)])
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Raw RGBA8 bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Reallocates to a new size; contents are cleared.
    pub fn resize(&mut self, width: i32, height: i32) {
        *self = Self::new(width, height);
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> usize {
        (y * self.width + x) as usize
    }

    /// Iterates `(x, y)` over `rect` after clamping it to the buffer.
    fn cells(&self, rect: Rect) -> impl Iterator<Item = (i32, i32)> + use<> {
        let r = rect.intersect(self.bounds()).unwrap_or(Rect::EMPTY);
        (r.top..=r.bottom).flat_map(move |y| (r.left..=r.right).map(move |x| (x, y)))
    }
}

impl Surface for PixelBuffer {
    fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn fill_box(&mut self, rect: Rect, color: Color, blend: BlendMode) {
        for (x, y) in self.cells(rect) {
            let i = self.index(x, y);
            self.pixels[i] = blend.apply(color, self.pixels[i]);
        }
    }

    fn draw_span(&mut self, line: LineSeg, color: Color) {
        let rect = match line.orientation {
            Orientation::Horizontal => Rect::with_size(line.x, line.y, line.length, 1),
            Orientation::Vertical => Rect::with_size(line.x, line.y, 1, line.length),
        };
        self.fill_box(rect, color, BlendMode::Over);
    }

    fn blit(&mut self, dest: Rect, image: &Image<'_>, src: Point, blend: BlendMode) {
        for (x, y) in self.cells(dest) {
            let sx = src.x + (x - dest.left);
            let sy = src.y + (y - dest.top);
            if !image.bounds().contains(Point::new(sx, sy)) {
                continue;
            }
            let i = self.index(x, y);
            self.pixels[i] = blend.apply(image.get(sx, sy), self.pixels[i]);
        }
    }

    fn blend_mask(&mut self, dest: Rect, mask: &Mask<'_>, src: Point, color: Color) {
        for (x, y) in self.cells(dest) {
            let sx = src.x + (x - dest.left);
            let sy = src.y + (y - dest.top);
            if !mask.bounds().contains(Point::new(sx, sy)) {
                continue;
            }
            let i = self.index(x, y);
            self.pixels[i] = color.with_coverage(mask.get(sx, sy)).over(self.pixels[i]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);

    #[test]
    fn fill_box_covers_inclusive_bounds() {
        let mut buf = PixelBuffer::new(8, 8);
        buf.fill_box(Rect::new(2, 2, 4, 3), RED, BlendMode::Replace);
        assert_eq!(buf.pixel(2, 2), Some(RED));
        assert_eq!(buf.pixel(4, 3), Some(RED));
        assert_eq!(buf.pixel(5, 3), Some(Color::TRANSPARENT));
        assert_eq!(buf.pixel(4, 4), Some(Color::TRANSPARENT));
    }

    #[test]
    fn fill_box_outside_is_ignored() {
        let mut buf = PixelBuffer::new(4, 4);
        buf.fill_box(Rect::new(10, 10, 20, 20), RED, BlendMode::Replace);
        assert!(buf.pixels().iter().all(|&c| c == Color::TRANSPARENT));
    }

    #[test]
    fn span_draws_requested_length() {
        let mut buf = PixelBuffer::new(10, 10);
        buf.draw_span(LineSeg::vertical(3, 1, 4), RED);
        let painted = (0..10).filter(|&y| buf.pixel(3, y) == Some(RED)).count();
        assert_eq!(painted, 4);
        assert_eq!(buf.pixel(3, 0), Some(Color::TRANSPARENT));
    }

    #[test]
    fn blit_copies_from_source_offset() {
        let src = [Color::BLACK, Color::WHITE, RED, Color::BLACK];
        let image = Image::new(2, 2, &src).unwrap();
        let mut buf = PixelBuffer::new(4, 4);
        buf.blit(Rect::new(1, 1, 1, 2), &image, Point::new(1, 0), BlendMode::Replace);
        assert_eq!(buf.pixel(1, 1), Some(Color::WHITE));
        assert_eq!(buf.pixel(1, 2), Some(Color::BLACK));
    }

    #[test]
    fn mask_zero_coverage_leaves_pixel() {
        let coverage = [0u8, 255];
        let mask = Mask::new(2, 1, &coverage).unwrap();
        let mut buf = PixelBuffer::new(2, 1);
        buf.clear(Color::WHITE);
        buf.blend_mask(Rect::new(0, 0, 1, 0), &mask, Point::ZERO, RED);
        assert_eq!(buf.pixel(0, 0), Some(Color::WHITE));
        assert_eq!(buf.pixel(1, 0), Some(RED));
    }

    #[test]
    fn image_rejects_short_pixel_slice() {
        assert!(Image::new(3, 3, &[Color::BLACK; 4]).is_none());
    }

    #[test]
    fn bytes_are_rgba() {
        let mut buf = PixelBuffer::new(1, 1);
        buf.clear(Color::rgba(1, 2, 3, 4));
        assert_eq!(buf.as_bytes(), &[1, 2, 3, 4]);
    }
}
