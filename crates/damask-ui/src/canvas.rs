//! Clipped, translated drawing on top of a [`Surface`].
//!
//! A [`Canvas`] wraps a borrowed surface with a [`ClipStack`]: every primitive
//! is shifted by the current offset and cut to the current clip before the
//! surface sees it, so widgets draw in their own local coordinates and cannot
//! paint outside the region being repainted.
//!
//! Each canvas belongs to the thread that draws into it; nothing here is
//! shared.

use damask_engine::coords::{LineSeg, Orientation, Point, Rect};
use damask_engine::paint::{BlendMode, Color};
use damask_engine::render::{Image, Mask, Surface};

// ── ClipStack ─────────────────────────────────────────────────────────────

/// Bounded stacks of drawing offsets and effective clip rectangles.
///
/// Offsets accumulate: pushing `(dx, dy)` moves the origin relative to the
/// current one. Clips intersect: pushing a rectangle (given relative to the
/// current offset) narrows the effective clip.
///
/// Pushes beyond the depth limit are refused and remembered, so the matching
/// pops are absorbed and the remaining pops still line up.
#[derive(Debug, Clone)]
pub struct ClipStack {
    bounds: Rect,
    offset: Point,
    clip: Rect,
    offsets: Vec<Point>,
    clips: Vec<Rect>,
    depth: usize,
    offset_overflow: usize,
    clip_overflow: usize,
}

impl ClipStack {
    pub fn new(bounds: Rect, depth: usize) -> Self {
        Self {
            bounds,
            offset: Point::ZERO,
            clip: bounds,
            offsets: Vec::with_capacity(depth),
            clips: Vec::with_capacity(depth),
            depth,
            offset_overflow: 0,
            clip_overflow: 0,
        }
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Current origin in surface coordinates.
    #[inline]
    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Current effective clip in surface coordinates; empty when nothing is drawable.
    #[inline]
    pub fn clip(&self) -> Rect {
        self.clip
    }

    /// Maximum number of entries in each stack.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of offsets currently pushed, including refused ones.
    pub fn offset_depth(&self) -> usize {
        self.offsets.len() + self.offset_overflow
    }

    /// Number of clips currently pushed, including refused ones.
    pub fn clip_depth(&self) -> usize {
        self.clips.len() + self.clip_overflow
    }

    /// Shifts the origin by `(dx, dy)`. Returns `false` if the stack is full.
    pub fn push_offset(&mut self, dx: i32, dy: i32) -> bool {
        if self.offsets.len() >= self.depth {
            self.offset_overflow += 1;
            log::warn!("offset stack overflow (depth {})", self.depth);
            return false;
        }
        self.offsets.push(self.offset);
        self.offset = self.offset + Point::new(dx, dy);
        true
    }

    /// Restores the previous origin. Returns `false` if nothing was pushed.
    pub fn pop_offset(&mut self) -> bool {
        if self.offset_overflow > 0 {
            self.offset_overflow -= 1;
            return true;
        }
        match self.offsets.pop() {
            Some(prev) => {
                self.offset = prev;
                true
            }
            None => {
                log::debug!("pop_offset on empty stack");
                self.offset = Point::ZERO;
                false
            }
        }
    }

    /// Narrows the clip to `rect`, given relative to the current offset.
    /// Returns `false` if the stack is full.
    pub fn push_clip(&mut self, rect: Rect) -> bool {
        if self.clips.len() >= self.depth {
            self.clip_overflow += 1;
            log::warn!("clip stack overflow (depth {})", self.depth);
            return false;
        }
        self.clips.push(self.clip);
        self.clip = rect
            .translate(self.offset.x, self.offset.y)
            .intersect(self.clip)
            .unwrap_or(Rect::EMPTY);
        true
    }

    /// Restores the previous clip. Returns `false` if nothing was pushed.
    pub fn pop_clip(&mut self) -> bool {
        if self.clip_overflow > 0 {
            self.clip_overflow -= 1;
            return true;
        }
        match self.clips.pop() {
            Some(prev) => {
                self.clip = prev;
                true
            }
            None => {
                log::debug!("pop_clip on empty stack");
                self.clip = self.bounds;
                false
            }
        }
    }

    /// Drops every pushed entry.
    pub fn reset(&mut self) {
        self.offsets.clear();
        self.clips.clear();
        self.offset_overflow = 0;
        self.clip_overflow = 0;
        self.offset = Point::ZERO;
        self.clip = self.bounds;
    }
}

// ── Canvas ────────────────────────────────────────────────────────────────

/// Drawing handle given to [`crate::Widget::draw`].
pub struct Canvas<'s> {
    surface: &'s mut dyn Surface,
    stack: ClipStack,
}

impl<'s> Canvas<'s> {
    /// Wraps `surface` with the default stack depth.
    pub fn new(surface: &'s mut dyn Surface) -> Self {
        Self::with_depth(surface, crate::UiConfig::default().stack_depth)
    }

    pub fn with_depth(surface: &'s mut dyn Surface, depth: usize) -> Self {
        let (w, h) = surface.size();
        Self { surface, stack: ClipStack::new(Rect::with_size(0, 0, w, h), depth) }
    }

    /// Surface extent, `(0, 0, width - 1, height - 1)`.
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.stack.bounds()
    }

    #[inline]
    pub fn offset(&self) -> Point {
        self.stack.offset()
    }

    #[inline]
    pub fn clip(&self) -> Rect {
        self.stack.clip()
    }

    pub fn stack(&self) -> &ClipStack {
        &self.stack
    }

    /// Swaps in `stack`, returning the one it replaces.
    pub fn replace_stack(&mut self, stack: ClipStack) -> ClipStack {
        std::mem::replace(&mut self.stack, stack)
    }

    pub fn push_offset(&mut self, dx: i32, dy: i32) -> bool {
        self.stack.push_offset(dx, dy)
    }

    pub fn pop_offset(&mut self) -> bool {
        self.stack.pop_offset()
    }

    pub fn push_clip(&mut self, rect: Rect) -> bool {
        self.stack.push_clip(rect)
    }

    pub fn pop_clip(&mut self) -> bool {
        self.stack.pop_clip()
    }

    pub fn reset(&mut self) {
        self.stack.reset();
    }

    // ── primitives ────────────────────────────────────────────────────────

    /// Fills a rectangle given in local coordinates.
    pub fn draw_box(&mut self, rect: Rect, color: Color, blend: BlendMode) {
        let off = self.stack.offset();
        if let Some(dest) = rect.translate(off.x, off.y).intersect(self.stack.clip()) {
            self.surface.fill_box(dest, color, blend);
        }
    }

    /// Draws a one-pixel-wide line of `length` pixels starting at local `(x, y)`.
    pub fn draw_line(&mut self, x: i32, y: i32, length: i32, orientation: Orientation, color: Color) {
        let off = self.stack.offset();
        let line = LineSeg { x, y, length, orientation }.translate(off.x, off.y);
        if let Some(visible) = self.stack.clip().clip_line(line) {
            self.surface.draw_span(visible, color);
        }
    }

    /// Copies `image` with its top-left corner at local `(x, y)`.
    pub fn blit(&mut self, x: i32, y: i32, image: &Image<'_>, blend: BlendMode) {
        if let Some((dest, src)) = self.place(x, y, image.bounds()) {
            self.surface.blit(dest, image, src, blend);
        }
    }

    /// Blends `color` through a glyph coverage mask placed at local `(x, y)`.
    pub fn blend_glyph(&mut self, x: i32, y: i32, mask: &Mask<'_>, color: Color) {
        if let Some((dest, src)) = self.place(x, y, mask.bounds()) {
            self.surface.blend_mask(dest, mask, src, color);
        }
    }

    /// Clipped destination for a source of `extent` placed at local `(x, y)`,
    /// plus the source pixel landing on its top-left corner.
    fn place(&self, x: i32, y: i32, extent: Rect) -> Option<(Rect, Point)> {
        let off = self.stack.offset();
        let full = extent.translate(off.x + x, off.y + y);
        let dest = full.intersect(self.stack.clip())?;
        Some((dest, Point::new(dest.left - full.left, dest.top - full.top)))
    }
}
