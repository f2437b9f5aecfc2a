/// Direction of a one-pixel-wide line segment.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// One-pixel-wide axis-aligned segment: `length` pixels starting at `(x, y)`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct LineSeg {
    pub x: i32,
    pub y: i32,
    pub length: i32,
    pub orientation: Orientation,
}

impl LineSeg {
    #[inline]
    pub const fn horizontal(x: i32, y: i32, length: i32) -> Self {
        Self { x, y, length, orientation: Orientation::Horizontal }
    }

    #[inline]
    pub const fn vertical(x: i32, y: i32, length: i32) -> Self {
        Self { x, y, length, orientation: Orientation::Vertical }
    }

    #[inline]
    pub fn translate(self, dx: i32, dy: i32) -> Self {
        Self { x: self.x + dx, y: self.y + dy, ..self }
    }
}
