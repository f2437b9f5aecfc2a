use super::{LineSeg, Orientation, Point};

/// Axis-aligned integer rectangle in pixels (top-left origin).
///
/// Bounds are **inclusive** on all four sides: a rectangle built with
/// [`Rect::with_size`]`(x, y, w, h)` covers columns `x ..= x + w - 1` and rows
/// `y ..= y + h - 1`.
///
/// A rectangle may be stored denormalized (`left > right` or `top > bottom`),
/// for example when built from two arbitrary corners. Geometric queries treat
/// such a rectangle as empty; call [`normalized`](Self::normalized) first when
/// the corners may be swapped.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Canonical empty rectangle.
    pub const EMPTY: Rect = Rect::new(0, 0, -1, -1);

    /// Rectangle from raw corner coordinates, stored as given.
    #[inline]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Rectangle from an origin and a size.
    ///
    /// A width or height `<= 0` produces an empty rectangle. Corners
    /// saturate at the `i32` range.
    #[inline]
    pub const fn with_size(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            right: left.saturating_add(width.saturating_sub(1)),
            bottom: top.saturating_add(height.saturating_sub(1)),
        }
    }

    /// Overwrites all four corners.
    #[inline]
    pub fn set(&mut self, left: i32, top: i32, right: i32, bottom: i32) {
        *self = Self::new(left, top, right, bottom);
    }

    /// Overwrites the rectangle from an origin and a size.
    #[inline]
    pub fn set_size(&mut self, left: i32, top: i32, width: i32, height: i32) {
        *self = Self::with_size(left, top, width, height);
    }

    #[inline]
    pub const fn origin(self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Number of columns covered; `0` for an empty rectangle.
    #[inline]
    pub const fn width(self) -> i32 {
        if self.right < self.left { 0 } else { self.right.saturating_sub(self.left).saturating_add(1) }
    }

    /// Number of rows covered; `0` for an empty rectangle.
    #[inline]
    pub const fn height(self) -> i32 {
        if self.bottom < self.top { 0 } else { self.bottom.saturating_sub(self.top).saturating_add(1) }
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.left > self.right || self.top > self.bottom
    }

    /// Pixel count, `0` when empty.
    #[inline]
    pub fn area(self) -> i64 {
        self.width() as i64 * self.height() as i64
    }

    /// Returns the rectangle with its corners ordered so `left <= right` and
    /// `top <= bottom`.
    #[inline]
    pub fn normalized(self) -> Self {
        Self {
            left: self.left.min(self.right),
            top: self.top.min(self.bottom),
            right: self.left.max(self.right),
            bottom: self.top.max(self.bottom),
        }
    }

    #[inline]
    pub fn normalize(&mut self) {
        *self = self.normalized();
    }

    /// Inclusive containment on every edge.
    #[inline]
    pub fn contains(self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }

    /// Returns `true` if `other` lies entirely inside `self`.
    #[inline]
    pub fn contains_rect(self, other: Rect) -> bool {
        !other.is_empty()
            && other.left >= self.left
            && other.right <= self.right
            && other.top >= self.top
            && other.bottom <= self.bottom
    }

    #[inline]
    pub fn translate(self, dx: i32, dy: i32) -> Self {
        Self {
            left: self.left.saturating_add(dx),
            top: self.top.saturating_add(dy),
            right: self.right.saturating_add(dx),
            bottom: self.bottom.saturating_add(dy),
        }
    }

    /// Overlapping region, or `None` if the rectangles are disjoint or either
    /// is empty.
    pub fn intersect(self, other: Rect) -> Option<Rect> {
        if self.is_empty() || other.is_empty() {
            return None;
        }

        let r = Rect {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        };

        if r.is_empty() { None } else { Some(r) }
    }

    /// Returns `true` if the rectangles overlap or share an edge.
    ///
    /// Diagonal corner contact counts as touching.
    pub fn touches(self, other: Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.left <= other.right.saturating_add(1)
            && other.left <= self.right.saturating_add(1)
            && self.top <= other.bottom.saturating_add(1)
            && other.top <= self.bottom.saturating_add(1)
    }

    /// Grows `self` to the bounding box of `self` and `other`.
    ///
    /// With `only_if_touching`, nothing is mutated and `false` is returned
    /// unless the two rectangles overlap or are adjacent.
    pub fn join(&mut self, other: Rect, only_if_touching: bool) -> bool {
        if other.is_empty() {
            return false;
        }
        if self.is_empty() {
            if only_if_touching {
                return false;
            }
            *self = other;
            return true;
        }
        if only_if_touching && !self.touches(other) {
            return false;
        }

        self.left = self.left.min(other.left);
        self.top = self.top.min(other.top);
        self.right = self.right.max(other.right);
        self.bottom = self.bottom.max(other.bottom);
        true
    }

    /// Bounding box of every non-empty rectangle yielded by `rects`.
    pub fn union_of(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
        let mut it = rects.into_iter().filter(|r| !r.is_empty());
        let mut acc = it.next()?;
        for r in it {
            acc.join(r, false);
        }
        Some(acc)
    }

    /// Clips a one-pixel-wide horizontal or vertical segment against `self`.
    ///
    /// Returns the visible part with its start and length adjusted, or `None`
    /// when nothing of the segment lies inside.
    pub fn clip_line(self, line: LineSeg) -> Option<LineSeg> {
        if self.is_empty() || line.length <= 0 {
            return None;
        }

        let LineSeg { x, y, length, orientation } = line;
        match orientation {
            Orientation::Horizontal => {
                if y < self.top || y > self.bottom {
                    return None;
                }
                let start = x.max(self.left);
                let end = x.saturating_add(length - 1).min(self.right);
                if start > end {
                    return None;
                }
                Some(LineSeg::horizontal(start, y, end.saturating_sub(start).saturating_add(1)))
            }
            Orientation::Vertical => {
                if x < self.left || x > self.right {
                    return None;
                }
                let start = y.max(self.top);
                let end = y.saturating_add(length - 1).min(self.bottom);
                if start > end {
                    return None;
                }
                Some(LineSeg::vertical(x, start, end.saturating_sub(start).saturating_add(1)))
            }
        }
    }
}
