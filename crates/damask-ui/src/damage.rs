//! Bounded damage accumulation.
//!
//! [`DirtyRects`] collects the screen-space rectangles that must be
//! repainted before the next frame. The set is conservative (it always covers
//! every rectangle added since the last [`drain`](DirtyRects::drain)) and
//! bounded (it never holds more than its capacity), trading precision for the
//! bound when it overflows.

use damask_engine::coords::Rect;

/// Fixed-capacity list of damage rectangles with coalescing insertion.
#[derive(Debug, Clone)]
pub struct DirtyRects {
    rects: Vec<Rect>,
    capacity: usize,
}

impl DirtyRects {
    /// Creates an empty set holding at most `capacity` rectangles (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { rects: Vec::with_capacity(capacity), capacity }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Rect] {
        &self.rects
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rect> {
        self.rects.iter()
    }

    /// Bounding box of all pending damage.
    pub fn bounds(&self) -> Option<Rect> {
        Rect::union_of(self.rects.iter().copied())
    }

    /// Records `rect` as damaged.
    ///
    /// 1. Merged into the first entry it overlaps or touches.
    /// 2. Otherwise appended while there is room.
    /// 3. Otherwise every entry collapses into entry 0 and `rect` becomes
    ///    entry 1, leaving two entries.
    ///
    /// Empty rectangles are ignored.
    pub fn add(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }

        if self.rects.iter_mut().any(|entry| entry.join(rect, true)) {
            return;
        }

        if self.rects.len() < self.capacity {
            self.rects.push(rect);
            return;
        }

        let Some(mut envelope) = Rect::union_of(self.rects.iter().copied()) else {
            self.rects.push(rect);
            return;
        };

        log::trace!("damage list full ({} entries); collapsing", self.rects.len());
        self.rects.clear();
        if self.capacity == 1 {
            envelope.join(rect, false);
            self.rects.push(envelope);
        } else {
            self.rects.push(envelope);
            self.rects.push(rect);
        }
    }

    /// Takes every pending rectangle, leaving the set empty for the next frame.
    pub fn drain(&mut self) -> Vec<Rect> {
        std::mem::replace(&mut self.rects, Vec::with_capacity(self.capacity))
    }

    pub fn clear(&mut self) {
        self.rects.clear();
    }
}

impl Default for DirtyRects {
    fn default() -> Self {
        Self::new(crate::UiConfig::default().dirty_capacity)
    }
}
