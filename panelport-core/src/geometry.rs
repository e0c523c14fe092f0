//! Pixel rectangles

use core::ops::Range;

/// Half-open pixel rectangle: `left..right` by `top..bottom`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Rect {
    /// Create from edge coordinates
    pub const fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create from an origin and a size, saturating at `u32::MAX`
    pub const fn from_size(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self::new(x, y, x.saturating_add(width), y.saturating_add(height))
    }

    pub const fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub const fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    /// True when the rectangle covers no pixel
    pub const fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Rect::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// Overlap of both, `None` when disjoint
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let r = Rect::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        );
        if r.is_empty() {
            None
        } else {
            Some(r)
        }
    }

    /// Widen horizontally to multiples of `step`, never past `limit`
    ///
    /// `left` rounds down, `right` rounds up.
    pub fn align_columns(&self, step: u32, limit: u32) -> Rect {
        let step = step.max(1);
        let left = self.left / step * step;
        let right = self.right.div_ceil(step) * step;
        Rect::new(left, self.top, right.min(limit), self.bottom)
    }

    /// Eight-row pages touched by the rectangle
    pub fn pages(&self) -> Range<u32> {
        self.top / 8..self.bottom.div_ceil(8)
    }
}
