// THEORY:
// `Bounds` is the shared geometric vocabulary of the engine. Every stage speaks in
// axis-aligned pixel rectangles: the detector emits them for each connected
// component, the grouper unions them, and the finalizer pads and clips them before
// cropping. Keeping the arithmetic in one small, copyable type means the
// "never negative, never outside the image" rules live in exactly one place.
//
// Conventions:
// 1.  `x`/`y` are the inclusive top-left pixel; `right()`/`bottom()` are exclusive.
// 2.  A `Bounds` produced by this crate always has a non-zero width and height.
// 3.  All growth is saturating; clipping happens against an explicit image size.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Builds the rectangle covering the inclusive pixel extents `min..=max`.
    pub fn from_extents(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Geometric center, `(x + w/2, y + h/2)`.
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// The smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Bounds) -> Bounds {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Bounds {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }

    pub fn contains(&self, other: &Bounds) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// True when the rectangle lies inside `[0, width) x [0, height)`.
    pub fn is_within(&self, width: u32, height: u32) -> bool {
        self.width > 0 && self.height > 0 && self.right() <= width && self.bottom() <= height
    }

    /// Pads the rectangle by `margin` on every side, then clips it to an image of
    /// `width x height`. The left and top edges stop at zero instead of going negative.
    pub fn expand_clipped(&self, margin: u32, width: u32, height: u32) -> Bounds {
        let x0 = self.x.saturating_sub(margin).min(width);
        let y0 = self.y.saturating_sub(margin).min(height);
        let x1 = self.right().saturating_add(margin).min(width);
        let y1 = self.bottom().saturating_add(margin).min(height);
        Bounds {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }

    /// Re-expresses `self` in the coordinate space of `outer`'s top-left corner.
    /// `self` must lie inside `outer`.
    pub fn relative_to(&self, outer: &Bounds) -> Bounds {
        Bounds {
            x: self.x - outer.x,
            y: self.y - outer.y,
            width: self.width,
            height: self.height,
        }
    }
}
