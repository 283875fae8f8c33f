// THEORY:
// A `RawRegion` is the unit of output of the detection layer: one connected patch
// of changed pixels, described by its outer border. It is the bridge between the
// pixel world of the difference mask and the geometric world of the grouper.
//
// Key properties:
// 1.  **Immutable snapshot**: a region is created once per connected component and
//     never mutated afterwards. Grouping only references regions, it never edits them.
// 2.  **Two views of the same shape**: the axis-aligned `bounds` feed the final crop,
//     while the raw border `points` feed the rotated-rectangle test the grouper uses
//     to decide whether a new region belongs to an existing group.
// 3.  **Detection order identity**: `id` is the position in detection order. The
//     single-pass grouper is order-sensitive, so this order is part of the result.

use imageproc::point::Point;

use crate::core_modules::bounds::Bounds;

/// One connected component of the difference mask.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRegion {
    /// Position of this region in detection order, starting at 0.
    pub id: usize,
    /// The tight axis-aligned box around every border pixel.
    pub bounds: Bounds,
    /// `(x + w/2, y + h/2)` of `bounds`.
    pub centroid: (f64, f64),
    /// The outer border pixels of the component.
    pub points: Vec<Point<i32>>,
}

impl RawRegion {
    /// Builds a region from its border pixels. Returns `None` for an empty border.
    pub fn from_border(id: usize, points: Vec<Point<i32>>) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let bounds = Bounds::from_extents(min_x as u32, min_y as u32, max_x as u32, max_y as u32);
        Some(Self {
            id,
            bounds,
            centroid: bounds.center(),
            points,
        })
    }

    /// Builds a region covering a solid rectangle, with its four corners as border.
    pub fn from_bounds(id: usize, bounds: Bounds) -> Self {
        let (x0, y0) = (bounds.x as i32, bounds.y as i32);
        let (x1, y1) = (bounds.right() as i32 - 1, bounds.bottom() as i32 - 1);
        Self {
            id,
            bounds,
            centroid: bounds.center(),
            points: vec![
                Point::new(x0, y0),
                Point::new(x1, y0),
                Point::new(x1, y1),
                Point::new(x0, y1),
            ],
        }
    }

    /// Euclidean distance from this region's centroid to `point`.
    pub fn distance_to(&self, point: (f64, f64)) -> f64 {
        let dx = self.centroid.0 - point.0;
        let dy = self.centroid.1 - point.1;
        (dx * dx + dy * dy).sqrt()
    }
}
