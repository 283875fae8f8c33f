// THEORY:
// A `RegionGroup` is an in-progress cluster of raw regions that will become one
// mismatch. Where a `RawRegion` is a frozen snapshot, a group is the stateful,
// growing object of the grouping layer.
//
// 1.  **Identity is membership**: a group is the ordered list of region ids it has
//     absorbed. Its geometry is derived from the members, never stored separately
//     from them.
// 2.  **Exact union box**: the bounding box is the union of every member's box.
//     Union is associative, so growing it one member at a time gives exactly the
//     box of the full membership, whatever order the members arrive in.
// 3.  **Shape for proximity**: the group keeps every member's border pixels so it
//     can answer "where is your middle?" with the center of the minimum-area
//     rotated rectangle around all of them.
// 4.  **Short-lived**: groups exist only between detection and finalization.

use imageproc::geometry::min_area_rect;
use imageproc::point::Point;

use crate::core_modules::bounds::Bounds;
use crate::core_modules::raw_region::RawRegion;

/// A growing cluster of raw regions.
#[derive(Debug, Clone)]
pub struct RegionGroup {
    /// Ids of the member regions, in the order they joined.
    members: Vec<usize>,
    /// Union of the member boxes.
    bounds: Bounds,
    /// Border pixels of every member, concatenated.
    points: Vec<Point<i32>>,
}

impl RegionGroup {
    /// Starts a group with a single region.
    pub fn new(region: &RawRegion) -> Self {
        Self {
            members: vec![region.id],
            bounds: region.bounds,
            points: region.points.clone(),
        }
    }

    /// Adds a region and grows the union box to cover it.
    pub fn push(&mut self, region: &RawRegion) {
        self.members.push(region.id);
        self.bounds = self.bounds.union(&region.bounds);
        self.points.extend_from_slice(&region.points);
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The union of all member boxes.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Center of the minimum-area (possibly rotated) rectangle enclosing every
    /// member's border pixels. Corners are pixel indices, so half a pixel is added
    /// to match the exclusive-edge convention of `RawRegion::centroid`.
    pub fn enclosing_center(&self) -> (f64, f64) {
        if self.points.is_empty() {
            return self.bounds.center();
        }
        let corners = min_area_rect(&self.points);
        let (sx, sy) = corners
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x as f64, sy + p.y as f64));
        (sx / 4.0 + 0.5, sy / 4.0 + 0.5)
    }
}
