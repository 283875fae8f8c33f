// THEORY:
// The `region_detector` is the engine of the detection layer. It turns the binary
// difference mask into a list of `RawRegion`s, one per visually separate patch of
// change.
//
// Algorithm:
// 1.  **Border following**: the mask is traced with a Suzuki-Abe border follower
//     (`imageproc::contours::find_contours`), which reports every outer border and
//     every hole border together with its parent in the nesting hierarchy.
// 2.  **Background frame**: the mask is copied into a canvas one pixel larger on
//     every side before tracing. The tracer misclassifies components touching the
//     left edge otherwise, so border points are shifted back by (-1, -1) afterwards.
// 3.  **External borders only**: only outer borders without a parent are kept. A
//     ring of changed pixels is one region, not a region plus a hole plus whatever
//     island sits inside the hole.
// 4.  **Summarizing**: each kept border becomes a `RawRegion` with its tight bounding
//     box and centroid. Ids follow the tracer's raster-scan discovery order.
// 5.  **Stateless utility**: like the rest of the core, detection is a pure function
//     of its input mask.

use image::{GrayImage, imageops};
use imageproc::contours::{BorderType, find_contours};
use imageproc::point::Point;

use crate::core_modules::raw_region::RawRegion;

pub mod region_detector {
    use super::*;

    /// Extracts the external connected components of a binary mask.
    /// Any non-zero pixel is foreground.
    pub fn find_regions(mask: &GrayImage) -> Vec<RawRegion> {
        let (width, height) = mask.dimensions();
        if width == 0 || height == 0 {
            return Vec::new();
        }

        let mut framed = GrayImage::new(width + 2, height + 2);
        imageops::replace(&mut framed, mask, 1, 1);

        let regions: Vec<RawRegion> = find_contours::<i32>(&framed)
            .into_iter()
            .filter(|contour| contour.border_type == BorderType::Outer && contour.parent.is_none())
            .enumerate()
            .filter_map(|(id, contour)| {
                let points = contour
                    .points
                    .into_iter()
                    .map(|p| Point::new(p.x - 1, p.y - 1))
                    .collect();
                RawRegion::from_border(id, points)
            })
            .collect();

        tracing::debug!(regions = regions.len(), "region detection: external components");
        regions
    }
}
