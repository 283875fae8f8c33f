// THEORY:
// The mismatch module is the finalization layer. It turns the abstract groups of
// the clustering layer into concrete, reportable evidence: a numbered rectangle
// plus a "before" and "after" picture of it.
//
// Key steps:
// 1.  **Framing**: each group's union box is padded by the margin so the reader
//     sees the mismatch in context, then clipped to the image. Clipping is the only
//     condition this engine recovers from internally; it never produces negative
//     coordinates or empty crops.
// 2.  **Numbering**: records are numbered from 1 in group-creation order.
// 3.  **Evidence**: both images are cropped at the same rectangle. The candidate
//     crop gets an outline around the un-padded mismatch so the eye lands on it;
//     the reference crop stays untouched. Crops are owned copies, so the caller's
//     images are never modified.

use image::{Rgba, RgbaImage, imageops};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use serde::{Deserialize, Serialize};

use crate::core_modules::bounds::Bounds;
use crate::core_modules::region_group::RegionGroup;

/// The geometry of one finalized mismatch, valid in both images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MismatchRegion {
    /// 1-based position in group-creation order.
    pub index: usize,
    /// The margin-expanded, clipped crop rectangle.
    pub bounds: Bounds,
    /// The union of the grouped regions, without margin.
    pub highlight: Bounds,
    /// How many raw regions were merged into this mismatch.
    pub region_count: usize,
}

/// A finalized mismatch with its before/after crops.
#[derive(Debug, Clone)]
pub struct MismatchRecord {
    pub region: MismatchRegion,
    /// Crop of the candidate image, with the mismatch outlined.
    pub candidate_crop: RgbaImage,
    /// Crop of the reference image at the same coordinates.
    pub reference_crop: RgbaImage,
}

impl MismatchRecord {
    pub fn index(&self) -> usize {
        self.region.index
    }

    pub fn bounds(&self) -> Bounds {
        self.region.bounds
    }
}

/// Pads, clips and numbers every group.
pub fn finalize_groups(groups: &[RegionGroup], width: u32, height: u32, margin: u32) -> Vec<MismatchRegion> {
    groups
        .iter()
        .filter(|group| !group.is_empty())
        .enumerate()
        .map(|(i, group)| {
            let highlight = group.bounds();
            MismatchRegion {
                index: i + 1,
                bounds: highlight.expand_clipped(margin, width, height),
                highlight,
                region_count: group.len(),
            }
        })
        .collect()
}

/// Copies `bounds` out of `image`.
pub fn crop(image: &RgbaImage, bounds: Bounds) -> RgbaImage {
    imageops::crop_imm(image, bounds.x, bounds.y, bounds.width, bounds.height).to_image()
}

/// Draws a `thickness`-pixel outline just outside `highlight`. Lines falling
/// outside the canvas are clipped.
pub fn draw_highlight(canvas: &mut RgbaImage, highlight: Bounds, color: Rgba<u8>, thickness: u32) {
    for ring in 1..=thickness {
        let rect = Rect::at(highlight.x as i32 - ring as i32, highlight.y as i32 - ring as i32).of_size(
            highlight.width.saturating_add(ring.saturating_mul(2)),
            highlight.height.saturating_add(ring.saturating_mul(2)),
        );
        draw_hollow_rect_mut(canvas, rect, color);
    }
}

/// Produces the before/after crops for a finalized region.
pub fn capture(
    region: MismatchRegion,
    reference: &RgbaImage,
    candidate: &RgbaImage,
    color: Rgba<u8>,
    thickness: u32,
) -> MismatchRecord {
    let mut candidate_crop = crop(candidate, region.bounds);
    draw_highlight(
        &mut candidate_crop,
        region.highlight.relative_to(&region.bounds),
        color,
        thickness,
    );
    MismatchRecord {
        region,
        candidate_crop,
        reference_crop: crop(reference, region.bounds),
    }
}
