// THEORY:
// The difference mask is the first, purely per-pixel stage of a comparison. It
// collapses two colour images into a single binary answer per pixel: "did this
// location change enough to matter?"
//
// 1.  **Intensity**: both images are reduced to one luma channel, so a change in
//     any colour channel registers as a change in brightness.
// 2.  **Delta**: the absolute per-pixel difference of the two luma grids.
// 3.  **Threshold**: deltas at or above the noise threshold become foreground (255),
//     everything else background (0). Anti-aliasing and compression noise below the
//     threshold disappear here, before any geometry is computed.
//
// Callers are responsible for ensuring the two images share the same dimensions.

use image::{DynamicImage, GrayImage};

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// Converts an image of any colour type into a single luma channel.
pub fn to_intensity(image: &DynamicImage) -> GrayImage {
    image.to_luma8()
}

/// Per-pixel `|reference - candidate|` of two equally sized luma images.
pub fn absolute_difference(reference: &GrayImage, candidate: &GrayImage) -> GrayImage {
    debug_assert_eq!(reference.dimensions(), candidate.dimensions());
    let (width, height) = reference.dimensions();
    let mut delta = GrayImage::new(width, height);
    for ((d, r), c) in delta.iter_mut().zip(reference.iter()).zip(candidate.iter()) {
        *d = r.abs_diff(*c);
    }
    delta
}

/// Binarizes a delta image: `value >= threshold` is foreground.
pub fn threshold_mask(delta: &GrayImage, threshold: u8) -> GrayImage {
    let (width, height) = delta.dimensions();
    let mut mask = GrayImage::new(width, height);
    for (m, d) in mask.iter_mut().zip(delta.iter()) {
        *m = if *d >= threshold { FOREGROUND } else { BACKGROUND };
    }
    mask
}

/// Runs the whole stage: intensity, delta and threshold.
pub fn difference_mask(reference: &DynamicImage, candidate: &DynamicImage, threshold: u8) -> GrayImage {
    let delta = absolute_difference(&to_intensity(reference), &to_intensity(candidate));
    threshold_mask(&delta, threshold)
}

/// Number of foreground pixels in a mask.
pub fn foreground_count(mask: &GrayImage) -> usize {
    mask.iter().filter(|&&v| v == FOREGROUND).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn identical_images_produce_empty_mask() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 4, Luma([120])));
        let mask = difference_mask(&img, &img, 30);
        assert_eq!(mask.dimensions(), (8, 4));
        assert_eq!(foreground_count(&mask), 0);
    }

    #[test]
    fn delta_is_symmetric() {
        let a = GrayImage::from_pixel(2, 2, Luma([10]));
        let b = GrayImage::from_pixel(2, 2, Luma([200]));
        assert_eq!(absolute_difference(&a, &b), absolute_difference(&b, &a));
        assert_eq!(absolute_difference(&a, &b).get_pixel(0, 0).0[0], 190);
    }

    #[test]
    fn threshold_is_inclusive() {
        let mut delta = GrayImage::new(3, 1);
        delta.put_pixel(0, 0, Luma([29]));
        delta.put_pixel(1, 0, Luma([30]));
        delta.put_pixel(2, 0, Luma([31]));
        let mask = threshold_mask(&delta, 30);
        assert_eq!(mask.get_pixel(0, 0).0[0], BACKGROUND);
        assert_eq!(mask.get_pixel(1, 0).0[0], FOREGROUND);
        assert_eq!(mask.get_pixel(2, 0).0[0], FOREGROUND);
    }
}
