// THEORY:
// The `pipeline` module is the top-level API of the engine. It chains the layers
// into a single call: given a reference image and a candidate image, return a
// numbered list of visual mismatches with before/after crops.
//
// Stages:
// 1.  Validation: equal, non-zero dimensions, checked before any pixel is read.
// 2.  Difference mask: luma delta and noise threshold.
// 3.  Detection: external connected components become raw regions.
// 4.  Grouping: nearby regions are clustered.
// 5.  Finalization: margin, clipping, numbering and cropping.
//
// The pipeline only holds an immutable configuration. One instance can serve any
// number of comparisons, sequentially or from several threads at once.

use std::path::Path;

use image::{DynamicImage, Rgba};
use serde::Serialize;

use crate::core_modules::difference_mask::{self, foreground_count};
use crate::core_modules::mismatch::{self, MismatchRecord, MismatchRegion};
use crate::core_modules::raw_region::RawRegion;
use crate::core_modules::region_detector::region_detector;
use crate::core_modules::region_group::RegionGroup;
use crate::core_modules::region_grouper;
use crate::core_modules::utils::image_helper;
use crate::error::{MismatchError, Result};

// Re-export key data structures for the public API.
pub use crate::config::{DetectorConfig, GroupingMode};
pub use crate::core_modules::bounds::Bounds;

/// The outcome of one comparison.
#[derive(Debug, Clone)]
pub struct ComparisonReport {
    pub width: u32,
    pub height: u32,
    /// Number of connected difference components found before grouping.
    pub raw_region_count: usize,
    /// Finalized mismatches, in index order.
    pub mismatches: Vec<MismatchRecord>,
}

/// Serializable summary of a `ComparisonReport`, without pixel data.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub width: u32,
    pub height: u32,
    pub raw_region_count: usize,
    pub mismatches: Vec<MismatchRegion>,
}

impl ComparisonReport {
    /// True when no mismatch was found.
    pub fn is_match(&self) -> bool {
        self.mismatches.is_empty()
    }

    pub fn regions(&self) -> Vec<MismatchRegion> {
        self.mismatches.iter().map(|m| m.region).collect()
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            width: self.width,
            height: self.height,
            raw_region_count: self.raw_region_count,
            mismatches: self.regions(),
        }
    }
}

/// The main entry point for comparing a reference image against a candidate.
#[derive(Debug, Clone)]
pub struct ComparisonPipeline {
    config: DetectorConfig,
}

impl ComparisonPipeline {
    /// Builds a pipeline after validating `config`.
    pub fn new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Decodes two image files and compares them.
    pub fn compare_files(&self, reference: impl AsRef<Path>, candidate: impl AsRef<Path>) -> Result<ComparisonReport> {
        let reference = image_helper::load(reference)?;
        let candidate = image_helper::load(candidate)?;
        self.compare(&reference, &candidate)
    }

    /// Runs every stage and returns the numbered mismatches with their crops.
    pub fn compare(&self, reference: &DynamicImage, candidate: &DynamicImage) -> Result<ComparisonReport> {
        let (width, height) = check_dimensions(reference, candidate)?;

        let (regions, groups) = self.detect_and_group(reference, candidate);
        let finalized = mismatch::finalize_groups(&groups, width, height, self.config.margin);

        let reference_rgba = reference.to_rgba8();
        let candidate_rgba = candidate.to_rgba8();
        let color = Rgba(self.config.highlight_color);
        let mismatches: Vec<MismatchRecord> = finalized
            .into_iter()
            .map(|region| {
                mismatch::capture(
                    region,
                    &reference_rgba,
                    &candidate_rgba,
                    color,
                    self.config.highlight_thickness,
                )
            })
            .collect();

        tracing::info!(
            width,
            height,
            raw_regions = regions.len(),
            mismatches = mismatches.len(),
            "comparison complete"
        );

        Ok(ComparisonReport {
            width,
            height,
            raw_region_count: regions.len(),
            mismatches,
        })
    }

    /// Like `compare`, but stops after finalization and returns rectangles only.
    pub fn locate(&self, reference: &DynamicImage, candidate: &DynamicImage) -> Result<Vec<MismatchRegion>> {
        let (width, height) = check_dimensions(reference, candidate)?;
        let (_, groups) = self.detect_and_group(reference, candidate);
        Ok(mismatch::finalize_groups(&groups, width, height, self.config.margin))
    }

    /// Returns the raw regions and the groups they were folded into.
    pub fn group(&self, reference: &DynamicImage, candidate: &DynamicImage) -> Result<(Vec<RawRegion>, Vec<RegionGroup>)> {
        check_dimensions(reference, candidate)?;
        Ok(self.detect_and_group(reference, candidate))
    }

    fn detect_and_group(&self, reference: &DynamicImage, candidate: &DynamicImage) -> (Vec<RawRegion>, Vec<RegionGroup>) {
        let mask = difference_mask::difference_mask(reference, candidate, self.config.threshold);
        tracing::debug!(
            changed_pixels = foreground_count(&mask),
            threshold = self.config.threshold,
            "difference mask computed"
        );

        let regions = region_detector::find_regions(&mask);
        let groups = region_grouper::group_regions(
            &regions,
            self.config.grouping_distance,
            self.config.grouping_mode,
        );
        (regions, groups)
    }
}

impl Default for ComparisonPipeline {
    fn default() -> Self {
        Self {
            config: DetectorConfig::default(),
        }
    }
}

fn check_dimensions(reference: &DynamicImage, candidate: &DynamicImage) -> Result<(u32, u32)> {
    let reference_dims = (reference.width(), reference.height());
    let candidate_dims = (candidate.width(), candidate.height());
    if reference_dims != candidate_dims {
        return Err(MismatchError::DimensionMismatch {
            reference: reference_dims,
            candidate: candidate_dims,
        });
    }
    let (width, height) = reference_dims;
    if width == 0 || height == 0 {
        return Err(MismatchError::EmptyImage { width, height });
    }
    Ok(reference_dims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{RgbImage, Rgb};

    #[test]
    fn rejects_different_dimensions() {
        let reference = DynamicImage::ImageRgb8(RgbImage::new(400, 800));
        let candidate = DynamicImage::ImageRgb8(RgbImage::new(400, 801));
        let err = ComparisonPipeline::default().compare(&reference, &candidate).unwrap_err();
        match err {
            MismatchError::DimensionMismatch { reference, candidate } => {
                assert_eq!(reference, (400, 800));
                assert_eq!(candidate, (400, 801));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_empty_images() {
        let empty = DynamicImage::ImageRgb8(RgbImage::new(0, 10));
        let err = ComparisonPipeline::default().compare(&empty, &empty).unwrap_err();
        assert!(matches!(err, MismatchError::EmptyImage { .. }));
    }

    #[test]
    fn rejects_invalid_config() {
        let config = DetectorConfig {
            highlight_thickness: 0,
            ..Default::default()
        };
        assert!(ComparisonPipeline::new(config).is_err());
    }

    #[test]
    fn subthreshold_noise_is_ignored() {
        let reference = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 64, Rgb([100, 100, 100])));
        let candidate = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 64, Rgb([110, 110, 110])));
        let report = ComparisonPipeline::default().compare(&reference, &candidate).unwrap();
        assert!(report.is_match());
        assert_eq!(report.raw_region_count, 0);
    }

    #[test]
    fn summary_serializes() {
        let reference = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 64, Rgb([0, 0, 0])));
        let mut candidate = RgbImage::from_pixel(64, 64, Rgb([0, 0, 0]));
        candidate.put_pixel(30, 30, Rgb([255, 255, 255]));
        let report = ComparisonPipeline::default()
            .compare(&reference, &DynamicImage::ImageRgb8(candidate))
            .unwrap();
        let json = serde_json::to_value(report.summary()).unwrap();
        assert_eq!(json["mismatches"][0]["index"], 1);
        assert_eq!(json["mismatches"][0]["highlight"]["x"], 30);
        assert_eq!(json["mismatches"][0]["bounds"]["x"], 0);
    }
}
