use serde::{Deserialize, Serialize};

use crate::error::{MismatchError, Result};

/// Default minimum grayscale delta (0-255) for a pixel to count as different.
pub const DEFAULT_THRESHOLD: u8 = 30;
/// Default maximum centroid distance, in pixels, for a region to join a group.
pub const DEFAULT_GROUPING_DISTANCE: f64 = 50.0;
/// Default padding, in pixels, added around each group before cropping.
pub const DEFAULT_MARGIN: u32 = 50;
/// Thickest outline `validate` accepts.
pub const MAX_HIGHLIGHT_THICKNESS: u32 = 64;

/// How raw difference regions are clustered into mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    /// Regions are visited once in detection order and join the first existing
    /// group whose enclosing-rectangle center lies within the grouping distance.
    /// Groups that drift close to each other later are not merged.
    #[default]
    SinglePass,
    /// Any two regions whose centroids lie within the grouping distance end up
    /// in the same group, directly or through a chain of neighbours.
    Transitive,
}

/// Tunable parameters for a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// A pixel is foreground in the difference mask when `|ref - cand| >= threshold`.
    pub threshold: u8,
    /// Centroid distance (exclusive) under which a region joins a group.
    pub grouping_distance: f64,
    /// Context padding added on every side of a group before clipping.
    pub margin: u32,
    pub grouping_mode: GroupingMode,
    /// RGBA colour of the outline drawn on the candidate crop.
    pub highlight_color: [u8; 4],
    /// Outline thickness in pixels.
    pub highlight_thickness: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            grouping_distance: DEFAULT_GROUPING_DISTANCE,
            margin: DEFAULT_MARGIN,
            grouping_mode: GroupingMode::SinglePass,
            highlight_color: [255, 0, 0, 255],
            highlight_thickness: 2,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.grouping_distance.is_finite() || self.grouping_distance < 0.0 {
            return Err(MismatchError::InvalidConfig(format!(
                "grouping_distance must be a finite, non-negative number, got {}",
                self.grouping_distance
            )));
        }
        if self.highlight_thickness == 0 || self.highlight_thickness > MAX_HIGHLIGHT_THICKNESS {
            return Err(MismatchError::InvalidConfig(format!(
                "highlight_thickness must be between 1 and {MAX_HIGHLIGHT_THICKNESS}, got {}",
                self.highlight_thickness
            )));
        }
        Ok(())
    }
}
