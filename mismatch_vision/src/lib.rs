// THEORY:
// This file is the entry point for the `mismatch_vision` library crate. It exposes
// the `ComparisonPipeline` (one reference/candidate pair at a time) and the
// `BatchComparator` (many independent pairs concurrently) as the high-level
// interface. The individual layers live in `core_modules` and stay public for
// callers that want to run or test a single stage:
//
//   difference_mask -> region_detector -> region_grouper -> mismatch
//
// Decoding, encoding and writing images are helpers around the core, not part of
// it; they live in `core_modules::utils::image_helper`.

pub mod batch_pipeline;
pub mod config;
pub mod core_modules;
pub mod error;
pub mod pipeline;

pub use batch_pipeline::{BatchComparator, PairSource};
pub use config::{DetectorConfig, GroupingMode};
pub use core_modules::bounds::Bounds;
pub use core_modules::mismatch::{MismatchRecord, MismatchRegion};
pub use error::{MismatchError, Result};
pub use pipeline::{ComparisonPipeline, ComparisonReport, ReportSummary};
