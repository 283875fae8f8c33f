pub mod bounds;
pub mod difference_mask;
pub mod mismatch;
pub mod raw_region;
pub mod region_detector;
pub mod region_group;
pub mod region_grouper;
pub mod utils;
