use thiserror::Error;

/// Top-level error type for the mismatch detection engine.
///
/// Finding zero mismatches is a valid outcome and never surfaces as an error.
#[derive(Debug, Error)]
pub enum MismatchError {
    #[error("image dimensions differ: reference is {reference:?}, candidate is {candidate:?}")]
    DimensionMismatch {
        reference: (u32, u32),
        candidate: (u32, u32),
    },

    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("image decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("batch worker unavailable: {0}")]
    WorkerUnavailable(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MismatchError>;
