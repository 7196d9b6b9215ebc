use thiserror::Error;

use crate::enums::SampleType;

#[derive(Debug, Error)]
pub enum StackError {
    #[error("Image stack needs at least one slice")]
    EmptyStack,

    #[error("Inconsistent slice dimensions at index {index}: expected {expected:?}, got {found:?}")]
    InconsistentDimensions {
        index: usize,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("Unsupported slice rank {0} (expected 2 or 3)")]
    UnsupportedRank(usize),

    #[error("Unknown lookup table: {0}")]
    UnknownLut(String),

    #[error("No ROI attached and no explicit ranges given")]
    MissingRoi,

    #[error("Cannot map {channels}-channel {sample_type} data for display")]
    UnsupportedDisplay {
        channels: usize,
        sample_type: SampleType,
    },

    #[error("Invalid display range: low {low} is above high {high}")]
    InvalidDisplayRange { low: f64, high: f64 },

    #[error("Pixel data does not match the image dimensions")]
    InvalidImageBuffer,

    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}
