//! Error types for spectral estimation and probe table handling

use thiserror::Error;

/// Precondition violations reported by the estimator
///
/// Rate mismatches are not errors, they travel as
/// [`AccuracyWarning`](crate::signal::AccuracyWarning) next to the result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpectralError {
    #[error("Signal lengths differ: {left} vs {right} samples")]
    LengthMismatch { left: usize, right: usize },

    #[error("Signals are not sampled on the same time base")]
    SamplingMismatch,

    #[error("Timestamps must be in ascending order (violated at index {index})")]
    TimestampsNotAscending { index: usize },

    #[error("Wall distance must be in ascending order (violated at index {index})")]
    WallDistanceNotAscending { index: usize },

    #[error("Need at least {required} samples, found {found}")]
    InsufficientSamples { required: usize, found: usize },

    #[error("Sampling frequency must be positive and finite (got {0})")]
    InvalidSamplingRate(f64),

    #[error("Resampling at {requested_fs} Hz needs more than {limit} grid points")]
    GridTooLarge { requested_fs: f64, limit: usize },

    #[error("Sampling interval must be positive and finite (got {0})")]
    InvalidInterval(f64),

    #[error("Invalid Welch segmentation: segment {segment_len}, overlap {overlap}, FFT length {nfft}")]
    InvalidSegment {
        segment_len: usize,
        overlap: usize,
        nfft: usize,
    },

    #[error("FFT processing failed: {0}")]
    Transform(String),
}

/// Errors raised while reading or writing probe tables
#[derive(Error, Debug)]
pub enum TableError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Table has no header line")]
    EmptyTable,

    #[error("Row {line} has {found} values, header declares {expected}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Cannot parse '{token}' on line {line} as a number")]
    Parse { line: usize, token: String },

    #[error("Column '{0}' not found")]
    MissingColumn(String),

    #[error("Output columns differ in length")]
    ColumnLength,

    #[error("Table shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}
