//! Error types for the bootband library.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while resampling, reconstructing or summarizing series.
///
/// All variants are input-validation failures: retrying with the same
/// inputs fails the same way.
#[derive(Debug, Error)]
pub enum Error {
    /// Series is too short for block-length estimation or resampling.
    #[error("series must have at least {min} observations, but has {len}")]
    InsufficientData { len: usize, min: usize },

    /// Quantile bounds do not satisfy `0 <= lower < upper <= 1`.
    #[error("quantiles must satisfy 0 <= lower < upper <= 1, but are ({lower}, {upper})")]
    InvalidQuantile { lower: f64, upper: f64 },

    /// Two sequences that must be aligned have different lengths.
    #[error("{what} must have length {expected}, but has {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// An error metric was requested but there is no data to evaluate.
    #[error("cannot compute an error metric without {segment} data")]
    EmptySegment { segment: &'static str },

    /// Band summarization was requested over zero replicates.
    #[error("ensemble must contain at least one replicate")]
    EmptyEnsemble,

    /// Series is not aligned to the index it must share.
    #[error("{what} {position} does not match the shared index")]
    IndexMismatch { what: &'static str, position: usize },

    /// Timestamps are not strictly increasing.
    #[error("index must be strictly increasing, but is not at position {position}")]
    UnorderedIndex { position: usize },

    /// An observed level is needed at a date the level series lacks.
    #[error("no observed level at or before {date}")]
    MissingObservation { date: NaiveDate },

    /// Segments overlap or are out of order.
    #[error("segment starting at {next} does not follow segment ending at {prev}")]
    NonContiguousSegments { prev: NaiveDate, next: NaiveDate },

    /// The random number generator could not be seeded from the OS.
    #[error("failed to seed random number generator: {0}")]
    Entropy(String),

    /// A sampling distribution could not be constructed.
    #[error("invalid sampling distribution: {0}")]
    Distribution(#[from] rand::distr::uniform::Error),
}

/// Result type with the library error.
pub type Result<T> = std::result::Result<T, Error>;
