//! All errors that can occur in the hybridscan library.

use std::fmt;

pub type Result<T> = std::result::Result<T, HybridscanError>;

#[derive(Clone, Debug, PartialEq)]
pub enum HybridscanError {
    /// A CSV row with the wrong number of fields or a field that does not parse.
    MalformedInputRow {
        path: String,
        row: usize,
        message: String,
    },
    /// A locus count that does not split evenly into chromosomes.
    DivisibilityViolation {
        loci: usize,
        chromosomes: usize,
    },
    /// A batch size that does not divide the number of samples in a file.
    BatchSizeMismatch {
        batch_size: usize,
        samples: usize,
    },
    /// No candidate false loci at all. Fewer candidates than required are recovered by
    /// sampling with replacement and never reach this variant.
    InsufficientCandidates {
        required: usize,
        available: usize,
    },
    /// An archive that is missing a key or stores it with an unexpected type or shape.
    IncompatibleArchiveSchema { path: String, message: String },
    /// A processing parameter outside its valid range.
    InvalidSetting(String),
    ReadError(String),
    WriteError(String),
}

impl HybridscanError {
    pub fn malformed(path: &str, row: usize, message: impl Into<String>) -> Self {
        HybridscanError::MalformedInputRow {
            path: path.to_string(),
            row,
            message: message.into(),
        }
    }

    pub fn schema(path: &str, message: impl Into<String>) -> Self {
        HybridscanError::IncompatibleArchiveSchema {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for HybridscanError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HybridscanError::MalformedInputRow { path, row, message } => {
                write!(f, "MalformedInputRow: {path} row {row}: {message}")
            }
            HybridscanError::DivisibilityViolation { loci, chromosomes } => {
                write!(
                    f,
                    "DivisibilityViolation: {loci} loci cannot be split into {chromosomes} chromosomes"
                )
            }
            HybridscanError::BatchSizeMismatch {
                batch_size,
                samples,
            } => {
                write!(
                    f,
                    "BatchSizeMismatch: batch size is {batch_size}, must be a factor of {samples}"
                )
            }
            HybridscanError::InsufficientCandidates {
                required,
                available,
            } => {
                write!(
                    f,
                    "InsufficientCandidates: {available} candidate loci for {required} required"
                )
            }
            HybridscanError::IncompatibleArchiveSchema { path, message } => {
                write!(f, "IncompatibleArchiveSchema: {path}: {message}")
            }
            HybridscanError::InvalidSetting(message) => write!(f, "InvalidSetting: {}", message),
            HybridscanError::ReadError(message) => write!(f, "ReadError: {}", message),
            HybridscanError::WriteError(message) => write!(f, "WriteError: {}", message),
        }
    }
}

impl std::error::Error for HybridscanError {}
