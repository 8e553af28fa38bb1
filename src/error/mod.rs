//! Error handling for education trajectory cleaning.
//!
//! Implausible observations are never errors: they are turned into missing
//! cleaned values. The variants here cover contract violations by the caller
//! and failures at the table/file boundary.

use std::io;
use std::path::PathBuf;

use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Specialized error type for trajectory cleaning
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An age below zero reached the age-level bound lookup
    #[error("Age out of domain: {age} (ages must be non-negative)")]
    NegativeAge {
        /// The offending age
        age: i32,
    },

    /// A negative age found while cleaning a specific individual
    #[error("Age out of domain for individual {id}: {age}")]
    NegativeAgeForIndividual {
        /// Identifier of the individual whose scaffold is broken
        id: String,
        /// The offending age
        age: i32,
    },

    /// Age and level sequences of one individual differ in length
    #[error("Sequence length mismatch: {ages} ages but {levels} levels")]
    LengthMismatch {
        /// Number of ages supplied
        ages: usize,
        /// Number of levels supplied
        levels: usize,
    },

    /// A required column is absent from the record batch
    #[error("Column not found: {column}")]
    ColumnNotFound {
        /// Name of the missing column
        column: String,
    },

    /// A column exists but cannot be adapted to the type the cleaner needs
    #[error("Column '{column}' has unsupported type {actual}, expected {expected}")]
    UnsupportedColumnType {
        /// Column name
        column: String,
        /// Type found in the batch
        actual: DataType,
        /// Type the cleaner works with
        expected: DataType,
    },

    /// A column could not be downcast to the array type it was cast to
    #[error("Invalid data type for column '{column}': expected {expected}")]
    InvalidDataType {
        /// Column name
        column: String,
        /// Array type that was expected
        expected: String,
    },

    /// A value the cleaner cannot do without is null
    #[error("Null value in column '{column}' at row {row}")]
    NullValue {
        /// Column name
        column: String,
        /// Row of the null value
        row: usize,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed
    #[error("Invalid configuration file: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Error opening, reading or writing a file
    #[error("IO error for {path}: {source}")]
    Io {
        /// File involved in the failed operation
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),
}

impl Error {
    /// Wrap an IO error together with the path it concerns
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for trajectory cleaning operations
pub type Result<T> = std::result::Result<T, Error>;
