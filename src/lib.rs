//! A Rust library for cleaning yearly educational attainment trajectories.
//!
//! Each individual's chronological `(age, reported level)` rows are checked
//! against plausibility rules, implausible reports are turned into missing
//! values, and the remaining gaps are filled. The result is appended to the
//! input Arrow table as one extra column.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod utils;

// Re-export the most common types for easier use
pub use config::CleaningConfig;
pub use error::{Error, Result};

pub use algorithm::education::{
    CleaningOutcome, CleaningStats, IndividualSequence, RoundingRule, clean, clean_individuals,
    clean_record_batch, interpolate, max_level_at_age, validate,
};

// Arrow types
pub use ::arrow::record_batch::RecordBatch;

pub use utils::io::{read_parquet, read_parquet_single, write_parquet};
