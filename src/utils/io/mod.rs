//! File input and output

pub mod parquet;

pub use self::parquet::{DEFAULT_BATCH_SIZE, read_parquet, read_parquet_single, write_parquet};
