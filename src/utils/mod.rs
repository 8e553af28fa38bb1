//! Utility modules for Arrow columns, Parquet files and logging

pub mod arrow;
pub mod io;
pub mod logging;
