//! Logging and progress tracking utilities

pub mod log;
pub mod progress;

pub use self::log::{log_table_io_complete, log_table_io_start, log_warning};
pub use self::progress::{create_main_progress_bar, finish_progress_bar};
