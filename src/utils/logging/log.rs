//! Log lines for reading and writing the yearly tables

use std::path::Path;
use std::time::Duration;

use arrow::record_batch::RecordBatch;

/// Announce that a table file is about to be read or written
pub fn log_table_io_start(action: &str, path: &Path) {
    log::info!("{action} {}", path.display());
}

/// Report rows and batches moved to or from a table file
///
/// `action` is the past tense used in the message, e.g. "Read" or "Wrote".
pub fn log_table_io_complete(
    action: &str,
    path: &Path,
    batches: &[RecordBatch],
    elapsed: Duration,
) {
    let rows: usize = batches.iter().map(RecordBatch::num_rows).sum();
    log::info!(
        "{action} {rows} rows in {} batches ({}) in {elapsed:?}",
        batches.len(),
        path.display()
    );
}

/// Log a warning, optionally tied to a file
pub fn log_warning(message: &str, path: Option<&Path>) {
    match path {
        Some(path) => log::warn!("{message}: {}", path.display()),
        None => log::warn!("{message}"),
    }
}
