//! Parquet file operations
//!
//! Reading the pre-joined yearly table and writing the cleaned result back.

use std::fs::File;
use std::path::Path;

use arrow::compute::concat_batches;
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use itertools::Itertools;
use parquet::arrow::{ArrowWriter, ProjectionMask, arrow_reader::ParquetRecordBatchReaderBuilder};
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;

use crate::error::{Error, Result};
use crate::utils::logging::{log_table_io_complete, log_table_io_start, log_warning};

/// Default batch size for Parquet reading
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// Helper function to get batch size from environment
#[must_use]
pub fn get_batch_size() -> Option<usize> {
    std::env::var("PARQUET_BATCH_SIZE")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
}

/// Build a projection mask for the columns of `schema` present in the file
///
/// Returns `None` when none of the requested columns exist, in which case
/// all columns are read.
#[must_use]
pub fn create_projection(
    schema: &Schema,
    file_schema: &Schema,
    parquet_schema: &parquet::schema::types::SchemaDescriptor,
) -> Option<ProjectionMask> {
    let projection = schema
        .fields()
        .iter()
        .filter_map(|f| {
            let field_name = f.name();
            file_schema.index_of(field_name).map_or_else(
                |_| {
                    log_warning(
                        &format!("Field {field_name} not found in parquet file, skipping"),
                        None,
                    );
                    None
                },
                Some,
            )
        })
        .collect_vec();

    if projection.is_empty() {
        log_warning(
            "No matching fields found in schema projection, reading all columns",
            None,
        );
        None
    } else {
        Some(ProjectionMask::roots(parquet_schema, projection))
    }
}

/// Read a parquet file into Arrow record batches
///
/// # Arguments
/// * `path` - Path to the Parquet file
/// * `schema` - Optional Arrow Schema for projecting specific columns
pub fn read_parquet(path: &Path, schema: Option<&Schema>) -> Result<Vec<RecordBatch>> {
    let start = std::time::Instant::now();
    log_table_io_start("Reading parquet file", path);

    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut builder = ParquetRecordBatchReaderBuilder::try_new(file)?
        .with_batch_size(get_batch_size().unwrap_or(DEFAULT_BATCH_SIZE));

    if let Some(schema) = schema {
        if let Some(mask) = create_projection(schema, builder.schema(), builder.parquet_schema()) {
            builder = builder.with_projection(mask);
        }
    }

    let batches = builder.build()?.collect::<std::result::Result<Vec<_>, _>>()?;

    log_table_io_complete("Read", path, &batches, start.elapsed());
    Ok(batches)
}

/// Read a parquet file into a single record batch
///
/// One individual's rows may be spread over several batches in the file,
/// and the cleaner needs them together.
pub fn read_parquet_single(path: &Path, schema: Option<&Schema>) -> Result<RecordBatch> {
    let batches = read_parquet(path, schema)?;
    let Some(first) = batches.first() else {
        return Err(Error::Config(format!(
            "Parquet file {} contains no record batches",
            path.display()
        )));
    };
    Ok(concat_batches(&first.schema(), &batches)?)
}

/// Write record batches to a parquet file
///
/// All batches must share the schema of the first one.
pub fn write_parquet(path: &Path, batches: &[RecordBatch]) -> Result<()> {
    let start = std::time::Instant::now();
    log_table_io_start("Writing parquet file", path);

    let Some(first) = batches.first() else {
        log_warning("No record batches to write", Some(path));
        return Ok(());
    };

    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let properties = WriterProperties::builder()
        .set_compression(Compression::ZSTD(ZstdLevel::default()))
        .build();
    let mut writer = ArrowWriter::try_new(file, first.schema(), Some(properties))?;
    for batch in batches {
        writer.write(batch)?;
    }
    writer.close()?;

    log_table_io_complete("Wrote", path, batches, start.elapsed());
    Ok(())
}
