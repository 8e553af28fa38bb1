//! Utilities for working with Arrow arrays.
//!
//! Columns are looked up by name and cast to the type the cleaner works with,
//! so registers that store levels as strings or narrow integers can be used
//! as-is.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Int32Array, StringArray};
use arrow::compute::kernels::cast::{can_cast_types, cast};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use log::info;

use crate::error::{Error, Result};

/// Get a column from a record batch, cast to `expected_type` when needed
///
/// # Arguments
///
/// * `batch` - The record batch containing the column
/// * `column_name` - The name of the column to extract
/// * `expected_type` - The data type the caller works with
///
/// # Errors
///
/// Returns an error if the column does not exist or cannot be cast. Values
/// that fail to parse during a cast (for example a non-numeric string) become
/// nulls rather than errors.
pub fn get_column(
    batch: &RecordBatch,
    column_name: &str,
    expected_type: &DataType,
) -> Result<ArrayRef> {
    let idx = get_column_index(batch, column_name)?;
    let column = batch.column(idx);
    let actual_type = column.data_type();

    if actual_type == expected_type {
        return Ok(Arc::clone(column));
    }

    if !can_cast_types(actual_type, expected_type) {
        return Err(Error::UnsupportedColumnType {
            column: column_name.to_string(),
            actual: actual_type.clone(),
            expected: expected_type.clone(),
        });
    }

    info!("Converting column '{column_name}' from {actual_type:?} to {expected_type:?}");
    Ok(cast(column, expected_type)?)
}

/// Get an optional column; `None` when the batch does not have it
pub fn get_optional_column(
    batch: &RecordBatch,
    column_name: &str,
    expected_type: &DataType,
) -> Result<Option<ArrayRef>> {
    if batch.schema().index_of(column_name).is_err() {
        return Ok(None);
    }
    get_column(batch, column_name, expected_type).map(Some)
}

/// Downcast an array reference to a concrete array type
///
/// # Errors
///
/// Returns [`Error::InvalidDataType`] if the array is of a different type.
pub fn downcast_array<'a, A: Array + 'static>(
    array: &'a ArrayRef,
    column_name: &str,
    expected_type_name: &str,
) -> Result<&'a A> {
    array
        .as_any()
        .downcast_ref::<A>()
        .ok_or_else(|| Error::InvalidDataType {
            column: column_name.to_string(),
            expected: expected_type_name.to_string(),
        })
}

/// Get the column index by name from a record batch
pub fn get_column_index(batch: &RecordBatch, column_name: &str) -> Result<usize> {
    batch
        .schema()
        .index_of(column_name)
        .map_err(|_| Error::ColumnNotFound {
            column: column_name.to_string(),
        })
}

/// Read a column as nullable 32-bit integers
pub fn int32_values(batch: &RecordBatch, column_name: &str) -> Result<Vec<Option<i32>>> {
    let array = get_column(batch, column_name, &DataType::Int32)?;
    let values = downcast_array::<Int32Array>(&array, column_name, "Int32")?;
    Ok(values.iter().collect())
}

/// Read a column as nullable strings
pub fn string_values(batch: &RecordBatch, column_name: &str) -> Result<Vec<Option<String>>> {
    let array = get_column(batch, column_name, &DataType::Utf8)?;
    let values = downcast_array::<StringArray>(&array, column_name, "String")?;
    Ok(values.iter().map(|v| v.map(str::to_string)).collect())
}

/// Return a copy of `batch` with `column` added under `name`
///
/// An existing column with the same name is replaced in place, keeping the
/// column order of the input.
pub fn with_column(batch: &RecordBatch, name: &str, column: ArrayRef) -> Result<RecordBatch> {
    let schema = batch.schema();
    let field = Arc::new(Field::new(name, column.data_type().clone(), true));

    let mut fields: Vec<_> = schema.fields().iter().cloned().collect();
    let mut columns = batch.columns().to_vec();

    if let Ok(idx) = schema.index_of(name) {
        fields[idx] = field;
        columns[idx] = column;
    } else {
        fields.push(field);
        columns.push(column);
    }

    let schema = Schema::new_with_metadata(fields, schema.metadata().clone());
    Ok(RecordBatch::try_new(Arc::new(schema), columns)?)
}
