//! Arrow data handling utilities

pub mod array_utils;

pub use array_utils::{
    downcast_array, get_column, get_column_index, get_optional_column, int32_values,
    string_values, with_column,
};
