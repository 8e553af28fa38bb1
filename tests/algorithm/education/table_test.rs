//! Cleaning whole Arrow tables

use std::sync::Arc;

use arrow::array::{Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use edu_trajectory::algorithm::education::{IndividualSequence, clean_individuals};
use edu_trajectory::{CleaningConfig, Error, RoundingRule, clean_record_batch};

/// Two individuals with interleaved rows
fn yearly_table() -> RecordBatch {
    let schema = Schema::new(vec![
        Field::new("PNR", DataType::Utf8, true),
        Field::new("YEAR", DataType::Int32, false),
        Field::new("AGE", DataType::Int32, true),
        Field::new("EDU_LEVEL", DataType::Int32, true),
    ]);
    RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(StringArray::from(vec![
                Some("p1"),
                Some("p2"),
                Some("p1"),
                Some("p2"),
                Some("p1"),
                Some("p1"),
                None,
            ])),
            Arc::new(Int32Array::from(vec![2000, 2000, 2001, 2001, 2002, 2003, 2000])),
            Arc::new(Int32Array::from(vec![
                Some(6),
                Some(30),
                Some(7),
                Some(31),
                Some(8),
                Some(9),
                None,
            ])),
            Arc::new(Int32Array::from(vec![
                Some(1),
                Some(9),
                Some(-1),
                Some(10),
                None,
                Some(4),
                Some(3),
            ])),
        ],
    )
    .unwrap()
}

fn cleaned_column(batch: &RecordBatch, name: &str) -> Vec<Option<i32>> {
    let idx = batch.schema().index_of(name).unwrap();
    batch
        .column(idx)
        .as_any()
        .downcast_ref::<Int32Array>()
        .unwrap()
        .iter()
        .collect()
}

#[test]
fn test_clean_record_batch_sequential() {
    let batch = yearly_table();
    let outcome = clean_record_batch(&batch, &CleaningConfig::default().sequential()).unwrap();

    assert_eq!(outcome.batch.num_columns(), batch.num_columns() + 1);
    assert_eq!(
        cleaned_column(&outcome.batch, "EDU_LEVEL_CLEAN"),
        vec![Some(1), Some(9), Some(2), Some(9), Some(3), Some(4), None]
    );
    assert_eq!(outcome.stats.individuals, 2);
    assert_eq!(outcome.stats.rows, 6);
    assert_eq!(outcome.stats.late_start_individuals, 1);
    assert_eq!(outcome.stats.interpolated_rows, 2);
    assert_eq!(outcome.unsorted_individuals, 0);
}

#[test]
fn test_parallel_matches_sequential() {
    let batch = yearly_table();
    let sequential = clean_record_batch(&batch, &CleaningConfig::default().sequential()).unwrap();
    let parallel =
        clean_record_batch(&batch, &CleaningConfig::default().with_threads(2)).unwrap();

    assert_eq!(
        cleaned_column(&sequential.batch, "EDU_LEVEL_CLEAN"),
        cleaned_column(&parallel.batch, "EDU_LEVEL_CLEAN")
    );
    assert_eq!(sequential.stats, parallel.stats);
}

#[test]
fn test_string_levels_and_custom_output() {
    let batch = yearly_table();
    let levels = StringArray::from(vec![
        Some("1"),
        Some("9"),
        None,
        Some("10"),
        Some("??"),
        Some("4"),
        None,
    ]);
    let schema = Schema::new(vec![
        batch.schema().field(0).clone(),
        batch.schema().field(1).clone(),
        batch.schema().field(2).clone(),
        Field::new("HFAUDD", DataType::Utf8, true),
    ]);
    let batch = RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::clone(batch.column(0)),
            Arc::clone(batch.column(1)),
            Arc::clone(batch.column(2)),
            Arc::new(levels),
        ],
    )
    .unwrap();

    let config = CleaningConfig::default()
        .sequential()
        .with_level_column("HFAUDD")
        .with_output_column("HFAUDD_CLEAN")
        .with_rounding(RoundingRule::HalfEven);
    let outcome = clean_record_batch(&batch, &config).unwrap();

    assert_eq!(
        cleaned_column(&outcome.batch, "HFAUDD_CLEAN"),
        vec![Some(1), Some(9), Some(2), Some(9), Some(3), Some(4), None]
    );
}

#[test]
fn test_output_column_replaced_when_present() {
    let batch = yearly_table();
    let config = CleaningConfig::default()
        .sequential()
        .with_output_column("EDU_LEVEL");
    let outcome = clean_record_batch(&batch, &config).unwrap();
    assert_eq!(outcome.batch.num_columns(), batch.num_columns());
    assert_eq!(cleaned_column(&outcome.batch, "EDU_LEVEL")[2], Some(2));
}

#[test]
fn test_missing_level_column() {
    let batch = yearly_table();
    let config = CleaningConfig::default().with_level_column("UDD");
    let result = clean_record_batch(&batch, &config);
    assert!(matches!(result, Err(Error::ColumnNotFound { ref column }) if column == "UDD"));
}

#[test]
fn test_unsorted_years_are_tolerated() {
    let batch = yearly_table();
    let years = Int32Array::from(vec![2003, 2000, 2002, 2001, 2001, 2000, 2000]);
    let mut columns = batch.columns().to_vec();
    columns[1] = Arc::new(years);
    let batch = RecordBatch::try_new(batch.schema(), columns).unwrap();

    let outcome = clean_record_batch(&batch, &CleaningConfig::default().sequential()).unwrap();
    assert_eq!(outcome.stats.individuals, 2);
    // Only p1 runs backwards in time
    assert_eq!(outcome.unsorted_individuals, 1);

    let config = CleaningConfig {
        year_column: None,
        ..CleaningConfig::default().sequential()
    };
    let outcome = clean_record_batch(&batch, &config).unwrap();
    assert_eq!(outcome.unsorted_individuals, 0);
}

#[test]
fn test_null_age_on_observed_row_is_error() {
    let batch = yearly_table();
    let ages = Int32Array::from(vec![Some(6), Some(30), None, Some(31), Some(8), Some(9), None]);
    let levels = Int32Array::from(vec![Some(1), Some(9), Some(2), Some(10), None, Some(4), None]);
    let mut columns = batch.columns().to_vec();
    columns[2] = Arc::new(ages);
    columns[3] = Arc::new(levels);
    let batch = RecordBatch::try_new(batch.schema(), columns).unwrap();

    let result = clean_record_batch(&batch, &CleaningConfig::default().sequential());
    assert!(matches!(result, Err(Error::NullValue { row: 2, .. })));
}

#[test]
fn test_clean_individuals_in_memory() {
    let individuals = vec![
        IndividualSequence::new("a", vec![6, 7, 8, 9], vec![Some(1), None, None, Some(4)]),
        IndividualSequence::new("b", vec![26, 27], vec![Some(5), Some(6)]),
        IndividualSequence::new("c", vec![], vec![]),
    ];
    let (cleaned, stats) =
        clean_individuals(&individuals, &CleaningConfig::default().with_threads(2)).unwrap();

    assert_eq!(cleaned.len(), 3);
    assert_eq!(cleaned[0].id, "a");
    assert_eq!(cleaned[0].levels, vec![Some(1), Some(2), Some(3), Some(4)]);
    assert_eq!(cleaned[1].levels, vec![Some(5), Some(5)]);
    assert!(cleaned[2].levels.is_empty());
    assert_eq!(stats.individuals, 3);
    assert_eq!(stats.fallback_rows, 2);
}
