//! Per-individual orchestration over a yearly table
//!
//! Rows are grouped by individual, each group is cleaned and interpolated on
//! its own, and the results are scattered back by row index. Groups share no
//! mutable state, so they can be processed on a rayon pool.

use std::sync::Arc;
use std::time::Instant;

use arrow::array::{Array, ArrayRef, Int32Array};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use indicatif::ProgressBar;
use log::{info, warn};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use rustc_hash::FxHashMap;

use super::cleaner::clean_with_stats;
use super::interpolator::interpolate_in_place;
use super::statistics::CleaningStats;
use crate::config::CleaningConfig;
use crate::error::{Error, Result};
use crate::utils::arrow::{
    downcast_array, get_optional_column, int32_values, string_values, with_column,
};
use crate::utils::logging::{create_main_progress_bar, finish_progress_bar};

/// Chronological observations of one individual
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndividualSequence {
    /// Individual identifier
    pub id: String,
    /// Age per calendar year
    pub ages: Vec<i32>,
    /// Reported level per calendar year
    pub levels: Vec<Option<i32>>,
}

impl IndividualSequence {
    /// Create a sequence from parallel age and level vectors
    pub fn new(id: impl Into<String>, ages: Vec<i32>, levels: Vec<Option<i32>>) -> Self {
        Self {
            id: id.into(),
            ages,
            levels,
        }
    }
}

/// Cleaned trajectory of one individual
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedIndividual {
    /// Individual identifier
    pub id: String,
    /// Cleaned level per calendar year
    pub levels: Vec<Option<i32>>,
    /// Decisions taken for this individual
    pub stats: CleaningStats,
}

/// Cleaned table together with the aggregate statistics
#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    /// Input batch with the cleaned level column
    pub batch: RecordBatch,
    /// Aggregate statistics over all individuals
    pub stats: CleaningStats,
    /// Individuals whose rows were not in calendar year order
    pub unsorted_individuals: usize,
}

/// Row indices of one individual, in table order
#[derive(Debug)]
struct RowGroup<'a> {
    id: &'a str,
    rows: Vec<usize>,
}

/// Run cleaner then interpolator on one sequence
pub fn process_sequence(
    ages: &[i32],
    levels: &[Option<i32>],
    config: &CleaningConfig,
) -> Result<(Vec<Option<i32>>, CleaningStats)> {
    let cleaned = clean_with_stats(ages, levels)?;
    let mut output = cleaned.levels;
    let mut stats = cleaned.stats;

    if config.interpolate {
        let fills = interpolate_in_place(&mut output, config.rounding);
        stats.record_fills(&fills);
    }
    stats.missing_rows = output.iter().filter(|level| level.is_none()).count();

    Ok((output, stats))
}

/// Clean a set of individuals held in memory
///
/// Results are returned in the order of the input.
pub fn clean_individuals(
    individuals: &[IndividualSequence],
    config: &CleaningConfig,
) -> Result<(Vec<CleanedIndividual>, CleaningStats)> {
    let process = |individual: &IndividualSequence| -> Result<CleanedIndividual> {
        let (levels, stats) = process_sequence(&individual.ages, &individual.levels, config)
            .map_err(|e| with_individual(e, &individual.id))?;
        Ok(CleanedIndividual {
            id: individual.id.clone(),
            levels,
            stats,
        })
    };

    let cleaned = run_groups(individuals, config, process)?;
    let stats = cleaned.iter().map(|c| c.stats.clone()).sum();
    Ok((cleaned, stats))
}

/// Clean the level column of a yearly table
///
/// The batch must hold one row per individual and calendar year, sorted by
/// year within each individual. Rows of one individual do not need to be
/// contiguous. Rows with a null identifier are left uncleaned.
///
/// # Errors
///
/// Fails if a configured column is missing or cannot be read as the type the
/// cleaner needs, if an age is null or negative on a row that carries a
/// level, or if the worker pool cannot be built.
pub fn clean_record_batch(batch: &RecordBatch, config: &CleaningConfig) -> Result<CleaningOutcome> {
    config.validate()?;
    let start = Instant::now();

    let ids = string_values(batch, &config.id_column)?;
    let ages = int32_values(batch, &config.age_column)?;
    let levels = int32_values(batch, &config.level_column)?;

    let groups = group_rows(&ids);
    info!(
        "Cleaning {} rows for {} individuals",
        batch.num_rows(),
        groups.len()
    );

    let unsorted_individuals = match &config.year_column {
        Some(year_column) => report_unsorted_groups(batch, year_column, &groups)?,
        None => 0,
    };

    let process = |group: &RowGroup<'_>| -> Result<(Vec<Option<i32>>, CleaningStats)> {
        let group_ages = group
            .rows
            .iter()
            .map(|&row| match (ages[row], levels[row]) {
                (Some(age), _) => Ok(age),
                // The age is never looked at on rows without an observation
                (None, None) => Ok(0),
                (None, Some(_)) => Err(Error::NullValue {
                    column: config.age_column.clone(),
                    row,
                }),
            })
            .collect::<Result<Vec<_>>>()?;
        let group_levels: Vec<_> = group.rows.iter().map(|&row| levels[row]).collect();

        process_sequence(&group_ages, &group_levels, config).map_err(|e| with_individual(e, group.id))
    };

    let results = run_groups(&groups, config, process)?;

    let mut cleaned = vec![None; batch.num_rows()];
    for (group, (group_levels, _)) in groups.iter().zip(&results) {
        for (&row, &level) in group.rows.iter().zip(group_levels) {
            cleaned[row] = level;
        }
    }
    let stats: CleaningStats = results.into_iter().map(|(_, stats)| stats).sum();

    let column: ArrayRef = Arc::new(Int32Array::from(cleaned));
    let batch = with_column(batch, &config.output_column, column)?;

    info!(
        "Cleaned {} individuals in {:?}: {} accepted, {} rejected, {} filled",
        stats.individuals,
        start.elapsed(),
        stats.accepted,
        stats.rejected(),
        stats.filled()
    );

    Ok(CleaningOutcome {
        batch,
        stats,
        unsorted_individuals,
    })
}

/// Group row indices by individual, in order of first appearance
fn group_rows(ids: &[Option<String>]) -> Vec<RowGroup<'_>> {
    let mut index: FxHashMap<&str, usize> = FxHashMap::default();
    let mut groups: Vec<RowGroup<'_>> = Vec::new();
    let mut unidentified = 0usize;

    for (row, id) in ids.iter().enumerate() {
        let Some(id) = id.as_deref() else {
            unidentified += 1;
            continue;
        };
        let group = *index.entry(id).or_insert_with(|| {
            groups.push(RowGroup {
                id,
                rows: Vec::new(),
            });
            groups.len() - 1
        });
        groups[group].rows.push(row);
    }

    if unidentified > 0 {
        warn!("{unidentified} rows without an individual identifier were left uncleaned");
    }
    groups
}

/// Warn about individuals whose rows are not in strictly increasing year order
///
/// Returns the number of such individuals; 0 when the batch has no year column.
fn report_unsorted_groups(
    batch: &RecordBatch,
    year_column: &str,
    groups: &[RowGroup<'_>],
) -> Result<usize> {
    let Some(array) = get_optional_column(batch, year_column, &DataType::Int32)? else {
        return Ok(0);
    };
    let years = downcast_array::<Int32Array>(&array, year_column, "Int32")?;

    let unsorted = groups
        .iter()
        .filter(|group| {
            group.rows.windows(2).any(|pair| {
                !years.is_null(pair[0])
                    && !years.is_null(pair[1])
                    && years.value(pair[0]) >= years.value(pair[1])
            })
        })
        .count();

    if unsorted > 0 {
        warn!(
            "{unsorted} individuals have rows out of calendar year order in column '{year_column}'; \
             results assume chronological order"
        );
    }
    Ok(unsorted)
}

/// Run `process` over every group, sequentially or on a rayon pool
fn run_groups<G, T, F>(groups: &[G], config: &CleaningConfig, process: F) -> Result<Vec<T>>
where
    G: Sync,
    T: Send,
    F: Fn(&G) -> Result<T> + Sync,
{
    let progress = config.show_progress.then(|| {
        create_main_progress_bar(groups.len() as u64, Some("Cleaning education trajectories"))
    });
    let tick = |pb: &Option<ProgressBar>| {
        if let Some(pb) = pb {
            pb.inc(1);
        }
    };

    let results = if config.parallel {
        let run = || {
            groups
                .par_iter()
                .map(|group| {
                    let result = process(group);
                    tick(&progress);
                    result
                })
                .collect::<Result<Vec<_>>>()
        };
        worker_pool(config)?.install(run)
    } else {
        groups
            .iter()
            .map(|group| {
                let result = process(group);
                tick(&progress);
                result
            })
            .collect::<Result<Vec<_>>>()
    };

    if let Some(pb) = &progress {
        finish_progress_bar(pb, Some("Cleaning complete"));
    }
    results
}

/// Build the rayon pool used for parallel cleaning
///
/// The pool is sized from the configuration rather than taken from the global
/// pool, so the thread count logged with the configuration is the one used.
fn worker_pool(config: &CleaningConfig) -> Result<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(config.worker_threads())
        .thread_name(|i| format!("edu-clean-{i}"))
        .build()
        .map_err(|e| Error::Config(format!("Failed to build worker pool: {e}")))
}

/// Attach the individual identifier to a negative-age error
fn with_individual(error: Error, id: &str) -> Error {
    match error {
        Error::NegativeAge { age } => Error::NegativeAgeForIndividual {
            id: id.to_string(),
            age,
        },
        other => other,
    }
}
