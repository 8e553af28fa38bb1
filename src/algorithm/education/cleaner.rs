//! Sequential cleaning of one individual's education trajectory.
//!
//! Cleaning runs in two phases. The sequential phase walks the rows in
//! chronological order and accepts or rejects each observation against the
//! running [`Anchor`]. If the first usable observation arrives at age 25 or
//! later the walk stops, and the fallback phase assigns the most frequent
//! reported level to the remaining suffix instead.

use itertools::Itertools;
use log::debug;

use super::level::{
    LATE_START_AGE, NEVER_SCHOOLED, NEVER_SCHOOLED_MIN_AGE, is_known_level, max_level_at_age,
    normalize,
};
use super::statistics::CleaningStats;
use crate::error::{Error, Result};

/// Most recent accepted observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    /// Row of the accepted observation
    pub index: usize,
    /// Accepted level
    pub level: i32,
}

/// Why an observation was turned into a missing value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// Level is higher than reachable at this age
    ExceedsAgeBound,
    /// "Never schooled" reported before age 10
    PrematureNeverSchooled,
    /// "Never schooled" reported after a real level was accepted
    NeverSchooledAfterLevel,
    /// Level rose by more than the rows elapsed since the anchor
    ExcessiveIncrease,
    /// Level dropped below the anchor
    Regression,
}

/// Outcome of a single row in the sequential phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// No observation for this row
    Missing,
    /// Observation kept; it becomes the new anchor
    Accepted(Anchor),
    /// Observation dropped
    Rejected(RejectReason),
    /// First usable observation at adult age; the sequential phase ends here
    LateStart,
}

/// Result of cleaning one sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedSequence {
    /// Cleaned level per row, same length as the input
    pub levels: Vec<Option<i32>>,
    /// Row from which the fallback mode was applied, if triggered
    pub fallback_start: Option<usize>,
    /// Counters for the decisions taken
    pub stats: CleaningStats,
}

/// Decide the fate of one row given the current anchor
///
/// `level` must already be normalized (see [`normalize`]).
pub fn step(anchor: Option<Anchor>, index: usize, age: i32, level: Option<i32>) -> Result<Step> {
    let Some(level) = level else {
        return Ok(Step::Missing);
    };

    if level > max_level_at_age(age)? && level != NEVER_SCHOOLED {
        return Ok(Step::Rejected(RejectReason::ExceedsAgeBound));
    }
    if age < NEVER_SCHOOLED_MIN_AGE && level == NEVER_SCHOOLED {
        return Ok(Step::Rejected(RejectReason::PrematureNeverSchooled));
    }

    let Some(anchor) = anchor else {
        if age >= LATE_START_AGE {
            return Ok(Step::LateStart);
        }
        return Ok(Step::Accepted(Anchor { index, level }));
    };

    if level == NEVER_SCHOOLED {
        return Ok(Step::Rejected(RejectReason::NeverSchooledAfterLevel));
    }
    let steps = (index - anchor.index) as i32;
    if level - anchor.level > steps {
        return Ok(Step::Rejected(RejectReason::ExcessiveIncrease));
    }
    if level < anchor.level && anchor.level != NEVER_SCHOOLED {
        return Ok(Step::Rejected(RejectReason::Regression));
    }

    Ok(Step::Accepted(Anchor { index, level }))
}

/// Clean one individual's sequence
///
/// # Arguments
/// * `ages` - Age per row, chronological
/// * `levels` - Reported level per row; `None` and `-1` both mean no data
///
/// # Returns
/// The cleaned levels, one per row. Implausible observations become `None`.
///
/// # Errors
/// Only on contract violations: mismatched lengths or a negative age on an
/// observed row.
pub fn clean(ages: &[i32], levels: &[Option<i32>]) -> Result<Vec<Option<i32>>> {
    clean_with_stats(ages, levels).map(|cleaned| cleaned.levels)
}

/// Clean one individual's sequence and report what happened
pub fn clean_with_stats(ages: &[i32], levels: &[Option<i32>]) -> Result<CleanedSequence> {
    if ages.len() != levels.len() {
        return Err(Error::LengthMismatch {
            ages: ages.len(),
            levels: levels.len(),
        });
    }

    let mut cleaned = vec![None; levels.len()];
    let mut stats = CleaningStats::for_sequence(levels.len());

    let fallback_start = accept_sequentially(ages, levels, &mut cleaned, &mut stats)?;

    if let Some(start) = fallback_start {
        debug!("Late first observation at row {start}, assigning fallback mode");
        stats.late_start_individuals += 1;
        stats.fallback_rows += apply_fallback(&levels[start..], &mut cleaned[start..]);
    }

    Ok(CleanedSequence {
        levels: cleaned,
        fallback_start,
        stats,
    })
}

/// Sequential phase: returns the row that triggered the fallback, if any
fn accept_sequentially(
    ages: &[i32],
    levels: &[Option<i32>],
    cleaned: &mut [Option<i32>],
    stats: &mut CleaningStats,
) -> Result<Option<usize>> {
    let mut anchor: Option<Anchor> = None;

    for (i, (&age, &raw)) in ages.iter().zip(levels).enumerate() {
        let level = normalize(raw);
        if level.is_some() {
            stats.observed += 1;
        }
        match step(anchor, i, age, level)? {
            Step::Missing => {}
            Step::Accepted(next) => {
                cleaned[i] = Some(next.level);
                anchor = Some(next);
                stats.accepted += 1;
            }
            Step::Rejected(reason) => stats.record_rejection(reason),
            Step::LateStart => {
                // Rows after the trigger are never stepped through
                stats.observed += levels[i + 1..]
                    .iter()
                    .filter(|raw| normalize(**raw).is_some())
                    .count();
                return Ok(Some(i));
            }
        }
    }

    Ok(None)
}

/// Most frequent reported level, ignoring missing and out-of-domain values
///
/// Ties go to the smallest level.
#[must_use]
pub fn fallback_mode(levels: &[Option<i32>]) -> Option<i32> {
    levels
        .iter()
        .filter_map(|&raw| normalize(raw))
        .filter(|&level| is_known_level(level))
        .counts()
        .into_iter()
        .max_by(|(level_a, count_a), (level_b, count_b)| {
            count_a.cmp(count_b).then(level_b.cmp(level_a))
        })
        .map(|(level, _)| level)
}

/// Fallback phase: overwrite the suffix with its mode, returns rows assigned
fn apply_fallback(levels: &[Option<i32>], cleaned: &mut [Option<i32>]) -> usize {
    let mode = fallback_mode(levels);
    cleaned.fill(mode);
    if mode.is_some() { cleaned.len() } else { 0 }
}
