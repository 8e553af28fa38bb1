//! Counters for cleaning and interpolation decisions
//!
//! Statistics are collected per individual and merged afterwards, so parallel
//! runs need no shared state.

use std::fmt;
use std::iter::Sum;
use std::ops::AddAssign;

use super::cleaner::RejectReason;
use super::interpolator::FillSummary;

/// Counts of what happened to the rows of one or more individuals
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleaningStats {
    /// Individuals processed
    pub individuals: usize,
    /// Rows processed
    pub rows: usize,
    /// Rows with a reported level
    pub observed: usize,
    /// Observations kept by the sequential phase
    pub accepted: usize,
    /// Rejected: level above the age bound
    pub rejected_age_bound: usize,
    /// Rejected: "never schooled" before age 10
    pub rejected_premature_never_schooled: usize,
    /// Rejected: "never schooled" after a real level
    pub rejected_never_schooled_after_level: usize,
    /// Rejected: increase faster than elapsed rows
    pub rejected_jump: usize,
    /// Rejected: level below the anchor
    pub rejected_regression: usize,
    /// Individuals whose first usable observation came at adult age
    pub late_start_individuals: usize,
    /// Rows assigned by the fallback mode
    pub fallback_rows: usize,
    /// Rows filled by linear interpolation
    pub interpolated_rows: usize,
    /// Rows filled with "never schooled"
    pub never_schooled_rows: usize,
    /// Rows filled after terminal attainment
    pub terminal_rows: usize,
    /// Rows left missing in the final output
    pub missing_rows: usize,
}

impl CleaningStats {
    /// Empty statistics for a single individual with `rows` rows
    #[must_use]
    pub fn for_sequence(rows: usize) -> Self {
        Self {
            individuals: 1,
            rows,
            ..Self::default()
        }
    }

    /// Count one rejected observation
    pub fn record_rejection(&mut self, reason: RejectReason) {
        let counter = match reason {
            RejectReason::ExceedsAgeBound => &mut self.rejected_age_bound,
            RejectReason::PrematureNeverSchooled => &mut self.rejected_premature_never_schooled,
            RejectReason::NeverSchooledAfterLevel => {
                &mut self.rejected_never_schooled_after_level
            }
            RejectReason::ExcessiveIncrease => &mut self.rejected_jump,
            RejectReason::Regression => &mut self.rejected_regression,
        };
        *counter += 1;
    }

    /// Count rows filled by the interpolator
    pub fn record_fills(&mut self, fills: &FillSummary) {
        self.interpolated_rows += fills.linear;
        self.never_schooled_rows += fills.never_schooled;
        self.terminal_rows += fills.terminal;
    }

    /// Total rejected observations
    #[must_use]
    pub const fn rejected(&self) -> usize {
        self.rejected_age_bound
            + self.rejected_premature_never_schooled
            + self.rejected_never_schooled_after_level
            + self.rejected_jump
            + self.rejected_regression
    }

    /// Total rows filled by the interpolator
    #[must_use]
    pub const fn filled(&self) -> usize {
        self.interpolated_rows + self.never_schooled_rows + self.terminal_rows
    }
}

impl AddAssign for CleaningStats {
    fn add_assign(&mut self, other: Self) {
        self.individuals += other.individuals;
        self.rows += other.rows;
        self.observed += other.observed;
        self.accepted += other.accepted;
        self.rejected_age_bound += other.rejected_age_bound;
        self.rejected_premature_never_schooled += other.rejected_premature_never_schooled;
        self.rejected_never_schooled_after_level += other.rejected_never_schooled_after_level;
        self.rejected_jump += other.rejected_jump;
        self.rejected_regression += other.rejected_regression;
        self.late_start_individuals += other.late_start_individuals;
        self.fallback_rows += other.fallback_rows;
        self.interpolated_rows += other.interpolated_rows;
        self.never_schooled_rows += other.never_schooled_rows;
        self.terminal_rows += other.terminal_rows;
        self.missing_rows += other.missing_rows;
    }
}

impl Sum for CleaningStats {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |mut acc, stats| {
            acc += stats;
            acc
        })
    }
}

impl fmt::Display for CleaningStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let percent = |count: usize| {
            if self.rows > 0 {
                count as f64 / self.rows as f64 * 100.0
            } else {
                0.0
            }
        };

        writeln!(f, "Education Cleaning Summary:")?;
        writeln!(f, "  Individuals: {}", self.individuals)?;
        writeln!(f, "  Rows: {}", self.rows)?;
        writeln!(f, "  Observed Levels: {} ({:.1}%)", self.observed, percent(self.observed))?;
        writeln!(f, "  Accepted: {}", self.accepted)?;
        writeln!(f, "  Rejected: {}", self.rejected())?;
        writeln!(f, "    Above Age Bound: {}", self.rejected_age_bound)?;
        writeln!(
            f,
            "    Never Schooled Before Age 10: {}",
            self.rejected_premature_never_schooled
        )?;
        writeln!(
            f,
            "    Never Schooled After A Level: {}",
            self.rejected_never_schooled_after_level
        )?;
        writeln!(f, "    Implausible Increase: {}", self.rejected_jump)?;
        writeln!(f, "    Regression: {}", self.rejected_regression)?;
        writeln!(
            f,
            "  Late Starters: {} ({} rows from fallback mode)",
            self.late_start_individuals, self.fallback_rows
        )?;
        writeln!(f, "  Filled: {}", self.filled())?;
        writeln!(f, "    Interpolated: {}", self.interpolated_rows)?;
        writeln!(f, "    Never Schooled: {}", self.never_schooled_rows)?;
        writeln!(f, "    Terminal Level: {}", self.terminal_rows)?;
        write!(
            f,
            "  Missing After Cleaning: {} ({:.1}%)",
            self.missing_rows,
            percent(self.missing_rows)
        )
    }
}
