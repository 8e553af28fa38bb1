//! Gap filling for cleaned education trajectories.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::level::{MAX_LEVEL, NEVER_SCHOOLED};

/// Rounding applied to interpolated levels that fall exactly between grades
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingRule {
    /// Ties round towards the higher level
    #[default]
    HalfUp,
    /// Ties round towards the even level
    HalfEven,
}

impl RoundingRule {
    /// Round `numerator / denominator` to an integer
    ///
    /// Exact integer arithmetic, so ties are detected without float error.
    /// `denominator` must be positive.
    #[must_use]
    pub const fn divide(self, numerator: i64, denominator: i64) -> i64 {
        let quotient = numerator.div_euclid(denominator);
        let twice_remainder = 2 * numerator.rem_euclid(denominator);
        if twice_remainder < denominator {
            quotient
        } else if twice_remainder > denominator {
            quotient + 1
        } else {
            match self {
                Self::HalfUp => quotient + 1,
                Self::HalfEven if quotient % 2 == 0 => quotient,
                Self::HalfEven => quotient + 1,
            }
        }
    }
}

impl fmt::Display for RoundingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HalfUp => write!(f, "round half up"),
            Self::HalfEven => write!(f, "round half to even"),
        }
    }
}

/// Rows filled by each interpolation rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillSummary {
    /// Filled by linear interpolation between two levels
    pub linear: usize,
    /// Filled with "never schooled"
    pub never_schooled: usize,
    /// Filled with the terminal level after the last observation
    pub terminal: usize,
}

/// Fill gaps in a cleaned sequence, returning a new sequence
#[must_use]
pub fn interpolate(cleaned: &[Option<i32>], rounding: RoundingRule) -> Vec<Option<i32>> {
    let mut filled = cleaned.to_vec();
    interpolate_in_place(&mut filled, rounding);
    filled
}

/// Fill gaps in a cleaned sequence in place
///
/// * A leading gap before a first value of 98 is filled with 98.
/// * Gaps between two levels are interpolated linearly.
/// * Gaps ending in 98 are filled with 98; gaps from 98 to a real level are
///   left missing.
/// * A trailing gap after a last value of 12 is filled with 12.
pub fn interpolate_in_place(levels: &mut [Option<i32>], rounding: RoundingRule) -> FillSummary {
    let mut summary = FillSummary::default();

    let known: SmallVec<[(usize, i32); 16]> = levels
        .iter()
        .enumerate()
        .filter_map(|(i, level)| level.map(|level| (i, level)))
        .collect();

    let (Some(&(first, first_level)), Some(&(last, last_level))) = (known.first(), known.last())
    else {
        return summary;
    };

    if first_level == NEVER_SCHOOLED {
        levels[..first].fill(Some(NEVER_SCHOOLED));
        summary.never_schooled += first;
    }

    for pair in known.windows(2) {
        let ((start, from), (end, to)) = (pair[0], pair[1]);
        if end - start <= 1 {
            continue;
        }
        let gap = &mut levels[start + 1..end];

        match (from == NEVER_SCHOOLED, to == NEVER_SCHOOLED) {
            (true, false) => {}
            (_, true) => {
                gap.fill(Some(NEVER_SCHOOLED));
                summary.never_schooled += gap.len();
            }
            (false, false) => {
                let span = (end - start) as i64;
                let rise = i64::from(to) - i64::from(from);
                for (offset, slot) in (1..).zip(gap.iter_mut()) {
                    let numerator = i64::from(from) * span + rise * offset;
                    *slot = Some(rounding.divide(numerator, span) as i32);
                }
                summary.linear += gap.len();
            }
        }
    }

    if last_level == MAX_LEVEL {
        let tail = &mut levels[last + 1..];
        tail.fill(Some(MAX_LEVEL));
        summary.terminal += tail.len();
    }

    summary
}

/// Compare a filled value against its interpolation boundaries
///
/// Used by tests and diagnostics to check that filled values stay between
/// the two known levels around them.
#[must_use]
pub fn within_boundaries(value: i32, from: i32, to: i32) -> bool {
    match from.cmp(&to) {
        Ordering::Less | Ordering::Equal => from <= value && value <= to,
        Ordering::Greater => to <= value && value <= from,
    }
}
