//! Read-only plausibility check of an age/level sequence.
//!
//! The validator is an oracle for tests and diagnostics. It is not used by
//! the cleaner, and the two differ on purpose in one place: the cleaner lets
//! any level follow a 98 anchor, the validator reports that as a regression.

use std::fmt;

use super::level::{NEVER_SCHOOLED, max_level_at_age, normalize};
use crate::error::{Error, Result};

/// Kind of plausibility rule a sequence breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    /// Level above what is reachable at that age
    ExceedsAgeBound,
    /// Level rose by more than the number of elapsed rows
    ExcessiveIncrease,
    /// Level dropped below the previous non-missing level
    Regression,
}

/// First rule violation found in a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation {
    /// Row at which the violation was detected
    pub index: usize,
    /// Rule that was broken
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = match self.kind {
            ViolationKind::ExceedsAgeBound => "level exceeds age bound",
            ViolationKind::ExcessiveIncrease => "level increased faster than elapsed years",
            ViolationKind::Regression => "level regressed",
        };
        write!(f, "{rule} at row {}", self.index)
    }
}

/// Check whether a sequence is internally consistent
///
/// Missing entries (and the `-1` sentinel) never invalidate a sequence.
/// Malformed input (length mismatch, negative age) is reported as invalid.
#[must_use]
pub fn validate(ages: &[i32], levels: &[Option<i32>]) -> bool {
    matches!(validate_detailed(ages, levels), Ok(None))
}

/// Find the first plausibility violation in a sequence
///
/// Returns `Ok(None)` when the whole sequence is consistent.
pub fn validate_detailed(ages: &[i32], levels: &[Option<i32>]) -> Result<Option<Violation>> {
    if ages.len() != levels.len() {
        return Err(Error::LengthMismatch {
            ages: ages.len(),
            levels: levels.len(),
        });
    }

    let mut anchor: Option<(usize, i32)> = None;

    for (i, (&age, &raw)) in ages.iter().zip(levels).enumerate() {
        let Some(level) = normalize(raw) else {
            continue;
        };

        let violation = |kind: ViolationKind| -> Result<Option<Violation>> {
            Ok(Some(Violation { index: i, kind }))
        };

        if level > max_level_at_age(age)? && level != NEVER_SCHOOLED {
            return violation(ViolationKind::ExceedsAgeBound);
        }

        let Some((last_index, last_level)) = anchor else {
            anchor = Some((i, level));
            continue;
        };

        let steps = (i - last_index) as i32;
        if level != NEVER_SCHOOLED && level - last_level > steps {
            return violation(ViolationKind::ExcessiveIncrease);
        }
        if level < last_level {
            return violation(ViolationKind::Regression);
        }
        anchor = Some((i, level));
    }

    Ok(None)
}
