//! Education level domain and the age-level bound.

use crate::error::{Error, Result};

/// Sentinel level meaning "never attended school"
pub const NEVER_SCHOOLED: i32 = 98;

/// Highest grade-equivalent level, terminal attainment
pub const MAX_LEVEL: i32 = 12;

/// Upstream "no data" marker, treated the same as a missing value
pub const NO_DATA: i32 = -1;

/// Age at which the first grade becomes plausible
const SCHOOL_START_AGE: i32 = 5;

/// Age from which the adult ceiling applies
const ADULT_AGE: i32 = 16;

/// Youngest age at which "never schooled" is credible
pub const NEVER_SCHOOLED_MIN_AGE: i32 = 10;

/// Age from which a first observation cannot anchor a sequential walk
pub const LATE_START_AGE: i32 = 25;

/// Maximum plausible education level at a given age
///
/// Ages 5 through 16 map one-to-one onto levels 1 through 12, younger
/// children are capped at 0 and adults at 12.
///
/// # Errors
///
/// Returns [`Error::NegativeAge`] when `age` is negative, which means the
/// upstream scaffold computed ages incorrectly.
pub fn max_level_at_age(age: i32) -> Result<i32> {
    if age < 0 {
        return Err(Error::NegativeAge { age });
    }
    Ok(if age < SCHOOL_START_AGE {
        0
    } else if age > ADULT_AGE {
        MAX_LEVEL
    } else {
        age - SCHOOL_START_AGE + 1
    })
}

/// Collapse the upstream "no data" sentinel into a missing value
///
/// `-1` and any other negative code carry no information about attainment,
/// so they become `None` alongside genuinely absent observations.
#[must_use]
pub const fn normalize(raw: Option<i32>) -> Option<i32> {
    match raw {
        Some(level) if level >= 0 => Some(level),
        _ => None,
    }
}

/// Whether a level belongs to the valid domain (0-12 or the 98 sentinel)
#[must_use]
pub const fn is_known_level(level: i32) -> bool {
    (level >= 0 && level <= MAX_LEVEL) || level == NEVER_SCHOOLED
}

/// Whether a level is plausible for the given age
///
/// 98 is always within the bound; whether it is credible at that age is a
/// separate rule applied by the cleaner.
pub fn within_bound(age: i32, level: i32) -> Result<bool> {
    Ok(level == NEVER_SCHOOLED || level <= max_level_at_age(age)?)
}
