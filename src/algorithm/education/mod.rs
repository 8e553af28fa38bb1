//! Education trajectory cleaning
//!
//! This module reconstructs one plausible education level per individual and
//! calendar year from noisy yearly reports. It includes:
//!
//! 1. The age-level bound and level domain
//! 2. A read-only validator for age/level sequences
//! 3. The two-phase cleaner that rejects implausible reports
//! 4. The gap interpolator that fills what the cleaner left missing
//! 5. Orchestration over whole tables, sequential or parallel

pub mod cleaner;
pub mod interpolator;
pub mod level;
pub mod orchestrator;
pub mod statistics;
pub mod validator;

pub use cleaner::{
    Anchor, CleanedSequence, RejectReason, Step, clean, clean_with_stats, fallback_mode, step,
};
pub use interpolator::{FillSummary, RoundingRule, interpolate, interpolate_in_place};
pub use level::{MAX_LEVEL, NEVER_SCHOOLED, NO_DATA, max_level_at_age, normalize};
pub use orchestrator::{
    CleanedIndividual, CleaningOutcome, IndividualSequence, clean_individuals,
    clean_record_batch, process_sequence,
};
pub use statistics::CleaningStats;
pub use validator::{Violation, ViolationKind, validate, validate_detailed};
