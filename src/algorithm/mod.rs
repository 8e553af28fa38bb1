//! Algorithm implementations for register study workflows
//!
//! Currently this holds the education trajectory cleaning used to derive
//! yearly attainment from survey and register reports.

pub mod education;
