//! Configuration for education trajectory cleaning.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::algorithm::education::RoundingRule;
use crate::error::{Error, Result};

/// Default name of the individual identifier column
pub const DEFAULT_ID_COLUMN: &str = "PNR";
/// Default name of the age column
pub const DEFAULT_AGE_COLUMN: &str = "AGE";
/// Default name of the calendar year column
pub const DEFAULT_YEAR_COLUMN: &str = "YEAR";
/// Default name of the reported education level column
pub const DEFAULT_LEVEL_COLUMN: &str = "EDU_LEVEL";
/// Default name of the cleaned education level column
pub const DEFAULT_OUTPUT_COLUMN: &str = "EDU_LEVEL_CLEAN";

/// Configuration for the per-individual cleaning run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Column identifying the individual
    pub id_column: String,
    /// Column with the age of the individual in that calendar year
    pub age_column: String,
    /// Column with the calendar year, only used to report unsorted groups
    pub year_column: Option<String>,
    /// Column with the reported education level
    pub level_column: String,
    /// Column the cleaned level is written to
    pub output_column: String,
    /// Process individuals on a rayon pool
    pub parallel: bool,
    /// Number of worker threads (defaults to the number of CPUs)
    pub num_threads: Option<usize>,
    /// Show an indicatif progress bar over individuals
    pub show_progress: bool,
    /// Rounding rule used by linear interpolation
    pub rounding: RoundingRule,
    /// Run the gap interpolator after the cleaner
    pub interpolate: bool,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            id_column: DEFAULT_ID_COLUMN.to_string(),
            age_column: DEFAULT_AGE_COLUMN.to_string(),
            year_column: Some(DEFAULT_YEAR_COLUMN.to_string()),
            level_column: DEFAULT_LEVEL_COLUMN.to_string(),
            output_column: DEFAULT_OUTPUT_COLUMN.to_string(),
            parallel: true,
            num_threads: None,
            show_progress: false,
            rounding: RoundingRule::default(),
            interpolate: true,
        }
    }
}

impl CleaningConfig {
    /// Load a configuration from a JSON file
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration is usable
    pub fn validate(&self) -> Result<()> {
        let names = [
            ("id_column", &self.id_column),
            ("age_column", &self.age_column),
            ("level_column", &self.level_column),
            ("output_column", &self.output_column),
        ];
        for (field, name) in names {
            if name.is_empty() {
                return Err(Error::Config(format!("{field} must not be empty")));
            }
        }
        if self.output_column == self.id_column || self.output_column == self.age_column {
            return Err(Error::Config(format!(
                "output_column '{}' would overwrite an input column",
                self.output_column
            )));
        }
        if self.num_threads == Some(0) {
            return Err(Error::Config("num_threads must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Effective number of worker threads
    #[must_use]
    pub fn worker_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(num_cpus::get)
    }

    /// Use sequential processing
    #[must_use]
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the number of worker threads
    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = Some(threads);
        self
    }

    /// Set the interpolation rounding rule
    #[must_use]
    pub const fn with_rounding(mut self, rounding: RoundingRule) -> Self {
        self.rounding = rounding;
        self
    }

    /// Enable or disable the progress bar
    #[must_use]
    pub const fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Set the reported level column
    #[must_use]
    pub fn with_level_column(mut self, column: impl Into<String>) -> Self {
        self.level_column = column.into();
        self
    }

    /// Set the output column
    #[must_use]
    pub fn with_output_column(mut self, column: impl Into<String>) -> Self {
        self.output_column = column.into();
        self
    }
}

impl fmt::Display for CleaningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cleaning Configuration:")?;
        writeln!(f, "  Individual Column: {}", self.id_column)?;
        writeln!(f, "  Age Column: {}", self.age_column)?;
        if let Some(year) = &self.year_column {
            writeln!(f, "  Year Column: {year}")?;
        }
        writeln!(f, "  Level Column: {}", self.level_column)?;
        writeln!(f, "  Output Column: {}", self.output_column)?;
        if self.parallel {
            writeln!(f, "  Parallel: yes ({} threads)", self.worker_threads())?;
        } else {
            writeln!(f, "  Parallel: no")?;
        }
        writeln!(f, "  Interpolate: {}", self.interpolate)?;
        writeln!(f, "  Rounding: {}", self.rounding)?;
        Ok(())
    }
}
