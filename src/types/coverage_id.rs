//! Coverage identifiers, the keys under which the WCS publishes one variable of
//! one model run.
//!
//! The service's naming convention is
//! `<VARIABLE_NAME>__<VERTICAL_LEVEL>___<RUN_TIME>Z[<AGGREGATION>]`, for example
//! `TEMPERATURE__SPECIFIC_HEIGHT_LEVEL_ABOVE_GROUND___2020-02-27T09.00.00Z` or
//! `TOTAL_PRECIPITATION__GROUND_OR_WATER_SURFACE___2020-02-27T09.00.00Z_PT3H`.

use crate::types::run_time::RunTime;
use std::fmt;

/// Separates the variable part from the run-time part of a coverage identifier.
pub const RUN_TIME_SEPARATOR: &str = "___";
const LEVEL_SEPARATOR: &str = "__";

/// An opaque coverage identifier as understood by `DescribeCoverage` and `GetCoverage`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoverageId(String);

impl CoverageId {
    /// Builds the identifier of `variable` for the model run started at `run_time`.
    ///
    /// This is a pure function: the same inputs always give the same identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use meteofrance_wcs::{CoverageId, RunTime};
    ///
    /// let run_time: RunTime = "2020-02-27T09".parse().unwrap();
    /// let id = CoverageId::compose("PRESSURE__GROUND_OR_WATER_SURFACE", run_time);
    /// assert_eq!(id.as_str(), "PRESSURE__GROUND_OR_WATER_SURFACE___2020-02-27T09.00.00Z");
    /// ```
    pub fn compose(variable: &str, run_time: RunTime) -> Self {
        Self(format!(
            "{variable}{RUN_TIME_SEPARATOR}{}Z",
            run_time.coverage_token()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits the identifier into its components, if it follows the naming convention.
    pub fn key(&self) -> Option<CoverageKey> {
        CoverageKey::parse(&self.0)
    }
}

impl fmt::Display for CoverageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CoverageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CoverageId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The components of a published coverage identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageKey {
    /// Uppercased, underscored variable name including its vertical level,
    /// e.g. `TEMPERATURE__SPECIFIC_HEIGHT_LEVEL_ABOVE_GROUND`.
    pub variable: String,
    pub run_time: RunTime,
    /// Accumulation period suffix such as `_PT3H` or `_P1D`. `None` for fields
    /// sampled on the product's own time step.
    pub aggregation: Option<String>,
}

impl CoverageKey {
    pub fn parse(coverage_id: &str) -> Option<Self> {
        let (variable, tail) = coverage_id.trim().rsplit_once(RUN_TIME_SEPARATOR)?;
        let (run_time, suffix) = tail.split_once('Z')?;
        if variable.is_empty() {
            return None;
        }
        let suffix = suffix.trim();
        Some(Self {
            variable: variable.to_string(),
            run_time: RunTime::from_coverage_token(run_time)?,
            aggregation: (!suffix.is_empty()).then(|| suffix.to_string()),
        })
    }

    /// Variable name without its vertical level, e.g. `TEMPERATURE`.
    pub fn variable_name(&self) -> &str {
        self.variable
            .split_once(LEVEL_SEPARATOR)
            .map_or(self.variable.as_str(), |(name, _)| name)
    }

    /// Vertical level part, e.g. `SPECIFIC_HEIGHT_LEVEL_ABOVE_GROUND`.
    pub fn vertical_level(&self) -> Option<&str> {
        self.variable
            .split_once(LEVEL_SEPARATOR)
            .map(|(_, level)| level)
    }

    pub fn coverage_id(&self) -> CoverageId {
        CoverageId::compose(&self.variable, self.run_time)
    }
}
