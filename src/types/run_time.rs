//! Defines [`RunTime`], the timestamp identifying when a forecast model was executed.
//!
//! Météo-France encodes run-times in coverage identifiers with dots as time
//! separators (`2020-02-27T09.00.00Z`), while humans usually refer to them by
//! date and hour (`2020-02-27T09`). `RunTime` converts between both.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const COVERAGE_FORMAT: &str = "%Y-%m-%dT%H.%M.%S";
const DISPLAY_FORMAT: &str = "%Y-%m-%dT%H";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognised run time '{0}'")]
pub struct ParseRunTimeError(pub String);

/// The time at which a forecast model run was started (UTC).
///
/// Ordering follows chronological order, so the most recent run-time of a list
/// is its maximum.
///
/// # Examples
///
/// ```
/// use meteofrance_wcs::RunTime;
///
/// let run_time: RunTime = "2020-02-27T09".parse().unwrap();
/// assert_eq!(run_time.to_string(), "2020-02-27T09");
/// assert_eq!(run_time.coverage_token(), "2020-02-27T09.00.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunTime(pub NaiveDateTime);

impl RunTime {
    pub fn new(datetime: NaiveDateTime) -> Self {
        Self(datetime)
    }

    /// Parses the run-time part of a coverage identifier, e.g. `2020-02-27T09.00.00`.
    pub fn from_coverage_token(token: &str) -> Option<Self> {
        NaiveDateTime::parse_from_str(token.trim_end_matches('Z'), COVERAGE_FORMAT)
            .ok()
            .map(Self)
    }

    /// The run-time as it appears in a coverage identifier (without the trailing `Z`).
    pub fn coverage_token(&self) -> String {
        self.0.format(COVERAGE_FORMAT).to_string()
    }

    pub fn to_utc(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.0)
    }
}

impl fmt::Display for RunTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DISPLAY_FORMAT))
    }
}

/// Accepts `2020-02-27T09`, `2020-02-27T09:00`, `2020-02-27T09:00:00`,
/// the coverage form `2020-02-27T09.00.00Z` and RFC 3339 timestamps.
impl FromStr for RunTime {
    type Err = ParseRunTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(dt) = trimmed.parse::<DateTime<Utc>>() {
            return Ok(Self(dt.naive_utc()));
        }
        if let Some(run_time) = Self::from_coverage_token(trimmed) {
            return Ok(run_time);
        }
        let naive = trimmed.trim_end_matches('Z');
        // chrono needs at least the minutes to build a NaiveDateTime.
        if let Ok(dt) = NaiveDateTime::parse_from_str(&format!("{naive}:00"), "%Y-%m-%dT%H:%M") {
            return Ok(Self(dt));
        }
        for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(naive, format) {
                return Ok(Self(dt));
            }
        }
        Err(ParseRunTimeError(s.to_string()))
    }
}

impl From<NaiveDateTime> for RunTime {
    fn from(value: NaiveDateTime) -> Self {
        Self(value)
    }
}

impl From<DateTime<Utc>> for RunTime {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value.naive_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn nine_am() -> RunTime {
        RunTime(
            NaiveDate::from_ymd_opt(2020, 2, 27)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_parses_every_supported_format() {
        for input in [
            "2020-02-27T09",
            "2020-02-27T09:00",
            "2020-02-27T09:00:00",
            "2020-02-27T09:00:00Z",
            "2020-02-27T09.00.00Z",
            "2020-02-27T09.00.00",
            "2020-02-27T10:00:00+01:00",
        ] {
            assert_eq!(input.parse::<RunTime>(), Ok(nine_am()), "input {input}");
        }
    }

    #[test]
    fn test_rejects_garbage() {
        let err = "yesterday".parse::<RunTime>().unwrap_err();
        assert_eq!(err, ParseRunTimeError("yesterday".to_string()));
    }

    #[test]
    fn test_display_and_coverage_token() {
        assert_eq!(nine_am().to_string(), "2020-02-27T09");
        assert_eq!(nine_am().coverage_token(), "2020-02-27T09.00.00");
        assert_eq!(
            RunTime::from_coverage_token("2020-02-27T09.00.00Z"),
            Some(nine_am())
        );
    }

    #[test]
    fn test_ordering_is_chronological() {
        let earlier: RunTime = "2020-02-23T00".parse().unwrap();
        assert!(earlier < nine_am());
        assert_eq!(vec![nine_am(), earlier].into_iter().max(), Some(nine_am()));
    }
}
