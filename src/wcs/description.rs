//! Parsing of `DescribeCoverage` replies: spatial extent and available time steps.

use crate::types::bbox::BoundingBox;
use crate::wcs::error::WcsError;
use crate::wcs::xml::{attribute, ends_with, walk, XmlNode};
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};

const DOCUMENT: &str = "DescribeCoverage reply";
const ENVELOPES: [&str; 2] = ["EnvelopeWithTimePeriod", "Envelope"];
/// Longest time period accepted from an envelope. Forecasts reach a few days.
const MAX_PERIOD_DAYS: i64 = 31;

/// Extent of one coverage as advertised by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageDescription {
    /// Largest box that can be requested, in `(lon, lat)` order.
    pub max_bbox: BoundingBox,
    pub axis_labels: Vec<String>,
    pub uom_labels: Vec<String>,
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Every time step from `begin` to `end` inclusive.
    pub time_steps: Vec<DateTime<Utc>>,
}

#[derive(Default)]
struct Envelope {
    axis_labels: Option<String>,
    uom_labels: Option<String>,
    lower_corner: Option<String>,
    upper_corner: Option<String>,
    begin: Option<String>,
    end: Option<String>,
}

impl CoverageDescription {
    /// Parses the first envelope of a `DescribeCoverage` reply. Time steps are
    /// generated every `step` between the begin and end positions.
    pub fn parse(xml: &str, step: Duration) -> Result<CoverageDescription, WcsError> {
        let mut envelope = Envelope::default();
        let mut seen_envelope = false;

        walk(xml, DOCUMENT, |node| match node {
            XmlNode::Open { path, attributes } => {
                if !seen_envelope && ENVELOPES.iter().any(|e| ends_with(path, e)) {
                    seen_envelope = true;
                    envelope.axis_labels = attribute(&attributes, "axisLabels").map(String::from);
                    envelope.uom_labels = attribute(&attributes, "uomLabels").map(String::from);
                }
            }
            XmlNode::Text { path, text } => {
                let inside = path.iter().any(|p| ENVELOPES.contains(&p.as_str()));
                if !inside {
                    return;
                }
                let slot = match path.last().map(String::as_str) {
                    Some("lowerCorner") => &mut envelope.lower_corner,
                    Some("upperCorner") => &mut envelope.upper_corner,
                    Some("beginPosition") => &mut envelope.begin,
                    Some("endPosition") => &mut envelope.end,
                    _ => return,
                };
                if slot.is_none() {
                    *slot = Some(text);
                }
            }
        })?;

        if !seen_envelope {
            return Err(missing("EnvelopeWithTimePeriod"));
        }
        let axis_labels = split_labels(envelope.axis_labels.as_deref());
        let uom_labels = split_labels(envelope.uom_labels.as_deref());
        let lower = parse_corner(envelope.lower_corner.as_deref(), "lowerCorner")?;
        let upper = parse_corner(envelope.upper_corner.as_deref(), "upperCorner")?;
        let begin = parse_timestamp(envelope.begin.as_deref().ok_or_else(|| missing("beginPosition"))?)?;
        let end = parse_timestamp(envelope.end.as_deref().ok_or_else(|| missing("endPosition"))?)?;
        if end - begin > Duration::days(MAX_PERIOD_DAYS) {
            return Err(WcsError::InvalidEnvelope(format!(
                "time period {begin} to {end} exceeds {MAX_PERIOD_DAYS} days"
            )));
        }

        let (lon, lat) = axis_order(&axis_labels);
        let coordinate = |corner: &[f64], index: usize| {
            corner.get(index).copied().ok_or_else(|| {
                WcsError::InvalidEnvelope(format!(
                    "corner has {} values, axis {} expected",
                    corner.len(),
                    index
                ))
            })
        };
        let max_bbox = BoundingBox {
            min_lon: coordinate(&lower, lon)?,
            min_lat: coordinate(&lower, lat)?,
            max_lon: coordinate(&upper, lon)?,
            max_lat: coordinate(&upper, lat)?,
        };
        if !max_bbox.is_valid() {
            return Err(WcsError::InvalidEnvelope(format!(
                "degenerate extent {max_bbox}"
            )));
        }

        Ok(CoverageDescription {
            max_bbox,
            axis_labels,
            uom_labels,
            begin,
            end,
            time_steps: time_steps(begin, end, step),
        })
    }

    pub fn last_time_step(&self) -> Option<DateTime<Utc>> {
        self.time_steps.last().copied()
    }
}

/// Timestamps from `begin` to `end` inclusive, every `step`. Empty when the
/// range is reversed or the step is not positive.
pub fn time_steps(begin: DateTime<Utc>, end: DateTime<Utc>, step: Duration) -> Vec<DateTime<Utc>> {
    if step <= Duration::zero() || end < begin {
        return Vec::new();
    }
    let mut steps = Vec::new();
    let mut current = Some(begin);
    while let Some(time) = current.filter(|t| *t <= end) {
        steps.push(time);
        current = time.checked_add_signed(step);
    }
    steps
}

fn missing(element: &'static str) -> WcsError {
    WcsError::MissingElement {
        document: DOCUMENT,
        element,
    }
}

fn split_labels(labels: Option<&str>) -> Vec<String> {
    labels
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Indices of the longitude and latitude axes. Longitude first unless the
/// labels say otherwise.
fn axis_order(axis_labels: &[String]) -> (usize, usize) {
    let position = |prefix: &str| {
        axis_labels
            .iter()
            .position(|label| label.to_ascii_lowercase().starts_with(prefix))
    };
    match (position("lon"), position("lat")) {
        (Some(lon), Some(lat)) => (lon, lat),
        _ => (0, 1),
    }
}

fn parse_corner(corner: Option<&str>, element: &'static str) -> Result<Vec<f64>, WcsError> {
    corner
        .ok_or_else(|| missing(element))?
        .split_whitespace()
        .map(|v| {
            v.parse::<f64>()
                .map_err(|_| WcsError::InvalidNumber(v.to_string()))
        })
        .collect()
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, WcsError> {
    if let Ok(dt) = value.parse::<DateTime<Utc>>() {
        return Ok(dt);
    }
    NaiveDateTime::parse_from_str(value.trim_end_matches('Z'), "%Y-%m-%dT%H:%M:%S")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| WcsError::InvalidTimestamp(value.to_string()))
}
