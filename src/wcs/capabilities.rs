//! Parsing of `GetCapabilities` replies into the set of published coverages.

use crate::types::coverage_id::CoverageId;
use crate::types::run_time::RunTime;
use crate::wcs::error::WcsError;
use crate::wcs::xml::{ends_with, walk, XmlNode};
use chrono::NaiveDateTime;
use log::debug;
use polars::prelude::*;
use std::collections::BTreeSet;

const DOCUMENT: &str = "GetCapabilities reply";
const RUN_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One `wcs:CoverageSummary` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageSummary {
    pub title: String,
    pub coverage_id: CoverageId,
}

/// Extracts every coverage summary of a capabilities document, in document order.
pub fn parse_coverage_summaries(xml: &str) -> Result<Vec<CoverageSummary>, WcsError> {
    let mut summaries = Vec::new();
    let mut title: Option<String> = None;
    let mut coverage_id: Option<String> = None;
    let mut in_summary = false;

    walk(xml, DOCUMENT, |node| match node {
        XmlNode::Open { path, .. } => {
            if ends_with(path, "CoverageSummary") {
                if let (Some(t), Some(id)) = (title.take(), coverage_id.take()) {
                    summaries.push(CoverageSummary {
                        title: t,
                        coverage_id: id.into(),
                    });
                }
                in_summary = true;
            }
        }
        XmlNode::Text { path, text } => {
            let parent_is_summary =
                path.len() >= 2 && path[path.len() - 2] == "CoverageSummary";
            if in_summary && parent_is_summary {
                if ends_with(path, "Title") {
                    title = Some(text);
                } else if ends_with(path, "CoverageId") {
                    coverage_id = Some(text);
                }
            }
        }
    })?;
    if let (Some(t), Some(id)) = (title, coverage_id) {
        summaries.push(CoverageSummary {
            title: t,
            coverage_id: id.into(),
        });
    }
    Ok(summaries)
}

/// Titles and run-times currently published by a product.
///
/// Backed by a [`DataFrame`] with the string columns `title`, `coverage_id`,
/// `variable` and `run_time`. Only coverages sampled on the product's own time
/// step are kept; accumulated fields (`..Z_PT3H`, `..Z_P1D`) are dropped.
#[derive(Debug, Clone)]
pub struct Capabilities {
    frame: DataFrame,
}

impl Capabilities {
    pub fn parse(xml: &str) -> Result<Capabilities, WcsError> {
        let summaries = parse_coverage_summaries(xml)?;
        Capabilities::from_summaries(&summaries)
    }

    pub fn from_summaries(summaries: &[CoverageSummary]) -> Result<Capabilities, WcsError> {
        let mut titles = Vec::new();
        let mut coverage_ids = Vec::new();
        let mut variables = Vec::new();
        let mut run_times = Vec::new();

        for summary in summaries {
            let Some(key) = summary.coverage_id.key() else {
                debug!("Skipping unrecognised coverage id {}", summary.coverage_id);
                continue;
            };
            if key.aggregation.is_some() {
                continue;
            }
            titles.push(summary.title.trim().to_string());
            coverage_ids.push(summary.coverage_id.to_string());
            variables.push(key.variable.clone());
            run_times.push(key.run_time.0.format(RUN_TIME_FORMAT).to_string());
        }
        debug!(
            "Kept {} of {} coverage summaries",
            titles.len(),
            summaries.len()
        );

        let frame = df!(
            "title" => titles,
            "coverage_id" => coverage_ids,
            "variable" => variables,
            "run_time" => run_times
        )?;
        Ok(Capabilities { frame })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Distinct titles, sorted.
    pub fn titles(&self) -> Result<Vec<String>, WcsError> {
        let titles: BTreeSet<String> = self
            .frame
            .column("title")?
            .str()?
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect();
        Ok(titles.into_iter().collect())
    }

    pub fn contains_title(&self, title: &str) -> Result<bool, WcsError> {
        Ok(self.rows_for(title)?.height() > 0)
    }

    /// Distinct run-times published for `title`, oldest first.
    pub fn run_times(&self, title: &str) -> Result<Vec<RunTime>, WcsError> {
        let rows = self.rows_for(title)?;
        let mut run_times = BTreeSet::new();
        for value in rows.column("run_time")?.str()?.into_iter().flatten() {
            let parsed = NaiveDateTime::parse_from_str(value, RUN_TIME_FORMAT)
                .map_err(|_| WcsError::InvalidTimestamp(value.to_string()))?;
            run_times.insert(RunTime::new(parsed));
        }
        Ok(run_times.into_iter().collect())
    }

    pub fn latest_run_time(&self, title: &str) -> Result<Option<RunTime>, WcsError> {
        Ok(self.run_times(title)?.pop())
    }

    /// Service variable name (e.g. `PRESSURE__GROUND_OR_WATER_SURFACE`) behind `title`.
    pub fn variable(&self, title: &str) -> Result<Option<String>, WcsError> {
        let rows = self
            .frame
            .clone()
            .lazy()
            .filter(col("title").eq(lit(title)))
            .select([col("variable")])
            .limit(1)
            .collect()?;
        let variable = rows
            .column("variable")?
            .str()?
            .into_iter()
            .flatten()
            .next()
            .map(str::to_string);
        Ok(variable)
    }

    fn rows_for(&self, title: &str) -> Result<DataFrame, WcsError> {
        let rows = self
            .frame
            .clone()
            .lazy()
            .filter(col("title").eq(lit(title)))
            .collect()?;
        Ok(rows)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn capabilities_xml(entries: &[(&str, &str)]) -> String {
        let summaries: String = entries
            .iter()
            .map(|(title, id)| {
                format!(
                    "<wcs:CoverageSummary><ows:Title>{title}</ows:Title>\
                     <wcs:CoverageId>{id}</wcs:CoverageId>\
                     <wcs:CoverageSubtype>RectifiedGridCoverage</wcs:CoverageSubtype>\
                     </wcs:CoverageSummary>"
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<wcs:Capabilities xmlns:wcs="http://www.opengis.net/wcs/2.0" xmlns:ows="http://www.opengis.net/ows/2.0" version="2.0.1">
  <ows:ServiceIdentification><ows:Title>ARPEGE WCS</ows:Title></ows:ServiceIdentification>
  <wcs:Contents>{summaries}</wcs:Contents>
</wcs:Capabilities>"#
        )
    }

    fn sample() -> Capabilities {
        let xml = capabilities_xml(&[
            (
                "Pressure at ground or water surface",
                "PRESSURE__GROUND_OR_WATER_SURFACE___2020-02-23T00.00.00Z",
            ),
            (
                "Pressure at ground or water surface",
                "PRESSURE__GROUND_OR_WATER_SURFACE___2020-02-27T09.00.00Z",
            ),
            (
                "Pressure at ground or water surface",
                "PRESSURE__GROUND_OR_WATER_SURFACE___2020-02-25T06.00.00Z",
            ),
            (
                "Temperature at specified height level above ground",
                "TEMPERATURE__SPECIFIC_HEIGHT_LEVEL_ABOVE_GROUND___2020-02-26T18.00.00Z",
            ),
            (
                "Total precipitation at ground or water surface",
                "TOTAL_PRECIPITATION__GROUND_OR_WATER_SURFACE___2020-02-27T09.00.00Z_PT3H",
            ),
        ]);
        Capabilities::parse(&xml).unwrap()
    }

    #[test]
    fn test_parse_summaries_ignores_service_title() {
        let xml = capabilities_xml(&[("Pressure", "PRESSURE___2020-02-23T00.00.00Z")]);
        let summaries = parse_coverage_summaries(&xml).unwrap();
        assert_eq!(
            summaries,
            [CoverageSummary {
                title: "Pressure".to_string(),
                coverage_id: "PRESSURE___2020-02-23T00.00.00Z".into(),
            }]
        );
    }

    #[test]
    fn test_aggregated_coverages_are_excluded() {
        let capabilities = sample();
        assert_eq!(capabilities.len(), 4);
        assert_eq!(
            capabilities.titles().unwrap(),
            [
                "Pressure at ground or water surface",
                "Temperature at specified height level above ground"
            ]
        );
        assert!(!capabilities
            .contains_title("Total precipitation at ground or water surface")
            .unwrap());
    }

    #[test]
    fn test_run_times_are_sorted_and_latest_is_last() {
        let capabilities = sample();
        let title = "Pressure at ground or water surface";
        let run_times: Vec<String> = capabilities
            .run_times(title)
            .unwrap()
            .iter()
            .map(RunTime::to_string)
            .collect();
        assert_eq!(run_times, ["2020-02-23T00", "2020-02-25T06", "2020-02-27T09"]);
        assert_eq!(
            capabilities.latest_run_time(title).unwrap().unwrap().to_string(),
            "2020-02-27T09"
        );
        assert_eq!(capabilities.latest_run_time("Unknown").unwrap(), None);
    }

    #[test]
    fn test_variable_lookup() {
        let capabilities = sample();
        assert_eq!(
            capabilities
                .variable("Temperature at specified height level above ground")
                .unwrap()
                .as_deref(),
            Some("TEMPERATURE__SPECIFIC_HEIGHT_LEVEL_ABOVE_GROUND")
        );
        assert_eq!(capabilities.variable("Unknown").unwrap(), None);
    }

    #[test]
    fn test_empty_document() {
        let capabilities = Capabilities::parse(&capabilities_xml(&[])).unwrap();
        assert!(capabilities.is_empty());
        assert!(capabilities.titles().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_document() {
        let err = Capabilities::parse("<wcs:Capabilities><wcs:Contents></wcs:Capabilities>")
            .unwrap_err();
        assert!(matches!(err, WcsError::XmlParse { .. }));
    }
}
