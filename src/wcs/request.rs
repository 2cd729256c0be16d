use crate::types::bbox::BoundingBox;
use crate::types::coverage_id::CoverageId;
use crate::types::vertical_level::VerticalLevel;
use chrono::{DateTime, Utc};

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Query of the `GetCapabilities` request.
pub fn capabilities_query(version: &str) -> Vec<(&'static str, String)> {
    vec![
        ("SERVICE", "WCS".to_string()),
        ("REQUEST", "GetCapabilities".to_string()),
        ("version", version.to_string()),
        ("Language", "eng".to_string()),
    ]
}

/// Query of the `DescribeCoverage` request.
pub fn describe_query(version: &str, coverage_id: &CoverageId) -> Vec<(&'static str, String)> {
    vec![
        ("SERVICE", "WCS".to_string()),
        ("version", version.to_string()),
        ("REQUEST", "DescribeCoverage".to_string()),
        ("CoverageId", coverage_id.to_string()),
    ]
}

/// One `GetCoverage` request: a single time step over a bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageRequest<'a> {
    pub coverage_id: &'a CoverageId,
    pub time: DateTime<Utc>,
    pub bbox: BoundingBox,
    pub vertical_level: Option<VerticalLevel>,
}

impl CoverageRequest<'_> {
    pub fn query_pairs(&self, version: &str) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("SERVICE", "WCS".to_string()),
            ("VERSION", version.to_string()),
            ("REQUEST", "GetCoverage".to_string()),
            ("format", "image/tiff".to_string()),
            ("coverageId", self.coverage_id.to_string()),
            ("subset", format!("time({})", self.time.format(TIME_FORMAT))),
            (
                "subset",
                format!("lat({},{})", self.bbox.min_lat, self.bbox.max_lat),
            ),
            (
                "subset",
                format!("long({},{})", self.bbox.min_lon, self.bbox.max_lon),
            ),
        ];
        if let Some(level) = self.vertical_level {
            pairs.push(("subset", level.subset()));
        }
        pairs
    }

    /// Label used in logs and errors.
    pub fn label(&self) -> String {
        format!(
            "GetCoverage {} at {}",
            self.coverage_id,
            self.time.format(TIME_FORMAT)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_get_coverage_query() {
        let coverage_id = CoverageId::from(
            "TEMPERATURE__SPECIFIC_HEIGHT_LEVEL_ABOVE_GROUND___2020-02-27T09.00.00Z",
        );
        let request = CoverageRequest {
            coverage_id: &coverage_id,
            time: Utc.with_ymd_and_hms(2020, 2, 27, 12, 0, 0).unwrap(),
            bbox: BoundingBox {
                min_lon: -5.5,
                min_lat: 47.0,
                max_lon: -1.0,
                max_lat: 49.0,
            },
            vertical_level: Some(VerticalLevel::Height(2)),
        };
        let pairs = request.query_pairs("2.0.1");
        let subsets: Vec<&str> = pairs
            .iter()
            .filter(|(k, _)| *k == "subset")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(
            subsets,
            [
                "time(2020-02-27T12:00:00Z)",
                "lat(47,49)",
                "long(-5.5,-1)",
                "height(2)"
            ]
        );
        assert!(pairs.contains(&("REQUEST", "GetCoverage".to_string())));
        assert!(pairs.contains(&("format", "image/tiff".to_string())));
        assert!(request.label().starts_with("GetCoverage TEMPERATURE__"));
    }

    #[test]
    fn test_no_vertical_subset_by_default() {
        let coverage_id = CoverageId::from("PRESSURE__GROUND_OR_WATER_SURFACE___2020-02-27T09.00.00Z");
        let request = CoverageRequest {
            coverage_id: &coverage_id,
            time: Utc.with_ymd_and_hms(2020, 2, 27, 12, 0, 0).unwrap(),
            bbox: BoundingBox {
                min_lon: 0.0,
                min_lat: 40.0,
                max_lon: 1.0,
                max_lat: 41.0,
            },
            vertical_level: None,
        };
        assert_eq!(request.query_pairs("2.0.1").len(), 8);
    }

    #[test]
    fn test_describe_and_capabilities_queries() {
        let id = CoverageId::from("PRESSURE___2020-02-27T09.00.00Z");
        assert!(describe_query("2.0.1", &id)
            .contains(&("CoverageId", "PRESSURE___2020-02-27T09.00.00Z".to_string())));
        assert!(capabilities_query("2.0.1").contains(&("Language", "eng".to_string())));
    }
}
