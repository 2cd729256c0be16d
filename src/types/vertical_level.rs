use std::fmt;

const HEIGHT_TITLE_MARKER: &str = "at specified height level above ground";
const DEFAULT_HEIGHT_M: u32 = 2;

/// Vertical slice requested from a 3D coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalLevel {
    /// Height above ground, in meters.
    Height(u32),
    /// Isobaric level, in hPa.
    Pressure(u32),
}

impl VerticalLevel {
    /// Titles on a height axis are sliced at 2 m unless told otherwise.
    pub fn default_for_title(title: &str) -> Option<Self> {
        title
            .contains(HEIGHT_TITLE_MARKER)
            .then_some(VerticalLevel::Height(DEFAULT_HEIGHT_M))
    }

    /// The `subset` parameter value of a `GetCoverage` request.
    pub fn subset(&self) -> String {
        match self {
            VerticalLevel::Height(m) => format!("height({m})"),
            VerticalLevel::Pressure(hpa) => format!("pressure({hpa})"),
        }
    }
}

impl fmt::Display for VerticalLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerticalLevel::Height(m) => write!(f, "{m} m"),
            VerticalLevel::Pressure(hpa) => write!(f, "{hpa} hPa"),
        }
    }
}
