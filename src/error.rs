use crate::auth::error::AuthError;
use crate::catalog::error::CatalogError;
use crate::render::error::RenderError;
use crate::types::bbox::BoundingBox;
use crate::types::run_time::{ParseRunTimeError, RunTime};
use crate::wcs::error::WcsError;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeteoFranceError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Wcs(#[from] WcsError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    InvalidRunTime(#[from] ParseRunTimeError),

    #[error("Title '{0}' is not published by the selected product")]
    UnknownTitle(String),

    #[error("Run time {run_time} is not available for '{title}'")]
    UnknownRunTime { title: String, run_time: RunTime },

    #[error("No run time of '{title}' covers the next {horizon_hours} hours (tried {tried} run times)")]
    HorizonUnavailable {
        title: String,
        horizon_hours: u32,
        tried: usize,
    },

    #[error("Invalid bounding box {0}: minimum corner must be strictly below maximum corner")]
    InvalidBoundingBox(BoundingBox),

    #[error("Bounding box {requested} does not overlap the coverage extent {domain}")]
    OutsideDomain {
        requested: BoundingBox,
        domain: BoundingBox,
    },

    #[error("Coverage {0} has not been described yet")]
    NotDescribed(String),

    #[error("No bounding box of interest set for coverage {0}")]
    NoBoundingBox(String),

    #[error("No time steps requested for coverage {0}")]
    NoRequestedSteps(String),

    #[error("Time step {time} is requested more than once for coverage {coverage_id}")]
    DuplicateRequestedStep {
        coverage_id: String,
        time: DateTime<Utc>,
    },

    #[error("Failed to fetch {coverage_id} at {time}")]
    Fetch {
        coverage_id: String,
        time: DateTime<Utc>,
        #[source]
        source: Box<WcsError>,
    },
}
