//! Client for the Météo-France OGC Web Coverage Service (WCS 2.0.1).
//!
//! Obtain a token, pick a forecast product (AROME, ARPEGE, ...), choose a field
//! and a model run, fetch its values over an area and a time window as a
//! `(time, y, x)` array, and optionally render them as an animated GIF.
//!
//! ```no_run
//! use meteofrance_wcs::{BoundingBox, MeteoFrance, MeteoFranceError, RenderOptions};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), MeteoFranceError> {
//! let client = MeteoFrance::with_token("__my_token__")?;
//! let arome = client
//!     .select_product()
//!     .dataset("arome")
//!     .area("france")
//!     .accuracy(0.01)
//!     .call()
//!     .await?;
//! let temperature = arome
//!     .select_coverage()
//!     .title("Temperature at specified height level above ground")
//!     .call()?
//!     .check_run_time(24)
//!     .await?
//!     .set_bbox_of_interest(BoundingBox::new(-5.2, 47.2, -1.0, 48.9)?)?;
//! let array = temperature.create_3d_array().await?;
//! array.make_movie("brittany_t2m", &RenderOptions::default()).await?;
//! # Ok(())
//! # }
//! ```

mod auth;
mod catalog;
mod config;
mod error;
mod meteofrance;
mod render;
mod session;
mod types;
mod utils;
mod wcs;

pub use error::MeteoFranceError;
pub use meteofrance::*;

pub use config::ServiceConfig;

pub use auth::credentials::Credentials;
pub use auth::error::AuthError;
pub use auth::token::Token;

pub use catalog::error::CatalogError;
pub use catalog::product::{Product, ServiceType, PRODUCTS};
pub use catalog::{select, select_from, ProductQuery};

pub use session::coverage_session::CoverageSession;
pub use session::horizon::{scan_run_times, HorizonMatch};
pub use session::product_session::ProductSession;

pub use types::bbox::BoundingBox;
pub use types::coverage_id::{CoverageId, CoverageKey};
pub use types::forecast_array::ForecastArray;
pub use types::run_time::{ParseRunTimeError, RunTime};
pub use types::vertical_level::VerticalLevel;

pub use wcs::capabilities::{parse_coverage_summaries, Capabilities, CoverageSummary};
pub use wcs::description::CoverageDescription;
pub use wcs::error::WcsError;

pub use render::color_scale::{ColorScale, ColorStop};
pub use render::error::RenderError;
pub use render::movie::{make_movie, Movie, RenderOptions};
