//! Provides [`CoverageSession`]: one selected coverage, its extent, the area of
//! interest and the time steps to fetch.

use crate::error::MeteoFranceError;
use crate::session::horizon::scan_run_times;
use crate::session::product_session::ProductSession;
use crate::types::bbox::BoundingBox;
use crate::types::coverage_id::CoverageId;
use crate::types::forecast_array::ForecastArray;
use crate::types::run_time::RunTime;
use crate::types::vertical_level::VerticalLevel;
use crate::wcs::description::CoverageDescription;
use crate::wcs::error::WcsError;
use crate::wcs::request::CoverageRequest;
use chrono::{DateTime, Utc};
use log::info;
use ndarray::{Array2, Axis};

/// A coverage picked from a [`ProductSession`].
///
/// The usual sequence is [`describe`](Self::describe) or
/// [`check_run_time`](Self::check_run_time), then
/// [`set_bbox_of_interest`](Self::set_bbox_of_interest), then
/// [`create_3d_array`](Self::create_3d_array). Each step returns a new session.
#[derive(Debug, Clone)]
pub struct CoverageSession<'a> {
    session: ProductSession<'a>,
    title: String,
    run_time: RunTime,
    coverage_id: CoverageId,
    vertical_level: Option<VerticalLevel>,
    description: Option<CoverageDescription>,
    bbox: Option<BoundingBox>,
    requested_steps: Vec<DateTime<Utc>>,
}

impl<'a> CoverageSession<'a> {
    pub(crate) fn new(
        session: ProductSession<'a>,
        title: String,
        run_time: RunTime,
        coverage_id: CoverageId,
        vertical_level: Option<VerticalLevel>,
    ) -> Self {
        Self {
            session,
            title,
            run_time,
            coverage_id,
            vertical_level,
            description: None,
            bbox: None,
            requested_steps: Vec::new(),
        }
    }

    pub fn product_session(&self) -> &ProductSession<'a> {
        &self.session
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn run_time(&self) -> RunTime {
        self.run_time
    }

    pub fn coverage_id(&self) -> &CoverageId {
        &self.coverage_id
    }

    pub fn vertical_level(&self) -> Option<VerticalLevel> {
        self.vertical_level
    }

    /// Extent and time steps, once [`describe`](Self::describe) or
    /// [`check_run_time`](Self::check_run_time) succeeded.
    pub fn description(&self) -> Option<&CoverageDescription> {
        self.description.as_ref()
    }

    pub fn max_bbox(&self) -> Option<BoundingBox> {
        self.description.as_ref().map(|d| d.max_bbox)
    }

    pub fn time_steps(&self) -> &[DateTime<Utc>] {
        self.description
            .as_ref()
            .map(|d| d.time_steps.as_slice())
            .unwrap_or_default()
    }

    pub fn bbox_of_interest(&self) -> Option<BoundingBox> {
        self.bbox
    }

    pub fn requested_steps(&self) -> &[DateTime<Utc>] {
        &self.requested_steps
    }

    /// Retrieves the extent and available time steps of the coverage.
    pub async fn describe(&self) -> Result<CoverageSession<'a>, MeteoFranceError> {
        let description = self
            .session
            .client()
            .describe_coverage(self.session.product(), &self.coverage_id)
            .await?;
        info!(
            "{} spans {} time steps over {}",
            self.coverage_id,
            description.time_steps.len(),
            description.max_bbox
        );
        Ok(Self {
            description: Some(description),
            ..self.clone()
        })
    }

    /// Picks the most recent run-time of this title whose forecast reaches
    /// `horizon_hours` hours from now, and requests the time steps of that window.
    ///
    /// # Errors
    ///
    /// [`MeteoFranceError::HorizonUnavailable`] if no published run-time reaches
    /// that far, or the first describe failure met while scanning.
    pub async fn check_run_time(&self, horizon_hours: u32) -> Result<CoverageSession<'a>, MeteoFranceError> {
        self.check_run_time_at(horizon_hours, Utc::now()).await
    }

    /// [`check_run_time`](Self::check_run_time) with an explicit current time.
    pub async fn check_run_time_at(
        &self,
        horizon_hours: u32,
        now: DateTime<Utc>,
    ) -> Result<CoverageSession<'a>, MeteoFranceError> {
        let run_times = self.session.list_available_run_times(&self.title)?;
        let variable = self
            .coverage_id
            .key()
            .map(|key| key.variable)
            .ok_or_else(|| MeteoFranceError::UnknownTitle(self.title.clone()))?;

        let client = self.session.client();
        let product = self.session.product();
        let found = scan_run_times(&run_times, now, horizon_hours, |run_time| {
            let coverage_id = CoverageId::compose(&variable, run_time);
            async move { client.describe_coverage(product, &coverage_id).await }
        })
        .await?;

        let Some(found) = found else {
            return Err(MeteoFranceError::HorizonUnavailable {
                title: self.title.clone(),
                horizon_hours,
                tried: run_times.len(),
            });
        };
        if found.run_time != self.run_time {
            info!("Switched {} from run time {} to {}", self.title, self.run_time, found.run_time);
        }
        Ok(Self {
            run_time: found.run_time,
            coverage_id: CoverageId::compose(&variable, found.run_time),
            description: Some(found.description),
            requested_steps: found.requested_steps,
            ..self.clone()
        })
    }

    /// Restricts the fetched area to `bbox`, clipped to the coverage extent.
    ///
    /// # Errors
    ///
    /// [`MeteoFranceError::NotDescribed`] if the extent is not known yet,
    /// [`MeteoFranceError::InvalidBoundingBox`] for a degenerate box and
    /// [`MeteoFranceError::OutsideDomain`] if it does not overlap the extent.
    pub fn set_bbox_of_interest(&self, bbox: BoundingBox) -> Result<CoverageSession<'a>, MeteoFranceError> {
        let domain = self
            .max_bbox()
            .ok_or_else(|| MeteoFranceError::NotDescribed(self.coverage_id.to_string()))?;
        if !bbox.is_valid() {
            return Err(MeteoFranceError::InvalidBoundingBox(bbox));
        }
        let clipped = bbox
            .intersection(&domain)
            .ok_or(MeteoFranceError::OutsideDomain {
                requested: bbox,
                domain,
            })?;
        Ok(Self {
            bbox: Some(clipped),
            ..self.clone()
        })
    }

    /// Replaces the time steps fetched by [`create_3d_array`](Self::create_3d_array).
    pub fn with_requested_steps(&self, steps: Vec<DateTime<Utc>>) -> CoverageSession<'a> {
        Self {
            requested_steps: steps,
            ..self.clone()
        }
    }

    /// Refreshes the product's capabilities and moves to the latest run-time
    /// of the same title. The area of interest is kept; the description and
    /// requested steps must be obtained again.
    pub async fn update(&self) -> Result<CoverageSession<'a>, MeteoFranceError> {
        let session = self.session.update().await?;
        let selected = session
            .select_coverage()
            .title(self.title.clone())
            .maybe_vertical_level(self.vertical_level)
            .call()?;
        Ok(Self {
            bbox: self.bbox,
            ..selected
        })
    }

    /// Downloads every requested time step over the area of interest and stacks
    /// them into a `(time, y, x)` array, in ascending time order.
    ///
    /// Requests are sent one after the other. Any failing step aborts the whole
    /// fetch.
    ///
    /// # Errors
    ///
    /// [`MeteoFranceError::NoBoundingBox`] or [`MeteoFranceError::NoRequestedSteps`]
    /// when the session is incomplete, [`MeteoFranceError::DuplicateRequestedStep`]
    /// before any request if a step is listed twice, [`MeteoFranceError::Fetch`]
    /// naming the failing time step otherwise.
    pub async fn create_3d_array(&self) -> Result<ForecastArray, MeteoFranceError> {
        let bbox = self
            .bbox
            .ok_or_else(|| MeteoFranceError::NoBoundingBox(self.coverage_id.to_string()))?;
        if self.requested_steps.is_empty() {
            return Err(MeteoFranceError::NoRequestedSteps(self.coverage_id.to_string()));
        }
        let mut times = self.requested_steps.clone();
        times.sort_unstable();
        if let Some(pair) = times.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(MeteoFranceError::DuplicateRequestedStep {
                coverage_id: self.coverage_id.to_string(),
                time: pair[0],
            });
        }

        let client = self.session.client();
        let product = self.session.product();
        let mut grids: Vec<Array2<f32>> = Vec::with_capacity(times.len());
        for &time in &times {
            let request = CoverageRequest {
                coverage_id: &self.coverage_id,
                time,
                bbox,
                vertical_level: self.vertical_level,
            };
            let grid = client
                .get_coverage(product, &request)
                .await
                .map_err(|e| self.fetch_error(time, e))?;
            if let Some(first) = grids.first() {
                if first.dim() != grid.dim() {
                    return Err(self.fetch_error(
                        time,
                        WcsError::RasterLayout(format!(
                            "grid of shape {:?} differs from the first step's {:?}",
                            grid.dim(),
                            first.dim()
                        )),
                    ));
                }
            }
            grids.push(grid);
        }

        let views: Vec<_> = grids.iter().map(|g| g.view()).collect();
        let values = ndarray::stack(Axis(0), &views)
            .map_err(|e| self.fetch_error(times[0], WcsError::RasterLayout(e.to_string())))?;
        info!("Fetched {} for {} time steps", self.coverage_id, times.len());

        Ok(ForecastArray {
            title: self.title.clone(),
            coverage_id: self.coverage_id.clone(),
            bbox,
            times,
            values,
        })
    }

    fn fetch_error(&self, time: DateTime<Utc>, source: WcsError) -> MeteoFranceError {
        MeteoFranceError::Fetch {
            coverage_id: self.coverage_id.to_string(),
            time,
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::product_session::tests::{client, session, PRESSURE};
    use crate::wcs::description::time_steps;
    use chrono::{Duration, TimeZone};

    fn described<'a>(coverage: &CoverageSession<'a>) -> CoverageSession<'a> {
        let begin = Utc.with_ymd_and_hms(2020, 2, 27, 10, 0, 0).unwrap();
        let end = begin + Duration::hours(47);
        CoverageSession {
            description: Some(CoverageDescription {
                max_bbox: BoundingBox {
                    min_lon: -12.0,
                    min_lat: 37.5,
                    max_lon: 16.0,
                    max_lat: 55.4,
                },
                axis_labels: vec!["long".into(), "lat".into(), "time".into()],
                uom_labels: vec![],
                begin,
                end,
                time_steps: time_steps(begin, end, Duration::hours(1)),
            }),
            ..coverage.clone()
        }
    }

    #[test]
    fn test_bbox_requires_description() {
        let client = client();
        let session = session(&client);
        let coverage = session.select_coverage().title(PRESSURE).call().unwrap();
        let err = coverage
            .set_bbox_of_interest(BoundingBox::new(-5.0, 47.0, -1.0, 49.0).unwrap())
            .unwrap_err();
        assert!(matches!(err, MeteoFranceError::NotDescribed(_)));
    }

    #[test]
    fn test_bbox_is_clipped_to_the_domain() {
        let client = client();
        let session = session(&client);
        let coverage = described(&session.select_coverage().title(PRESSURE).call().unwrap());

        let inside = coverage
            .set_bbox_of_interest(BoundingBox::new(-5.0, 47.0, -1.0, 49.0).unwrap())
            .unwrap();
        assert_eq!(
            inside.bbox_of_interest(),
            Some(BoundingBox::new(-5.0, 47.0, -1.0, 49.0).unwrap())
        );
        // The previous session is left as it was.
        assert_eq!(coverage.bbox_of_interest(), None);

        let overlapping = coverage
            .set_bbox_of_interest(BoundingBox::new(10.0, 50.0, 20.0, 60.0).unwrap())
            .unwrap();
        assert_eq!(
            overlapping.bbox_of_interest(),
            Some(BoundingBox::new(10.0, 50.0, 16.0, 55.4).unwrap())
        );
    }

    #[test]
    fn test_bbox_errors() {
        let client = client();
        let session = session(&client);
        let coverage = described(&session.select_coverage().title(PRESSURE).call().unwrap());

        let outside = coverage
            .set_bbox_of_interest(BoundingBox::new(100.0, 10.0, 110.0, 20.0).unwrap())
            .unwrap_err();
        assert!(matches!(outside, MeteoFranceError::OutsideDomain { .. }));

        let inverted = BoundingBox {
            min_lon: 2.0,
            min_lat: 45.0,
            max_lon: 1.0,
            max_lat: 46.0,
        };
        assert!(matches!(
            coverage.set_bbox_of_interest(inverted),
            Err(MeteoFranceError::InvalidBoundingBox(_))
        ));
    }

    #[tokio::test]
    async fn test_create_3d_array_checks_inputs_first() {
        let client = client();
        let session = session(&client);
        let coverage = described(&session.select_coverage().title(PRESSURE).call().unwrap());

        assert!(matches!(
            coverage.create_3d_array().await,
            Err(MeteoFranceError::NoBoundingBox(_))
        ));

        let with_bbox = coverage
            .set_bbox_of_interest(BoundingBox::new(-5.0, 47.0, -1.0, 49.0).unwrap())
            .unwrap();
        assert!(matches!(
            with_bbox.create_3d_array().await,
            Err(MeteoFranceError::NoRequestedSteps(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_steps_are_rejected() {
        let client = client();
        let session = session(&client);
        let coverage = described(&session.select_coverage().title(PRESSURE).call().unwrap())
            .set_bbox_of_interest(BoundingBox::new(-5.0, 47.0, -1.0, 49.0).unwrap())
            .unwrap();
        let steps = coverage.time_steps();
        let requested = coverage.with_requested_steps(vec![steps[1], steps[0], steps[1]]);
        match requested.create_3d_array().await {
            Err(MeteoFranceError::DuplicateRequestedStep { time, .. }) => assert_eq!(time, steps[1]),
            other => panic!("expected a duplicate step error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_out_of_range_horizon_is_unavailable() {
        let client = client();
        let session = session(&client);
        let coverage = session.select_coverage().title(PRESSURE).call().unwrap();
        let now = Utc.with_ymd_and_hms(2020, 2, 27, 10, 23, 0).unwrap();
        let err = coverage.check_run_time_at(u32::MAX, now).await.unwrap_err();
        assert!(matches!(
            err,
            MeteoFranceError::HorizonUnavailable { horizon_hours: u32::MAX, tried: 4, .. }
        ));
    }

    #[test]
    fn test_with_requested_steps() {
        let client = client();
        let session = session(&client);
        let coverage = described(&session.select_coverage().title(PRESSURE).call().unwrap());
        let steps = coverage.time_steps()[..3].to_vec();
        let requested = coverage.with_requested_steps(steps.clone());
        assert_eq!(requested.requested_steps(), steps.as_slice());
        assert!(coverage.requested_steps().is_empty());
    }
}
