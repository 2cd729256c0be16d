//! Provides [`ProductSession`], the state of a client once a product is selected.

use crate::catalog::product::Product;
use crate::error::MeteoFranceError;
use crate::meteofrance::MeteoFrance;
use crate::session::coverage_session::CoverageSession;
use crate::types::coverage_id::CoverageId;
use crate::types::run_time::RunTime;
use crate::types::vertical_level::VerticalLevel;
use crate::wcs::capabilities::Capabilities;
use bon::bon;
use log::info;

/// A selected product together with the coverages it currently publishes.
///
/// Obtained from [`MeteoFrance::select_product`]. Sessions are immutable:
/// [`ProductSession::update`] and [`ProductSession::select_coverage`] return new
/// values and leave `self` untouched, also on failure.
#[derive(Debug, Clone)]
pub struct ProductSession<'a> {
    client: &'a MeteoFrance,
    product: &'static Product,
    capabilities: Capabilities,
}

#[bon]
impl<'a> ProductSession<'a> {
    pub(crate) fn new(
        client: &'a MeteoFrance,
        product: &'static Product,
        capabilities: Capabilities,
    ) -> Self {
        Self {
            client,
            product,
            capabilities,
        }
    }

    pub fn client(&self) -> &'a MeteoFrance {
        self.client
    }

    pub fn product(&self) -> &'static Product {
        self.product
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Titles of the fields published on the product's own time step, sorted.
    /// Accumulated fields (3-hourly, daily, ...) are not listed.
    pub fn list_titles(&self) -> Result<Vec<String>, MeteoFranceError> {
        Ok(self.capabilities.titles()?)
    }

    /// Run-times published for `title`, oldest first.
    ///
    /// # Errors
    ///
    /// [`MeteoFranceError::UnknownTitle`] if the product does not publish `title`.
    pub fn list_available_run_times(&self, title: &str) -> Result<Vec<RunTime>, MeteoFranceError> {
        let run_times = self.capabilities.run_times(title)?;
        if run_times.is_empty() {
            return Err(MeteoFranceError::UnknownTitle(title.to_string()));
        }
        Ok(run_times)
    }

    /// Fetches the capabilities again, typically to pick up newer run-times.
    pub async fn update(&self) -> Result<ProductSession<'a>, MeteoFranceError> {
        let capabilities = self.client.get_capabilities(self.product).await?;
        Ok(Self::new(self.client, self.product, capabilities))
    }

    /// Selects the coverage of `title` for one run-time.
    ///
    /// Without `.run_time(..)` the most recent run-time of that title is used.
    /// Titles "at specified height level above ground" are sliced at 2 m unless
    /// `.vertical_level(..)` says otherwise. Finish with `.call()`.
    ///
    /// # Errors
    ///
    /// [`MeteoFranceError::UnknownTitle`] if the title is not published,
    /// [`MeteoFranceError::UnknownRunTime`] if an explicit run-time is not
    /// available for it.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use meteofrance_wcs::{MeteoFrance, MeteoFranceError, RunTime};
    /// # async fn run(client: &MeteoFrance) -> Result<(), MeteoFranceError> {
    /// let arpege = client.select_product().dataset("arpege").area("world").call().await?;
    /// let coverage = arpege
    ///     .select_coverage()
    ///     .title("Pressure at ground or water surface")
    ///     .run_time("2020-02-27T09".parse::<RunTime>()?)
    ///     .call()?;
    /// println!("{}", coverage.coverage_id());
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub fn select_coverage(
        &self,
        #[builder(into)] title: String,
        run_time: Option<RunTime>,
        vertical_level: Option<VerticalLevel>,
    ) -> Result<CoverageSession<'a>, MeteoFranceError> {
        let run_times = self.list_available_run_times(&title)?;
        let run_time = match run_time {
            Some(requested) if run_times.contains(&requested) => requested,
            Some(requested) => {
                return Err(MeteoFranceError::UnknownRunTime {
                    title,
                    run_time: requested,
                })
            }
            None => *run_times
                .last()
                .ok_or_else(|| MeteoFranceError::UnknownTitle(title.clone()))?,
        };
        let coverage_id = self.coverage_id(&title, run_time)?;
        let vertical_level = vertical_level.or_else(|| VerticalLevel::default_for_title(&title));
        info!("Selected coverage {}", coverage_id);

        Ok(CoverageSession::new(
            self.clone(),
            title,
            run_time,
            coverage_id,
            vertical_level,
        ))
    }
}

impl ProductSession<'_> {
    /// Identifier of `title` for `run_time`, built from the variable name the
    /// service uses for that title.
    pub fn coverage_id(&self, title: &str, run_time: RunTime) -> Result<CoverageId, MeteoFranceError> {
        let variable = self
            .capabilities
            .variable(title)?
            .ok_or_else(|| MeteoFranceError::UnknownTitle(title.to_string()))?;
        Ok(CoverageId::compose(&variable, run_time))
    }
}
