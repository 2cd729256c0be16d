//! The static table of forecast products served over WCS.

use ordered_float::OrderedFloat;
use std::fmt;

/// Kind of OGC service exposing a product. Only WCS is wrapped by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceType {
    Wcs,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Wcs => "wcs",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One forecast product: a numerical model run over an area at a given grid spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Product {
    /// Model name, e.g. `arome` or `arpege`.
    pub dataset: &'static str,
    /// Covered area, e.g. `france`, `europe` or `world`.
    pub area: &'static str,
    /// Grid spacing in degrees.
    pub accuracy: OrderedFloat<f64>,
    pub service_type: ServiceType,
    /// Endpoint name appended to the API root, after the token.
    pub endpoint: &'static str,
    /// Declared time step of the product, in hours.
    pub time_step_hours: u32,
}

impl Product {
    pub fn time_step(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.time_step_hours))
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{} ({})",
            self.dataset, self.area, self.accuracy, self.service_type
        )
    }
}

/// Every product known to the client.
pub static PRODUCTS: [Product; 4] = [
    Product {
        dataset: "arpege",
        area: "world",
        accuracy: OrderedFloat(0.5),
        service_type: ServiceType::Wcs,
        endpoint: "MF-NWP-GLOBAL-ARPEGE-05-GLOBE-WCS",
        time_step_hours: 1,
    },
    Product {
        dataset: "arpege",
        area: "europe",
        accuracy: OrderedFloat(0.1),
        service_type: ServiceType::Wcs,
        endpoint: "MF-NWP-GLOBAL-ARPEGE-01-EUROPE-WCS",
        time_step_hours: 1,
    },
    Product {
        dataset: "arome",
        area: "france",
        accuracy: OrderedFloat(0.025),
        service_type: ServiceType::Wcs,
        endpoint: "MF-NWP-HIGHRES-AROME-0025-FRANCE-WCS",
        time_step_hours: 1,
    },
    Product {
        dataset: "arome",
        area: "france",
        accuracy: OrderedFloat(0.01),
        service_type: ServiceType::Wcs,
        endpoint: "MF-NWP-HIGHRES-AROME-001-FRANCE-WCS",
        time_step_hours: 1,
    },
];
