//! Narrows the static product table down to a single product.
//!
//! The table is treated as a small relation with a uniqueness constraint on the
//! result: every supplied criterion is an equality filter, unsupplied criteria
//! match everything, and the selection only succeeds if exactly one row is left.

pub mod error;
pub mod product;

use crate::catalog::error::CatalogError;
use crate::catalog::product::{Product, ServiceType, PRODUCTS};
use ordered_float::OrderedFloat;
use std::fmt;

/// Partial criteria for picking a product. `None` fields are not filtered on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    pub dataset: Option<String>,
    pub area: Option<String>,
    pub accuracy: Option<f64>,
}

impl ProductQuery {
    fn matches(&self, product: &Product) -> bool {
        product.service_type == ServiceType::Wcs
            && self
                .dataset
                .as_deref()
                .map_or(true, |d| product.dataset.eq_ignore_ascii_case(d.trim()))
            && self
                .area
                .as_deref()
                .map_or(true, |a| product.area.eq_ignore_ascii_case(a.trim()))
            && self
                .accuracy
                .map_or(true, |acc| product.accuracy == OrderedFloat(acc))
    }
}

impl fmt::Display for ProductQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(dataset) = &self.dataset {
            parts.push(format!("dataset={dataset}"));
        }
        if let Some(area) = &self.area {
            parts.push(format!("area={area}"));
        }
        if let Some(accuracy) = self.accuracy {
            parts.push(format!("accuracy={accuracy}"));
        }
        if parts.is_empty() {
            write!(f, "(no criteria)")
        } else {
            write!(f, "({})", parts.join(", "))
        }
    }
}

/// Selects exactly one product of `catalog` matching `query`.
///
/// # Errors
///
/// [`CatalogError::AmbiguousSelection`] lists every candidate when more than one
/// row matches, [`CatalogError::NoMatch`] is returned when none does.
pub fn select_from<'c>(
    catalog: &'c [Product],
    query: &ProductQuery,
) -> Result<&'c Product, CatalogError> {
    let candidates: Vec<&Product> = catalog.iter().filter(|p| query.matches(p)).collect();
    match candidates.as_slice() {
        [single] => Ok(*single),
        [] => Err(CatalogError::NoMatch {
            criteria: query.clone(),
        }),
        many => Err(CatalogError::AmbiguousSelection {
            criteria: query.clone(),
            candidates: many.iter().map(|p| **p).collect(),
        }),
    }
}

/// Selects exactly one product of the built-in [`PRODUCTS`] table.
pub fn select(query: &ProductQuery) -> Result<&'static Product, CatalogError> {
    select_from(&PRODUCTS, query)
}
