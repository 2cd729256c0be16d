use crate::catalog::product::Product;
use crate::catalog::ProductQuery;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Several products match {criteria}: {}", list_products(.candidates))]
    AmbiguousSelection {
        criteria: ProductQuery,
        candidates: Vec<Product>,
    },

    #[error("No product matches {criteria}")]
    NoMatch { criteria: ProductQuery },
}

fn list_products(products: &[Product]) -> String {
    products
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
