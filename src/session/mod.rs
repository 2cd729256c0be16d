//! Immutable session values threaded through the workflow: a product session
//! per selected product, and a coverage session per selected coverage.

pub mod coverage_session;
pub mod horizon;
pub mod product_session;
