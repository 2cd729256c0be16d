//! Low-level access to the OGC Web Coverage Service: requests, XML replies and
//! GeoTIFF payloads.

pub mod capabilities;
pub mod description;
pub mod error;
pub mod loader;
pub mod raster;
pub mod request;
pub(crate) mod xml;
