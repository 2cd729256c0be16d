//! Turns a [`crate::ForecastArray`] into an animated GIF.

pub mod color_scale;
pub mod error;
pub mod movie;
