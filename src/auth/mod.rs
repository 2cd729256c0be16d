//! Access tokens for the Météo-France API, and the credentials they are issued for.

pub mod credentials;
pub mod error;
pub mod token;
