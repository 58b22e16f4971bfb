//! Backend for the SIRA real-estate site: aggregated JustImmo listings and the
//! contact form relay.

pub mod config;
pub mod contact;
pub mod error;
pub mod listings;
pub mod telemetry;

pub use error::AppError;
