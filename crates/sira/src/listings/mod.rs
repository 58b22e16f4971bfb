//! Listings aggregation over the JustImmo API and the catalog views built on it.
//!
//! Every request drains the provider from offset 0. Nothing is cached between
//! requests.

pub mod aggregator;
pub mod catalog;
pub mod domain;
pub mod query;
pub mod router;
pub mod source;
pub mod xml;

#[cfg(test)]
mod tests;

pub use aggregator::ListingAggregator;
pub use catalog::{map_markers, paginate, CatalogStats, MapMarker, Pagination};
pub use domain::{ImageGroup, Listing, ListingImage, ListingPage, MarketingType, PAGE_SIZE};
pub use query::{Language, ListingParams, ListingQuery, ListingSort, PageWindow, QueryError};
pub use router::listings_router;
pub use source::{JustimmoClient, ListingSource, UpstreamError};
pub use xml::XmlError;
