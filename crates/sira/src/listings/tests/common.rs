use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::to_bytes;
use axum::response::Response;
use serde_json::{json, Value};

use crate::listings::domain::{Listing, ListingPage};
use crate::listings::query::ListingQuery;
use crate::listings::source::{ListingSource, UpstreamError};

pub(super) fn listing(id: usize, price: f64) -> Listing {
    serde_json::from_value(json!({
        "id": format!("obj-{id}"),
        "titel": format!("Objekt {id}"),
        "vermarktungsart": "KAUF",
        "kaufpreis": price.to_string(),
        "wohnflaeche": "75",
        "plz": "1010",
    }))
    .expect("listing parses")
}

/// `count` listings priced descending from `top`.
pub(super) fn catalog(count: usize, top: f64) -> Vec<Listing> {
    (0..count)
        .map(|index| listing(index, top - index as f64 * 100.0))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct PageRequest {
    pub(super) offset: usize,
    pub(super) limit: usize,
    pub(super) query: ListingQuery,
}

/// Serves a fixed catalog page by page and records every request.
#[derive(Default)]
pub(super) struct FakeListingSource {
    listings: Vec<Listing>,
    fail_at: Option<usize>,
    requests: Mutex<Vec<PageRequest>>,
}

impl FakeListingSource {
    pub(super) fn with_listings(listings: Vec<Listing>) -> Arc<Self> {
        Arc::new(Self {
            listings,
            ..Self::default()
        })
    }

    pub(super) fn failing_at(listings: Vec<Listing>, offset: usize) -> Arc<Self> {
        Arc::new(Self {
            listings,
            fail_at: Some(offset),
            ..Self::default()
        })
    }

    pub(super) fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().expect("request log poisoned").clone()
    }

    pub(super) fn calls(&self) -> usize {
        self.requests().len()
    }
}

#[async_trait]
impl ListingSource for FakeListingSource {
    async fn fetch_page(
        &self,
        query: &ListingQuery,
        offset: usize,
        limit: usize,
    ) -> Result<ListingPage, UpstreamError> {
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(PageRequest {
                offset,
                limit,
                query: query.clone(),
            });

        if self.fail_at == Some(offset) {
            return Err(UpstreamError::Status {
                status: 503,
                body: "Service Unavailable".to_string(),
            });
        }

        let page = self
            .listings
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok(ListingPage::new(offset, page))
    }
}

pub(super) async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}
