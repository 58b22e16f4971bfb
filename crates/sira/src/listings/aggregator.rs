use std::sync::Arc;

use tracing::{debug, info};

use super::domain::{Listing, PAGE_SIZE};
use super::query::ListingQuery;
use super::source::{ListingSource, UpstreamError};

/// Drains a paginated [`ListingSource`] into one collection per request.
///
/// Pages are fetched one after another starting at offset 0. The loop stops on
/// an empty page or on the first page shorter than the page size. A failure at
/// any offset discards everything collected so far.
pub struct ListingAggregator<S> {
    source: Arc<S>,
    page_size: usize,
}

impl<S> ListingAggregator<S>
where
    S: ListingSource + 'static,
{
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            page_size: PAGE_SIZE,
        }
    }

    /// Collects every listing matching `query`, in upstream order.
    pub async fn collect(&self, query: &ListingQuery) -> Result<Vec<Listing>, UpstreamError> {
        let mut collected = Vec::new();
        let mut offset = 0;

        loop {
            let page = self
                .source
                .fetch_page(query, offset, self.page_size)
                .await?;

            if page.is_empty() {
                debug!(offset, "listings provider returned an empty page");
                break;
            }

            let received = page.len();
            collected.extend(page.listings.into_iter().filter(|listing| {
                let admitted = query.admits_price(listing);
                if !admitted {
                    debug!(
                        id = %listing.id,
                        price = listing.effective_price(),
                        min_price = query.min_price,
                        "dropping listing below minimum price"
                    );
                }
                admitted
            }));

            debug!(offset, received, "listings page received");

            if received < self.page_size {
                break;
            }
            offset += self.page_size;
        }

        info!(total = collected.len(), "listings aggregated");
        Ok(collected)
    }

    /// Runs [`collect`](Self::collect) and applies the query's local sort, if any.
    pub async fn collect_sorted(
        &self,
        query: &ListingQuery,
    ) -> Result<Vec<Listing>, UpstreamError> {
        let mut listings = self.collect(query).await?;
        if let Some(sort) = query.sort {
            sort.apply(&mut listings);
        }
        Ok(listings)
    }
}
