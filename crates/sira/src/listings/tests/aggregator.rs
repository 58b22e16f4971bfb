use super::common::*;

use crate::listings::query::{Language, ListingQuery, ListingSort};
use crate::listings::source::UpstreamError;
use crate::listings::ListingAggregator;

#[tokio::test]
async fn drains_two_pages_of_one_hundred_and_fifty() {
    let source = FakeListingSource::with_listings(catalog(150, 480_000.0));
    let aggregator = ListingAggregator::new(source.clone());
    let query = ListingQuery {
        language: Language::En,
        min_price: 200_000.0,
        max_price: 500_000.0,
        ..ListingQuery::default()
    };

    let listings = aggregator.collect(&query).await.expect("aggregation succeeds");

    assert_eq!(listings.len(), 150);
    let requests = source.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].offset, 0);
    assert_eq!(requests[1].offset, 100);
    assert!(requests.iter().all(|request| request.limit == 100));
    assert!(requests.iter().all(|request| request.query == query));
}

#[tokio::test]
async fn empty_first_page_makes_a_single_call() {
    let source = FakeListingSource::with_listings(Vec::new());
    let aggregator = ListingAggregator::new(source.clone());

    let listings = aggregator
        .collect(&ListingQuery::default())
        .await
        .expect("aggregation succeeds");

    assert!(listings.is_empty());
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn exact_multiple_of_page_size_needs_a_trailing_empty_page() {
    let source = FakeListingSource::with_listings(catalog(200, 900_000.0));
    let aggregator = ListingAggregator::new(source.clone());

    let listings = aggregator
        .collect(&ListingQuery::default())
        .await
        .expect("aggregation succeeds");

    assert_eq!(listings.len(), 200);
    assert_eq!(source.calls(), 3);
}

#[tokio::test]
async fn short_page_ends_the_loop() {
    let source = FakeListingSource::with_listings(catalog(250, 900_000.0));
    let aggregator = ListingAggregator::new(source.clone());

    let listings = aggregator
        .collect(&ListingQuery::default())
        .await
        .expect("aggregation succeeds");

    assert_eq!(listings.len(), 250);
    assert_eq!(source.calls(), 3);
}

#[tokio::test]
async fn failure_at_any_offset_discards_collected_pages() {
    let source = FakeListingSource::failing_at(catalog(250, 900_000.0), 200);
    let aggregator = ListingAggregator::new(source.clone());

    let err = aggregator
        .collect(&ListingQuery::default())
        .await
        .expect_err("third page fails");

    assert!(matches!(err, UpstreamError::Status { status: 503, .. }));
    assert_eq!(err.to_string(), "HTTP 503: Service Unavailable");
    assert_eq!(source.calls(), 3);
}

#[tokio::test]
async fn listings_below_minimum_price_are_dropped_locally() {
    let mut listings = catalog(3, 300_000.0);
    listings.push(listing(99, 150_000.0));
    let source = FakeListingSource::with_listings(listings);
    let aggregator = ListingAggregator::new(source);
    let query = ListingQuery {
        min_price: 200_000.0,
        ..ListingQuery::default()
    };

    let listings = aggregator.collect(&query).await.expect("aggregation succeeds");

    assert_eq!(listings.len(), 3);
    assert!(listings
        .iter()
        .all(|listing| listing.effective_price() >= 200_000.0));
}

#[tokio::test]
async fn dropped_listings_do_not_shorten_a_full_page() {
    // A full page where every listing is filtered out must still be followed.
    let mut listings = catalog(100, 50_000.0);
    listings.extend(catalog(1, 10_000.0));
    let source = FakeListingSource::with_listings(listings);
    let aggregator = ListingAggregator::new(source.clone());
    let query = ListingQuery {
        min_price: 1_000_000.0,
        ..ListingQuery::default()
    };

    let listings = aggregator.collect(&query).await.expect("aggregation succeeds");

    assert!(listings.is_empty());
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn collect_sorted_applies_local_order() {
    let source = FakeListingSource::with_listings(catalog(5, 500_000.0));
    let aggregator = ListingAggregator::new(source);
    let query = ListingQuery {
        sort: Some(ListingSort::PriceAsc),
        ..ListingQuery::default()
    };

    let listings = aggregator
        .collect_sorted(&query)
        .await
        .expect("aggregation succeeds");

    let prices: Vec<f64> = listings.iter().map(|l| l.effective_price()).collect();
    assert_eq!(
        prices,
        vec![499_600.0, 499_700.0, 499_800.0, 499_900.0, 500_000.0]
    );
}
