use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;
use tracing::warn;

use super::aggregator::ListingAggregator;
use super::catalog::{self, CatalogStats};
use super::query::{Language, ListingParams, ListingQuery, PageWindow, QueryError};
use super::source::{ListingSource, UpstreamError};

/// Router exposing the aggregated listings and the catalog views built on top.
pub fn listings_router<S>(aggregator: Arc<ListingAggregator<S>>) -> Router
where
    S: ListingSource + 'static,
{
    Router::new()
        .route("/justimmo", get(aggregate_handler::<S>))
        .route("/api/justimmo", get(aggregate_handler::<S>))
        .route("/api/immobilien", get(catalog_handler::<S>))
        .route("/api/immobilien/stats", get(stats_handler::<S>))
        .route("/api/immobilien/map", get(map_handler::<S>))
        .route("/api/immobilien/:id", get(detail_handler::<S>))
        .with_state(aggregator)
}

fn query_rejected(error: QueryError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
}

fn upstream_failed(error: UpstreamError) -> Response {
    warn!(error = %error, "listings aggregation failed");
    let payload = json!({
        "error": error.to_string(),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}

pub(crate) async fn aggregate_handler<S>(
    State(aggregator): State<Arc<ListingAggregator<S>>>,
    Query(params): Query<ListingParams>,
) -> Response
where
    S: ListingSource + 'static,
{
    let query = match ListingQuery::from_params(&params) {
        Ok(query) => query,
        Err(error) => return query_rejected(error),
    };

    match aggregator.collect_sorted(&query).await {
        Ok(listings) => (StatusCode::OK, axum::Json(listings)).into_response(),
        Err(error) => upstream_failed(error),
    }
}

pub(crate) async fn catalog_handler<S>(
    State(aggregator): State<Arc<ListingAggregator<S>>>,
    Query(params): Query<ListingParams>,
) -> Response
where
    S: ListingSource + 'static,
{
    let (query, window) = match ListingQuery::from_params(&params)
        .and_then(|query| Ok((query, PageWindow::from_params(&params)?)))
    {
        Ok(parsed) => parsed,
        Err(error) => return query_rejected(error),
    };

    match aggregator.collect_sorted(&query).await {
        Ok(listings) => {
            let (data, pagination) = catalog::paginate(listings, window);
            let payload = json!({
                "data": data,
                "pagination": pagination,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => upstream_failed(error),
    }
}

pub(crate) async fn stats_handler<S>(
    State(aggregator): State<Arc<ListingAggregator<S>>>,
    Query(params): Query<ListingParams>,
) -> Response
where
    S: ListingSource + 'static,
{
    let query = match ListingQuery::from_params(&params) {
        Ok(query) => query,
        Err(error) => return query_rejected(error),
    };

    match aggregator.collect(&query).await {
        Ok(listings) => {
            let payload = json!({
                "data": CatalogStats::from_listings(&listings),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => upstream_failed(error),
    }
}

pub(crate) async fn map_handler<S>(
    State(aggregator): State<Arc<ListingAggregator<S>>>,
    Query(params): Query<ListingParams>,
) -> Response
where
    S: ListingSource + 'static,
{
    let query = match ListingQuery::from_params(&params) {
        Ok(query) => query,
        Err(error) => return query_rejected(error),
    };

    match aggregator.collect(&query).await {
        Ok(listings) => {
            let payload = json!({
                "data": catalog::map_markers(&listings),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => upstream_failed(error),
    }
}

pub(crate) async fn detail_handler<S>(
    State(aggregator): State<Arc<ListingAggregator<S>>>,
    Path(id): Path<String>,
    Query(params): Query<ListingParams>,
) -> Response
where
    S: ListingSource + 'static,
{
    let query = ListingQuery {
        language: Language::from_param(params.lang.as_deref()),
        ..ListingQuery::default()
    };

    match aggregator.collect(&query).await {
        Ok(listings) => match catalog::find_listing(listings, &id) {
            Some(listing) => {
                let payload = json!({
                    "data": listing,
                });
                (StatusCode::OK, axum::Json(payload)).into_response()
            }
            None => {
                let payload = json!({
                    "error": format!("listing {id} not found"),
                });
                (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
            }
        },
        Err(error) => upstream_failed(error),
    }
}
