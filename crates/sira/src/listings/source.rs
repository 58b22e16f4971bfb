use async_trait::async_trait;
use reqwest::header::ACCEPT;
use tracing::debug;

use super::domain::ListingPage;
use super::query::ListingQuery;
use super::xml::{self, XmlError};
use crate::config::JustimmoConfig;

const LIST_PATH: &str = "/objekt/list";

/// Paginated upstream of listings, ordered by price descending.
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch_page(
        &self,
        query: &ListingQuery,
        offset: usize,
        limit: usize,
    ) -> Result<ListingPage, UpstreamError>;
}

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("listings provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid listings payload: {0}")]
    Payload(#[from] XmlError),
}

/// HTTP client for the JustImmo `objekt/list` endpoint.
#[derive(Clone)]
pub struct JustimmoClient {
    http: reqwest::Client,
    list_url: String,
    username: String,
    password: String,
}

impl JustimmoClient {
    pub fn new(config: &JustimmoConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(http: reqwest::Client, config: &JustimmoConfig) -> Self {
        Self {
            http,
            list_url: format!("{}{LIST_PATH}", config.base_url.trim_end_matches('/')),
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    fn page_params(
        query: &ListingQuery,
        offset: usize,
        limit: usize,
    ) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("picturesize", "uhd".to_string()),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
            ("orderby", "preis".to_string()),
            ("ordertype", "desc".to_string()),
        ];
        params.extend(query.upstream_filters());
        params
    }
}

impl std::fmt::Debug for JustimmoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JustimmoClient")
            .field("list_url", &self.list_url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ListingSource for JustimmoClient {
    async fn fetch_page(
        &self,
        query: &ListingQuery,
        offset: usize,
        limit: usize,
    ) -> Result<ListingPage, UpstreamError> {
        let params = Self::page_params(query, offset, limit);
        debug!(url = %self.list_url, offset, limit, "requesting listings page");

        let response = self
            .http
            .get(&self.list_url)
            .basic_auth(&self.username, Some(&self.password))
            .header(ACCEPT, "application/xml")
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let listings = xml::listings_from_document(&body)?;
        Ok(ListingPage::new(offset, listings))
    }
}
