use anyhow::Context;
use async_trait::async_trait;
use reqwest::Url;

use crate::config::Config;
use crate::data_models::{OutputRecordData, SearchResponse};
use crate::error::SearchError;
use crate::mapper::to_record_data;

pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Pages past the first are never requested.
const OFFSET: &str = "0";

/// Anything that can turn an entity name into a list of matching pages.
#[async_trait]
pub trait EntitySearch: Send + Sync {
    async fn search_entity(&self, entity_name: &str) -> Result<OutputRecordData, SearchError>;
}

/// Builds the outbound search URI for `entity_name`. Every parameter goes
/// through query encoding, so names containing `&`, `#` or spaces stay
/// inside `q`.
pub fn build_query(config: &Config, entity_name: &str) -> Result<Url, SearchError> {
    let q = if config.query_suffix.is_empty() {
        entity_name.to_string()
    } else {
        format!("{} {}", entity_name, config.query_suffix)
    };
    let count = config.result_count.to_string();

    Url::parse_with_params(
        &config.endpoint,
        [
            ("q", q.as_str()),
            ("customconfig", config.custom_config_id.as_str()),
            ("mkt", config.market.as_str()),
            ("count", count.as_str()),
            ("offset", OFFSET),
            ("safesearch", config.safe_search.as_str()),
        ],
    )
    .map_err(|e| SearchError::InvalidEndpoint(format!("{}: {}", config.endpoint, e)))
}

/// Decodes a search response body. An empty or `null` body and an envelope
/// without `webPages.value` are errors, not empty results.
pub fn parse_search_response(body: &str) -> Result<OutputRecordData, SearchError> {
    if body.trim().is_empty() {
        return Err(SearchError::EmptyBody);
    }
    let response: Option<SearchResponse> = serde_json::from_str(body)?;
    let response = response.ok_or(SearchError::EmptyBody)?;
    let web_pages = response.web_pages.ok_or(SearchError::MissingWebPages)?;
    let hits = web_pages.value.ok_or(SearchError::MissingHits)?;

    tracing::debug!(
        hits = hits.len(),
        total_estimated_matches = ?web_pages.total_estimated_matches,
        "decoded search response"
    );
    Ok(to_record_data(Some(hits.as_slice())))
}

pub struct SearchClient {
    client: reqwest::Client,
    config: Config,
}

impl SearchClient {
    pub fn new(config: Config) -> anyhow::Result<SearchClient> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build search HTTP client")?;
        Ok(SearchClient { client, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[async_trait]
impl EntitySearch for SearchClient {
    async fn search_entity(&self, entity_name: &str) -> Result<OutputRecordData, SearchError> {
        let uri = build_query(&self.config, entity_name)?;
        tracing::debug!(entity = entity_name, "querying custom search");

        let res = self
            .client
            .get(uri)
            .header(SUBSCRIPTION_KEY_HEADER, &self.config.subscription_key)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(SearchError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        parse_search_response(&body)
    }
}
