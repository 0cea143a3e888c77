//! Google Custom Search JSON API client

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::agents::error::{BackendError, BackendResult};
use crate::domain::{SearchHit, SearchPort, SearchResults};

const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// The API never returns more than this many items per request
const MAX_NUM: u32 = 10;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Option<Vec<SearchHit>>,
    #[serde(rename = "searchInformation")]
    search_information: Option<SearchInformation>,
}

#[derive(Debug, Deserialize)]
struct SearchInformation {
    #[serde(rename = "totalResults")]
    total_results: Option<String>,
}

/// [`SearchPort`] backed by a programmable search engine
pub struct GoogleSearchClient {
    client: Client,
    api_key: String,
    engine_id: String,
    endpoint: String,
}

impl GoogleSearchClient {
    pub fn new(
        api_key: impl Into<String>,
        engine_id: impl Into<String>,
        timeout: Duration,
    ) -> BackendResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Request(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            engine_id: engine_id.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SearchPort for GoogleSearchClient {
    async fn search(&self, query: &str, num_results: u32) -> BackendResult<SearchResults> {
        let num = num_results.min(MAX_NUM);
        debug!(query = %query, num, "google search");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
            ])
            .query(&[("num", num)])
            .send()
            .await?
            .error_for_status()?;

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        let Some(items) = body.items else {
            return Err(BackendError::Empty("No search results found".to_string()));
        };

        Ok(SearchResults {
            query: query.to_string(),
            total_results: body.search_information.and_then(|info| info.total_results),
            results: items,
        })
    }
}
