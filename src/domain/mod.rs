//! Ports to the external collaborators the research tools depend on
//!
//! The scraping, search and browsing backends live behind these traits so the
//! tools (and their tests) only see a narrow async contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agents::error::BackendResult;

/// A single web search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: Option<String>,
    pub link: Option<String>,
    pub snippet: Option<String>,
    #[serde(rename = "displayLink")]
    pub display_link: Option<String>,
}

/// Results of a web search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    #[serde(rename = "totalResults")]
    pub total_results: Option<String>,
    pub results: Vec<SearchHit>,
}

/// A fetched web page reduced to text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebPage {
    pub url: String,
    pub status_code: u16,
    pub html: String,
    pub text: String,
    pub title: Option<String>,
}

/// LinkedIn data source (profiles, companies and their activity)
#[async_trait]
pub trait LinkedInPort: Send + Sync {
    async fn profile(&self, profile_url: &str) -> BackendResult<Value>;

    async fn profile_posts(&self, profile_url: &str, max_posts: u32) -> BackendResult<Vec<Value>>;

    async fn profile_reactions(
        &self,
        profile_url: &str,
        max_reactions: u32,
    ) -> BackendResult<Vec<Value>>;

    async fn company(&self, company_url: &str) -> BackendResult<Value>;

    async fn company_posts(&self, company_url: &str, max_posts: u32) -> BackendResult<Vec<Value>>;
}

/// Web search engine
#[async_trait]
pub trait SearchPort: Send + Sync {
    async fn search(&self, query: &str, num_results: u32) -> BackendResult<SearchResults>;
}

/// Page fetcher
#[async_trait]
pub trait BrowsePort: Send + Sync {
    async fn fetch(&self, url: &str) -> BackendResult<WebPage>;
}
