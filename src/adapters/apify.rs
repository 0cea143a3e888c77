//! LinkedIn data through Apify actors
//!
//! Each lookup is one synchronous actor run
//! (`run-sync-get-dataset-items`) whose dataset items are returned directly.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::agents::error::{BackendError, BackendResult};
use crate::domain::LinkedInPort;

const DEFAULT_BASE_URL: &str = "https://api.apify.com/v2";

/// Actor ids used for each kind of lookup
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApifyActors {
    #[serde(default = "default_profile_detail")]
    pub profile_detail: String,
    #[serde(default = "default_profile_posts")]
    pub profile_posts: String,
    #[serde(default = "default_profile_reactions")]
    pub profile_reactions: String,
    #[serde(default = "default_company_detail")]
    pub company_detail: String,
    #[serde(default = "default_company_posts")]
    pub company_posts: String,
}

impl Default for ApifyActors {
    fn default() -> Self {
        Self {
            profile_detail: default_profile_detail(),
            profile_posts: default_profile_posts(),
            profile_reactions: default_profile_reactions(),
            company_detail: default_company_detail(),
            company_posts: default_company_posts(),
        }
    }
}

fn default_profile_detail() -> String {
    "apimaestro/linkedin-profile-detail".to_string()
}

fn default_profile_posts() -> String {
    "apimaestro/linkedin-profile-posts".to_string()
}

fn default_profile_reactions() -> String {
    "apimaestro/linkedin-profile-reactions".to_string()
}

fn default_company_detail() -> String {
    "apimaestro/linkedin-company-detail".to_string()
}

fn default_company_posts() -> String {
    "apimaestro/linkedin-company-posts".to_string()
}

/// [`LinkedInPort`] backed by the Apify REST API
pub struct ApifyLinkedInClient {
    client: Client,
    token: String,
    base_url: String,
    actors: ApifyActors,
    profile_slug: Regex,
    company_slug: Regex,
}

impl ApifyLinkedInClient {
    pub fn new(token: impl Into<String>, actors: ApifyActors, timeout: Duration) -> BackendResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Request(e.to_string()))?;

        Ok(Self {
            client,
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            actors,
            profile_slug: slug_pattern(r"/(?:in|company)/([^/?]+?)(?:/|$|\?|#)")?,
            company_slug: slug_pattern(r"/company/([^/?]+?)(?:/|$|\?|#)")?,
        })
    }

    /// Point the client at another API root (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Run an actor synchronously and return its dataset items
    async fn run_actor(&self, actor_id: &str, input: Value, limit: u32) -> BackendResult<Vec<Value>> {
        let url = format!(
            "{}/acts/{}/run-sync-get-dataset-items",
            self.base_url,
            actor_id.replace('/', "~")
        );
        debug!(actor = %actor_id, limit, "running apify actor");

        let response = self
            .client
            .post(&url)
            .query(&[("token", self.token.as_str())])
            .query(&[("limit", limit)])
            .json(&input)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(actor = %actor_id, status = status.as_u16(), "apify actor run failed");
            return Err(BackendError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let items: Vec<Value> = response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        Ok(items.into_iter().take(limit as usize).collect())
    }

    fn profile_input(&self, profile_url: &str) -> Value {
        json!({
            "profileUrl": profile_url,
            "username": extract_slug(&self.profile_slug, profile_url),
        })
    }

    fn company_input(&self, company_url: &str) -> Value {
        json!({
            "companyUrl": company_url,
            "companyName": extract_slug(&self.company_slug, company_url),
        })
    }
}

fn slug_pattern(pattern: &str) -> BackendResult<Regex> {
    Regex::new(pattern).map_err(|e| BackendError::Parse(e.to_string()))
}

/// Username or company slug from a LinkedIn URL, else its last path segment
fn extract_slug(pattern: &Regex, url: &str) -> String {
    pattern
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
        .or_else(|| url.rsplit('/').next())
        .unwrap_or(url)
        .to_string()
}

fn with_limit(mut input: Value, limit: u32) -> Value {
    input["limit"] = json!(limit);
    input
}

#[async_trait]
impl LinkedInPort for ApifyLinkedInClient {
    async fn profile(&self, profile_url: &str) -> BackendResult<Value> {
        let items = self
            .run_actor(&self.actors.profile_detail, self.profile_input(profile_url), 1)
            .await?;
        Ok(items.into_iter().next().unwrap_or(Value::Null))
    }

    async fn profile_posts(&self, profile_url: &str, max_posts: u32) -> BackendResult<Vec<Value>> {
        let input = with_limit(self.profile_input(profile_url), max_posts);
        self.run_actor(&self.actors.profile_posts, input, max_posts).await
    }

    async fn profile_reactions(
        &self,
        profile_url: &str,
        max_reactions: u32,
    ) -> BackendResult<Vec<Value>> {
        let input = with_limit(self.profile_input(profile_url), max_reactions);
        self.run_actor(&self.actors.profile_reactions, input, max_reactions).await
    }

    async fn company(&self, company_url: &str) -> BackendResult<Value> {
        let items = self
            .run_actor(&self.actors.company_detail, self.company_input(company_url), 1)
            .await?;
        Ok(items.into_iter().next().unwrap_or(Value::Null))
    }

    async fn company_posts(&self, company_url: &str, max_posts: u32) -> BackendResult<Vec<Value>> {
        let input = with_limit(self.company_input(company_url), max_posts);
        self.run_actor(&self.actors.company_posts, input, max_posts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApifyLinkedInClient {
        ApifyLinkedInClient::new("token", ApifyActors::default(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_profile_slug_extraction() {
        let client = client();
        let slug = |url: &str| extract_slug(&client.profile_slug, url);

        assert_eq!(slug("https://www.linkedin.com/in/jane-doe/"), "jane-doe");
        assert_eq!(slug("https://www.linkedin.com/in/jane-doe"), "jane-doe");
        assert_eq!(slug("https://www.linkedin.com/in/jane-doe?trk=feed"), "jane-doe");
        assert_eq!(slug("https://www.linkedin.com/company/northwind/about"), "northwind");
        assert_eq!(slug("jane-doe"), "jane-doe");
    }

    #[test]
    fn test_company_slug_ignores_profile_urls() {
        let client = client();
        assert_eq!(
            extract_slug(&client.company_slug, "https://www.linkedin.com/company/northwind/"),
            "northwind"
        );
        assert_eq!(
            extract_slug(&client.company_slug, "https://www.linkedin.com/in/jane-doe"),
            "jane-doe"
        );
    }

    #[test]
    fn test_inputs_carry_url_and_slug() {
        let client = client();
        assert_eq!(
            with_limit(client.profile_input("https://www.linkedin.com/in/jane-doe/"), 5),
            json!({
                "profileUrl": "https://www.linkedin.com/in/jane-doe/",
                "username": "jane-doe",
                "limit": 5
            })
        );
        assert_eq!(
            client.company_input("https://www.linkedin.com/company/northwind"),
            json!({
                "companyUrl": "https://www.linkedin.com/company/northwind",
                "companyName": "northwind"
            })
        );
    }
}
