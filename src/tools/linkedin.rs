//! LinkedIn data tools

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{ResearchTool, ToolResult};
use crate::agents::error::BackendResult;
use crate::domain::LinkedInPort;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ProfileArgs {
    /// The LinkedIn profile URL to fetch data from
    pub profile_url: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ProfilePostsArgs {
    /// The LinkedIn profile URL to fetch posts from
    pub profile_url: String,
    /// Maximum number of posts to retrieve (default: 5)
    #[serde(default = "default_profile_posts")]
    pub max_posts: u32,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ProfileReactionsArgs {
    /// The LinkedIn profile URL to fetch reactions from
    pub profile_url: String,
    /// Maximum number of reactions to retrieve (default: 15)
    #[serde(default = "default_reactions")]
    pub max_reactions: u32,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CompanyArgs {
    /// The LinkedIn company URL to fetch details from
    pub company_url: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CompanyPostsArgs {
    /// The LinkedIn company URL to fetch posts from
    pub company_url: String,
    /// Maximum number of posts to retrieve (default: 6)
    #[serde(default = "default_company_posts")]
    pub max_posts: u32,
}

fn default_profile_posts() -> u32 {
    5
}

fn default_reactions() -> u32 {
    15
}

fn default_company_posts() -> u32 {
    6
}

/// Turn a backend answer into a tool result, keeping the input URL on failure
fn envelope<T: Into<Value>>(
    outcome: BackendResult<T>,
    failure: &str,
    url_key: &str,
    url: &str,
) -> ToolResult {
    match outcome {
        Ok(payload) => {
            let payload = payload.into();
            let empty = match &payload {
                Value::Null => true,
                Value::Array(items) => items.is_empty(),
                Value::Object(map) => map.is_empty(),
                _ => false,
            };
            if empty {
                ToolResult::error(failure, [(url_key, json!(url))])
            } else {
                ToolResult::success(payload)
            }
        }
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "{}", failure);
            ToolResult::error(failure, [(url_key, json!(url)), ("reason", json!(e.to_string()))])
        }
    }
}

pub struct GetLinkedInProfileData {
    linkedin: Arc<dyn LinkedInPort>,
}

impl GetLinkedInProfileData {
    pub fn new(linkedin: Arc<dyn LinkedInPort>) -> Self {
        Self { linkedin }
    }
}

#[async_trait]
impl ResearchTool for GetLinkedInProfileData {
    type Args = ProfileArgs;

    fn name(&self) -> &'static str {
        "get_linkedin_profile_data"
    }

    fn description(&self) -> &'static str {
        "Fetch detailed profile information from a LinkedIn profile URL. Returns comprehensive \
         profile data including work experience, education, skills, and more."
    }

    async fn call(&self, args: ProfileArgs) -> ToolResult {
        let outcome = self.linkedin.profile(&args.profile_url).await;
        envelope(outcome, "Failed to fetch LinkedIn profile data", "profile_url", &args.profile_url)
    }
}

pub struct GetLinkedInProfilePosts {
    linkedin: Arc<dyn LinkedInPort>,
}

impl GetLinkedInProfilePosts {
    pub fn new(linkedin: Arc<dyn LinkedInPort>) -> Self {
        Self { linkedin }
    }
}

#[async_trait]
impl ResearchTool for GetLinkedInProfilePosts {
    type Args = ProfilePostsArgs;

    fn name(&self) -> &'static str {
        "get_linkedin_profile_posts"
    }

    fn description(&self) -> &'static str {
        "Fetch recent posts from a LinkedIn profile URL. Returns post content, engagement \
         metrics, and timestamps. Useful for evaluating prospect intent and activity."
    }

    async fn call(&self, args: ProfilePostsArgs) -> ToolResult {
        let outcome = self.linkedin.profile_posts(&args.profile_url, args.max_posts).await;
        envelope(outcome, "Failed to fetch LinkedIn profile posts", "profile_url", &args.profile_url)
    }
}

pub struct GetLinkedInProfileReactions {
    linkedin: Arc<dyn LinkedInPort>,
}

impl GetLinkedInProfileReactions {
    pub fn new(linkedin: Arc<dyn LinkedInPort>) -> Self {
        Self { linkedin }
    }
}

#[async_trait]
impl ResearchTool for GetLinkedInProfileReactions {
    type Args = ProfileReactionsArgs;

    fn name(&self) -> &'static str {
        "get_linkedin_profile_reactions"
    }

    fn description(&self) -> &'static str {
        "Fetch recent reactions/engagement from a LinkedIn profile URL. Shows what posts the \
         person has reacted to, revealing their interests and intent signals."
    }

    async fn call(&self, args: ProfileReactionsArgs) -> ToolResult {
        let outcome = self
            .linkedin
            .profile_reactions(&args.profile_url, args.max_reactions)
            .await;
        envelope(outcome, "Failed to fetch LinkedIn profile reactions", "profile_url", &args.profile_url)
    }
}

pub struct GetLinkedInCompanyDetails {
    linkedin: Arc<dyn LinkedInPort>,
}

impl GetLinkedInCompanyDetails {
    pub fn new(linkedin: Arc<dyn LinkedInPort>) -> Self {
        Self { linkedin }
    }
}

#[async_trait]
impl ResearchTool for GetLinkedInCompanyDetails {
    type Args = CompanyArgs;

    fn name(&self) -> &'static str {
        "get_linkedin_company_details"
    }

    fn description(&self) -> &'static str {
        "Fetch detailed information from a LinkedIn company page URL. Returns comprehensive \
         company data including description, employee count, industry, location, and more."
    }

    async fn call(&self, args: CompanyArgs) -> ToolResult {
        let outcome = self.linkedin.company(&args.company_url).await;
        envelope(outcome, "Failed to fetch LinkedIn company details", "company_url", &args.company_url)
    }
}

pub struct GetLinkedInCompanyPosts {
    linkedin: Arc<dyn LinkedInPort>,
}

impl GetLinkedInCompanyPosts {
    pub fn new(linkedin: Arc<dyn LinkedInPort>) -> Self {
        Self { linkedin }
    }
}

#[async_trait]
impl ResearchTool for GetLinkedInCompanyPosts {
    type Args = CompanyPostsArgs;

    fn name(&self) -> &'static str {
        "get_linkedin_company_posts"
    }

    fn description(&self) -> &'static str {
        "Fetch recent posts from a LinkedIn company page URL. Returns post content, engagement \
         metrics, and timestamps. Useful for understanding company messaging and activity."
    }

    async fn call(&self, args: CompanyPostsArgs) -> ToolResult {
        let outcome = self.linkedin.company_posts(&args.company_url, args.max_posts).await;
        envelope(outcome, "Failed to fetch LinkedIn company posts", "company_url", &args.company_url)
    }
}
