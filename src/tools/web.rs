use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::{ResearchTool, ToolResult};
use crate::domain::BrowsePort;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct BrowseArgs {
    /// The URL to fetch and browse
    pub url: String,
}

pub struct BrowseWeb {
    browser: Arc<dyn BrowsePort>,
}

impl BrowseWeb {
    pub fn new(browser: Arc<dyn BrowsePort>) -> Self {
        Self { browser }
    }
}

#[async_trait]
impl ResearchTool for BrowseWeb {
    type Args = BrowseArgs;

    fn name(&self) -> &'static str {
        "browse_web"
    }

    fn description(&self) -> &'static str {
        "Fetch and browse any web URL. Returns the HTML content, extracted text, and page title. \
         Useful for accessing URLs returned from other tools or gathering web information."
    }

    async fn call(&self, args: BrowseArgs) -> ToolResult {
        match self.browser.fetch(&args.url).await {
            Ok(page) => match serde_json::to_value(page) {
                Ok(payload) => ToolResult::success(payload),
                Err(e) => ToolResult::error(
                    format!("Failed to parse content: {}", e),
                    [("url", json!(args.url))],
                ),
            },
            Err(e) => {
                tracing::warn!(url = %args.url, error = %e, "page fetch failed");
                ToolResult::error(e.to_string(), [("url", json!(args.url))])
            }
        }
    }
}
