//! Web and news search tools

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::{AnalyzeWithLlm, ResearchTool, ToolResult};
use crate::agents::prompts::{build_news_filter_prompt, NewsSubject};
use crate::domain::{SearchPort, SearchResults};

/// Most results the search engine returns per query
pub const MAX_RESULTS: u32 = 10;

const COMPANY_NEWS_KEYWORDS: &str =
    "(funding OR acquisition OR partnership OR announcement OR investment OR growth OR expansion)";

const PERSON_NEWS_KEYWORDS: &str =
    "(interview OR speaking OR appointment OR promoted OR joined OR announcement OR award OR keynote)";

fn default_num_results() -> u32 {
    MAX_RESULTS
}

fn default_timeframe() -> u32 {
    6
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchWebArgs {
    /// The search query to execute
    pub query: String,
    /// Number of results to return (max 10, default 10)
    #[serde(default = "default_num_results")]
    pub num_results: u32,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CompanyNewsArgs {
    /// The company name to search news for
    pub company_name: String,
    /// Brief context about the company (industry, website, or key details to disambiguate).
    /// Example: 'cybersecurity company, sentra.io' or 'automotive manufacturer'
    pub company_context: String,
    /// How many months back to search (default: 6)
    #[serde(default = "default_timeframe")]
    pub timeframe_months: u32,
    /// Number of results to return (max 10, default 10)
    #[serde(default = "default_num_results")]
    pub num_results: u32,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PersonNewsArgs {
    /// The person's name to search news for
    pub person_name: String,
    /// Context about the person (company, role, industry).
    /// Example: 'CEO of Sentra, cybersecurity' or 'CTO at Acme Corp'
    pub person_context: String,
    /// Number of results to return (max 10, default 10)
    #[serde(default = "default_num_results")]
    pub num_results: u32,
}

pub struct SearchWeb {
    search: Arc<dyn SearchPort>,
}

impl SearchWeb {
    pub fn new(search: Arc<dyn SearchPort>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl ResearchTool for SearchWeb {
    type Args = SearchWebArgs;

    fn name(&self) -> &'static str {
        "search_web"
    }

    fn description(&self) -> &'static str {
        "Search the web using Google Custom Search. Returns search results with titles, links, \
         and snippets. Perfect for finding information about companies, news, funding \
         announcements, or any general research. Use browse_web to fetch full HTML of specific URLs."
    }

    async fn call(&self, args: SearchWebArgs) -> ToolResult {
        let num_results = args.num_results.min(MAX_RESULTS);
        match self.search.search(&args.query, num_results).await {
            Ok(results) => results_payload(&results),
            Err(e) => {
                tracing::warn!(query = %args.query, error = %e, "web search failed");
                ToolResult::error(e.to_string(), [("query", json!(args.query))])
            }
        }
    }
}

fn results_payload(results: &SearchResults) -> ToolResult {
    match serde_json::to_value(results) {
        Ok(payload) => ToolResult::success(payload),
        Err(e) => ToolResult::error(
            format!("Failed to process search results: {}", e),
            [("query", json!(results.query))],
        ),
    }
}

/// Quoted name, disambiguating context and a keyword group
fn news_query(name: &str, context: &str, keywords: &str) -> String {
    [format!("\"{}\"", name), context.trim().to_string(), keywords.to_string()]
        .into_iter()
        .filter(|term| !term.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Search, then keep only the hits the analysis model judges to be about the subject
async fn filtered_news_search(
    search: &dyn SearchPort,
    analyst: &AnalyzeWithLlm,
    subject: NewsSubject,
    name: &str,
    context: &str,
    query: &str,
    num_results: u32,
) -> Option<ToolResult> {
    let mut results = match search.search(query, num_results.min(MAX_RESULTS)).await {
        Ok(results) => results,
        Err(e) => {
            tracing::warn!(query = %query, error = %e, "news search failed");
            return None;
        }
    };

    let original_count = results.results.len();
    let listing = serde_json::to_string(&results.results).unwrap_or_default();
    let prompt = build_news_filter_prompt(subject, name, context, &listing);

    let validation_error = match analyst.select_indices(&prompt, original_count).await {
        Ok(indices) => {
            let hits = std::mem::take(&mut results.results);
            results.results = indices.into_iter().filter_map(|i| hits.get(i).cloned()).collect();
            None
        }
        Err(reason) => Some(format!("Could not validate results: {}", reason)),
    };

    let mut payload = results_payload(&results);
    match validation_error {
        Some(error) => payload.insert("validation_error", json!(error)),
        None => {
            payload.insert("original_count", json!(original_count));
            payload.insert("filtered_count", json!(results.results.len()));
        }
    }
    Some(payload)
}

pub struct SearchCompanyNews {
    search: Arc<dyn SearchPort>,
    analyst: AnalyzeWithLlm,
}

impl SearchCompanyNews {
    pub fn new(search: Arc<dyn SearchPort>, analyst: AnalyzeWithLlm) -> Self {
        Self { search, analyst }
    }
}

#[async_trait]
impl ResearchTool for SearchCompanyNews {
    type Args = CompanyNewsArgs;

    fn name(&self) -> &'static str {
        "search_company_news"
    }

    fn description(&self) -> &'static str {
        "Search for recent news and announcements about a specific company. Finds funding rounds, \
         acquisitions, partnerships, expansions, and other newsworthy events. Essential for BANT \
         Budget and Timing assessment. IMPORTANT: Always provide company_context (industry, website \
         domain, or key details) to avoid confusion with other companies with the same name. \
         Results are validated by an LLM to filter out irrelevant hits."
    }

    async fn call(&self, args: CompanyNewsArgs) -> ToolResult {
        let query = news_query(&args.company_name, &args.company_context, COMPANY_NEWS_KEYWORDS);
        let outcome = filtered_news_search(
            self.search.as_ref(),
            &self.analyst,
            NewsSubject::Company,
            &args.company_name,
            &args.company_context,
            &query,
            args.num_results,
        )
        .await;

        match outcome {
            Some(mut payload) => {
                payload.insert("search_type", json!("company_news"));
                payload.insert("company_name", json!(args.company_name));
                payload.insert("company_context", json!(args.company_context));
                payload.insert("timeframe_months", json!(args.timeframe_months));
                payload
            }
            None => ToolResult::error(
                "Failed to search company news",
                [("company_name", json!(args.company_name))],
            ),
        }
    }
}

pub struct SearchPersonNews {
    search: Arc<dyn SearchPort>,
    analyst: AnalyzeWithLlm,
}

impl SearchPersonNews {
    pub fn new(search: Arc<dyn SearchPort>, analyst: AnalyzeWithLlm) -> Self {
        Self { search, analyst }
    }
}

#[async_trait]
impl ResearchTool for SearchPersonNews {
    type Args = PersonNewsArgs;

    fn name(&self) -> &'static str {
        "search_person_news"
    }

    fn description(&self) -> &'static str {
        "Search for news mentions, interviews, speaking engagements, and announcements about a \
         specific person. Validates their authority, influence, and thought leadership. Useful for \
         BANT Authority assessment and finding external validation beyond LinkedIn. IMPORTANT: \
         Always provide person_context (company, role, industry) to disambiguate from other people \
         with the same name. Results are validated by an LLM to filter out irrelevant hits."
    }

    async fn call(&self, args: PersonNewsArgs) -> ToolResult {
        let query = news_query(&args.person_name, &args.person_context, PERSON_NEWS_KEYWORDS);
        let outcome = filtered_news_search(
            self.search.as_ref(),
            &self.analyst,
            NewsSubject::Person,
            &args.person_name,
            &args.person_context,
            &query,
            args.num_results,
        )
        .await;

        match outcome {
            Some(mut payload) => {
                payload.insert("search_type", json!("person_news"));
                payload.insert("person_name", json!(args.person_name));
                payload.insert("person_context", json!(args.person_context));
                payload
            }
            None => ToolResult::error(
                "Failed to search person news",
                [("person_name", json!(args.person_name))],
            ),
        }
    }
}
