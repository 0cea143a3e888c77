//! # Prospector - LinkedIn prospect research agent
//!
//! Prospector runs a tool-calling research loop against a LinkedIn profile,
//! then scores the prospect against the user's sales goal.
//!
//! ## Features
//!
//! - **Research loop**: the model picks tools (LinkedIn data, web search, news,
//!   page browsing, sub-LLM analysis) until it calls `finish`
//! - **Scoring**: BANT assessment with bounded retries and a neutral fallback
//! - **Streaming**: every step is an event, served as SSE over HTTP or as JSON
//!   lines from the CLI
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use prospector::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::new()?;
//!     let agent = prospector::build_agent(&settings, &settings.credentials()?)?;
//!     let outcome = agent
//!         .run("Sell SOC tooling", "https://www.linkedin.com/in/jane-doe")
//!         .outcome()
//!         .await;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Agents**: the loop, the scoring pass and the completion client
//! - **Tools**: typed tool executors and the registry the model sees
//! - **Domain**: ports to the external collaborators
//! - **Adapters**: HTTP clients for those ports and the axum handlers
//! - **Config**: layered settings and credentials

pub mod adapters;
pub mod agents;
pub mod cli;
pub mod config;
pub mod domain;
pub mod tools;

use crate::adapters::apify::ApifyLinkedInClient;
use crate::adapters::google_search::GoogleSearchClient;
use crate::adapters::health_handler::HealthHandler;
use crate::adapters::research_handler::{self, ResearchState};
use crate::adapters::web_browser::HttpPageFetcher;
use crate::agents::llm::{LlmProvider, OpenAiProvider};
use crate::agents::ResearchAgent;
use crate::config::{Credentials, Settings};
use crate::tools::{ToolBackends, ToolRegistry};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;

/// Wire the completion client, the collaborators and the toolbox into an agent
pub fn build_agent(settings: &Settings, credentials: &Credentials) -> anyhow::Result<ResearchAgent> {
    let provider: Arc<dyn LlmProvider> =
        Arc::new(OpenAiProvider::new(&settings.llm, &credentials.openai_key)?);
    let integrations = &settings.integrations;

    let mut linkedin = ApifyLinkedInClient::new(
        &credentials.apify_token,
        integrations.actors.clone(),
        Duration::from_secs(integrations.actor_timeout_seconds),
    )?;
    if let Some(base_url) = &integrations.apify_base_url {
        linkedin = linkedin.with_base_url(base_url);
    }

    let mut search = GoogleSearchClient::new(
        &credentials.google_search_key,
        &credentials.google_search_engine_id,
        Duration::from_secs(integrations.search_timeout_seconds),
    )?;
    if let Some(endpoint) = &integrations.google_search_endpoint {
        search = search.with_endpoint(endpoint);
    }

    let browser = HttpPageFetcher::new(Duration::from_secs(integrations.browse_timeout_seconds))?;

    let registry = ToolRegistry::standard(ToolBackends {
        linkedin: Arc::new(linkedin),
        search: Arc::new(search),
        browser: Arc::new(browser),
        analyst: provider.clone(),
        analysis: settings.agent.analysis.clone(),
    })?;
    tracing::info!(tools = registry.len(), model = %provider.model(), "research agent ready");

    Ok(ResearchAgent::new(provider, Arc::new(registry), settings.agent.clone()))
}

/// Creates the Axum application router with all endpoints configured.
///
/// # Arguments
///
/// * `agent` - Research agent serving `/v1/research`
/// * `health_handler` - Health check handler
///
/// # Returns
///
/// Configured Axum Router
pub fn create_app(agent: ResearchAgent, health_handler: Arc<HealthHandler>) -> Router {
    let health_router = Router::new()
        .route("/health", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.health().await }
            }
        }))
        .route("/health/live", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.live().await }
            }
        }));

    let api_router = Router::new()
        .route("/research", post(research_handler::start_research))
        .route("/tools", get(research_handler::list_tools))
        .with_state(ResearchState { agent });

    health_router.nest("/v1", api_router).layer(
        tower_http::cors::CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}
