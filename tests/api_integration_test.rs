use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use prospector::adapters::health_handler::HealthHandler;
use prospector::agents::error::{LlmError, LlmResult};
use prospector::agents::llm::{CompletionRequest, CompletionResponse, LlmProvider, LlmStream};
use prospector::agents::{AgentConfig, ResearchAgent, ToolCall};
use prospector::tools::{Finish, ToolRegistry};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt; // Correct import for oneshot

/// Replays canned completions in order
struct CannedProvider {
    replies: Mutex<VecDeque<CompletionResponse>>,
}

impl CannedProvider {
    fn new(replies: Vec<CompletionResponse>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
        }
    }
}

#[async_trait]
impl LlmProvider for CannedProvider {
    fn name(&self) -> &str {
        "canned"
    }

    fn model(&self) -> &str {
        "canned-model"
    }

    fn supports_streaming(&self) -> bool {
        false
    }

    async fn complete(&self, _request: CompletionRequest) -> LlmResult<CompletionResponse> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| LlmError::Api {
                status: 500,
                message: "no more replies".to_string(),
            })
    }

    fn complete_stream(&self, _request: CompletionRequest) -> LlmStream {
        let (sender, stream) = LlmStream::channel(1);
        tokio::spawn(async move {
            let _ = sender
                .send_error(LlmError::Streaming("not supported".to_string()))
                .await;
        });
        stream
    }
}

fn app(replies: Vec<CompletionResponse>) -> axum::Router {
    let provider = Arc::new(CannedProvider::new(replies));
    let registry = ToolRegistry::builder().register(Finish).build().unwrap();
    let agent = ResearchAgent::new(provider, Arc::new(registry), AgentConfig::default());
    let health = Arc::new(HealthHandler::new(agent.registry().len(), "canned-model"));
    prospector::create_app(agent, health)
}

fn finishing_run() -> Vec<CompletionResponse> {
    vec![
        CompletionResponse::tool_calls(
            "",
            vec![ToolCall::new(
                "call_1",
                "finish",
                r#"{"summary":"CISO at Northwind, hiring SOC analysts"}"#,
            )],
        ),
        CompletionResponse::text(
            r#"{"good_signals":["Hiring SOC analysts"],"bad_signals":[],"score":81,"reasoning":"Active need"}"#,
        ),
    ]
}

fn research_request(body: Value) -> Request<Body> {
    Request::builder()
        .uri("/v1/research")
        .method("POST")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Parse an SSE body into (event name, data JSON) pairs
fn sse_events(body: &str) -> Vec<(String, Value)> {
    body.split("\n\n")
        .filter_map(|block| {
            let mut name = None;
            let mut data = None;
            for line in block.lines() {
                if let Some(value) = line.strip_prefix("event:") {
                    name = Some(value.trim().to_string());
                } else if let Some(value) = line.strip_prefix("data:") {
                    data = serde_json::from_str(value.trim()).ok();
                }
            }
            Some((name?, data?))
        })
        .collect()
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = app(vec![]);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body_json: Value = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(body_json["status"], "healthy");
    assert_eq!(body_json["checks"]["tools"], 1);

    let response = app
        .oneshot(Request::builder().uri("/health/live").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_research_streams_events_until_final_result() {
    let response = app(finishing_run())
        .oneshot(research_request(json!({
            "goal": "Sell SOC tooling",
            "profile_url": "https://www.linkedin.com/in/jane-doe"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let events = sse_events(&String::from_utf8(body_bytes.to_vec()).unwrap());
    let names: Vec<&str> = events.iter().map(|(name, _)| name.as_str()).collect();

    assert_eq!(
        names,
        vec!["started", "iteration", "tool_started", "tool_completed", "final_result"]
    );
    for (name, data) in &events {
        assert_eq!(data["type"], name.as_str());
    }

    let (_, last) = events.last().unwrap();
    assert_eq!(last["assessment"]["score"], 81);
    assert_eq!(last["assessment"]["good_signals"], json!(["Hiring SOC analysts"]));
}

#[tokio::test]
async fn test_research_requires_goal_and_profile_url() {
    for body in [
        json!({ "goal": "", "profile_url": "https://www.linkedin.com/in/jane-doe" }),
        json!({ "goal": "Sell SOC tooling", "profile_url": "   " }),
        json!({ "goal": "Sell SOC tooling" }),
    ] {
        let response = app(vec![]).oneshot(research_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body_json: Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body_json["success"], false);
        assert!(body_json["error"].as_str().unwrap().ends_with("is required"));
    }
}

#[tokio::test]
async fn test_provider_failure_ends_stream_with_error_event() {
    let response = app(vec![])
        .oneshot(research_request(json!({
            "goal": "Sell SOC tooling",
            "profile_url": "https://www.linkedin.com/in/jane-doe"
        })))
        .await
        .unwrap();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let events = sse_events(&String::from_utf8(body_bytes.to_vec()).unwrap());

    let (name, data) = events.last().unwrap();
    assert_eq!(name, "error");
    assert_eq!(data["message"], "API error: 500 - no more replies");
}

#[tokio::test]
async fn test_tools_lists_registered_descriptors() {
    let response = app(vec![])
        .oneshot(Request::builder().uri("/v1/tools").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body_json: Value = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(body_json["data"][0]["name"], "finish");
    assert_eq!(body_json["data"][0]["parameters"]["required"], json!(["summary"]));
}

#[tokio::test]
async fn test_build_agent_registers_full_catalog() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let settings = prospector::config::Settings::from_path(&temp_dir.path().join("none.toml")).unwrap();
    let credentials = settings
        .resolve_credentials(|name| Some(format!("test-{}", name.to_lowercase())))
        .unwrap();

    let agent = prospector::build_agent(&settings, &credentials).unwrap();

    assert_eq!(agent.registry().len(), prospector::tools::CATALOG.len());
    for name in prospector::tools::CATALOG {
        assert!(agent.registry().contains(name), "missing {}", name);
    }
}
