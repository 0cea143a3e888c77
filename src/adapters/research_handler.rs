//! HTTP entry point for research runs
//!
//! `POST /v1/research` starts a run and streams its events as server-sent
//! events. Each SSE message is named after the event `type` and carries the
//! event JSON as data; the response ends after the terminal event.

use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

use crate::agents::{ResearchAgent, RunEvent};
use crate::tools::ToolDescriptor;

/// Shared state of the research routes
#[derive(Clone)]
pub struct ResearchState {
    pub agent: ResearchAgent,
}

#[derive(Debug, Deserialize)]
pub struct ResearchRequest {
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub profile_url: String,
}

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Start a research run and stream its events
pub async fn start_research(
    State(state): State<ResearchState>,
    Json(request): Json<ResearchRequest>,
) -> Response {
    if request.goal.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, Json(ApiResponse::<()>::error("goal is required")))
            .into_response();
    }
    if request.profile_url.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error("profile_url is required")),
        )
            .into_response();
    }

    tracing::info!(profile_url = %request.profile_url, "research requested over HTTP");

    let events = state
        .agent
        .run(request.goal, request.profile_url)
        .map(|event| Ok::<_, Infallible>(to_sse(&event)));

    Sse::new(events).keep_alive(KeepAlive::default()).into_response()
}

/// Tool descriptors the model is offered
pub async fn list_tools(State(state): State<ResearchState>) -> Json<ApiResponse<Vec<ToolDescriptor>>> {
    Json(ApiResponse::success(state.agent.registry().describe_all().to_vec()))
}

fn to_sse(event: &RunEvent) -> Event {
    let sse = Event::default().event(event.kind());
    match serde_json::to_string(event) {
        Ok(data) => sse.data(data),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize run event");
            sse.data(error_data(&e.to_string()))
        }
    }
}

/// Error event payload for a run event that could not be serialized
fn error_data(message: &str) -> String {
    serde_json::json!({ "type": "error", "message": message }).to_string()
}
