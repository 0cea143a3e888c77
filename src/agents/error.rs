//! Error types for the research agent

use thiserror::Error;

/// Errors surfaced to whoever builds or drives an agent
#[derive(Debug, Error)]
pub enum AgentError {
    /// Configuration error (including registry/catalog mismatches)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Provider-level failures of the completion client.
///
/// These are the only failures that abort a research run.
#[derive(Debug, Error)]
pub enum LlmError {
    /// API error
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication error
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// Streaming error
    #[error("Streaming error: {0}")]
    Streaming(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Timeout
    #[error("Request timed out after {0}s")]
    Timeout(u64),
}

/// Failures detected while dispatching a single tool call.
///
/// Every variant is recovered locally: the loop turns it into a `tool_error`
/// event and an `{error, ...}` tool reply, and the run continues.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Malformed tool arguments: {0}")]
    MalformedArguments(String),

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("Tool {tool} failed: {reason}")]
    Failed { tool: String, reason: String },

    #[error("Tool {tool} panicked: {reason}")]
    Panicked { tool: String, reason: String },

    #[error("Tool {tool} timed out after {seconds}s")]
    Timeout { tool: String, seconds: u64 },
}

/// Failures of the scraping, search and browsing collaborators
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Request timed out")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("{0}")]
    Empty(String),

    #[error("Failed to parse content: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout(0)
        } else if err.is_connect() {
            LlmError::Network(format!("Connection error: {}", err))
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout
        } else if let Some(status) = err.status() {
            BackendError::Upstream {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            BackendError::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::Serialization(err.to_string())
    }
}

/// Result type alias for agent operations
pub type AgentResult<T> = Result<T, AgentError>;

/// Result type alias for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;

/// Result type alias for collaborator calls
pub type BackendResult<T> = Result<T, BackendError>;
