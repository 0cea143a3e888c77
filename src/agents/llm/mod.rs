//! Completion client
//!
//! The research loop only talks to [`LlmProvider`]. Three call shapes are used:
//! - plain text completions (analysis sub-model, scoring pass)
//! - completions with tool definitions (research loop)
//! - the streamed variant of the latter, reassembled by [`LlmStream::collect`]

mod openai;
mod stream;

#[cfg(test)]
pub(crate) mod scripted;

pub use openai::OpenAiProvider;
pub use stream::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agents::config::SamplingConfig;
use crate::agents::domain::{Message, ToolCall};
use crate::agents::error::LlmResult;

/// Trait for LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Get the default model
    fn model(&self) -> &str;

    /// Check if streaming is supported
    fn supports_streaming(&self) -> bool {
        true
    }

    /// Complete a request (non-streaming)
    async fn complete(&self, request: CompletionRequest) -> LlmResult<CompletionResponse>;

    /// Complete a request with streaming
    fn complete_stream(&self, request: CompletionRequest) -> LlmStream;

    /// Text completion without tools; returns the reply content
    async fn complete_text(
        &self,
        messages: Vec<Message>,
        sampling: &SamplingConfig,
    ) -> LlmResult<String> {
        let request = CompletionRequest::new(messages).with_sampling(sampling);
        let response = self.complete(request).await?;
        Ok(response.message.content)
    }

    /// Completion that advertises the given function-calling schemas
    async fn complete_with_tools(
        &self,
        messages: Vec<Message>,
        tools: &[Value],
        sampling: &SamplingConfig,
    ) -> LlmResult<CompletionResponse> {
        let request = CompletionRequest::new(messages)
            .with_sampling(sampling)
            .with_tools(tools.to_vec());

        if request.stream && self.supports_streaming() {
            self.complete_stream(request).collect().await
        } else {
            self.complete(request).await
        }
    }
}

/// Request for LLM completion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Messages in the conversation
    pub messages: Vec<Message>,
    /// Model to use (overrides provider default)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Temperature for sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Tools in function-calling shape
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
    /// Force a JSON object reply
    #[serde(default)]
    pub json_mode: bool,
    /// Whether to stream the response
    #[serde(default)]
    pub stream: bool,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_sampling(mut self, sampling: &SamplingConfig) -> Self {
        self.model = sampling.model.clone();
        self.temperature = sampling.temperature;
        self.max_tokens = sampling.max_tokens;
        self.json_mode = sampling.json_mode;
        self.stream = sampling.stream;
        self
    }

    /// Attach tool schemas; an empty list means no tools
    pub fn with_tools(mut self, tools: Vec<Value>) -> Self {
        self.tools = if tools.is_empty() { None } else { Some(tools) };
        self
    }
}

/// Response from LLM completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated message
    pub message: Message,
    /// Reason the completion stopped
    pub finish_reason: FinishReason,
    /// Token usage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl CompletionResponse {
    /// A plain assistant reply
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            message: Message::assistant(content),
            finish_reason: FinishReason::Stop,
            usage: None,
        }
    }

    /// An assistant reply requesting tool calls
    pub fn tool_calls(content: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        Self {
            message: Message::assistant_with_tools(content, calls),
            finish_reason: FinishReason::ToolCalls,
            usage: None,
        }
    }
}

/// Reason completion stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop
    Stop,
    /// Hit max tokens
    Length,
    /// Tool call requested
    ToolCalls,
    /// Content filtered
    ContentFilter,
}

impl FinishReason {
    pub(crate) fn from_wire(reason: Option<&str>) -> Self {
        match reason {
            Some("length") => FinishReason::Length,
            Some("tool_calls") => FinishReason::ToolCalls,
            Some("content_filter") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
