//! Streaming types for LLM responses

use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

use super::{CompletionResponse, FinishReason, TokenUsage};
use crate::agents::domain::{Message, ToolCall};
use crate::agents::error::LlmError;

/// A chunk of streamed LLM response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Delta content (text being generated)
    #[serde(default)]
    pub content: String,
    /// Tool calls being made (partial)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallDelta>,
    /// Finish reason (if this is the final chunk)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
    /// Token usage (usually only in final chunk)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl StreamChunk {
    /// Create a text content chunk
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Create a tool call chunk
    pub fn tool_call(delta: ToolCallDelta) -> Self {
        Self {
            tool_calls: vec![delta],
            ..Default::default()
        }
    }

    /// Create a finish chunk
    pub fn finish(reason: FinishReason, usage: Option<TokenUsage>) -> Self {
        Self {
            finish_reason: Some(reason),
            usage,
            ..Default::default()
        }
    }
}

/// Delta update for a tool call (streaming tool calls)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallDelta {
    /// Index of the tool call being updated
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Arguments JSON fragment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

impl ToolCallDelta {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            id: None,
            name: None,
            arguments: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_arguments(mut self, args: impl Into<String>) -> Self {
        self.arguments = Some(args.into());
        self
    }
}

/// Accumulator for building tool calls from streaming deltas
#[derive(Debug, Default)]
pub struct ToolCallAccumulator {
    tool_calls: Vec<ToolCallBuilder>,
}

#[derive(Debug, Default)]
struct ToolCallBuilder {
    id: String,
    name: String,
    arguments: String,
}

impl ToolCallAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a delta update
    pub fn apply_delta(&mut self, delta: &ToolCallDelta) {
        while self.tool_calls.len() <= delta.index {
            self.tool_calls.push(ToolCallBuilder::default());
        }

        let builder = &mut self.tool_calls[delta.index];

        if let Some(id) = &delta.id {
            builder.id.push_str(id);
        }
        if let Some(name) = &delta.name {
            builder.name.push_str(name);
        }
        if let Some(args) = &delta.arguments {
            builder.arguments.push_str(args);
        }
    }

    /// Build the final tool calls. Argument text is kept exactly as streamed.
    pub fn build(self) -> Vec<ToolCall> {
        self.tool_calls
            .into_iter()
            .filter(|b| !b.name.is_empty())
            .map(|b| {
                let id = if b.id.is_empty() {
                    ToolCall::generate_id()
                } else {
                    b.id
                };
                ToolCall::new(id, b.name, b.arguments)
            })
            .collect()
    }
}

/// Streaming response from an LLM provider
pub struct LlmStream {
    receiver: mpsc::Receiver<Result<StreamChunk, LlmError>>,
}

impl LlmStream {
    /// Create a channel pair for building an LLM stream
    pub fn channel(buffer: usize) -> (LlmStreamSender, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (LlmStreamSender { sender: tx }, Self { receiver: rx })
    }

    /// Collect all chunks into a complete response
    pub async fn collect(mut self) -> Result<CompletionResponse, LlmError> {
        let mut content = String::new();
        let mut tool_accumulator = ToolCallAccumulator::new();
        let mut finish_reason = None;
        let mut usage = None;

        while let Some(result) = self.receiver.recv().await {
            let chunk = result?;

            content.push_str(&chunk.content);

            for delta in &chunk.tool_calls {
                tool_accumulator.apply_delta(delta);
            }

            if let Some(reason) = chunk.finish_reason {
                finish_reason = Some(reason);
            }

            if chunk.usage.is_some() {
                usage = chunk.usage;
            }
        }

        let tool_calls = tool_accumulator.build();
        let message = if tool_calls.is_empty() {
            Message::assistant(content)
        } else {
            Message::assistant_with_tools(content, tool_calls)
        };

        Ok(CompletionResponse {
            message,
            finish_reason: finish_reason.unwrap_or(FinishReason::Stop),
            usage,
        })
    }
}

impl Stream for LlmStream {
    type Item = Result<StreamChunk, LlmError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_recv(cx)
    }
}

type SendResult = Result<(), mpsc::error::SendError<Result<StreamChunk, LlmError>>>;

/// Sender half for building an LLM stream
#[derive(Clone)]
pub struct LlmStreamSender {
    sender: mpsc::Sender<Result<StreamChunk, LlmError>>,
}

impl LlmStreamSender {
    pub async fn send(&self, chunk: StreamChunk) -> SendResult {
        self.sender.send(Ok(chunk)).await
    }

    pub async fn send_error(&self, error: LlmError) -> SendResult {
        self.sender.send(Err(error)).await
    }
}
