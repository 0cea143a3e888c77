//! Run lifecycle events and the channel that carries them

use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

use super::Assessment;
use crate::tools::ToolResult;

/// One logical step of a research run, in production order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    /// The run has started
    Started { message: String },
    /// A new model round trip begins (1-based)
    Iteration { iteration: u32 },
    /// A requested tool is about to be dispatched
    ToolStarted {
        tool_name: String,
        tool_title: String,
        tool_description: String,
        arguments: Value,
    },
    /// A tool executor returned a result (which may itself carry an `error`)
    ToolCompleted { tool_name: String, result: ToolResult },
    /// The dispatcher could not execute the requested tool
    ToolError { tool_name: String, error: ToolResult },
    /// The model answered without requesting any tool
    NoToolCall { message: String },
    /// The scoring pass produced a verdict
    FinalResult { assessment: super::Assessment },
    /// The iteration budget ran out
    MaxIterations { message: String },
    /// A provider-level failure aborted the run
    Error { message: String },
}

impl RunEvent {
    pub fn started() -> Self {
        Self::Started {
            message: "Agent execution started".to_string(),
        }
    }

    pub fn iteration(iteration: u32) -> Self {
        Self::Iteration { iteration }
    }

    pub fn tool_completed(tool_name: impl Into<String>, result: ToolResult) -> Self {
        Self::ToolCompleted {
            tool_name: tool_name.into(),
            result,
        }
    }

    pub fn tool_error(tool_name: impl Into<String>, error: ToolResult) -> Self {
        Self::ToolError {
            tool_name: tool_name.into(),
            error,
        }
    }

    pub fn no_tool_call(message: impl Into<String>) -> Self {
        Self::NoToolCall {
            message: message.into(),
        }
    }

    pub fn final_result(assessment: Assessment) -> Self {
        Self::FinalResult { assessment }
    }

    pub fn max_iterations() -> Self {
        Self::MaxIterations {
            message: "Reached maximum iterations".to_string(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Wire discriminator, identical to the serialized `type` field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::Iteration { .. } => "iteration",
            Self::ToolStarted { .. } => "tool_started",
            Self::ToolCompleted { .. } => "tool_completed",
            Self::ToolError { .. } => "tool_error",
            Self::NoToolCall { .. } => "no_tool_call",
            Self::FinalResult { .. } => "final_result",
            Self::MaxIterations { .. } => "max_iterations",
            Self::Error { .. } => "error",
        }
    }

    /// Whether the stream ends after this event
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::NoToolCall { .. }
                | Self::FinalResult { .. }
                | Self::MaxIterations { .. }
                | Self::Error { .. }
        )
    }
}

/// Receiving half of a run: the caller-visible event stream
pub struct RunStream {
    receiver: mpsc::Receiver<RunEvent>,
}

impl RunStream {
    /// Create a channel pair for a single run
    pub fn channel(buffer: usize) -> (RunStreamSender, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (RunStreamSender { sender: tx }, Self { receiver: rx })
    }

    /// Drain the stream until the producer finishes
    pub async fn collect_events(mut self) -> Vec<RunEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.receiver.recv().await {
            events.push(event);
        }
        events
    }

    /// Drain the stream and return only the terminal event, if any
    pub async fn outcome(self) -> Option<RunEvent> {
        self.collect_events()
            .await
            .into_iter()
            .rev()
            .find(RunEvent::is_terminal)
    }
}

impl Stream for RunStream {
    type Item = RunEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_recv(cx)
    }
}

/// Sending half, owned by the orchestration loop
#[derive(Clone)]
pub struct RunStreamSender {
    sender: mpsc::Sender<RunEvent>,
}

impl RunStreamSender {
    /// Send an event. Fails once the caller has dropped the stream.
    pub async fn send(&self, event: RunEvent) -> Result<(), mpsc::error::SendError<RunEvent>> {
        self.sender.send(event).await
    }

    /// Check if the receiver is closed (the run was cancelled)
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
