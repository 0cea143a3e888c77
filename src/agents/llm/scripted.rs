//! Deterministic provider for unit tests: replays canned responses in order

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{
    CompletionRequest, CompletionResponse, LlmProvider, LlmStream, StreamChunk, ToolCallDelta,
};
use crate::agents::error::{LlmError, LlmResult};

pub(crate) struct ScriptedProvider {
    replies: Mutex<VecDeque<LlmResult<CompletionResponse>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub(crate) fn new(replies: Vec<LlmResult<CompletionResponse>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request received so far
    pub(crate) fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_reply(&self, request: CompletionRequest) -> LlmResult<CompletionResponse> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Api {
                status: 500,
                message: "script exhausted".to_string(),
            }))
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: CompletionRequest) -> LlmResult<CompletionResponse> {
        self.next_reply(request)
    }

    fn complete_stream(&self, request: CompletionRequest) -> LlmStream {
        let reply = self.next_reply(request);
        let (sender, stream) = LlmStream::channel(16);

        tokio::spawn(async move {
            let response = match reply {
                Ok(response) => response,
                Err(e) => {
                    let _ = sender.send_error(e).await;
                    return;
                }
            };

            let _ = sender.send(StreamChunk::text(response.message.content.clone())).await;
            for (index, call) in response.message.requested_calls().iter().enumerate() {
                let head = ToolCallDelta::new(index).with_id(&call.id).with_name(&call.name);
                let _ = sender.send(StreamChunk::tool_call(head)).await;
                // Split arguments across two chunks like a real provider would
                let half = call.arguments.chars().count() / 2;
                let mid = call
                    .arguments
                    .char_indices()
                    .nth(half)
                    .map_or(call.arguments.len(), |(i, _)| i);
                let (left, right) = call.arguments.split_at(mid);
                for part in [left, right] {
                    let delta = ToolCallDelta::new(index).with_arguments(part);
                    let _ = sender.send(StreamChunk::tool_call(delta)).await;
                }
            }
            let _ = sender
                .send(StreamChunk::finish(response.finish_reason, response.usage))
                .await;
        });

        stream
    }
}
