//! OpenAI chat-completions provider with streaming support

use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{
    CompletionRequest, CompletionResponse, FinishReason, LlmProvider, LlmStream, LlmStreamSender,
    StreamChunk, TokenUsage, ToolCallDelta,
};
use crate::agents::config::LlmProviderConfig;
use crate::agents::domain::{Message, ToolCall};
use crate::agents::error::{LlmError, LlmResult};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI LLM Provider
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    default_max_tokens: Option<u32>,
}

impl OpenAiProvider {
    /// Create a provider from configuration and an already resolved API key
    pub fn new(config: &LlmProviderConfig, api_key: impl Into<String>) -> LlmResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Authentication(format!(
                "Environment variable {} is empty",
                config.api_key_env
            )));
        }

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
            model: config.model.clone(),
            default_max_tokens: config.max_tokens,
        })
    }

    /// Build the request body for the chat completions endpoint
    fn build_request_body(&self, request: &CompletionRequest) -> Value {
        let mut body = json!({
            "model": request.model.as_ref().unwrap_or(&self.model),
            "messages": convert_messages(&request.messages),
        });

        if let Some(temp) = request.temperature {
            body["temperature"] = json!(temp);
        }

        if let Some(max_tokens) = request.max_tokens.or(self.default_max_tokens) {
            body["max_tokens"] = json!(max_tokens);
        }

        if let Some(tools) = &request.tools {
            body["tools"] = json!(tools);
        }

        if request.json_mode {
            body["response_format"] = json!({ "type": "json_object" });
        }

        if request.stream {
            body["stream"] = json!(true);
            body["stream_options"] = json!({ "include_usage": true });
        }

        body
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    async fn send(
        client: &reqwest::Client,
        url: &str,
        api_key: &str,
        body: &Value,
    ) -> LlmResult<reqwest::Response> {
        let response = client
            .post(url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        Err(match status.as_u16() {
            401 | 403 => LlmError::Authentication(error_text),
            429 => LlmError::RateLimited(error_text),
            code => LlmError::Api {
                status: code,
                message: error_text,
            },
        })
    }

    async fn stream_completion(
        client: reqwest::Client,
        url: String,
        api_key: String,
        body: Value,
        sender: LlmStreamSender,
    ) -> LlmResult<()> {
        let response = Self::send(&client, &url, &api_key, &body).await?;

        let mut stream = response.bytes_stream();
        let mut lines = LineBuffer::default();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| LlmError::Streaming(e.to_string()))?;
            lines.extend(&chunk);

            while let Some(line) = lines.next_line() {
                let Some(data) = line.strip_prefix("data:").map(str::trim) else {
                    continue;
                };
                if data == "[DONE]" {
                    return Ok(());
                }

                if let Some(chunk) = parse_stream_data(data) {
                    if sender.send(chunk).await.is_err() {
                        return Ok(()); // Receiver dropped
                    }
                }
            }
        }

        Ok(())
    }
}

/// Byte buffer that yields complete `\n`-terminated lines.
///
/// Network chunks can split a multi-byte character, so decoding waits until a
/// whole line has arrived.
#[derive(Default)]
struct LineBuffer {
    bytes: Vec<u8>,
}

impl LineBuffer {
    fn extend(&mut self, chunk: &[u8]) {
        self.bytes.extend_from_slice(chunk);
    }

    fn next_line(&mut self) -> Option<String> {
        let pos = self.bytes.iter().position(|b| *b == b'\n')?;
        let line: Vec<u8> = self.bytes.drain(..=pos).collect();
        Some(String::from_utf8_lossy(&line).trim().to_string())
    }
}

/// Convert internal messages to the wire format
fn convert_messages(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|m| {
            let mut msg = json!({
                "role": m.role.to_string(),
                "content": m.content,
            });

            if let Some(tool_calls) = &m.tool_calls {
                msg["tool_calls"] = json!(tool_calls
                    .iter()
                    .map(|tc| {
                        json!({
                            "id": tc.id,
                            "type": "function",
                            "function": {
                                "name": tc.name,
                                "arguments": tc.arguments,
                            }
                        })
                    })
                    .collect::<Vec<_>>());
            }

            if let Some(tool_call_id) = &m.tool_call_id {
                msg["tool_call_id"] = json!(tool_call_id);
            }

            msg
        })
        .collect()
}

/// Parse a non-streaming response
fn parse_response(response: OpenAiResponse) -> LlmResult<CompletionResponse> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::Parse("No choices in response".to_string()))?;

    let tool_calls: Vec<ToolCall> = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|tc| ToolCall::new(tc.id, tc.function.name, tc.function.arguments))
        .collect();

    let content = choice.message.content.unwrap_or_default();
    let message = if tool_calls.is_empty() {
        Message::assistant(content)
    } else {
        Message::assistant_with_tools(content, tool_calls)
    };

    Ok(CompletionResponse {
        message,
        finish_reason: FinishReason::from_wire(choice.finish_reason.as_deref()),
        usage: response.usage.map(Into::into),
    })
}

/// Parse one SSE `data:` payload into a chunk
fn parse_stream_data(data: &str) -> Option<StreamChunk> {
    let parsed: OpenAiStreamResponse = serde_json::from_str(data).ok()?;
    let usage = parsed.usage.map(Into::into);

    let Some(choice) = parsed.choices.into_iter().next() else {
        // The usage-only trailer has no choices
        return usage.map(|usage| StreamChunk {
            usage: Some(usage),
            ..Default::default()
        });
    };

    let tool_calls = choice
        .delta
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|tc| {
            let mut delta = ToolCallDelta::new(tc.index);
            if let Some(id) = tc.id {
                delta = delta.with_id(id);
            }
            if let Some(func) = tc.function {
                if let Some(name) = func.name {
                    delta = delta.with_name(name);
                }
                if let Some(args) = func.arguments {
                    delta = delta.with_arguments(args);
                }
            }
            delta
        })
        .collect();

    Some(StreamChunk {
        content: choice.delta.content.unwrap_or_default(),
        tool_calls,
        finish_reason: choice
            .finish_reason
            .as_deref()
            .map(|reason| FinishReason::from_wire(Some(reason))),
        usage,
    })
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> LlmResult<CompletionResponse> {
        let mut request = request;
        request.stream = false;
        let body = self.build_request_body(&request);

        let response = Self::send(&self.client, &self.endpoint(), &self.api_key, &body).await?;

        let parsed: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(format!("Failed to parse response: {}", e)))?;

        parse_response(parsed)
    }

    fn complete_stream(&self, request: CompletionRequest) -> LlmStream {
        let (sender, stream) = LlmStream::channel(64);

        let mut request = request;
        request.stream = true;
        let body = self.build_request_body(&request);
        let client = self.client.clone();
        let url = self.endpoint();
        let api_key = self.api_key.clone();

        tokio::spawn(async move {
            let result =
                Self::stream_completion(client, url, api_key, body, sender.clone()).await;
            if let Err(e) = result {
                let _ = sender.send_error(e).await;
            }
        });

        stream
    }
}

// Wire response types

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAiToolCall {
    id: String,
    function: OpenAiFunction,
}

#[derive(Debug, Deserialize)]
struct OpenAiFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl From<OpenAiUsage> for TokenUsage {
    fn from(usage: OpenAiUsage) -> Self {
        TokenUsage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiStreamResponse {
    #[serde(default)]
    choices: Vec<OpenAiStreamChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiStreamChoice {
    delta: OpenAiDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiDelta {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiStreamToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAiStreamToolCall {
    index: usize,
    id: Option<String>,
    function: Option<OpenAiStreamFunction>,
}

#[derive(Debug, Deserialize)]
struct OpenAiStreamFunction {
    name: Option<String>,
    arguments: Option<String>,
}
