//! Research loop: tool-calling conversation followed by a scoring pass

use futures::FutureExt;
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use super::scoring::Scorer;
use crate::agents::config::AgentConfig;
use crate::agents::domain::{Conversation, Message, RunEvent, RunStream, RunStreamSender, ToolCall};
use crate::agents::error::{LlmError, ToolError};
use crate::agents::llm::{CompletionResponse, LlmProvider};
use crate::agents::prompts::{build_agent_context, AGENT_SYSTEM_PROMPT};
use crate::tools::{metadata_for, ToolRegistry, ToolResult, FINISH_TOOL};

/// Event channel capacity per run
const EVENT_BUFFER: usize = 64;

/// Shown when the model stops without calling a tool or saying anything
const NO_TOOL_CALL_MESSAGE: &str = "Agent finished without calling tools";

/// How one requested tool call ended
enum CallOutcome {
    Completed(ToolResult),
    Failed(ToolResult),
}

/// Drives one research run per call to [`ResearchAgent::run`]
#[derive(Clone)]
pub struct ResearchAgent {
    provider: Arc<dyn LlmProvider>,
    registry: Arc<ToolRegistry>,
    scorer: Arc<Scorer>,
    config: AgentConfig,
}

impl ResearchAgent {
    pub fn new(provider: Arc<dyn LlmProvider>, registry: Arc<ToolRegistry>, config: AgentConfig) -> Self {
        let scorer = Scorer::new(
            provider.clone(),
            config.scoring.clone(),
            Duration::from_secs(config.llm_timeout_seconds),
        );
        Self {
            provider,
            registry,
            scorer: Arc::new(scorer),
            config,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Start a run in its own task and return its event stream.
    ///
    /// Dropping the stream cancels the run.
    pub fn run(&self, goal: impl Into<String>, profile_url: impl Into<String>) -> RunStream {
        let (sender, stream) = RunStream::channel(EVENT_BUFFER);
        let agent = self.clone();
        let goal = goal.into();
        let profile_url = profile_url.into();

        tokio::spawn(async move {
            let run = agent.drive(&goal, &profile_url, sender.clone());
            if let Err(panic) = AssertUnwindSafe(run).catch_unwind().await {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!(reason = %reason, "research run panicked");
                let _ = sender.send(RunEvent::error(format!("Research run aborted: {}", reason))).await;
            }
        });

        stream
    }

    /// Body of a run. Emits every event on `sender` and returns after the terminal one.
    pub async fn drive(&self, goal: &str, profile_url: &str, sender: RunStreamSender) {
        tracing::info!(profile_url = %profile_url, "research run started");

        if sender.send(RunEvent::started()).await.is_err() {
            return;
        }

        let mut conversation: Conversation = vec![
            Message::system(AGENT_SYSTEM_PROMPT),
            Message::user(build_agent_context(goal, profile_url)),
        ];

        let tool_timeout = Duration::from_secs(self.config.tool_timeout_seconds);

        for iteration in 1..=self.config.max_iterations {
            tracing::debug!(iteration, "research iteration");
            if sender.send(RunEvent::iteration(iteration)).await.is_err() {
                return;
            }

            let response = match self.next_turn(&conversation).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(iteration, error = %e, "completion failed, aborting run");
                    let _ = sender.send(RunEvent::error(e.to_string())).await;
                    return;
                }
            };

            let message = response.message;
            let calls = message.requested_calls().to_vec();

            if calls.is_empty() {
                let text = if message.content.trim().is_empty() {
                    NO_TOOL_CALL_MESSAGE.to_string()
                } else {
                    message.content
                };
                tracing::info!(iteration, "model answered without a tool call");
                let _ = sender.send(RunEvent::no_tool_call(text)).await;
                return;
            }

            conversation.push(message);

            let mut finish_summary = None;

            for call in &calls {
                if sender.is_closed() {
                    tracing::info!(tool = %call.name, "run cancelled before tool dispatch");
                    return;
                }

                let Some(outcome) = self.execute_call(call, tool_timeout, &sender).await else {
                    return;
                };

                let result = match outcome {
                    CallOutcome::Completed(result) => {
                        if call.name == FINISH_TOOL {
                            finish_summary =
                                Some(result.get_str("summary").unwrap_or_default().to_string());
                        }
                        result
                    }
                    CallOutcome::Failed(result) => result,
                };

                conversation.push(Message::tool_result(&call.id, &result));
            }

            if let Some(summary) = finish_summary {
                if sender.is_closed() {
                    tracing::info!("run cancelled before scoring");
                    return;
                }

                let assessment = self.scorer.score(&summary, goal, &conversation).await;
                tracing::info!(iteration, score = assessment.score, "research run finished");
                let _ = sender.send(RunEvent::final_result(assessment)).await;
                return;
            }
        }

        tracing::warn!(max_iterations = self.config.max_iterations, "iteration budget exhausted");
        let _ = sender.send(RunEvent::max_iterations()).await;
    }

    async fn next_turn(&self, conversation: &Conversation) -> Result<CompletionResponse, LlmError> {
        let call = self.provider.complete_with_tools(
            conversation.clone(),
            self.registry.to_model_schema(),
            &self.config.research,
        );

        match tokio::time::timeout(Duration::from_secs(self.config.llm_timeout_seconds), call).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(self.config.llm_timeout_seconds)),
        }
    }

    /// Announce, validate and dispatch one tool call.
    ///
    /// Returns `None` once the caller has gone away.
    async fn execute_call(
        &self,
        call: &ToolCall,
        timeout: Duration,
        sender: &RunStreamSender,
    ) -> Option<CallOutcome> {
        let parsed = call.parse_arguments();
        let shown_arguments = match &parsed {
            Ok(args) => args.clone(),
            Err(_) => Value::String(call.arguments.clone()),
        };

        let metadata = metadata_for(&call.name);
        let started = RunEvent::ToolStarted {
            tool_name: call.name.clone(),
            tool_title: metadata.title,
            tool_description: metadata.description,
            arguments: shown_arguments,
        };
        if sender.send(started).await.is_err() {
            return None;
        }

        let dispatched = if !self.registry.contains(&call.name) {
            Err(ToolError::UnknownTool(call.name.clone()))
        } else {
            match parsed {
                Ok(args) => {
                    tracing::info!(tool = %call.name, "dispatching tool");
                    self.registry.dispatch(&call.name, args, timeout).await
                }
                Err(e) => Err(ToolError::MalformedArguments(e.to_string())),
            }
        };

        let (event, outcome) = match dispatched {
            Ok(result) => (
                RunEvent::tool_completed(&call.name, result.clone()),
                CallOutcome::Completed(result),
            ),
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "tool call failed");
                let result = ToolResult::error(e.to_string(), []);
                (
                    RunEvent::tool_error(&call.name, result.clone()),
                    CallOutcome::Failed(result),
                )
            }
        };

        if sender.send(event).await.is_err() {
            return None;
        }
        Some(outcome)
    }
}

#[cfg(test)]
#[path = "research_test.rs"]
mod tests;
