//! Scoring pass: turns a finished conversation into an [`Assessment`]

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::retry::retry_bounded;
use crate::agents::config::ScoringConfig;
use crate::agents::domain::{Assessment, Message, Role, ScoredReply, REQUIRED_KEYS};
use crate::agents::error::LlmError;
use crate::agents::llm::LlmProvider;
use crate::agents::prompts::{build_scoring_request, SCORING_SYSTEM_PROMPT};
use crate::tools::strip_code_fence;

/// Why a single scoring attempt was rejected
#[derive(Debug)]
enum AttemptFailure {
    Provider(LlmError),
    Reply { raw: String, reason: String },
}

/// Scores a research run against the user's goal with bounded retries
pub struct Scorer {
    provider: Arc<dyn LlmProvider>,
    config: ScoringConfig,
    call_timeout: Duration,
}

impl Scorer {
    pub fn new(provider: Arc<dyn LlmProvider>, config: ScoringConfig, call_timeout: Duration) -> Self {
        Self {
            provider,
            config,
            call_timeout,
        }
    }

    /// Always returns an assessment; the fallback is used once every attempt failed
    pub async fn score(&self, summary: &str, goal: &str, conversation: &[Message]) -> Assessment {
        let context = extract_context_summary(conversation);
        let messages = vec![
            Message::system(SCORING_SYSTEM_PROMPT),
            Message::user(build_scoring_request(summary, goal, &context)),
        ];

        let outcome = retry_bounded(self.config.max_attempts, |attempt| {
            let messages = messages.clone();
            async move {
                let result = self.attempt(messages).await;
                if let Err(failure) = &result {
                    tracing::warn!(attempt, failure = ?failure, "scoring attempt rejected");
                }
                result
            }
        })
        .await;

        match outcome {
            Ok(assessment) => assessment,
            Err(exhausted) => {
                let raw = exhausted.errors.into_iter().rev().find_map(|failure| match failure {
                    AttemptFailure::Reply { raw, .. } => Some(raw),
                    AttemptFailure::Provider(_) => None,
                });
                tracing::error!(attempts = exhausted.attempts, "scoring exhausted, using fallback");
                Assessment::fallback(exhausted.attempts, raw)
            }
        }
    }

    async fn attempt(&self, messages: Vec<Message>) -> Result<Assessment, AttemptFailure> {
        let call = self.provider.complete_text(messages, &self.config.sampling);
        let raw = match tokio::time::timeout(self.call_timeout, call).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => return Err(AttemptFailure::Provider(e)),
            Err(_) => {
                return Err(AttemptFailure::Provider(LlmError::Timeout(
                    self.call_timeout.as_secs(),
                )))
            }
        };

        parse_assessment(&raw).map_err(|reason| AttemptFailure::Reply { raw, reason })
    }
}

/// Validate a scoring reply: JSON object, every required key, correct types
pub(crate) fn parse_assessment(raw: &str) -> Result<Assessment, String> {
    let value: Value =
        serde_json::from_str(strip_code_fence(raw.trim())).map_err(|e| e.to_string())?;

    let object = value.as_object().ok_or("reply is not a JSON object")?;
    let missing: Vec<&str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| !object.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(format!("missing keys: {}", missing.join(", ")));
    }

    let reply: ScoredReply = serde_json::from_value(value).map_err(|e| e.to_string())?;
    Ok(reply.into())
}

/// User requests and tool results, in order, separated by blank lines
pub fn extract_context_summary(conversation: &[Message]) -> String {
    conversation
        .iter()
        .filter_map(|message| match message.role {
            Role::User => Some(format!("User Request: {}", message.content)),
            Role::Tool => Some(format!("Tool Result: {}", message.content)),
            Role::System | Role::Assistant => None,
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
