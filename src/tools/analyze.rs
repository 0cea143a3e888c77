use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::{ResearchTool, ToolResult};
use crate::agents::config::SamplingConfig;
use crate::agents::domain::Message;
use crate::agents::error::LlmResult;
use crate::agents::llm::LlmProvider;
use crate::agents::prompts::{build_analysis_request, ANALYSIS_SYSTEM_PROMPT};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AnalyzeArgs {
    /// The analysis prompt/question to ask the LLM
    pub prompt: String,
    /// The context or data to analyze
    pub context: String,
}

/// Delegates a free-form analysis to the secondary reasoning model
#[derive(Clone)]
pub struct AnalyzeWithLlm {
    provider: Arc<dyn LlmProvider>,
    sampling: SamplingConfig,
}

impl AnalyzeWithLlm {
    pub fn new(provider: Arc<dyn LlmProvider>, sampling: SamplingConfig) -> Self {
        Self { provider, sampling }
    }

    /// Ask the analysis model and return its text reply
    pub async fn analyze(&self, prompt: &str, context: &str) -> LlmResult<String> {
        let messages = vec![
            Message::system(ANALYSIS_SYSTEM_PROMPT),
            Message::user(build_analysis_request(prompt, context)),
        ];
        self.provider.complete_text(messages, &self.sampling).await
    }

    /// Ask for a JSON array of indices and parse it.
    ///
    /// Out-of-range and duplicate indices are dropped; order is preserved.
    pub async fn select_indices(&self, prompt: &str, len: usize) -> Result<Vec<usize>, String> {
        let reply = self.analyze(prompt, "").await.map_err(|e| e.to_string())?;
        parse_indices(&reply, len)
    }
}

pub(crate) fn parse_indices(reply: &str, len: usize) -> Result<Vec<usize>, String> {
    let trimmed = strip_code_fence(reply.trim());
    let raw: Vec<i64> = serde_json::from_str(trimmed).map_err(|e| e.to_string())?;

    let mut indices = Vec::with_capacity(raw.len());
    for index in raw {
        if index < 0 {
            continue;
        }
        let index = index as usize;
        if index < len && !indices.contains(&index) {
            indices.push(index);
        }
    }
    Ok(indices)
}

/// Models sometimes wrap JSON in a ```json fence
pub(crate) fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[async_trait]
impl ResearchTool for AnalyzeWithLlm {
    type Args = AnalyzeArgs;

    fn name(&self) -> &'static str {
        "analyze_with_llm"
    }

    fn description(&self) -> &'static str {
        "Use a reasoning LLM to deeply analyze content. Perfect for extracting BANT signals, \
         sentiment analysis, pattern recognition, or complex insights from scraped data. \
         Provide a clear analysis prompt and the context to analyze."
    }

    async fn call(&self, args: AnalyzeArgs) -> ToolResult {
        match self.analyze(&args.prompt, &args.context).await {
            Ok(analysis) => ToolResult::success(json!({ "analysis": analysis })),
            Err(e) => {
                tracing::warn!(error = %e, "analysis request failed");
                ToolResult::error(format!("Analysis failed: {}", e), [])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::llm::scripted::ScriptedProvider;
    use crate::agents::llm::CompletionResponse;

    #[test]
    fn test_parse_indices_filters_out_of_range() {
        assert_eq!(parse_indices("[0, 4, 1, 1, -2]", 3), Ok(vec![0, 1]));
        assert_eq!(parse_indices("```json\n[2]\n```", 3), Ok(vec![2]));
        assert!(parse_indices("the first two", 3).is_err());
    }

    #[tokio::test]
    async fn test_analysis_envelope() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok(CompletionResponse::text(
            "Budget: Series B raised in March",
        ))]));
        let tool = AnalyzeWithLlm::new(provider.clone(), SamplingConfig::default());

        let result = tool
            .call(AnalyzeArgs {
                prompt: "Find budget signals".to_string(),
                context: "Raised $40M".to_string(),
            })
            .await;

        assert_eq!(result.get_str("analysis"), Some("Budget: Series B raised in March"));
        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].messages[1].content.contains("Raised $40M"));
        assert!(requests[0].tools.is_none());
    }

    #[tokio::test]
    async fn test_analysis_provider_failure_is_error_result() {
        let provider = Arc::new(ScriptedProvider::new(vec![]));
        let tool = AnalyzeWithLlm::new(provider, SamplingConfig::default());

        let result = tool
            .call(AnalyzeArgs {
                prompt: "Find budget signals".to_string(),
                context: String::new(),
            })
            .await;

        assert!(result.error_message().unwrap_or_default().starts_with("Analysis failed"));
    }
}
