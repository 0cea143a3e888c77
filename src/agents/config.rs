//! Configuration types for the research agent

use serde::{Deserialize, Serialize};

/// Per-call sampling parameters.
///
/// The research loop, the scoring pass and the analysis sub-model each carry
/// their own, which is what separates exploratory from precise completions.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SamplingConfig {
    /// Model override (provider default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Ask the provider for a strict JSON object reply
    #[serde(default)]
    pub json_mode: bool,
    /// Stream the completion and reassemble it
    #[serde(default)]
    pub stream: bool,
}

impl SamplingConfig {
    pub fn with_temperature(temperature: f32) -> Self {
        Self {
            temperature: Some(temperature),
            ..Default::default()
        }
    }

    fn research() -> Self {
        Self::with_temperature(0.7)
    }

    fn scoring() -> Self {
        Self {
            json_mode: true,
            ..Self::with_temperature(0.2)
        }
    }

    fn analysis() -> Self {
        Self {
            model: Some("o3-mini".to_string()),
            ..Default::default()
        }
    }
}

/// Completion provider connection settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LlmProviderConfig {
    /// Default model identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable containing the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Custom base URL (for proxies or compatible endpoints)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Default max tokens for completions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for LlmProviderConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key_env: default_api_key_env(),
            base_url: None,
            max_tokens: None,
        }
    }
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_KEY".to_string()
}

/// Scoring pass settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScoringConfig {
    /// Attempts before falling back to the neutral assessment
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "SamplingConfig::scoring")]
    pub sampling: SamplingConfig,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            sampling: SamplingConfig::scoring(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

/// Research loop settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AgentConfig {
    /// Maximum model round trips per run
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Timeout for a single completion call
    #[serde(default = "default_llm_timeout")]
    pub llm_timeout_seconds: u64,
    /// Timeout for a single tool execution
    #[serde(default = "default_tool_timeout")]
    pub tool_timeout_seconds: u64,
    #[serde(default = "SamplingConfig::research")]
    pub research: SamplingConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    /// Sampling for `analyze_with_llm` and the news relevance filters
    #[serde(default = "SamplingConfig::analysis")]
    pub analysis: SamplingConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            llm_timeout_seconds: default_llm_timeout(),
            tool_timeout_seconds: default_tool_timeout(),
            research: SamplingConfig::research(),
            scoring: ScoringConfig::default(),
            analysis: SamplingConfig::analysis(),
        }
    }
}

fn default_max_iterations() -> u32 {
    10
}

fn default_llm_timeout() -> u64 {
    120
}

fn default_tool_timeout() -> u64 {
    150
}
