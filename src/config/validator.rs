use thiserror::Error;

use crate::agents::config::{AgentConfig, SamplingConfig};
use crate::config::{IntegrationSettings, ServerSettings, Settings};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_server(&settings.server) {
            errors.extend(e);
        }

        if settings.llm.model.trim().is_empty() {
            errors.push(ValidationError::MissingField("llm.model".to_string()));
        }
        if settings.llm.api_key_env.trim().is_empty() {
            errors.push(ValidationError::MissingField("llm.api_key_env".to_string()));
        }

        if let Err(e) = Self::validate_agent(&settings.agent) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_integrations(&settings.integrations) {
            errors.extend(e);
        }

        errors.extend(Self::validate_tool_timeout(&settings.agent, &settings.integrations));

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(server: &ServerSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if server.host.is_empty() {
            errors.push(ValidationError::MissingField("server.host".to_string()));
        }

        if server.port == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_agent(agent: &AgentConfig) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let positive = [
            ("agent.max_iterations", agent.max_iterations as u64),
            ("agent.llm_timeout_seconds", agent.llm_timeout_seconds),
            ("agent.tool_timeout_seconds", agent.tool_timeout_seconds),
            ("agent.scoring.max_attempts", agent.scoring.max_attempts as u64),
        ];
        for (field, value) in positive {
            if value == 0 {
                errors.push(ValidationError::InvalidValue {
                    field: field.to_string(),
                    reason: "Must be greater than 0".to_string(),
                });
            }
        }

        Self::validate_sampling("agent.research", &agent.research, &mut errors);
        Self::validate_sampling("agent.scoring.sampling", &agent.scoring.sampling, &mut errors);
        Self::validate_sampling("agent.analysis", &agent.analysis, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_sampling(prefix: &str, sampling: &SamplingConfig, errors: &mut Vec<ValidationError>) {
        if let Some(temperature) = sampling.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                errors.push(ValidationError::InvalidValue {
                    field: format!("{}.temperature", prefix),
                    reason: format!("{} is outside [0, 2]", temperature),
                });
            }
        }

        if sampling.max_tokens == Some(0) {
            errors.push(ValidationError::InvalidValue {
                field: format!("{}.max_tokens", prefix),
                reason: "Must be greater than 0".to_string(),
            });
        }
    }

    fn validate_integrations(integrations: &IntegrationSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let timeouts = [
            ("integrations.actor_timeout_seconds", integrations.actor_timeout_seconds),
            ("integrations.search_timeout_seconds", integrations.search_timeout_seconds),
            ("integrations.browse_timeout_seconds", integrations.browse_timeout_seconds),
        ];
        for (field, value) in timeouts {
            if value == 0 {
                errors.push(ValidationError::InvalidValue {
                    field: field.to_string(),
                    reason: "Must be greater than 0".to_string(),
                });
            }
        }

        let env_names = [
            ("integrations.apify_token_env", &integrations.apify_token_env),
            ("integrations.google_search_key_env", &integrations.google_search_key_env),
            ("integrations.google_search_engine_id_env", &integrations.google_search_engine_id_env),
        ];
        for (field, value) in env_names {
            if value.trim().is_empty() {
                errors.push(ValidationError::MissingField(field.to_string()));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// The loop's tool timeout has to outlast each collaborator's own timeout
    fn validate_tool_timeout(
        agent: &AgentConfig,
        integrations: &IntegrationSettings,
    ) -> Vec<ValidationError> {
        if agent.tool_timeout_seconds == 0 {
            return Vec::new();
        }

        [
            ("integrations.actor_timeout_seconds", integrations.actor_timeout_seconds),
            ("integrations.search_timeout_seconds", integrations.search_timeout_seconds),
            ("integrations.browse_timeout_seconds", integrations.browse_timeout_seconds),
        ]
        .into_iter()
        .filter(|(_, value)| *value >= agent.tool_timeout_seconds)
        .map(|(field, value)| ValidationError::InvalidValue {
            field: "agent.tool_timeout_seconds".to_string(),
            reason: format!("Must be greater than {} ({}s)", field, value),
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ServerSettings, Settings};

    fn settings() -> Settings {
        Settings {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 8000,
            },
            llm: Default::default(),
            agent: Default::default(),
            integrations: Default::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        let result = ConfigValidator::validate(&settings());
        assert!(result.is_ok());
    }

    #[test]
    fn test_invalid_port() {
        let mut settings = settings();
        settings.server.port = 0;

        let result = ConfigValidator::validate(&settings);
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_tool_timeout_must_outlast_integration_timeouts() {
        let mut settings = settings();
        settings.agent.tool_timeout_seconds = 90;

        let errors = ConfigValidator::validate(&settings).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "Invalid value for agent.tool_timeout_seconds: \
             Must be greater than integrations.actor_timeout_seconds (120s)"
        );

        settings.integrations.actor_timeout_seconds = 60;
        assert!(ConfigValidator::validate(&settings).is_ok());
    }

    #[test]
    fn test_every_violation_is_reported() {
        let mut settings = settings();
        settings.server.host = String::new();
        settings.agent.max_iterations = 0;
        settings.agent.scoring.max_attempts = 0;
        settings.agent.research.temperature = Some(3.5);
        settings.integrations.browse_timeout_seconds = 0;

        let errors = ConfigValidator::validate(&settings).unwrap_err();
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();

        assert_eq!(errors.len(), 5);
        assert!(messages.contains(&"Missing required field: server.host".to_string()));
        assert!(messages
            .iter()
            .any(|m| m.starts_with("Invalid value for agent.research.temperature")));
        assert!(messages
            .iter()
            .any(|m| m.contains("integrations.browse_timeout_seconds")));
    }
}
