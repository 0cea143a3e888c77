use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod validator;

use crate::adapters::apify::ApifyActors;
use crate::agents::config::{AgentConfig, LlmProviderConfig};
use crate::cli::Cli;

/// Default configuration file, looked up relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "prospector.toml";

/// Prefix of environment overrides (`PROSPECTOR__SERVER__PORT=8080`)
pub const ENV_PREFIX: &str = "PROSPECTOR";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub llm: LlmProviderConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub integrations: IntegrationSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Where the research collaborators live and how long to wait for them
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IntegrationSettings {
    /// Environment variable holding the Apify API token
    #[serde(default = "default_apify_token_env")]
    pub apify_token_env: String,
    /// Environment variable holding the Google API key
    #[serde(default = "default_google_key_env")]
    pub google_search_key_env: String,
    /// Environment variable holding the programmable search engine id
    #[serde(default = "default_google_engine_env")]
    pub google_search_engine_id_env: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apify_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_search_endpoint: Option<String>,
    /// Upper bound for one synchronous actor run
    #[serde(default = "default_actor_timeout")]
    pub actor_timeout_seconds: u64,
    #[serde(default = "default_search_timeout")]
    pub search_timeout_seconds: u64,
    #[serde(default = "default_browse_timeout")]
    pub browse_timeout_seconds: u64,
    #[serde(default)]
    pub actors: ApifyActors,
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        Self {
            apify_token_env: default_apify_token_env(),
            google_search_key_env: default_google_key_env(),
            google_search_engine_id_env: default_google_engine_env(),
            apify_base_url: None,
            google_search_endpoint: None,
            actor_timeout_seconds: default_actor_timeout(),
            search_timeout_seconds: default_search_timeout(),
            browse_timeout_seconds: default_browse_timeout(),
            actors: ApifyActors::default(),
        }
    }
}

fn default_apify_token_env() -> String {
    "APIFY_TOKEN".to_string()
}

fn default_google_key_env() -> String {
    "GOOGLE_SEARCH_KEY".to_string()
}

fn default_google_engine_env() -> String {
    "GOOGLE_SEARCH_ENGINE_ID".to_string()
}

fn default_actor_timeout() -> u64 {
    120
}

fn default_search_timeout() -> u64 {
    10
}

fn default_browse_timeout() -> u64 {
    10
}

/// Secrets resolved from the environment at startup
#[derive(Clone)]
pub struct Credentials {
    pub openai_key: String,
    pub apify_token: String,
    pub google_search_key: String,
    pub google_search_engine_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").finish_non_exhaustive()
    }
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_path(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Create settings from CLI arguments (includes config file and CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let mut settings = Self::load(&cli.config)?;

        // Apply CLI overrides (CLI > env vars > config file)
        settings.apply_cli_overrides(cli);

        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate settings from an optional file plus the environment
    pub fn from_path(path: &Path) -> Result<Self, anyhow::Error> {
        let settings = Self::load(path)?;
        settings.validate()?;
        Ok(settings)
    }

    fn load(path: &Path) -> Result<Self, anyhow::Error> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(s.try_deserialize()?)
    }

    /// Apply CLI argument overrides to settings
    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })
    }

    /// Read every credential from the process environment
    pub fn credentials(&self) -> Result<Credentials, anyhow::Error> {
        self.resolve_credentials(|name| std::env::var(name).ok())
    }

    /// Resolve credentials through `lookup`, reporting every missing variable at once
    pub fn resolve_credentials<F>(&self, lookup: F) -> Result<Credentials, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut read = |name: &str| match lookup(name).filter(|value| !value.trim().is_empty()) {
            Some(value) => value,
            None => {
                missing.push(name.to_string());
                String::new()
            }
        };

        let credentials = Credentials {
            apify_token: read(&self.integrations.apify_token_env),
            openai_key: read(&self.llm.api_key_env),
            google_search_key: read(&self.integrations.google_search_key_env),
            google_search_engine_id: read(&self.integrations.google_search_engine_id_env),
        };

        if missing.is_empty() {
            Ok(credentials)
        } else {
            Err(anyhow::anyhow!(
                "Required configuration values are missing: {}",
                missing.join(", ")
            ))
        }
    }
}
