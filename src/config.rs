use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the docstream server.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Base URL of the vector indexing service that stores content units.
    pub sink_url: String,
    /// Optional API key forwarded to the indexing service.
    pub sink_api_key: Option<String>,
    /// Language-model provider used for conversation titles.
    pub llm_provider: LlmProvider,
    /// Model identifier passed to the provider.
    pub llm_model: Option<String>,
    /// Optional override for the Ollama base URL.
    pub ollama_url: Option<String>,
    /// Hard deadline for a single title-generation call, in seconds.
    pub title_timeout_secs: u64,
    /// Period of the ingestion liveness heartbeat, in seconds.
    pub heartbeat_secs: u64,
    /// Capacity of the conversation event broadcast channel.
    pub event_bus_capacity: usize,
    /// Trusted request header carrying the resolved caller identity.
    pub identity_header: String,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Supported language-model backends for title generation.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// No provider configured; titles fall back to the localized default.
    None,
    /// Local Ollama runtime.
    Ollama,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            sink_url: load_env("SINK_URL")?,
            sink_api_key: load_env_optional("SINK_API_KEY"),
            llm_provider: load_env_optional("LLM_PROVIDER")
                .unwrap_or_else(|| "none".to_string())
                .parse()
                .map_err(|()| ConfigError::InvalidValue("LLM_PROVIDER".to_string()))?,
            llm_model: load_env_optional("LLM_MODEL"),
            ollama_url: load_env_optional("OLLAMA_URL"),
            title_timeout_secs: parse_optional("TITLE_TIMEOUT_SECS")?.unwrap_or(120),
            heartbeat_secs: parse_optional("HEARTBEAT_SECS")?.unwrap_or(15),
            event_bus_capacity: parse_optional("EVENT_BUS_CAPACITY")?.unwrap_or(256),
            identity_header: load_env_optional("IDENTITY_HEADER")
                .unwrap_or_else(|| "x-user-email".to_string()),
            server_port: parse_optional("SERVER_PORT")?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

impl std::str::FromStr for LlmProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "ollama" => Ok(Self::Ollama),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        sink_url = %config.sink_url,
        llm_provider = ?config.llm_provider,
        heartbeat_secs = config.heartbeat_secs,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
