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

/// Runtime configuration for the Docsum server.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Completion provider used to generate segment and document summaries.
    pub completion_provider: CompletionProvider,
    /// Model identifier passed to the completion provider.
    pub completion_model: String,
    /// API key for the hosted OpenAI provider (required when selected).
    pub openai_api_key: Option<String>,
    /// Optional base URL override for the OpenAI API.
    pub openai_base_url: Option<String>,
    /// Optional base URL of the local Ollama runtime.
    pub ollama_url: Option<String>,
    /// Optional override for the per-segment word budget.
    pub summary_segment_words: Option<usize>,
    /// Optional cap on concurrent completion calls within one run.
    pub summary_max_concurrency: Option<usize>,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Supported completion backends for the summarization pipeline.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionProvider {
    /// Local Ollama runtime.
    Ollama,
    /// Hosted OpenAI chat completions API.
    OpenAI,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let completion_provider: CompletionProvider = load_env("COMPLETION_PROVIDER")?
            .parse()
            .map_err(|()| ConfigError::InvalidValue("COMPLETION_PROVIDER".to_string()))?;
        let openai_api_key = load_env_optional("OPENAI_API_KEY");
        if matches!(completion_provider, CompletionProvider::OpenAI) && openai_api_key.is_none() {
            return Err(ConfigError::MissingVariable("OPENAI_API_KEY".to_string()));
        }

        Ok(Self {
            completion_provider,
            completion_model: load_env("COMPLETION_MODEL")?,
            openai_api_key,
            openai_base_url: load_env_optional("OPENAI_BASE_URL"),
            ollama_url: load_env_optional("OLLAMA_URL"),
            summary_segment_words: load_env_optional("SUMMARY_SEGMENT_WORDS")
                .map(|value| {
                    value
                        .parse()
                        .ok()
                        .filter(|words| *words > 0)
                        .ok_or_else(|| {
                            ConfigError::InvalidValue("SUMMARY_SEGMENT_WORDS".to_string())
                        })
                })
                .transpose()?,
            summary_max_concurrency: load_env_optional("SUMMARY_MAX_CONCURRENCY")
                .map(|value| {
                    value
                        .parse()
                        .ok()
                        .filter(|limit| *limit > 0)
                        .ok_or_else(|| {
                            ConfigError::InvalidValue("SUMMARY_MAX_CONCURRENCY".to_string())
                        })
                })
                .transpose()?,
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

impl std::str::FromStr for CompletionProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
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
        completion_provider = ?config.completion_provider,
        completion_model = %config.completion_model,
        segment_words = ?config.summary_segment_words,
        max_concurrency = ?config.summary_max_concurrency,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
