//! Configuration management for vizier.
//!
//! Configuration can be set via environment variables:
//! - `OPENROUTER_API_KEY` - Required. Your OpenRouter API key.
//! - `OPENROUTER_BASE_URL` - Optional. Chat-completions endpoint. Defaults to OpenRouter.
//! - `DEFAULT_MODEL` - Optional. The model to use. Defaults to `openai/gpt-4o-mini`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//! - `MAX_TOOL_ITERATIONS` - Optional. Bound on the tool-calling loop. Defaults to `8`.
//! - `TEMPERATURE` - Optional. Sampling temperature. Defaults to `0`.
//! - `N_SAMPLES` - Optional. Samples kept per profiled field. Defaults to `3`.
//! - `USE_TOOLS` - Optional. Let goal generation call tools. Defaults to `true`.

use thiserror::Error;

use crate::llm::OPENROUTER_API_URL;
use crate::util::env_var_bool;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenRouter API key
    pub api_key: String,

    /// Chat-completions endpoint
    pub base_url: String,

    /// Model identifier (OpenRouter format)
    pub default_model: String,

    pub host: String,

    pub port: u16,

    /// Maximum model round-trips in one tool-calling loop
    pub max_tool_iterations: usize,

    pub temperature: f64,

    /// Samples kept per profiled field
    pub n_samples: usize,

    /// Whether goal generation may call tools
    pub use_tools: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `OPENROUTER_API_KEY` is not set,
    /// and `ConfigError::InvalidValue` for unparseable numbers.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("OPENROUTER_API_KEY".to_string()))?;

        let base_url =
            std::env::var("OPENROUTER_BASE_URL").unwrap_or_else(|_| OPENROUTER_API_URL.to_string());

        let default_model =
            std::env::var("DEFAULT_MODEL").unwrap_or_else(|_| "openai/gpt-4o-mini".to_string());

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = parse_env("PORT", 3000u16)?;
        let max_tool_iterations = parse_env("MAX_TOOL_ITERATIONS", 8usize)?;
        let temperature = parse_env("TEMPERATURE", 0.0f64)?;
        let n_samples = parse_env("N_SAMPLES", 3usize)?;

        if max_tool_iterations == 0 {
            return Err(ConfigError::InvalidValue(
                "MAX_TOOL_ITERATIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            base_url,
            default_model,
            host,
            port,
            max_tool_iterations,
            temperature,
            n_samples,
            use_tools: env_var_bool("USE_TOOLS", true),
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(api_key: String, default_model: String) -> Self {
        Self {
            api_key,
            base_url: OPENROUTER_API_URL.to_string(),
            default_model,
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_tool_iterations: 8,
            temperature: 0.0,
            n_samples: 3,
            use_tools: true,
        }
    }
}

fn parse_env<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_defaults() {
        let config = Config::new("key".to_string(), "m".to_string());
        assert_eq!(config.base_url, OPENROUTER_API_URL);
        assert_eq!(config.max_tool_iterations, 8);
        assert!(config.use_tools);
    }

    #[test]
    fn parse_env_reports_bad_values() {
        // Variable names unique to this test so parallel tests do not interfere.
        std::env::set_var("VIZIER_TEST_PORT_BAD", "eighty");
        let err = parse_env("VIZIER_TEST_PORT_BAD", 1u16).unwrap_err();
        assert!(err.to_string().contains("VIZIER_TEST_PORT_BAD"));

        std::env::set_var("VIZIER_TEST_PORT_OK", " 8080 ");
        assert_eq!(parse_env("VIZIER_TEST_PORT_OK", 1u16).unwrap(), 8080);

        assert_eq!(parse_env("VIZIER_TEST_PORT_UNSET", 7u16).unwrap(), 7);
    }
}
