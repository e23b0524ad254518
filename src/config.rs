//! Application configuration
//!
//! Centralized configuration management loaded from environment variables.
//! The model provider settings have no defaults and must be supplied by the
//! environment; only the listening address falls back to a default.

use std::env;
use std::fmt;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Model provider configuration
    pub model: ModelConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Model provider configuration (OpenAI-compatible chat completions API)
#[derive(Clone)]
pub struct ModelConfig {
    /// Model identifier (e.g. "gpt-4o-mini")
    pub model: String,
    /// API credential
    pub api_key: String,
    /// API base URL (e.g. "https://api.openai.com/v1")
    pub base_url: String,
}

// Manual Debug so startup logging never prints the credential.
impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// `MODEL`, `API_KEY` and `BASE_URL` are required. `PORT` defaults to 3000
    /// and `HOST` to `0.0.0.0`.
    pub fn from_env() -> anyhow::Result<Self> {
        let model = env::var("MODEL")
            .map_err(|_| anyhow::anyhow!("MODEL environment variable is required"))?;
        let api_key = env::var("API_KEY")
            .map_err(|_| anyhow::anyhow!("API_KEY environment variable is required"))?;
        let base_url = env::var("BASE_URL")
            .map_err(|_| anyhow::anyhow!("BASE_URL environment variable is required"))?;

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(3000),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            model: ModelConfig {
                model,
                api_key,
                base_url: base_url.trim_end_matches('/').to_string(),
            },
        })
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_addr_format() {
        let config = Config {
            server: ServerConfig {
                port: 3000,
                host: "127.0.0.1".to_string(),
            },
            model: ModelConfig {
                model: "test-model".to_string(),
                api_key: "secret".to_string(),
                base_url: "http://localhost:9999/v1".to_string(),
            },
        };
        assert_eq!(config.server_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_model_config_debug_redacts_key() {
        let config = ModelConfig {
            model: "test-model".to_string(),
            api_key: "super-secret".to_string(),
            base_url: "http://localhost:9999/v1".to_string(),
        };
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
