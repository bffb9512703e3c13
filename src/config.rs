//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Agent simulation configuration
    pub simulation: SimulationConfig,
    /// OpenRouter API configuration
    pub openrouter: OpenRouterConfig,
    /// Policy document store configuration
    pub policy: PolicyConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Agent simulation configuration
///
/// Controls the cadence of the simulated agent run loop: every `tick`
/// an agent's progress advances by `increment` until it reaches 100.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    /// Interval between progress ticks
    pub tick: Duration,
    /// Progress added per tick (percentage points)
    pub increment: u8,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(500),
            increment: 10,
        }
    }
}

/// OpenRouter API configuration
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    /// API key (empty string if not configured)
    pub api_key: String,
    /// Base URL of the OpenRouter API
    pub base_url: String,
    /// Default model used for chat completions
    pub model: String,
    /// Default sampling temperature
    pub temperature: f32,
    /// Default completion token limit
    pub max_tokens: u32,
    /// Public URL of this deployment, sent as the HTTP referer
    pub referer: Option<String>,
}

/// Policy document store configuration
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    /// Optional directory of policy documents indexed at startup
    pub docs_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            simulation: SimulationConfig {
                tick: Duration::from_millis(
                    env::var("AGENT_TICK_MS")
                        .ok()
                        .and_then(|t| t.parse().ok())
                        .unwrap_or(500),
                ),
                increment: env::var("AGENT_TICK_INCREMENT")
                    .ok()
                    .and_then(|i| i.parse().ok())
                    .unwrap_or(10),
            },
            openrouter: OpenRouterConfig {
                api_key: env::var("OPENROUTER_API_KEY").unwrap_or_default(),
                base_url: env::var("OPENROUTER_BASE_URL")
                    .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string()),
                model: env::var("OPENROUTER_MODEL")
                    .unwrap_or_else(|_| "deepseek/deepseek-chat-v3.1:free".to_string()),
                temperature: env::var("OPENROUTER_TEMPERATURE")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(0.2),
                max_tokens: env::var("OPENROUTER_MAX_TOKENS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(300),
                referer: env::var("APP_PUBLIC_URL").ok(),
            },
            policy: PolicyConfig {
                docs_dir: env::var("POLICY_DOCS_DIR").ok(),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
