//! Hub configuration: gateway endpoint, data-service URLs, and workflow
//! bounds. Defaults come from environment variables; a TOML file overrides
//! everything when supplied.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Text-generation endpoint (OpenAI-compatible chat completions).
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayEndpoint {
    pub url: String,
    #[serde(default = "default_api_key")]
    pub api_key: String,
    pub model: String,
}

/// Top-level hub configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    pub gateway: GatewayEndpoint,
    /// Base URL of the knowledge lookup service.
    #[serde(default = "default_kb_url")]
    pub kb_url: String,
    /// Base URL of the account service.
    #[serde(default = "default_account_url")]
    pub account_url: String,
    /// Base URL of the memory service.
    #[serde(default = "default_memory_url")]
    pub memory_url: String,
    /// Maximum KB hits requested per resolver pass.
    #[serde(default = "default_kb_result_limit")]
    pub kb_result_limit: usize,
    /// Hard cap on resolver passes per run; exceeding it stalls the run.
    #[serde(default = "default_resolver_cycle_cap")]
    pub resolver_cycle_cap: u32,
    /// Timeout applied to every external collaborator call, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_key() -> String {
    "not-needed".into()
}

fn default_kb_url() -> String {
    std::env::var("HUB_KB_URL").unwrap_or_else(|_| "http://localhost:9101".into())
}

fn default_account_url() -> String {
    std::env::var("HUB_ACCOUNT_URL").unwrap_or_else(|_| "http://localhost:9102".into())
}

fn default_memory_url() -> String {
    std::env::var("HUB_MEMORY_URL").unwrap_or_else(|_| "http://localhost:9103".into())
}

fn default_kb_result_limit() -> usize {
    5
}

fn default_resolver_cycle_cap() -> u32 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayEndpoint {
                url: std::env::var("HUB_GATEWAY_URL")
                    .unwrap_or_else(|_| "http://localhost:8080/v1".into()),
                api_key: std::env::var("HUB_GATEWAY_API_KEY")
                    .unwrap_or_else(|_| default_api_key()),
                model: std::env::var("HUB_GATEWAY_MODEL")
                    .unwrap_or_else(|_| "gpt-4o-mini".into()),
            },
            kb_url: default_kb_url(),
            account_url: default_account_url(),
            memory_url: default_memory_url(),
            kb_result_limit: default_kb_result_limit(),
            resolver_cycle_cap: default_resolver_cycle_cap(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl HubConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Timeout for external collaborator calls.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
