//! Configuration Management
//!
//! Provider settings stored in `<config dir>/azsqlpool/config.json`, with the
//! environment as fallback. Command-line flags override both.

use crate::azure::auth::AzureCredentials;
use crate::azure::client::{AzureClient, DEFAULT_ENDPOINT, DEFAULT_POLL_INTERVAL, SQL_API_VERSION};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const SUBSCRIPTION_ENV_VARS: &[&str] = &["ARM_SUBSCRIPTION_ID", "AZURE_SUBSCRIPTION_ID"];
const ENDPOINT_ENV_VAR: &str = "ARM_ENDPOINT";

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Subscription the pools live in
    #[serde(default)]
    pub subscription_id: Option<String>,
    /// Management endpoint, e.g. for sovereign clouds
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_version: Option<String>,
    /// Fallback delay between long-running operation polls
    #[serde(default)]
    pub poll_interval_secs: Option<u64>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("azsqlpool").join("config.json"))
    }

    /// Load configuration from disk; a missing or unreadable file yields defaults
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk; without a config directory nothing is written
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get effective subscription (CLI > config > environment)
    pub fn effective_subscription(&self) -> Option<String> {
        self.subscription_id
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| {
                SUBSCRIPTION_ENV_VARS
                    .iter()
                    .find_map(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))
            })
    }

    /// Get effective endpoint (CLI > config > environment > public cloud)
    pub fn effective_endpoint(&self) -> String {
        self.endpoint
            .clone()
            .or_else(|| std::env::var(ENDPOINT_ENV_VAR).ok())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    pub fn effective_api_version(&self) -> String {
        self.api_version
            .clone()
            .unwrap_or_else(|| SQL_API_VERSION.to_string())
    }

    pub fn effective_poll_interval(&self) -> Duration {
        self.poll_interval_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL)
    }

    /// Build a client from this configuration and the given credentials
    pub fn build_client(&self, credentials: AzureCredentials) -> Result<AzureClient> {
        let subscription = self.effective_subscription().context(
            "No Azure subscription configured. Set ARM_SUBSCRIPTION_ID or use --subscription",
        )?;

        let endpoint = self.effective_endpoint();
        let parsed = url::Url::parse(&endpoint)
            .with_context(|| format!("Invalid management endpoint {:?}", endpoint))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("Management endpoint must be http(s): {}", endpoint);
        }

        let client = AzureClient::new(credentials, &subscription)
            .context("Failed to create HTTP client")?
            .with_endpoint(parsed.as_str())
            .with_api_version(&self.effective_api_version())
            .with_poll_interval(self.effective_poll_interval());

        tracing::info!(
            "Using subscription: {}, endpoint: {}",
            client.subscription_id,
            client.endpoint
        );

        Ok(client)
    }
}
