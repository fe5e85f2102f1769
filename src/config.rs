//! Configuration loading for agentweave.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Get the agentweave home directory (~/.agentweave).
pub fn get_home_dir() -> Result<PathBuf> {
    let home = directories::UserDirs::new()
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

    Ok(home.home_dir().join(".agentweave"))
}

/// Get the settings file path.
pub fn get_settings_path() -> Result<PathBuf> {
    Ok(get_home_dir()?.join("settings.json"))
}

/// Load settings from ~/.agentweave/settings.json
pub fn load_settings() -> Result<Settings> {
    load_settings_from(&get_settings_path()?)
}

/// Load settings from an explicit path.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Err(Error::Config(format!(
            "Settings file not found at {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    let settings: Settings = serde_json::from_str(&content)?;
    validate_settings(&settings)?;

    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Load settings or return default if not found.
pub fn load_settings_or_default() -> Settings {
    load_settings().unwrap_or_else(|e| {
        tracing::warn!("Failed to load settings: {}, using defaults", e);
        Settings::default()
    })
}

fn validate_settings(settings: &Settings) -> Result<()> {
    if settings.orchestrator.response_timeout_seconds == 0 {
        return Err(Error::Config(
            "orchestrator.response_timeout_seconds must be greater than zero".to_string(),
        ));
    }
    if settings.tools.timeout_seconds == 0 {
        return Err(Error::Config(
            "tools.timeout_seconds must be greater than zero".to_string(),
        ));
    }
    if !settings.tools.offline && settings.tools.base_url.trim().is_empty() {
        return Err(Error::Config(
            "tools.base_url is required unless tools.offline is set".to_string(),
        ));
    }
    Ok(())
}

/// Orchestrator configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrchestratorSettings {
    #[serde(default = "default_response_timeout_seconds")]
    pub response_timeout_seconds: u64,
    #[serde(default = "default_poll_batch_size")]
    pub poll_batch_size: usize,
}

fn default_response_timeout_seconds() -> u64 {
    30
}

fn default_poll_batch_size() -> usize {
    16
}

impl OrchestratorSettings {
    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.response_timeout_seconds)
    }
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            response_timeout_seconds: default_response_timeout_seconds(),
            poll_batch_size: default_poll_batch_size(),
        }
    }
}

/// Tool gateway configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ToolSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub api_key: Option<String>,
    #[serde(default = "default_tool_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_tool_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default)]
    pub offline: bool,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8700/tools".to_string()
}

fn default_tool_timeout_seconds() -> u64 {
    60
}

fn default_tool_retries() -> u32 {
    1
}

fn default_retry_backoff_ms() -> u64 {
    600
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_seconds: default_tool_timeout_seconds(),
            retries: default_tool_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            offline: false,
        }
    }
}

/// agentweave settings.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Settings {
    #[serde(default)]
    pub orchestrator: OrchestratorSettings,

    #[serde(default)]
    pub tools: ToolSettings,
}
