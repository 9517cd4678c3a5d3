//! Configuration management.
//!
//! Handles provider selection and persistence of per-provider option
//! tables. Environment variables overlay the file so deployments can
//! inject credentials without writing them to disk.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

use crate::ai::{ProviderConfig, ProviderKind};

fn default_provider() -> ProviderKind {
    ProviderKind::OpenAI
}

fn default_version() -> u32 {
    1
}

/// Sage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Which backend answers questions. A deployment-time decision; there
    /// is no per-call provider switching.
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,
    /// Option table for the OpenAI provider
    #[serde(default)]
    pub openai: ProviderConfig,
    /// Option table for the Anthropic provider
    #[serde(default)]
    pub anthropic: ProviderConfig,
    /// Option table for self-hosted OpenAI-compatible servers
    #[serde(default)]
    pub local: ProviderConfig,
    /// Option table for Ollama
    #[serde(default)]
    pub ollama: ProviderConfig,
    /// Version of config schema (for future migrations)
    #[serde(default = "default_version")]
    pub version: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            openai: ProviderConfig::default(),
            anthropic: ProviderConfig::default(),
            local: ProviderConfig::default(),
            ollama: ProviderConfig::default(),
            version: 1,
        }
    }
}

impl Config {
    /// Get the config file path (~/.sage/config.toml)
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        Ok(home.join(".sage").join("config.toml"))
    }

    /// Check if config exists (i.e., not first run)
    pub fn exists() -> bool {
        Self::path().map(|p| p.exists()).unwrap_or(false)
    }

    /// Load config from disk, or return None if it doesn't exist
    pub fn load() -> Result<Option<Self>> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(Some(config))
    }

    /// Save config to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;

        // Ensure directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Option table for the given provider.
    pub fn provider_config(&self, kind: ProviderKind) -> &ProviderConfig {
        match kind {
            ProviderKind::OpenAI => &self.openai,
            ProviderKind::Anthropic => &self.anthropic,
            ProviderKind::Local => &self.local,
            ProviderKind::Ollama => &self.ollama,
        }
    }

    /// Overlay environment variables onto the loaded file. Called once at
    /// startup, before the orchestrator is constructed.
    pub fn apply_env(&mut self) {
        if let Ok(value) = std::env::var("SAGE_PROVIDER") {
            match ProviderKind::from_str(&value) {
                Ok(kind) => self.provider = kind,
                Err(err) => warn!(%value, error = %err, "ignoring SAGE_PROVIDER"),
            }
        }

        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                self.openai.api_key = Some(key);
            }
        }

        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            if !key.is_empty() {
                self.anthropic.api_key = Some(key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider, ProviderKind::OpenAI);
        assert_eq!(config.version, 1);
        assert!(config.openai.api_key.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.provider = ProviderKind::Ollama;
        config.ollama.model = Some("llama3.1:8b".to_string());

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.provider, ProviderKind::Ollama);
        assert_eq!(parsed.ollama.model.as_deref(), Some("llama3.1:8b"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            provider = "local"

            [local]
            base_url = "http://192.168.1.10:8000"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.provider, ProviderKind::Local);
        assert_eq!(
            parsed.local.base_url.as_deref(),
            Some("http://192.168.1.10:8000")
        );
        assert!(parsed.openai.api_key.is_none());
        assert_eq!(parsed.version, 1);
    }

    #[test]
    fn test_provider_config_lookup() {
        let mut config = Config::default();
        config.local.model = Some("sage-7b".to_string());
        assert_eq!(
            config.provider_config(ProviderKind::Local).model.as_deref(),
            Some("sage-7b")
        );
        assert!(config.provider_config(ProviderKind::Ollama).model.is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let home = tempfile::tempdir().unwrap();
        std::env::set_var("HOME", home.path());

        let mut config = Config::default();
        config.provider = ProviderKind::Local;
        config.local.model = Some("sage-7b".to_string());
        config.save().unwrap();

        let loaded = Config::load().unwrap().unwrap();
        assert_eq!(loaded.provider, ProviderKind::Local);
        assert_eq!(loaded.local.model.as_deref(), Some("sage-7b"));
    }
}
