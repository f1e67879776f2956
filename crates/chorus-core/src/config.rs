//! Chorus configuration
//!
//! Loaded from `~/.chorus/config.toml` (optional) and overlaid with
//! provider API keys from the environment.
//!
//! ```toml
//! [providers.anthropic]
//! api_key = "sk-ant-..."
//!
//! [providers.openai]
//! base_url = "http://localhost:8080/v1"
//!
//! [history]
//! threshold = 30
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::ai::providers::ProviderId;
use crate::constants;

/// Credentials and endpoint for one provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    /// Override for proxies and local gateways
    pub base_url: Option<String>,
}

impl ProviderSettings {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            base_url: None,
        }
    }

    /// API key, treating blank values as absent
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Configured base URL or the provider default, without a trailing slash
    pub fn base_url(&self, provider: ProviderId) -> String {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(provider.default_base_url())
            .trim_end_matches('/')
            .to_string()
    }
}

/// Per-provider settings, one table per provider in the TOML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub anthropic: ProviderSettings,
    pub openai: ProviderSettings,
    pub google: ProviderSettings,
    pub open_router: ProviderSettings,
}

impl ProvidersConfig {
    pub fn get(&self, provider: ProviderId) -> &ProviderSettings {
        match provider {
            ProviderId::Anthropic => &self.anthropic,
            ProviderId::OpenAI => &self.openai,
            ProviderId::Google => &self.google,
            ProviderId::OpenRouter => &self.open_router,
        }
    }

    pub fn get_mut(&mut self, provider: ProviderId) -> &mut ProviderSettings {
        match provider {
            ProviderId::Anthropic => &mut self.anthropic,
            ProviderId::OpenAI => &mut self.openai,
            ProviderId::Google => &mut self.google,
            ProviderId::OpenRouter => &mut self.open_router,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Message count above which older turns may be summarized
    pub threshold: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            threshold: constants::history::SUMMARY_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChorusConfig {
    pub providers: ProvidersConfig,
    pub history: HistoryConfig,
}

impl ChorusConfig {
    /// Load from `path` (if it exists), then apply the process environment
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let mut config = Self::load_from(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Override API keys from environment variables
    ///
    /// The first non-blank variable in `ProviderId::api_key_env_vars` wins
    /// over the file value. `lookup` is injected so tests never touch the
    /// process environment.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for &provider in ProviderId::all() {
            let key = provider
                .api_key_env_vars()
                .iter()
                .filter_map(|var| lookup(var).map(|value| (*var, value)))
                .find(|(_, value)| !value.trim().is_empty());
            if let Some((var, value)) = key {
                debug!("Using {} for {}", var, provider);
                self.providers.get_mut(provider).api_key = Some(value.trim().to_string());
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.history.threshold == 0 {
            bail!("history.threshold must be at least 1");
        }
        Ok(())
    }

    pub fn provider(&self, provider: ProviderId) -> &ProviderSettings {
        self.providers.get(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ChorusConfig::default();
        assert_eq!(config.history.threshold, constants::history::SUMMARY_THRESHOLD);
        for &provider in ProviderId::all() {
            assert!(config.provider(provider).api_key().is_none());
        }
    }

    #[test]
    fn test_parse_toml() {
        let config = ChorusConfig::from_toml(
            r#"
            [providers.anthropic]
            api_key = "sk-ant-test"

            [providers.open_router]
            api_key = "sk-or-test"
            base_url = "https://proxy.example.com/v1/"

            [history]
            threshold = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.provider(ProviderId::Anthropic).api_key(), Some("sk-ant-test"));
        assert_eq!(
            config.provider(ProviderId::OpenRouter).base_url(ProviderId::OpenRouter),
            "https://proxy.example.com/v1"
        );
        assert_eq!(
            config.provider(ProviderId::Google).base_url(ProviderId::Google),
            ProviderId::Google.default_base_url()
        );
        assert_eq!(config.history.threshold, 30);
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let err = ChorusConfig::from_toml("[history]\nthreshold = 0\n").unwrap_err();
        assert!(err.to_string().contains("threshold"));
    }

    #[test]
    fn test_blank_key_is_absent() {
        let settings = ProviderSettings::with_api_key("   ");
        assert!(settings.api_key().is_none());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config =
            ChorusConfig::from_toml("[providers.openai]\napi_key = \"from-file\"\n").unwrap();
        config.apply_env(env(&[("OPENAI_API_KEY", "from-env")]));
        assert_eq!(config.provider(ProviderId::OpenAI).api_key(), Some("from-env"));
    }

    #[test]
    fn test_blank_env_does_not_override() {
        let mut config =
            ChorusConfig::from_toml("[providers.openai]\napi_key = \"from-file\"\n").unwrap();
        config.apply_env(env(&[("OPENAI_API_KEY", "  ")]));
        assert_eq!(config.provider(ProviderId::OpenAI).api_key(), Some("from-file"));
    }

    #[test]
    fn test_google_env_fallback() {
        let mut config = ChorusConfig::default();
        config.apply_env(env(&[("GOOGLE_API_KEY", "g-key")]));
        assert_eq!(config.provider(ProviderId::Google).api_key(), Some("g-key"));

        let mut config = ChorusConfig::default();
        config.apply_env(env(&[("GOOGLE_API_KEY", "g-key"), ("GEMINI_API_KEY", "gem-key")]));
        assert_eq!(config.provider(ProviderId::Google).api_key(), Some("gem-key"));
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = ChorusConfig::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, ChorusConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[history]\nthreshold = 5\n").unwrap();
        let config = ChorusConfig::load_from(&path).unwrap();
        assert_eq!(config.history.threshold, 5);
    }

    #[test]
    fn test_invalid_file_names_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[history\n").unwrap();
        let err = ChorusConfig::load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("config.toml"));
    }
}
