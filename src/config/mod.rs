//! Configuration module

use crate::classify::PromptKind;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listen address for the HTTP API
    pub listen: String,

    /// Provider definitions
    pub providers: Vec<ProviderSpec>,

    /// Classifier keyword lists
    pub classifier: ClassifierConfig,

    /// Log level
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration from file (synchronous)
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from file (async)
    pub async fn load_async<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        Self::from_str(&content)
    }

    /// Load from string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.providers.is_empty() {
            return Err(Error::config("At least one provider must be configured"));
        }

        let mut seen = HashSet::new();
        for provider in &self.providers {
            provider.validate()?;
            if !seen.insert(provider.name.as_str()) {
                return Err(Error::config(format!(
                    "Duplicate provider name: {}",
                    provider.name
                )));
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen: "127.0.0.1:8080".to_string(),
            providers: Vec::new(),
            classifier: ClassifierConfig::default(),
            log_level: Some("info".to_string()),
        }
    }
}

/// Static description of an upstream LLM backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSpec {
    /// Unique provider name
    pub name: String,

    /// Model identifier sent to the backend
    pub model: String,

    /// Price per token in USD
    pub cost_per_token: f64,

    /// Nominal latency in milliseconds
    pub latency_ms: u64,

    /// Requests admitted per rolling minute
    pub rate_limit_rpm: u32,

    /// Prompt types this provider is tuned for
    #[serde(default)]
    pub specialties: Vec<PromptKind>,

    /// Relative answer quality, 0.0 to 1.0
    pub quality_score: f64,

    /// Remote API settings; absent means the mock client is used
    #[serde(default)]
    pub api: Option<ApiConfig>,
}

impl ProviderSpec {
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::config("Provider name cannot be empty"));
        }
        if self.model.is_empty() {
            return Err(Error::config(format!("Provider {}: model cannot be empty", self.name)));
        }
        if self.cost_per_token <= 0.0 {
            return Err(Error::config(format!(
                "Provider {}: cost_per_token must be positive",
                self.name
            )));
        }
        if self.latency_ms == 0 {
            return Err(Error::config(format!(
                "Provider {}: latency_ms must be positive",
                self.name
            )));
        }
        if self.rate_limit_rpm == 0 {
            return Err(Error::config(format!(
                "Provider {}: rate_limit_rpm must be positive",
                self.name
            )));
        }
        if !(0.0..=1.0).contains(&self.quality_score) {
            return Err(Error::config(format!(
                "Provider {}: quality_score must be within [0, 1]",
                self.name
            )));
        }
        if let Some(api) = &self.api {
            api.validate(&self.name)?;
        }
        Ok(())
    }

    /// Check whether this provider is declared good at `kind`
    pub fn is_specialist(&self, kind: PromptKind) -> bool {
        self.specialties.contains(&kind)
    }
}

/// Remote API settings for an OpenAI-compatible backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL, e.g. "https://api.openai.com/v1"
    pub base_url: String,

    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl ApiConfig {
    fn validate(&self, provider: &str) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::config(format!(
                "Provider {}: api.base_url cannot be empty",
                provider
            )));
        }
        if self.api_key_env.is_empty() {
            return Err(Error::config(format!(
                "Provider {}: api.api_key_env cannot be empty",
                provider
            )));
        }
        Ok(())
    }
}

/// Classifier keyword lists; empty lists fall back to the built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ClassifierConfig {
    pub code: Vec<String>,
    pub writing: Vec<String>,
}

impl ClassifierConfig {
    /// Build the classifier, falling back to defaults for empty lists
    pub fn build(&self) -> crate::classify::Classifier {
        let code = if self.code.is_empty() {
            crate::classify::DEFAULT_CODE_KEYWORDS.clone()
        } else {
            self.code.clone()
        };
        let writing = if self.writing.is_empty() {
            crate::classify::DEFAULT_WRITING_KEYWORDS.clone()
        } else {
            self.writing.clone()
        };
        crate::classify::Classifier::new(code, writing)
    }
}

/// Minimal valid spec for unit tests across the crate
#[cfg(test)]
pub fn test_spec(name: &str) -> ProviderSpec {
    ProviderSpec {
        name: name.to_string(),
        model: format!("{}-model", name),
        cost_per_token: 0.00001,
        latency_ms: 500,
        rate_limit_rpm: 60,
        specialties: Vec::new(),
        quality_score: 0.8,
        api: None,
    }
}
