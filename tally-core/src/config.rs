//! Configuration management
//!
//! Settings live in settings.json inside the tally directory:
//! ```json
//! {
//!   "provider": { "failureRate": 0.5, "maxBalance": 100, "latencyMs": 100, "seed": null }
//! }
//! ```
//! Keys this crate does not manage are preserved when saving.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::{RandomProviderSettings, DEFAULT_LATENCY};

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    provider: ProviderSection,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProviderSection {
    #[serde(default = "default_failure_rate")]
    failure_rate: f64,
    #[serde(default = "default_max_balance")]
    max_balance: u64,
    #[serde(default = "default_latency_ms")]
    latency_ms: u64,
    #[serde(default)]
    seed: Option<u64>,
}

fn default_failure_rate() -> f64 {
    0.5
}

fn default_max_balance() -> u64 {
    100
}

fn default_latency_ms() -> u64 {
    DEFAULT_LATENCY.as_millis() as u64
}

impl Default for ProviderSection {
    fn default() -> Self {
        Self {
            failure_rate: default_failure_rate(),
            max_balance: default_max_balance(),
            latency_ms: default_latency_ms(),
            seed: None,
        }
    }
}

/// Settings for the simulated balance provider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderConfig {
    pub failure_rate: f64,
    pub max_balance: u64,
    pub latency_ms: u64,
    pub seed: Option<u64>,
}

impl ProviderConfig {
    /// Settings for `RandomBalanceProvider`
    pub fn to_settings(&self) -> RandomProviderSettings {
        RandomProviderSettings {
            max_balance: self.max_balance,
            failure_rate: self.failure_rate,
            latency: Duration::from_millis(self.latency_ms),
            seed: self.seed,
        }
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.failure_rate) {
            bail!(
                "failureRate must be between 0 and 1, got {}",
                self.failure_rate
            );
        }
        Ok(())
    }
}

impl From<&ProviderSection> for ProviderConfig {
    fn from(section: &ProviderSection) -> Self {
        Self {
            failure_rate: section.failure_rate,
            max_balance: section.max_balance,
            latency_ms: section.latency_ms,
            seed: section.seed,
        }
    }
}

/// Tally configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: ProviderConfig,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        let raw = SettingsFile::default();
        Self {
            provider: ProviderConfig::from(&raw.provider),
            _raw_settings: raw,
        }
    }
}

impl Config {
    /// Load config from the tally directory
    ///
    /// Provider settings can be overridden with TALLY_FAILURE_RATE,
    /// TALLY_LATENCY_MS and TALLY_SEED (for CI/testing).
    pub fn load(tally_dir: &Path) -> Result<Self> {
        let mut config = Self::load_file(tally_dir)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.provider.validate()?;
        Ok(config)
    }

    /// Load settings.json without environment overrides
    pub fn load_file(tally_dir: &Path) -> Result<Self> {
        let settings_path = tally_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read {:?}", settings_path))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid settings file {:?}", settings_path))?
        } else {
            SettingsFile::default()
        };

        Ok(Self {
            provider: ProviderConfig::from(&raw.provider),
            _raw_settings: raw,
        })
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup("TALLY_FAILURE_RATE") {
            self.provider.failure_rate = value
                .trim()
                .parse()
                .with_context(|| format!("TALLY_FAILURE_RATE is not a number: {}", value))?;
        }
        if let Some(value) = lookup("TALLY_LATENCY_MS") {
            self.provider.latency_ms = value
                .trim()
                .parse()
                .with_context(|| format!("TALLY_LATENCY_MS is not a number: {}", value))?;
        }
        if let Some(value) = lookup("TALLY_SEED") {
            self.provider.seed = Some(
                value
                    .trim()
                    .parse()
                    .with_context(|| format!("TALLY_SEED is not a number: {}", value))?,
            );
        }
        Ok(())
    }

    /// Save config to the tally directory
    pub fn save(&self, tally_dir: &Path) -> Result<()> {
        self.provider.validate()?;
        let settings_path = tally_dir.join("settings.json");

        let mut settings = self._raw_settings.clone();
        settings.provider = ProviderSection {
            failure_rate: self.provider.failure_rate,
            max_balance: self.provider.max_balance,
            latency_ms: self.provider.latency_ms,
            seed: self.provider.seed,
        };

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }
}
