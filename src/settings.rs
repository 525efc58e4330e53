// src/settings.rs
//
// Layered settings: optional Config.toml, then TXV__* environment variables.

use crate::cache::{CacheError, CacheLimits, CACHE_DELETE_COUNT, CACHE_MAX_SIZE};
use crate::chains::{validate_chains, ChainId, ChainValidationError};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;

/// Default config file, looked up relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "Config.toml";

/// Comma list or JSON array of chain ids, overrides `verifier.chain_ids`.
pub const CHAIN_IDS_ENV: &str = "TXV_CHAIN_IDS";

#[derive(Debug, Deserialize, Clone)]
pub struct CacheSettings {
    #[serde(default = "default_max_size")]
    pub max_size: usize,
    #[serde(default = "default_delete_count")]
    pub delete_count: usize,
}

fn default_max_size() -> usize {
    CACHE_MAX_SIZE
}
fn default_delete_count() -> usize {
    CACHE_DELETE_COUNT
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
            delete_count: default_delete_count(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Verifier {
    #[serde(default = "default_chain_ids")]
    pub chain_ids: Vec<u64>,
}

fn default_chain_ids() -> Vec<u64> {
    vec![ChainId::ETHEREUM.0 as u64]
}

impl Default for Verifier {
    fn default() -> Self {
        Self {
            chain_ids: default_chain_ids(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Service {
    #[serde(default = "default_trim_interval_ms")]
    pub trim_interval_ms: u64,
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_trim_interval_ms() -> u64 {
    1_000
}
fn default_channel_capacity() -> usize {
    1_024
}

impl Default for Service {
    fn default() -> Self {
        Self {
            trim_interval_ms: default_trim_interval_ms(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl Service {
    pub fn trim_interval(&self) -> Duration {
        Duration::from_millis(self.trim_interval_ms.max(1))
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub verifier: Verifier,
    #[serde(default)]
    pub service: Service,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Chains(#[from] ChainValidationError),
    #[error("invalid TXV_CHAIN_IDS value: {0}")]
    ChainIdsEnv(String),
}

impl Settings {
    /// Loads `Config.toml` if present, then `TXV__*` environment variables.
    pub fn new() -> Result<Self, SettingsError> {
        Self::load(Path::new(DEFAULT_CONFIG_FILE), false)
    }

    /// Loads settings from an explicit file that must exist.
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        Self::load(path, true)
    }

    fn load(path: &Path, required: bool) -> Result<Self, SettingsError> {
        let s = Config::builder()
            .add_source(File::from(path).required(required))
            .add_source(Environment::with_prefix("TXV").separator("__"))
            .build()?;

        let mut settings: Self = s.try_deserialize()?;

        if let Ok(raw) = env::var(CHAIN_IDS_ENV) {
            let ids = parse_chain_id_list(&raw).ok_or_else(|| SettingsError::ChainIdsEnv(raw.clone()))?;
            if !ids.is_empty() {
                settings.verifier.chain_ids = ids;
            }
        }

        Ok(settings)
    }

    pub fn cache_limits(&self) -> Result<CacheLimits, CacheError> {
        CacheLimits::new(self.cache.max_size, self.cache.delete_count)
    }

    pub fn enabled_chains(&self) -> Result<Vec<ChainId>, ChainValidationError> {
        validate_chains(&self.verifier.chain_ids)
    }

    /// Fails on the first configuration problem, before anything is allocated.
    pub fn validate(&self) -> Result<(CacheLimits, Vec<ChainId>), SettingsError> {
        Ok((self.cache_limits()?, self.enabled_chains()?))
    }
}

/// Accepts `2,10002`, `2 10002` or `[2, 10002]`. Returns `None` on any bad entry.
pub fn parse_chain_id_list(input: &str) -> Option<Vec<u64>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Some(vec![]);
    }
    if trimmed.starts_with('[') {
        return serde_json::from_str::<Vec<u64>>(trimmed).ok();
    }
    trimmed
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<u64>().ok())
        .collect()
}
