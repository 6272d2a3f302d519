//! Configuration loading, validation, and management for chainpilot.
//!
//! Loads configuration from `~/.chainpilot/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.chainpilot/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default completion provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per completion
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Agent behaviour (history cap, per-role models)
    #[serde(default)]
    pub agents: AgentsConfig,

    /// Bridging SDK endpoints, keys and timings
    #[serde(default)]
    pub bridge: BridgeConfig,

    /// Staking-rewards API
    #[serde(default)]
    pub staking: StakingConfig,

    /// Wormholescan explorer API
    #[serde(default)]
    pub explorer: ExplorerConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.2
}
fn default_max_tokens() -> u32 {
    1024
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("agents", &self.agents)
            .field("bridge", &self.bridge)
            .field("staking", &self.staking)
            .field("explorer", &self.explorer)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentsConfig {
    /// Turns kept per agent conversation. Oldest turns are evicted first;
    /// the system prompt is always sent. `0` disables the cap.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Model for the step planner (falls back to `default_model`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planner_model: Option<String>,

    /// Model for result summaries (falls back to `default_model`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_model: Option<String>,
}

fn default_history_limit() -> usize {
    40
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            planner_model: None,
            summary_model: None,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// "Mainnet", "Testnet" or "Devnet"
    #[serde(default = "default_network")]
    pub network: String,

    #[serde(default = "default_ethereum_rpc")]
    pub ethereum_rpc: String,

    #[serde(default = "default_solana_rpc")]
    pub solana_rpc: String,

    /// Falls back to `ETH_PRIVATE_KEY`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eth_private_key: Option<String>,

    /// Falls back to `SOL_PRIVATE_KEY`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sol_private_key: Option<String>,

    /// Gas limit for destination-chain EVM signers
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,

    /// Interval between wrapped-asset checks
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Upper bound on waiting for a wrapped asset after attestation
    #[serde(default = "default_wrap_wait_timeout_secs")]
    pub wrap_wait_timeout_secs: u64,

    /// Upper bound on fetching a signed VAA
    #[serde(default = "default_vaa_timeout_secs")]
    pub vaa_timeout_secs: u64,

    /// Upper bound on transfer completion
    #[serde(default = "default_transfer_timeout_secs")]
    pub transfer_timeout_secs: u64,

    /// Pause after quoting, before initiating a transfer
    #[serde(default = "default_pre_initiate_delay_ms")]
    pub pre_initiate_delay_ms: u64,

    /// Pause after initiating, before checking completion
    #[serde(default = "default_post_initiate_delay_ms")]
    pub post_initiate_delay_ms: u64,
}

fn default_network() -> String {
    "Mainnet".into()
}
fn default_ethereum_rpc() -> String {
    "https://eth.llamarpc.com".into()
}
fn default_solana_rpc() -> String {
    "https://api.mainnet-beta.solana.com".into()
}
fn default_gas_limit() -> u64 {
    2_500_000
}
fn default_poll_interval_secs() -> u64 {
    2
}
fn default_wrap_wait_timeout_secs() -> u64 {
    10 * 60
}
fn default_vaa_timeout_secs() -> u64 {
    25 * 60
}
fn default_transfer_timeout_secs() -> u64 {
    15 * 60
}
fn default_pre_initiate_delay_ms() -> u64 {
    2_000
}
fn default_post_initiate_delay_ms() -> u64 {
    3_000
}

impl BridgeConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn wrap_wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wrap_wait_timeout_secs)
    }

    pub fn vaa_timeout(&self) -> Duration {
        Duration::from_secs(self.vaa_timeout_secs)
    }

    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_secs(self.transfer_timeout_secs)
    }

    pub fn pre_initiate_delay(&self) -> Duration {
        Duration::from_millis(self.pre_initiate_delay_ms)
    }

    pub fn post_initiate_delay(&self) -> Duration {
        Duration::from_millis(self.post_initiate_delay_ms)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            ethereum_rpc: default_ethereum_rpc(),
            solana_rpc: default_solana_rpc(),
            eth_private_key: None,
            sol_private_key: None,
            gas_limit: default_gas_limit(),
            poll_interval_secs: default_poll_interval_secs(),
            wrap_wait_timeout_secs: default_wrap_wait_timeout_secs(),
            vaa_timeout_secs: default_vaa_timeout_secs(),
            transfer_timeout_secs: default_transfer_timeout_secs(),
            pre_initiate_delay_ms: default_pre_initiate_delay_ms(),
            post_initiate_delay_ms: default_post_initiate_delay_ms(),
        }
    }
}

impl std::fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("network", &self.network)
            .field("ethereum_rpc", &self.ethereum_rpc)
            .field("solana_rpc", &self.solana_rpc)
            .field("eth_private_key", &redact(&self.eth_private_key))
            .field("sol_private_key", &redact(&self.sol_private_key))
            .field("gas_limit", &self.gas_limit)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("wrap_wait_timeout_secs", &self.wrap_wait_timeout_secs)
            .field("vaa_timeout_secs", &self.vaa_timeout_secs)
            .field("transfer_timeout_secs", &self.transfer_timeout_secs)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct StakingConfig {
    #[serde(default = "default_staking_endpoint")]
    pub endpoint: String,

    /// Falls back to `STAKING_REWARDS_API_KEY`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Maximum reward options per lookup
    #[serde(default = "default_staking_limit")]
    pub limit: u32,
}

fn default_staking_endpoint() -> String {
    "https://api.stakingrewards.com/public/query".into()
}
fn default_staking_limit() -> u32 {
    15
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            endpoint: default_staking_endpoint(),
            api_key: None,
            limit: default_staking_limit(),
        }
    }
}

impl std::fmt::Debug for StakingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StakingConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &redact(&self.api_key))
            .field("limit", &self.limit)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    #[serde(default = "default_explorer_url")]
    pub base_url: String,
}

fn default_explorer_url() -> String {
    "https://api.wormholescan.io/api/v1".into()
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            base_url: default_explorer_url(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.chainpilot/config.toml).
    ///
    /// Environment overrides, see [`AppConfig::apply_env`]:
    /// - `CHAINPILOT_API_KEY`, then `OPENAI_API_KEY`, then `OPENROUTER_API_KEY`
    /// - `CHAINPILOT_PROVIDER`, `CHAINPILOT_MODEL`
    /// - `STAKING_REWARDS_API_KEY`, `ETH_PRIVATE_KEY`, `SOL_PRIVATE_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Fill in values from the environment. Secrets only fill gaps; provider
    /// and model always win over the file.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = lookup("CHAINPILOT_API_KEY")
                .or_else(|| lookup("OPENAI_API_KEY"))
                .or_else(|| lookup("OPENROUTER_API_KEY"));
        }

        if let Some(provider) = lookup("CHAINPILOT_PROVIDER") {
            self.default_provider = provider;
        }

        if let Some(model) = lookup("CHAINPILOT_MODEL") {
            self.default_model = model;
        }

        if self.staking.api_key.is_none() {
            self.staking.api_key = lookup("STAKING_REWARDS_API_KEY");
        }
        if self.bridge.eth_private_key.is_none() {
            self.bridge.eth_private_key = lookup("ETH_PRIVATE_KEY");
        }
        if self.bridge.sol_private_key.is_none() {
            self.bridge.sol_private_key = lookup("SOL_PRIVATE_KEY");
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".chainpilot")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        // A capped history still needs room for a turn, its reply and one
        // corrective exchange.
        if self.agents.history_limit != 0 && self.agents.history_limit < 4 {
            return Err(ConfigError::ValidationError(
                "agents.history_limit must be 0 (unbounded) or at least 4".into(),
            ));
        }

        if self.bridge.poll_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "bridge.poll_interval_secs must be > 0".into(),
            ));
        }

        for (name, url) in [
            ("bridge.ethereum_rpc", &self.bridge.ethereum_rpc),
            ("bridge.solana_rpc", &self.bridge.solana_rpc),
            ("staking.endpoint", &self.staking.endpoint),
            ("explorer.base_url", &self.explorer.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be an http(s) URL, got '{url}'"
                )));
            }
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Model used by the planner.
    pub fn planner_model(&self) -> &str {
        self.agents.planner_model.as_deref().unwrap_or(&self.default_model)
    }

    /// Model used for result summaries.
    pub fn summary_model(&self) -> &str {
        self.agents.summary_model.as_deref().unwrap_or(&self.default_model)
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            agents: AgentsConfig::default(),
            bridge: BridgeConfig::default(),
            staking: StakingConfig::default(),
            explorer: ExplorerConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
