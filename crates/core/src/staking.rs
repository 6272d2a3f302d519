//! Staking-rewards lookup abstraction.
//!
//! A single read-only query returning reward options ranked by reward rate,
//! each with its output asset, provider and a handful of metrics.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

pub const DEFAULT_TYPE_KEY: &str = "liquid-staking";

/// Filter for a reward-option lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingQuery {
    pub symbols: Vec<String>,
    pub type_keys: Vec<String>,
    pub limit: u32,
}

impl Default for StakingQuery {
    fn default() -> Self {
        Self {
            symbols: vec!["ETH".into(), "SOL".into()],
            type_keys: vec![DEFAULT_TYPE_KEY.into()],
            limit: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingProvider {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub label: String,
    pub metric_key: String,
    #[serde(default)]
    pub default_value: Option<f64>,
}

/// One ranked staking opportunity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardOption {
    #[serde(default)]
    pub output_assets: Vec<Asset>,
    #[serde(default)]
    pub providers: Vec<StakingProvider>,
    #[serde(default)]
    pub metrics: Vec<Metric>,
}

impl RewardOption {
    pub fn asset(&self) -> Option<&Asset> {
        self.output_assets.first()
    }

    pub fn provider(&self) -> Option<&StakingProvider> {
        self.providers.first()
    }

    pub fn metric(&self, key: &str) -> Option<f64> {
        self.metrics
            .iter()
            .find(|m| m.metric_key == key)
            .and_then(|m| m.default_value)
    }

    /// Annual reward rate in percent.
    pub fn reward_rate(&self) -> Option<f64> {
        self.metric("reward_rate")
    }

    /// The follow-up request a user sends when picking this option.
    pub fn stake_prompt(&self) -> String {
        let symbol = self.asset().map(|a| a.symbol.as_str()).unwrap_or_default();
        let provider = self.provider().map(|p| p.name.as_str()).unwrap_or_default();
        format!("I want to stake {symbol} on {provider}")
    }
}

/// Read-only staking-rewards query service.
#[async_trait]
pub trait StakingRewards: Send + Sync {
    async fn reward_options(&self, query: &StakingQuery) -> Result<Vec<RewardOption>, ServiceError>;
}
