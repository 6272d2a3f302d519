//! Bridging SDK stand-in used when no SDK binding is linked.
//!
//! Every operation fails with [`BridgeError::NotConfigured`]; executors turn
//! that into an error result, so the chat flow still completes and the user
//! sees why nothing was sent.

use async_trait::async_trait;
use chainpilot_config::BridgeConfig;
use chainpilot_core::bridge::*;
use chainpilot_core::{BridgeError, Chain};
use std::fmt;
use std::time::Duration;

/// What a bridging SDK is constructed from: the network, one RPC endpoint
/// per chain and the signer keys.
#[derive(Clone)]
pub struct SdkConfig {
    pub network: String,
    pub ethereum_rpc: String,
    pub solana_rpc: String,
    pub eth_private_key: Option<String>,
    pub sol_private_key: Option<String>,
    pub gas_limit: u64,
}

impl SdkConfig {
    pub fn from_config(config: &BridgeConfig) -> Self {
        Self {
            network: config.network.clone(),
            ethereum_rpc: config.ethereum_rpc.clone(),
            solana_rpc: config.solana_rpc.clone(),
            eth_private_key: config.eth_private_key.clone(),
            sol_private_key: config.sol_private_key.clone(),
            gas_limit: config.gas_limit,
        }
    }

    pub fn rpc(&self, chain: Chain) -> &str {
        match chain {
            Chain::Ethereum => &self.ethereum_rpc,
            Chain::Solana => &self.solana_rpc,
        }
    }

    pub fn signer_key(&self, chain: Chain) -> Option<&str> {
        match chain {
            Chain::Ethereum => self.eth_private_key.as_deref(),
            Chain::Solana => self.sol_private_key.as_deref(),
        }
    }

    /// Environment variables naming the signer keys that are still unset.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        [(Chain::Ethereum, "ETH_PRIVATE_KEY"), (Chain::Solana, "SOL_PRIVATE_KEY")]
            .into_iter()
            .filter(|(chain, _)| self.signer_key(*chain).is_none_or(|k| k.trim().is_empty()))
            .map(|(_, var)| var)
            .collect()
    }
}

impl fmt::Debug for SdkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |key: &Option<String>| if key.is_some() { "[REDACTED]" } else { "None" };
        f.debug_struct("SdkConfig")
            .field("network", &self.network)
            .field("ethereum_rpc", &self.ethereum_rpc)
            .field("solana_rpc", &self.solana_rpc)
            .field("eth_private_key", &redact(&self.eth_private_key))
            .field("sol_private_key", &redact(&self.sol_private_key))
            .field("gas_limit", &self.gas_limit)
            .finish()
    }
}

pub struct UnconfiguredBridge {
    reason: String,
}

impl UnconfiguredBridge {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Stand-in for an SDK built from `config`. The reason names the
    /// missing signer keys first, then the missing SDK binding.
    pub fn from_sdk_config(config: &SdkConfig) -> Self {
        let missing = config.missing_keys();
        let reason = if missing.is_empty() {
            format!(
                "no bridging SDK is linked into this build (network {}, Ethereum RPC {}, Solana RPC {})",
                config.network,
                config.rpc(Chain::Ethereum),
                config.rpc(Chain::Solana)
            )
        } else {
            format!("{} required for bridging on {}", missing.join(" and "), config.network)
        };
        tracing::debug!(config = ?config, reason = %reason, "Bridging SDK unavailable");
        Self::new(reason)
    }

    fn fail<T>(&self) -> Result<T, BridgeError> {
        Err(BridgeError::NotConfigured(self.reason.clone()))
    }
}

impl Default for UnconfiguredBridge {
    fn default() -> Self {
        Self::new("no bridging SDK is linked into this build")
    }
}

#[async_trait]
impl BridgeSdk for UnconfiguredBridge {
    fn name(&self) -> &str {
        "unconfigured"
    }

    async fn token_id(&self, _chain: Chain, _address: &str) -> Result<TokenId, BridgeError> {
        self.fail()
    }

    async fn signer(&self, _chain: Chain, _gas_limit: Option<u64>) -> Result<Signer, BridgeError> {
        self.fail()
    }

    async fn wrapped_asset(&self, _chain: Chain, _token: &TokenId) -> Result<Option<TokenId>, BridgeError> {
        self.fail()
    }

    async fn create_attestation(&self, _token: &TokenId, _signer: &Signer) -> Result<Vec<TxId>, BridgeError> {
        self.fail()
    }

    async fn parse_transaction(&self, _tx: &TxId) -> Result<Vec<WormholeMessageId>, BridgeError> {
        self.fail()
    }

    async fn fetch_vaa(&self, _message: &WormholeMessageId, _timeout: Duration) -> Result<Option<Vaa>, BridgeError> {
        self.fail()
    }

    async fn submit_attestation(&self, _vaa: &Vaa, _signer: &Signer) -> Result<Vec<TxId>, BridgeError> {
        self.fail()
    }

    async fn supported_destination_tokens(&self, _token: &TokenId, _from: Chain, _to: Chain) -> Result<Vec<TokenId>, BridgeError> {
        self.fail()
    }

    async fn find_routes(&self, _request: &TransferRequest) -> Result<Vec<Route>, BridgeError> {
        self.fail()
    }

    async fn validate(&self, _route: &Route, _request: &TransferRequest, _amount: &str) -> Result<RouteValidation, BridgeError> {
        self.fail()
    }

    async fn quote(&self, _route: &Route, _request: &TransferRequest, _amount: &str) -> Result<Quote, BridgeError> {
        self.fail()
    }

    async fn initiate(
        &self,
        _route: &Route,
        _request: &TransferRequest,
        _sender: &Signer,
        _quote: &Quote,
        _recipient: &ChainAddress,
    ) -> Result<TransferReceipt, BridgeError> {
        self.fail()
    }

    async fn check_and_complete(
        &self,
        _route: &Route,
        _receipt: &TransferReceipt,
        _receiver: &Signer,
        _timeout: Duration,
    ) -> Result<TransferReceipt, BridgeError> {
        self.fail()
    }
}
