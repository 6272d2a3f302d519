//! Bridging SDK abstraction.
//!
//! The executors only sequence these calls and interpret success or failure;
//! the cross-chain mechanics live behind the trait. Every handle type here is
//! opaque to the agent layer apart from what it needs for logging.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::chain::Chain;
use crate::error::BridgeError;

/// A token on a specific chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenId {
    pub chain: Chain,
    pub address: String,
}

impl TokenId {
    pub fn new(chain: Chain, address: impl Into<String>) -> Self {
        Self {
            chain,
            address: address.into(),
        }
    }

    /// The wrapped native token of `chain`.
    pub fn native(chain: Chain) -> Self {
        Self::new(chain, chain.native_token_address())
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.chain, self.address)
    }
}

/// An address on a specific chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainAddress {
    pub chain: Chain,
    pub address: String,
}

/// A signer acquired from a private key and RPC endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signer {
    pub chain: Chain,
    pub address: ChainAddress,
    /// Opaque SDK reference.
    pub handle: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxId {
    pub chain: Chain,
    pub txid: String,
}

/// A Wormhole message emitted by a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WormholeMessageId {
    pub chain: Chain,
    pub emitter: String,
    pub sequence: u64,
}

/// A signed attestation from the guardian network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vaa {
    pub message: WormholeMessageId,
    /// Address of the attested token, as read from the payload.
    pub token_address: String,
    pub bytes: Vec<u8>,
}

/// Source and destination tokens for a routed transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    pub source: TokenId,
    pub destination: TokenId,
}

/// A route the resolver can use for a transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub name: String,
    /// Opaque SDK reference.
    pub handle: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteValidation {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub source_amount: String,
    pub destination_amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relay_fee: Option<String>,
}

/// State of a routed transfer as reported by the SDK.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub state: String,
    #[serde(default)]
    pub origin_txs: Vec<TxId>,
    #[serde(default)]
    pub destination_txs: Vec<TxId>,
}

/// The operations the executors need from a cross-chain bridging SDK.
#[async_trait]
pub trait BridgeSdk: Send + Sync {
    /// Name used in logs (e.g. "wormhole-mainnet").
    fn name(&self) -> &str;

    /// Resolve a token address on `chain`.
    async fn token_id(&self, chain: Chain, address: &str) -> Result<TokenId, BridgeError>;

    /// Acquire a signer for `chain`. `gas_limit` applies to EVM chains.
    async fn signer(&self, chain: Chain, gas_limit: Option<u64>) -> Result<Signer, BridgeError>;

    /// Look up the wrapped version of `token` on `chain`.
    /// `Ok(None)` means no wrapped asset exists yet.
    async fn wrapped_asset(&self, chain: Chain, token: &TokenId) -> Result<Option<TokenId>, BridgeError>;

    /// Create, sign and send the attestation for `token`.
    async fn create_attestation(&self, token: &TokenId, signer: &Signer) -> Result<Vec<TxId>, BridgeError>;

    /// Extract the Wormhole messages emitted by a transaction.
    async fn parse_transaction(&self, tx: &TxId) -> Result<Vec<WormholeMessageId>, BridgeError>;

    /// Fetch the signed VAA for an attestation. `Ok(None)` means retries ran out.
    async fn fetch_vaa(&self, message: &WormholeMessageId, timeout: Duration) -> Result<Option<Vaa>, BridgeError>;

    /// Submit an attestation on the destination chain.
    async fn submit_attestation(&self, vaa: &Vaa, signer: &Signer) -> Result<Vec<TxId>, BridgeError>;

    /// Tokens the resolver can deliver on `to` for `token` sent from `from`.
    async fn supported_destination_tokens(&self, token: &TokenId, from: Chain, to: Chain) -> Result<Vec<TokenId>, BridgeError>;

    /// Resolve the routes able to perform `request`, best first.
    async fn find_routes(&self, request: &TransferRequest) -> Result<Vec<Route>, BridgeError>;

    /// Check the route accepts `amount` (decimal string).
    async fn validate(&self, route: &Route, request: &TransferRequest, amount: &str) -> Result<RouteValidation, BridgeError>;

    async fn quote(&self, route: &Route, request: &TransferRequest, amount: &str) -> Result<Quote, BridgeError>;

    /// Start the transfer.
    async fn initiate(
        &self,
        route: &Route,
        request: &TransferRequest,
        sender: &Signer,
        quote: &Quote,
        recipient: &ChainAddress,
    ) -> Result<TransferReceipt, BridgeError>;

    /// Wait for the transfer to arrive and redeem it if needed.
    async fn check_and_complete(
        &self,
        route: &Route,
        receipt: &TransferReceipt,
        receiver: &Signer,
        timeout: Duration,
    ) -> Result<TransferReceipt, BridgeError>;
}
