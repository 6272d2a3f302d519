//! Action executors.
//!
//! An executor runs the side effect behind a completed agent and reports an
//! [`ExecutionResult`]. Executors never return errors: SDK and HTTP failures
//! become `status = error` so the remaining steps still run.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chainpilot_config::BridgeConfig;
use chainpilot_core::error::BridgeError;
use chainpilot_core::event::{LogLevel, LogMessage, LogSink};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::chat::ChatElement;

pub mod fast_transfer;
pub mod stake;
pub mod wrap;

pub use fast_transfer::FastTransferExecutor;
pub use stake::StakeExecutor;
pub use wrap::WrapExecutor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Error,
}

/// Outcome of an action, forwarded to the summary agent as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

impl ExecutionResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: ExecutionStatus::Success,
            message: message.into(),
            tx_hash: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ExecutionStatus::Error,
            message: message.into(),
            tx_hash: None,
        }
    }

    pub fn with_tx_hash(mut self, tx_hash: impl Into<String>) -> Self {
        self.tx_hash = Some(tx_hash.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
    }
}

#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub result: ExecutionResult,
    /// Extra element to render before the summary (e.g. staking options).
    pub display: Option<ChatElement>,
}

impl From<ExecutionResult> for ActionOutcome {
    fn from(result: ExecutionResult) -> Self {
        Self {
            result,
            display: None,
        }
    }
}

/// Performs the side effect for a validated request `R`.
#[async_trait]
pub trait ActionExecutor<R: Send + Sync>: Send + Sync {
    async fn execute(&self, request: &R) -> ActionOutcome;
}

/// Timing and gas settings shared by the bridge executors.
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    pub gas_limit: u64,
    pub poll_interval: Duration,
    pub wrap_wait_timeout: Duration,
    pub vaa_timeout: Duration,
    pub transfer_timeout: Duration,
    pub pre_initiate_delay: Duration,
    pub post_initiate_delay: Duration,
}

impl BridgeSettings {
    pub fn from_config(config: &BridgeConfig) -> Self {
        Self {
            gas_limit: config.gas_limit,
            poll_interval: config.poll_interval(),
            wrap_wait_timeout: config.wrap_wait_timeout(),
            vaa_timeout: config.vaa_timeout(),
            transfer_timeout: config.transfer_timeout(),
            pre_initiate_delay: config.pre_initiate_delay(),
            post_initiate_delay: config.post_initiate_delay(),
        }
    }
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self::from_config(&BridgeConfig::default())
    }
}

/// Progress log for one executor: every entry goes to `tracing` and to the
/// injected sink.
#[derive(Clone)]
pub struct ActionLog {
    source: &'static str,
    sink: Arc<dyn LogSink>,
}

impl ActionLog {
    pub fn new(source: &'static str, sink: Arc<dyn LogSink>) -> Self {
        Self { source, sink }
    }

    pub fn info(&self, message: impl Into<String>) {
        let message = message.into();
        info!(source = self.source, "{message}");
        self.sink.emit(LogMessage::new(self.source, LogLevel::Info, message));
    }

    pub fn success(&self, message: impl Into<String>) {
        let message = message.into();
        info!(source = self.source, success = true, "{message}");
        self.sink.emit(LogMessage::new(self.source, LogLevel::Success, message));
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        error!(source = self.source, "{message}");
        self.sink.emit(LogMessage::new(self.source, LogLevel::Error, message));
    }
}

/// Sleep for `duration` unless the session is cancelled first.
pub(crate) async fn pause(
    duration: Duration,
    cancel: &CancellationToken,
    what: &str,
) -> Result<(), BridgeError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(BridgeError::Cancelled(what.to_string())),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted bridge used by the executor tests.

    use async_trait::async_trait;
    use chainpilot_core::bridge::*;
    use chainpilot_core::{BridgeError, Chain};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Happy-path bridge with switches for the failure branches.
    #[derive(Default)]
    pub struct ScriptedBridge {
        /// `wrapped_asset` returns `None` this many times before succeeding;
        /// `None` = never appears.
        pub wrapped_after: Option<usize>,
        pub no_vaa: bool,
        pub no_routes: bool,
        pub invalid_route: Option<String>,
        pub quote_error: Option<String>,
        pub calls: Mutex<Vec<String>>,
        pub wrapped_checks: Mutex<usize>,
    }

    impl ScriptedBridge {
        pub fn called(&self, name: &str) -> bool {
            self.calls.lock().unwrap().iter().any(|c| c == name)
        }

        pub fn count(&self, name: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|c| *c == name).count()
        }

        fn record(&self, name: &str) {
            self.calls.lock().unwrap().push(name.to_string());
        }
    }

    fn tx(chain: Chain, id: &str) -> TxId {
        TxId {
            chain,
            txid: id.to_string(),
        }
    }

    #[async_trait]
    impl BridgeSdk for ScriptedBridge {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn token_id(&self, chain: Chain, address: &str) -> Result<TokenId, BridgeError> {
            self.record("token_id");
            Ok(TokenId::new(chain, address))
        }

        async fn signer(&self, chain: Chain, _gas_limit: Option<u64>) -> Result<Signer, BridgeError> {
            self.record("signer");
            Ok(Signer {
                chain,
                address: ChainAddress {
                    chain,
                    address: format!("{chain}-signer"),
                },
                handle: "h".into(),
            })
        }

        async fn wrapped_asset(&self, chain: Chain, _token: &TokenId) -> Result<Option<TokenId>, BridgeError> {
            self.record("wrapped_asset");
            let mut checks = self.wrapped_checks.lock().unwrap();
            let seen = *checks;
            *checks += 1;
            Ok(match self.wrapped_after {
                Some(n) if seen >= n => Some(TokenId::new(chain, "0xwrapped")),
                _ => None,
            })
        }

        async fn create_attestation(&self, token: &TokenId, _signer: &Signer) -> Result<Vec<TxId>, BridgeError> {
            self.record("create_attestation");
            Ok(vec![tx(token.chain, "attest-tx")])
        }

        async fn parse_transaction(&self, tx: &TxId) -> Result<Vec<WormholeMessageId>, BridgeError> {
            self.record("parse_transaction");
            Ok(vec![WormholeMessageId {
                chain: tx.chain,
                emitter: "emitter".into(),
                sequence: 7,
            }])
        }

        async fn fetch_vaa(&self, message: &WormholeMessageId, _timeout: Duration) -> Result<Option<Vaa>, BridgeError> {
            self.record("fetch_vaa");
            Ok((!self.no_vaa).then(|| Vaa {
                message: message.clone(),
                token_address: "0xtoken".into(),
                bytes: vec![1, 2, 3],
            }))
        }

        async fn submit_attestation(&self, vaa: &Vaa, signer: &Signer) -> Result<Vec<TxId>, BridgeError> {
            self.record("submit_attestation");
            let _ = vaa;
            Ok(vec![tx(signer.chain, "submit-tx")])
        }

        async fn supported_destination_tokens(&self, _token: &TokenId, _from: Chain, to: Chain) -> Result<Vec<TokenId>, BridgeError> {
            self.record("supported_destination_tokens");
            Ok(vec![TokenId::native(to)])
        }

        async fn find_routes(&self, _request: &TransferRequest) -> Result<Vec<Route>, BridgeError> {
            self.record("find_routes");
            if self.no_routes {
                return Ok(Vec::new());
            }
            Ok(vec![Route {
                name: "fast-route".into(),
                handle: "r".into(),
            }])
        }

        async fn validate(&self, _route: &Route, _request: &TransferRequest, _amount: &str) -> Result<RouteValidation, BridgeError> {
            self.record("validate");
            Ok(RouteValidation {
                valid: self.invalid_route.is_none(),
                error: self.invalid_route.clone(),
            })
        }

        async fn quote(&self, _route: &Route, _request: &TransferRequest, amount: &str) -> Result<Quote, BridgeError> {
            self.record("quote");
            if let Some(e) = &self.quote_error {
                return Err(BridgeError::Quote(e.clone()));
            }
            Ok(Quote {
                source_amount: amount.to_string(),
                destination_amount: "0.05".into(),
                eta_secs: Some(30),
                relay_fee: None,
            })
        }

        async fn initiate(
            &self,
            _route: &Route,
            request: &TransferRequest,
            _sender: &Signer,
            _quote: &Quote,
            _recipient: &ChainAddress,
        ) -> Result<TransferReceipt, BridgeError> {
            self.record("initiate");
            Ok(TransferReceipt {
                state: "SourceInitiated".into(),
                origin_txs: vec![tx(request.source.chain, "0xorigin")],
                destination_txs: Vec::new(),
            })
        }

        async fn check_and_complete(
            &self,
            _route: &Route,
            receipt: &TransferReceipt,
            _receiver: &Signer,
            _timeout: Duration,
        ) -> Result<TransferReceipt, BridgeError> {
            self.record("check_and_complete");
            Ok(TransferReceipt {
                state: "DestinationFinalized".into(),
                origin_txs: receipt.origin_txs.clone(),
                destination_txs: vec![tx(Chain::Solana, "dest-sig")],
            })
        }
    }
}
