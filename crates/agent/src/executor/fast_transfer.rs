//! Fast-finality transfer through the best available route.

use std::sync::Arc;

use async_trait::async_trait;
use chainpilot_core::bridge::{BridgeSdk, ChainAddress, TransferRequest};
use chainpilot_core::error::BridgeError;
use chainpilot_core::event::LogSink;
use chainpilot_core::Chain;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use super::{ActionExecutor, ActionLog, ActionOutcome, BridgeSettings, ExecutionResult, pause};
use crate::domains::FastTransferRequest;

pub struct FastTransferExecutor {
    sdk: Arc<dyn BridgeSdk>,
    settings: BridgeSettings,
    cancel: CancellationToken,
    log: ActionLog,
}

/// Address to resolve for `token` on `chain`. Native symbols map to the
/// chain's wrapped native token; anything else is taken as an address.
fn source_token_address(chain: Chain, token: &str) -> String {
    let native = match chain {
        Chain::Ethereum => ["ETH", "WETH"],
        Chain::Solana => ["SOL", "WSOL"],
    };
    if token.eq_ignore_ascii_case("native") || native.iter().any(|n| token.eq_ignore_ascii_case(n)) {
        chain.native_token_address().to_string()
    } else {
        token.to_string()
    }
}

impl FastTransferExecutor {
    pub fn new(sdk: Arc<dyn BridgeSdk>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            sdk,
            settings: BridgeSettings::default(),
            cancel: CancellationToken::new(),
            log: ActionLog::new("fast_transfer", sink),
        }
    }

    pub fn with_settings(mut self, settings: BridgeSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    async fn run(&self, request: &FastTransferRequest) -> Result<ExecutionResult, BridgeError> {
        let from = request.source_chain;
        let to = request.destination_chain;
        let amount = request.amount_string();

        // ── Step 1: Tokens and signers ──
        let source = self
            .sdk
            .token_id(from, &source_token_address(from, &request.token))
            .await?;
        let destination = self.sdk.token_id(to, to.native_token_address()).await?;

        let supported = self.sdk.supported_destination_tokens(&source, from, to).await?;
        self.log.info(format!(
            "Supported destination tokens: {}",
            supported
                .iter()
                .take(5)
                .map(|t| t.address.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));

        let sender = self.sdk.signer(from, None).await?;
        let receiver = self.sdk.signer(to, None).await?;
        let recipient = ChainAddress {
            chain: to,
            address: request.recipient_address.clone(),
        };

        // ── Step 2: Route, validation, quote ──
        let transfer = TransferRequest { source, destination };
        let route = self
            .sdk
            .find_routes(&transfer)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BridgeError::NoRoute(format!("{from} -> {to}")))?;
        self.log.info(format!("Using route {}", route.name));

        let validation = self.sdk.validate(&route, &transfer, &amount).await?;
        if !validation.valid {
            return Err(BridgeError::Validation(
                validation.error.unwrap_or_else(|| "route rejected the transfer".into()),
            ));
        }
        self.log.info(format!("Validated route for {amount} {}", request.token));

        let quote = self.sdk.quote(&route, &transfer, &amount).await?;
        self.log.info(format!(
            "Successfully fetched quote: {} -> {}",
            quote.source_amount, quote.destination_amount
        ));

        // ── Step 3: Initiate and complete ──
        pause(self.settings.pre_initiate_delay, &self.cancel, "preparing the transfer").await?;
        let receipt = self
            .sdk
            .initiate(&route, &transfer, &sender, &quote, &recipient)
            .await?;
        self.log.info(format!("Initiated transfer ({})", receipt.state));

        pause(self.settings.post_initiate_delay, &self.cancel, "waiting for the transfer").await?;
        let timeout = self.settings.transfer_timeout;
        let completed = tokio::select! {
            _ = self.cancel.cancelled() => {
                return Err(BridgeError::Cancelled("completing the transfer".into()));
            }
            outcome = tokio::time::timeout(
                timeout,
                self.sdk.check_and_complete(&route, &receipt, &receiver, timeout),
            ) => outcome.map_err(|_| BridgeError::Timeout {
                what: "transfer completion".into(),
                secs: timeout.as_secs(),
            })??,
        };

        let tx_hash = completed
            .origin_txs
            .first()
            .or_else(|| receipt.origin_txs.first())
            .map(|t| t.txid.clone());
        let details = json!({
            "state": completed.state,
            "originTxs": completed.origin_txs,
            "destinationTxs": completed.destination_txs,
        });
        self.log.success(format!("Transfer completed ({})", completed.state));

        let result = ExecutionResult::success(format!(
            "Transfer successful. Full transfer details: {details}"
        ));
        Ok(match tx_hash {
            Some(hash) => result.with_tx_hash(hash),
            None => result,
        })
    }
}

#[async_trait]
impl ActionExecutor<FastTransferRequest> for FastTransferExecutor {
    async fn execute(&self, request: &FastTransferRequest) -> ActionOutcome {
        match self.run(request).await {
            Ok(result) => result.into(),
            Err(e) => {
                let message = match e {
                    BridgeError::Validation(_) | BridgeError::Quote(_) => e.to_string(),
                    other => format!("Error executing transfer: {other}"),
                };
                self.log.error(&message);
                ExecutionResult::error(message).into()
            }
        }
    }
}
