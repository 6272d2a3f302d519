//! Token wrapping via attestation.
//!
//! Sequence: resolve token → destination signer → existing wrapped asset?
//! → origin signer → attest → parse messages → fetch VAA → submit on the
//! destination → poll until the wrapped asset shows up.

use std::sync::Arc;

use async_trait::async_trait;
use chainpilot_core::bridge::{BridgeSdk, TokenId};
use chainpilot_core::error::BridgeError;
use chainpilot_core::event::LogSink;
use chainpilot_core::Chain;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::{ActionExecutor, ActionLog, ActionOutcome, BridgeSettings, ExecutionResult, pause};
use crate::domains::WrapRequest;

pub struct WrapExecutor {
    sdk: Arc<dyn BridgeSdk>,
    settings: BridgeSettings,
    cancel: CancellationToken,
    log: ActionLog,
}

impl WrapExecutor {
    pub fn new(sdk: Arc<dyn BridgeSdk>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            sdk,
            settings: BridgeSettings::default(),
            cancel: CancellationToken::new(),
            log: ActionLog::new("wrap", sink),
        }
    }

    pub fn with_settings(mut self, settings: BridgeSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Token cancelled when the session ends.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    async fn run(&self, request: &WrapRequest) -> Result<ExecutionResult, BridgeError> {
        let origin = request.origin_chain;
        let destination = request.destination_chain;

        // ── Step 1: Resolve the token and check for an existing wrap ──
        let token = self.sdk.token_id(origin, &request.token).await?;
        let dest_signer = self
            .sdk
            .signer(destination, Some(self.settings.gas_limit))
            .await?;

        if let Some(wrapped) = self.sdk.wrapped_asset(destination, &token).await? {
            self.log.info(format!(
                "Token already wrapped on {destination}. Skipping attestation."
            ));
            return Ok(ExecutionResult::success(format!(
                "A wrapped version of {} already exists on {destination} ({}). Would you like to lock and mint instead?",
                request.token, wrapped.address
            )));
        }
        self.log.info(format!(
            "No wrapped token found on {destination}. Proceeding with attestation."
        ));

        // ── Step 2: Attest on the origin chain ──
        let origin_signer = self.sdk.signer(origin, None).await?;
        self.log.info(format!("Creating attestation for {token} on {origin}"));
        let txids = self.sdk.create_attestation(&token, &origin_signer).await?;
        let txid = txids
            .first()
            .cloned()
            .ok_or_else(|| BridgeError::Sdk("attestation produced no transaction".into()))?;
        self.log.info(format!("Created attestation: {}", txid.txid));

        // ── Step 3: Wait for the guardians' VAA ──
        let messages = self.sdk.parse_transaction(&txid).await?;
        let message = messages
            .first()
            .ok_or_else(|| BridgeError::Sdk("attestation emitted no Wormhole message".into()))?;
        self.log.info(format!(
            "Fetching VAA for sequence {} (timeout {}s)",
            message.sequence,
            self.settings.vaa_timeout.as_secs()
        ));
        let vaa = self
            .sdk
            .fetch_vaa(message, self.settings.vaa_timeout)
            .await?
            .ok_or_else(|| {
                BridgeError::Sdk("VAA not found after retries exhausted. Try extending the timeout.".into())
            })?;

        // ── Step 4: Submit on the destination and wait for the asset ──
        let submitted = self.sdk.submit_attestation(&vaa, &dest_signer).await?;
        self.log.info(format!(
            "Submitted attestation on {destination}: {}",
            submitted
                .iter()
                .map(|t| t.txid.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));

        let wrapped = self.wait_for_wrapped(destination, &token).await?;
        self.log.success(format!(
            "Wrapped asset for {token} is {}",
            wrapped.address
        ));

        Ok(
            ExecutionResult::success(format!(
                "Successfully created wrapped {} on {destination}.",
                request.token
            ))
            .with_tx_hash(txid.txid),
        )
    }

    /// Poll every `poll_interval` until the asset exists, the wait times
    /// out, or the session is cancelled.
    async fn wait_for_wrapped(&self, chain: Chain, token: &TokenId) -> Result<TokenId, BridgeError> {
        let deadline = Instant::now() + self.settings.wrap_wait_timeout;
        loop {
            if let Some(wrapped) = self.sdk.wrapped_asset(chain, token).await? {
                return Ok(wrapped);
            }
            if Instant::now() >= deadline {
                return Err(BridgeError::Timeout {
                    what: format!("wrapped asset on {chain}"),
                    secs: self.settings.wrap_wait_timeout.as_secs(),
                });
            }
            pause(self.settings.poll_interval, &self.cancel, "waiting for the wrapped asset").await?;
        }
    }
}

#[async_trait]
impl ActionExecutor<WrapRequest> for WrapExecutor {
    async fn execute(&self, request: &WrapRequest) -> ActionOutcome {
        match self.run(request).await {
            Ok(result) => result.into(),
            Err(e) => {
                let message = format!("Failed to create wrapped token: {e}");
                self.log.error(&message);
                ExecutionResult::error(message).into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::testing::ScriptedBridge;
    use chainpilot_core::event::MemorySink;
    use std::time::Duration;

    fn request() -> WrapRequest {
        WrapRequest {
            origin_chain: Chain::Solana,
            destination_chain: Chain::Ethereum,
            token: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".into(),
        }
    }

    fn settings() -> BridgeSettings {
        BridgeSettings {
            poll_interval: Duration::from_secs(2),
            wrap_wait_timeout: Duration::from_secs(10),
            ..BridgeSettings::default()
        }
    }

    #[tokio::test]
    async fn existing_wrap_skips_attestation() {
        let bridge = Arc::new(ScriptedBridge {
            wrapped_after: Some(0),
            ..Default::default()
        });
        let sink = Arc::new(MemorySink::new());
        let executor = WrapExecutor::new(bridge.clone(), sink.clone());

        let outcome = executor.execute(&request()).await;

        assert!(outcome.result.is_success());
        assert!(outcome.result.message.starts_with("A wrapped version of"));
        assert!(!bridge.called("create_attestation"));
        assert!(sink.entries()[0].message.contains("Skipping attestation"));
    }

    #[tokio::test(start_paused = true)]
    async fn full_attestation_flow() {
        // Absent at the pre-check and the first two polls.
        let bridge = Arc::new(ScriptedBridge {
            wrapped_after: Some(3),
            ..Default::default()
        });
        let executor = WrapExecutor::new(bridge.clone(), Arc::new(MemorySink::new())).with_settings(settings());

        let outcome = executor.execute(&request()).await;

        assert!(outcome.result.is_success(), "{:?}", outcome.result);
        assert_eq!(outcome.result.tx_hash.as_deref(), Some("attest-tx"));
        assert!(bridge.called("submit_attestation"));
        assert_eq!(bridge.count("wrapped_asset"), 4);
    }

    #[tokio::test]
    async fn missing_vaa_is_an_error_result() {
        let bridge = Arc::new(ScriptedBridge {
            no_vaa: true,
            ..Default::default()
        });
        let executor = WrapExecutor::new(bridge.clone(), Arc::new(MemorySink::new()));

        let outcome = executor.execute(&request()).await;

        assert!(!outcome.result.is_success());
        assert_eq!(
            outcome.result.message,
            "Failed to create wrapped token: VAA not found after retries exhausted. Try extending the timeout."
        );
        assert!(!bridge.called("submit_attestation"));
    }

    #[tokio::test(start_paused = true)]
    async fn polling_is_bounded_by_timeout() {
        let bridge = Arc::new(ScriptedBridge::default());
        let executor = WrapExecutor::new(bridge.clone(), Arc::new(MemorySink::new())).with_settings(settings());

        let outcome = executor.execute(&request()).await;

        assert!(!outcome.result.is_success());
        assert!(outcome.result.message.contains("Timed out after 10s"));
        // one pre-check, then polls at t = 0, 2, 4, 6, 8, 10
        assert_eq!(bridge.count("wrapped_asset"), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn polling_stops_on_cancel() {
        let bridge = Arc::new(ScriptedBridge::default());
        let cancel = CancellationToken::new();
        let executor = WrapExecutor::new(bridge, Arc::new(MemorySink::new()))
            .with_settings(settings())
            .with_cancellation(cancel.clone());
        cancel.cancel();

        let outcome = executor.execute(&request()).await;
        assert!(outcome.result.message.contains("Cancelled while waiting for the wrapped asset"));
    }

    #[tokio::test]
    async fn unconfigured_sdk_reports_reason() {
        let executor = WrapExecutor::new(
            Arc::new(chainpilot_services::UnconfiguredBridge::new("no keys")),
            Arc::new(MemorySink::new()),
        );
        let outcome = executor.execute(&request()).await;
        assert_eq!(
            outcome.result.message,
            "Failed to create wrapped token: Bridge SDK not configured: no keys"
        );
    }
}
