//! End-to-end integration tests for the chainpilot chat pipeline.
//!
//! These drive the orchestrator through its public API from a user
//! utterance to the rendered chat elements: planning, parameter
//! collection, execution and summaries.

use std::sync::{Arc, Mutex};

use chainpilot_agent::domains::TransferRequest;
use chainpilot_agent::{APOLOGY, BufferedSurface, ChatElement, Orchestrator};
use chainpilot_config::AppConfig;
use chainpilot_core::error::{ProviderError, ServiceError};
use chainpilot_core::event::{DomainEvent, LogLevel};
use chainpilot_core::message::{Message, Role};
use chainpilot_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use chainpilot_core::staking::{RewardOption, StakingQuery, StakingRewards};
use chainpilot_core::Chain;
use chainpilot_services::UnconfiguredBridge;
use serde_json::json;

// ── Mock Provider ────────────────────────────────────────────────────────

/// A mock provider that returns scripted responses in sequence and keeps
/// every request it was sent.
struct ScriptedProvider {
    responses: Mutex<Vec<ProviderResponse>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn request(&self, index: usize) -> ProviderRequest {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let count = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len()
        };
        let responses = self.responses.lock().unwrap();
        if count > responses.len() {
            panic!("ScriptedProvider exhausted: call #{count}, have {}", responses.len());
        }
        Ok(responses[count - 1].clone())
    }
}

/// Provider whose every call fails.
struct DownProvider;

#[async_trait::async_trait]
impl Provider for DownProvider {
    fn name(&self) -> &str {
        "down"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::Network("connection refused".into()))
    }
}

fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock".into(),
        metadata: serde_json::Map::new(),
    }
}

fn json_response(value: serde_json::Value) -> ProviderResponse {
    text_response(&value.to_string())
}

// ── Mock Staking Service ─────────────────────────────────────────────────

struct RecordingStaking {
    options: Vec<RewardOption>,
    queries: Mutex<Vec<StakingQuery>>,
}

impl RecordingStaking {
    fn new(options: Vec<RewardOption>) -> Self {
        Self {
            options,
            queries: Mutex::new(Vec::new()),
        }
    }

    fn queries(&self) -> Vec<StakingQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl StakingRewards for RecordingStaking {
    async fn reward_options(&self, query: &StakingQuery) -> Result<Vec<RewardOption>, ServiceError> {
        self.queries.lock().unwrap().push(query.clone());
        Ok(self.options.clone())
    }
}

fn reward_option(provider: &str, symbol: &str, rate: f64) -> RewardOption {
    serde_json::from_value(json!({
        "outputAssets": [{ "symbol": symbol, "name": symbol }],
        "providers": [{ "name": provider, "slug": provider.to_lowercase() }],
        "metrics": [{ "label": "Reward Rate", "metricKey": "reward_rate", "defaultValue": rate }]
    }))
    .unwrap()
}

fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.bridge.pre_initiate_delay_ms = 0;
    config.bridge.post_initiate_delay_ms = 0;
    config
}

fn orchestrator(provider: Arc<dyn Provider>, staking: Arc<RecordingStaking>) -> Orchestrator {
    Orchestrator::new(
        provider,
        Arc::new(UnconfiguredBridge::new("test build")),
        staking,
        &config(),
    )
}

fn assistant_texts(elements: &[ChatElement]) -> Vec<&str> {
    elements
        .iter()
        .filter_map(|e| match e {
            ChatElement::Message { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

// ── E2E: Staking ─────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_stake_eth_with_lido() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        json_response(json!({
            "intent": "Stake ETH on Ethereum with Lido",
            "message": "I'll look up staking options for you.",
            "steps": [{ "agent": "stake_agent", "context": "stake 2 ETH on ethereum with Lido" }]
        })),
        json_response(json!({
            "message": "Generating staking interface...",
            "params": { "chain": "Ethereum", "token": "ETH", "amount": "2", "provider": "Lido" },
            "status": "complete"
        })),
        text_response("Lido is the top option at 2.91% for your 2 ETH."),
    ]));
    let staking = Arc::new(RecordingStaking::new(vec![
        reward_option("Rocket Pool", "rETH", 3.10),
        reward_option("Lido", "stETH", 2.91),
    ]));
    let mut orch = orchestrator(provider.clone(), staking.clone());
    let mut surface = BufferedSurface::default();

    let elements = orch.handle("stake 2 ETH on ethereum with Lido", &mut surface).await;

    // Header, plan message, one indicator, agent message, options, summary.
    assert_eq!(elements.len(), 6, "{elements:#?}");
    assert!(matches!(&elements[0], ChatElement::Header { text } if text == "Stake ETH on Ethereum with Lido"));
    assert!(matches!(&elements[2], ChatElement::StepIndicator { index: 0, total: 1, agent } if agent == "stake_agent"));
    let ChatElement::StakingOptions { symbol, options } = &elements[4] else {
        panic!("expected staking options, got {:?}", elements[4]);
    };
    assert_eq!(symbol, "ETH");
    assert_eq!(options[0].provider().unwrap().name, "Lido");
    assert_eq!(
        assistant_texts(&elements).last().copied(),
        Some("Lido is the top option at 2.91% for your 2 ETH.")
    );

    let queries = staking.queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].symbols, vec!["ETH".to_string()]);
    assert_eq!(queries[0].type_keys, vec!["Lido".to_string()]);

    // The summary agent sees the execution result as JSON.
    assert_eq!(provider.calls(), 3);
    let summary_request = provider.request(2);
    let user = summary_request.messages.iter().find(|m| m.role == Role::User).unwrap();
    assert!(user.content.contains("\"status\":\"success\""), "{}", user.content);
}

#[tokio::test]
async fn e2e_stake_asks_for_chain_then_completes() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        json_response(json!({
            "intent": "Stake tokens",
            "message": "Sure.",
            "steps": [{ "agent": "stake_agent", "context": "user wants to stake" }]
        })),
        json_response(json!({ "message": "Which chain would you like to stake on?", "params": {}, "status": "need_input" })),
        json_response(json!({
            "message": "Generating staking interface...",
            "params": { "chain": "Solana" },
            "status": "complete"
        })),
        text_response("Here are the best SOL options."),
    ]));
    let staking = Arc::new(RecordingStaking::new(vec![reward_option("Jito", "JitoSOL", 7.4)]));
    let mut orch = orchestrator(provider.clone(), staking.clone());
    let mut surface = BufferedSurface::new(["Solana"]);

    let elements = orch.handle("I want to stake", &mut surface).await;

    assert!(assistant_texts(&elements).contains(&"Which chain would you like to stake on?"));
    assert_eq!(staking.queries()[0].symbols, vec!["SOL".to_string()]);

    let second = provider.request(2);
    let context = &second.messages.last().unwrap().content;
    assert!(context.ends_with("user wants to stake\nUser: Solana"), "{context}");
}

// ── E2E: Bridging ────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_bridge_some_tokens_collects_then_hands_off() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        json_response(json!({
            "intent": "Bridge tokens",
            "message": "Let's set up your transfer.",
            "steps": [{ "agent": "bridge_transfer_agent", "context": "bridge some tokens" }]
        })),
        json_response(json!({
            "message": "Which chain are you bridging from, and to which chain?",
            "params": {},
            "status": "need_input"
        })),
        json_response(json!({
            "message": "Preparing your transfer.",
            "params": {
                "fromChain": "Ethereum",
                "toChain": "Solana",
                "fromToken": "USDC",
                "toToken": "USDC",
                "amount": 25
            },
            "status": "complete"
        })),
    ]));
    let staking = Arc::new(RecordingStaking::new(Vec::new()));
    let mut orch = orchestrator(provider.clone(), staking.clone());
    let mut surface = BufferedSurface::new(["from Ethereum to Solana, 25 USDC"]);

    let elements = orch.handle("bridge some tokens", &mut surface).await;

    let widget = elements
        .iter()
        .find_map(|e| match e {
            ChatElement::TransferWidget { transfer } => Some(transfer.clone()),
            _ => None,
        })
        .expect("transfer widget rendered");
    assert_eq!(
        widget,
        TransferRequest {
            from_chain: Chain::Ethereum,
            to_chain: Chain::Solana,
            from_token: "USDC".into(),
            to_token: "USDC".into(),
            amount: Some(25.0),
        }
    );
    // Hand-off only: no staking lookups and no summary call.
    assert!(staking.queries().is_empty());
    assert_eq!(provider.calls(), 3);
    assert!(!elements.iter().any(|e| matches!(e, ChatElement::Error { .. })));
}

#[tokio::test]
async fn e2e_bridge_waits_quietly_when_user_leaves() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        json_response(json!({
            "message": "Okay.",
            "steps": [{ "agent": "bridge_transfer_agent", "context": "bridge some tokens" }]
        })),
        json_response(json!({ "message": "Which chain are you bridging from?", "params": {}, "status": "need_input" })),
    ]));
    let mut orch = orchestrator(provider.clone(), Arc::new(RecordingStaking::new(Vec::new())));
    let mut surface = BufferedSurface::default();

    let elements = orch.handle("bridge some tokens", &mut surface).await;

    assert_eq!(
        assistant_texts(&elements).last().copied(),
        Some("Which chain are you bridging from?")
    );
    assert!(!elements.iter().any(|e| matches!(e, ChatElement::TransferWidget { .. } | ChatElement::Error { .. })));
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn e2e_wrap_without_sdk_reports_through_summary() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        json_response(json!({
            "message": "Wrapping your token.",
            "steps": [{ "agent": "wrap_token_agent", "context": "wrap USDC from Solana to Ethereum" }]
        })),
        json_response(json!({
            "message": "Creating the wrapped token...",
            "params": { "originChain": "Solana", "destinationChain": "Ethereum", "token": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v" },
            "status": "complete"
        })),
        text_response("Wrapping isn't available in this build."),
    ]));
    let mut orch = orchestrator(provider.clone(), Arc::new(RecordingStaking::new(Vec::new())));
    let mut events = orch.event_bus().subscribe();
    let mut surface = BufferedSurface::default();

    let elements = orch.handle("wrap USDC from Solana to Ethereum", &mut surface).await;

    assert_eq!(
        assistant_texts(&elements).last().copied(),
        Some("Wrapping isn't available in this build.")
    );
    let summary_input = provider.request(2).messages.last().unwrap().content.clone();
    assert!(summary_input.contains("Bridge SDK not configured: test build"), "{summary_input}");

    let mut saw_error_log = false;
    let mut completed = None;
    while let Ok(event) = events.try_recv() {
        match event.as_ref() {
            DomainEvent::ActionLogged(entry) if entry.level == LogLevel::Error => saw_error_log = true,
            DomainEvent::StepCompleted { success, .. } => completed = Some(*success),
            _ => {}
        }
    }
    assert!(saw_error_log);
    assert_eq!(completed, Some(false));
}

// ── E2E: Failures ────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_provider_down_renders_single_apology() {
    let mut orch = orchestrator(Arc::new(DownProvider), Arc::new(RecordingStaking::new(Vec::new())));
    let mut surface = BufferedSurface::default();

    let elements = orch.handle("stake 2 ETH", &mut surface).await;

    assert_eq!(elements.len(), 1);
    assert!(matches!(&elements[0], ChatElement::Error { text } if text == APOLOGY));
}

#[tokio::test]
async fn e2e_multi_step_plan_runs_in_order() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        json_response(json!({
            "intent": "Move ETH to Solana and stake it",
            "message": "Two steps.",
            "steps": [
                { "agent": "bridge_transfer_agent", "context": "move 1 ETH from Ethereum to Solana" },
                { "agent": "stake_agent", "context": "stake on Solana" }
            ]
        })),
        json_response(json!({
            "message": "Transfer ready.",
            "params": { "fromChain": "Ethereum", "toChain": "Solana", "fromToken": "ETH", "toToken": "SOL", "amount": 1 },
            "status": "complete"
        })),
        json_response(json!({ "message": "Looking up options.", "params": { "chain": "Solana" }, "status": "complete" })),
        text_response("Jito leads on Solana."),
    ]));
    let staking = Arc::new(RecordingStaking::new(vec![reward_option("Jito", "JitoSOL", 7.4)]));
    let mut orch = orchestrator(provider.clone(), staking);
    let mut surface = BufferedSurface::default();

    let elements = orch.handle("move my ETH to Solana and stake it", &mut surface).await;

    let widget = elements
        .iter()
        .position(|e| matches!(e, ChatElement::TransferWidget { .. }))
        .unwrap();
    let options = elements
        .iter()
        .position(|e| matches!(e, ChatElement::StakingOptions { .. }))
        .unwrap();
    assert!(widget < options);
    assert_eq!(provider.calls(), 4);
    assert_eq!(surface.rendered().len(), elements.len());
}
