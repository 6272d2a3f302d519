//! Step orchestration.
//!
//! One orchestrator per chat session. For each utterance:
//!
//! 1. **Plan**: the planner turns the utterance into ordered steps
//! 2. **Preview**: intent, message and one indicator per step are rendered
//! 3. **Drive**: each step's agent runs until complete, asking the user
//!    whenever it needs input
//! 4. **Act**: the step's executor runs and the summary agent explains
//!    the result
//!
//! Steps run strictly in order. A provider failure renders one apology and
//! drops the rest of the plan; everything already rendered stays.

use std::sync::Arc;

use chainpilot_config::AppConfig;
use chainpilot_core::bridge::BridgeSdk;
use chainpilot_core::error::AgentError;
use chainpilot_core::event::{DomainEvent, EventBus, LogSink};
use chainpilot_core::provider::Provider;
use chainpilot_core::staking::StakingRewards;
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::chat::ChatElement;
use crate::domains::{AgentDomain, FastTransferDomain, StakeDomain, TransferDomain, WrapDomain};
use crate::executor::{
    ActionExecutor, ActionOutcome, BridgeSettings, FastTransferExecutor, StakeExecutor, WrapExecutor,
};
use crate::planner::{AgentName, PlannerAgent, Step};
use crate::structured::{AgentOutcome, StructuredAgent};
use crate::summary::SummaryAgent;
use crate::surface::ChatSurface;

pub const APOLOGY: &str = "Sorry, something went wrong while processing your request.";

/// How a step ended.
enum StepFlow {
    Done { success: bool },
    Skipped,
    /// The user went away while an agent was waiting for input.
    SessionEnded,
}

/// Renders to the surface and keeps a copy of everything shown.
struct Transcript<'a> {
    surface: &'a mut dyn ChatSurface,
    elements: Vec<ChatElement>,
}

impl Transcript<'_> {
    async fn show(&mut self, element: ChatElement) {
        self.elements.push(element.clone());
        self.surface.render(element).await;
    }
}

pub struct Orchestrator {
    planner: PlannerAgent,
    summary: SummaryAgent,
    transfer: StructuredAgent<TransferDomain>,
    stake: StructuredAgent<StakeDomain>,
    wrap: StructuredAgent<WrapDomain>,
    fast_transfer: StructuredAgent<FastTransferDomain>,
    stake_executor: StakeExecutor,
    wrap_executor: WrapExecutor,
    fast_transfer_executor: FastTransferExecutor,
    events: Arc<EventBus>,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn Provider>,
        bridge: Arc<dyn BridgeSdk>,
        staking: Arc<dyn StakingRewards>,
        config: &AppConfig,
    ) -> Self {
        let events = Arc::new(EventBus::default());
        let cancel = CancellationToken::new();
        let sink: Arc<dyn LogSink> = events.clone();
        let settings = BridgeSettings::from_config(&config.bridge);

        Self {
            planner: PlannerAgent::new(provider.clone(), config.planner_model())
                .with_temperature(config.default_temperature),
            summary: SummaryAgent::new(provider.clone(), config.summary_model()),
            transfer: StructuredAgent::from_config(provider.clone(), config),
            stake: StructuredAgent::from_config(provider.clone(), config),
            wrap: StructuredAgent::from_config(provider.clone(), config),
            fast_transfer: StructuredAgent::from_config(provider, config),
            stake_executor: StakeExecutor::new(staking, sink.clone()).with_limit(config.staking.limit),
            wrap_executor: WrapExecutor::new(bridge.clone(), sink.clone())
                .with_settings(settings.clone())
                .with_cancellation(cancel.clone()),
            fast_transfer_executor: FastTransferExecutor::new(bridge, sink)
                .with_settings(settings)
                .with_cancellation(cancel.clone()),
            events,
            cancel,
        }
    }

    /// Bus carrying step events and executor logs.
    pub fn event_bus(&self) -> Arc<EventBus> {
        self.events.clone()
    }

    /// Cancelling this token stops executor waits for this session.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Handle one utterance. Returns every element rendered along the way.
    pub async fn handle(&mut self, utterance: &str, surface: &mut dyn ChatSurface) -> Vec<ChatElement> {
        let mut transcript = Transcript {
            surface,
            elements: Vec::new(),
        };

        // ── Step 1: Plan ──
        let plan = match self.planner.plan(utterance).await {
            Ok(plan) => plan,
            Err(e) => {
                self.fail("planning", &e, &mut transcript).await;
                return transcript.elements;
            }
        };

        // ── Step 2: Preview ──
        if let Some(intent) = plan.intent.as_deref().filter(|i| !i.trim().is_empty()) {
            transcript.show(ChatElement::Header { text: intent.to_string() }).await;
        }
        if !plan.message.trim().is_empty() {
            transcript.show(ChatElement::assistant(&plan.message)).await;
        }
        let total = plan.steps.len();
        for (index, step) in plan.steps.iter().enumerate() {
            transcript
                .show(ChatElement::StepIndicator {
                    index,
                    total,
                    agent: step.agent.to_string(),
                })
                .await;
        }

        // ── Step 3: Drive each step in order ──
        for (index, step) in plan.steps.iter().enumerate() {
            self.events.publish(DomainEvent::StepStarted {
                index,
                agent: step.agent.to_string(),
                timestamp: Utc::now(),
            });

            match self.run_step(step, &mut transcript).await {
                Ok(StepFlow::Done { success }) => {
                    self.events.publish(DomainEvent::StepCompleted {
                        index,
                        agent: step.agent.to_string(),
                        success,
                        timestamp: Utc::now(),
                    });
                }
                Ok(StepFlow::Skipped) => {}
                Ok(StepFlow::SessionEnded) => {
                    info!(step = index, agent = %step.agent, "Session ended while waiting for input");
                    break;
                }
                Err(e) => {
                    self.fail(step.agent.as_str(), &e, &mut transcript).await;
                    break;
                }
            }
        }

        transcript.elements
    }

    async fn run_step(&mut self, step: &Step, transcript: &mut Transcript<'_>) -> Result<StepFlow, AgentError> {
        debug!(agent = %step.agent, context = %step.context, "Running step");
        match &step.agent {
            AgentName::BridgeTransfer => {
                let Some(request) = drive(&mut self.transfer, &self.cancel, &step.context, transcript).await? else {
                    return Ok(StepFlow::SessionEnded);
                };
                transcript.show(ChatElement::TransferWidget { transfer: request }).await;
                Ok(StepFlow::Done { success: true })
            }
            AgentName::Stake => {
                let Some(request) = drive(&mut self.stake, &self.cancel, &step.context, transcript).await? else {
                    return Ok(StepFlow::SessionEnded);
                };
                let outcome = self.stake_executor.execute(&request).await;
                Ok(self.report(outcome, transcript).await)
            }
            AgentName::WrapToken => {
                let Some(request) = drive(&mut self.wrap, &self.cancel, &step.context, transcript).await? else {
                    return Ok(StepFlow::SessionEnded);
                };
                let outcome = self.wrap_executor.execute(&request).await;
                Ok(self.report(outcome, transcript).await)
            }
            AgentName::FastTransfer => {
                let Some(request) = drive(&mut self.fast_transfer, &self.cancel, &step.context, transcript).await? else {
                    return Ok(StepFlow::SessionEnded);
                };
                let outcome = self.fast_transfer_executor.execute(&request).await;
                Ok(self.report(outcome, transcript).await)
            }
            AgentName::Unknown(name) => {
                warn!(agent = %name, "Planner returned an unknown agent, skipping step");
                Ok(StepFlow::Skipped)
            }
        }
    }

    /// Render the executor's element and the summarized result.
    async fn report(&self, outcome: ActionOutcome, transcript: &mut Transcript<'_>) -> StepFlow {
        let success = outcome.result.is_success();
        if let Some(display) = outcome.display {
            transcript.show(display).await;
        }
        let summary = self.summary.summarize(&outcome.result.to_json()).await;
        transcript.show(ChatElement::assistant(summary)).await;
        StepFlow::Done { success }
    }

    async fn fail(&self, context: &str, error: &AgentError, transcript: &mut Transcript<'_>) {
        warn!(context, error = %error, "Aborting plan");
        self.events.publish(DomainEvent::ErrorOccurred {
            context: context.to_string(),
            error_message: error.to_string(),
            timestamp: Utc::now(),
        });
        transcript.show(ChatElement::error(APOLOGY)).await;
    }
}

/// Run `agent` until it completes. `None` means the session ended first,
/// either by closing its input or by cancellation.
async fn drive<D: AgentDomain>(
    agent: &mut StructuredAgent<D>,
    cancel: &CancellationToken,
    context: &str,
    transcript: &mut Transcript<'_>,
) -> Result<Option<D::Request>, AgentError> {
    let mut context = context.to_string();
    loop {
        match agent.process(&context).await? {
            AgentOutcome::Complete { message, request, .. } => {
                info!(agent = D::NAME, "Agent complete");
                transcript.show(ChatElement::assistant(message)).await;
                return Ok(Some(request));
            }
            AgentOutcome::NeedInput { message, .. } => {
                transcript.show(ChatElement::assistant(message)).await;
                let reply = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    reply = transcript.surface.next_input() => reply,
                };
                let Some(reply) = reply else {
                    return Ok(None);
                };
                context = format!("{context}\nUser: {reply}");
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
