//! Planner agent: turns one utterance into an ordered list of steps.
//!
//! Stateless and single-shot. A reply that cannot be read as a plan is an
//! [`AgentError::InvalidPlan`]; the planner is never retried.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chainpilot_core::error::AgentError;
use chainpilot_core::message::Message;
use chainpilot_core::provider::{Provider, ProviderRequest};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, info};

use crate::domains::{AgentDomain, FastTransferDomain, StakeDomain, TransferDomain, WrapDomain};
use crate::sanitize::sanitize_reply;

const PLANNER_PROMPT: &str = r#"You are the user-facing planning agent of a blockchain assistant.
You do not perform operations yourself; you hand them to specialist agents.

Things users ask for:
- moving tokens between chains
- staking tokens on a chain
- creating a wrapped version of a token on another chain
- fast-finality transfers

Agents you can call:
- bridge_transfer_agent (regular token transfer between chains)
- stake_agent (find staking options and stake)
- wrap_token_agent (check for or create a wrapped token)
- fast_transfer_agent (fast-finality settlement transfers)

Break the request into steps, in the order they must happen, and give each agent the context the user already provided.
If no agent is needed, answer the user in "message" and return an empty "steps" array.

Reply with a single JSON object and nothing else:
{
  "intent": "the user wants to move tokens from Ethereum to Solana and then stake on Solana",
  "message": "Planning your request...",
  "steps": [
    { "agent": "bridge_transfer_agent", "context": "user wants to move tokens from Ethereum to Solana" },
    { "agent": "stake_agent", "context": "user wants to stake the tokens on Solana" }
  ]
}"#;

/// Agents a step can be dispatched to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AgentName {
    BridgeTransfer,
    Stake,
    WrapToken,
    FastTransfer,
    /// A name the planner invented; logged and skipped.
    Unknown(String),
}

impl AgentName {
    pub fn as_str(&self) -> &str {
        match self {
            AgentName::BridgeTransfer => TransferDomain::NAME,
            AgentName::Stake => StakeDomain::NAME,
            AgentName::WrapToken => WrapDomain::NAME,
            AgentName::FastTransfer => FastTransferDomain::NAME,
            AgentName::Unknown(name) => name,
        }
    }
}

impl FromStr for AgentName {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "bridge_transfer_agent" => AgentName::BridgeTransfer,
            "stake_agent" => AgentName::Stake,
            "wrap_token_agent" => AgentName::WrapToken,
            "fast_transfer_agent" | "mayan_fast_agent" => AgentName::FastTransfer,
            other => AgentName::Unknown(other.to_string()),
        })
    }
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AgentName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AgentName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        let Ok(parsed) = name.parse::<AgentName>();
        Ok(parsed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(alias = "step")]
    pub agent: AgentName,
    #[serde(default)]
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub steps: Vec<Step>,
}

/// `"steps": null` reads as no steps.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Step>, D::Error> {
    Ok(Option::<Vec<Step>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Plan {
    pub fn parse(raw: &str) -> Result<Self, AgentError> {
        serde_json::from_str(&sanitize_reply(raw)).map_err(|e| AgentError::InvalidPlan(e.to_string()))
    }
}

pub struct PlannerAgent {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
}

impl PlannerAgent {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.2,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub async fn plan(&self, utterance: &str) -> Result<Plan, AgentError> {
        let mut request = ProviderRequest::new(
            &self.model,
            vec![Message::system(PLANNER_PROMPT), Message::user(utterance)],
        );
        request.temperature = self.temperature;

        let response = self
            .provider
            .complete(request)
            .await
            .map_err(|source| AgentError::ProcessingFailed {
                agent: "planner".into(),
                source,
            })?;

        let plan = Plan::parse(&response.message.content)?;
        info!(
            steps = plan.steps.len(),
            intent = plan.intent.as_deref().unwrap_or(""),
            "Plan ready"
        );
        debug!(agents = ?plan.steps.iter().map(|s| s.agent.as_str()).collect::<Vec<_>>(), "Planned agents");
        Ok(plan)
    }
}
