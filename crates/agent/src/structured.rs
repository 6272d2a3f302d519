//! Structured-JSON agent.
//!
//! One instance per domain per session. Each call to
//! [`StructuredAgent::process`] sends `[system prompt, ...history]`, expects a
//! `{message, params, status}` object back and returns either a validated
//! request ([`AgentOutcome::Complete`]) or a question for the user
//! ([`AgentOutcome::NeedInput`]).
//!
//! # Corrective retry
//!
//! ```text
//! context ──► model ──► sanitize ──► parse ──► validate ──► outcome
//!                                      │           │
//!                                      └─ReplyError┘
//!                                            │
//!                             corrective turn + one retry
//!                                            │
//!                  valid ─► prefixed outcome │ field check failed ─► NeedInput (prefixed)
//!                                            │ unparseable ─► NeedInput (rephrase)
//! ```
//!
//! Transport failures are not retried; they surface as
//! [`AgentError::ProcessingFailed`].

use std::marker::PhantomData;
use std::sync::Arc;

use chainpilot_config::AppConfig;
use chainpilot_core::error::AgentError;
use chainpilot_core::message::{Conversation, Message};
use chainpilot_core::provider::{Provider, ProviderRequest};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domains::{AgentDomain, FieldViolation};
use crate::sanitize::sanitize_reply;

/// Prepended to the message of any reply obtained through the retry.
pub const RETRY_PREFIX: &str = "I noticed some issues with the previous response. ";

/// Returned when the retried reply still cannot be read.
pub const REPHRASE_MESSAGE: &str =
    "Sorry, I couldn't understand that. Could you rephrase your request with the details I asked for?";

const MISSING_FIELDS: &str = "The response was missing required fields. Please provide a complete response with message, params, and status.";
const NOT_JSON: &str = "The response was not a valid JSON object. Please reply with only a JSON object containing message, params, and status.";

/// Result of one `process` call.
#[derive(Debug)]
pub enum AgentOutcome<D: AgentDomain> {
    /// All required fields present; the request is safe to act on.
    Complete {
        message: String,
        params: D::Params,
        request: D::Request,
    },
    /// The user has to answer `message` before the agent can continue.
    NeedInput { message: String, params: D::Params },
}

impl<D: AgentDomain> AgentOutcome<D> {
    pub fn message(&self) -> &str {
        match self {
            AgentOutcome::Complete { message, .. } | AgentOutcome::NeedInput { message, .. } => message,
        }
    }

    pub fn params(&self) -> &D::Params {
        match self {
            AgentOutcome::Complete { params, .. } | AgentOutcome::NeedInput { params, .. } => params,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, AgentOutcome::Complete { .. })
    }

    fn prefixed(self) -> Self {
        match self {
            AgentOutcome::Complete {
                message,
                params,
                request,
            } => AgentOutcome::Complete {
                message: format!("{RETRY_PREFIX}{message}"),
                params,
                request,
            },
            AgentOutcome::NeedInput { message, params } => AgentOutcome::NeedInput {
                message: format!("{RETRY_PREFIX}{message}"),
                params,
            },
        }
    }
}

/// Why a reply was rejected. Every variant takes the same retry path.
#[derive(Debug, Error)]
enum ReplyError<P> {
    #[error("reply is not a JSON object: {0}")]
    Malformed(String),

    #[error("reply is missing message, params or status")]
    MissingFields,

    #[error("field check failed on '{}'", violation.field)]
    Field {
        violation: FieldViolation,
        message: String,
        params: P,
    },
}

impl<P> ReplyError<P> {
    /// User turn that tells the model what to fix.
    fn corrective(&self) -> &'static str {
        match self {
            ReplyError::Malformed(_) => NOT_JSON,
            ReplyError::MissingFields => MISSING_FIELDS,
            ReplyError::Field { violation, .. } => violation.corrective,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Complete,
    NeedInput,
}

/// A multi-turn agent bound to one domain.
pub struct StructuredAgent<D: AgentDomain> {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    history: Conversation,
    /// Keep at most this many turns; 0 = unbounded.
    history_limit: usize,
    _domain: PhantomData<fn() -> D>,
}

impl<D: AgentDomain> StructuredAgent<D> {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.2,
            max_tokens: None,
            history: Conversation::new(),
            history_limit: 0,
            _domain: PhantomData,
        }
    }

    /// Model, sampling and history settings from the app config.
    pub fn from_config(provider: Arc<dyn Provider>, config: &AppConfig) -> Self {
        Self::new(provider, &config.default_model)
            .with_temperature(config.default_temperature)
            .with_max_tokens(config.default_max_tokens)
            .with_history_limit(config.agents.history_limit)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn name(&self) -> &'static str {
        D::NAME
    }

    /// Stored turns, oldest first. The system prompt is not part of it.
    pub fn history(&self) -> &[Message] {
        &self.history.messages
    }

    /// Run one turn for `context`, retrying once on a rejected reply.
    pub async fn process(&mut self, context: &str) -> Result<AgentOutcome<D>, AgentError> {
        // ── Step 1: First attempt ──
        self.remember(Message::user(context));
        let raw = self.complete().await?;

        let rejection = match Self::interpret(&raw) {
            Ok(outcome) => {
                debug!(agent = D::NAME, complete = outcome.is_complete(), "Reply accepted");
                return Ok(outcome);
            }
            Err(rejection) => rejection,
        };

        // ── Step 2: Corrective turn and a single retry ──
        warn!(agent = D::NAME, reason = %rejection, "Reply rejected, retrying once");
        self.remember(Message::user(rejection.corrective()));
        let raw = self.complete().await?;

        let outcome = match Self::interpret(&raw) {
            Ok(outcome) => outcome.prefixed(),
            Err(ReplyError::Field {
                violation,
                message,
                params,
            }) => {
                info!(agent = D::NAME, field = violation.field, "Retry still incomplete, asking the user");
                AgentOutcome::NeedInput {
                    message: format!("{RETRY_PREFIX}{message}"),
                    params,
                }
            }
            Err(other) => {
                warn!(agent = D::NAME, reason = %other, "Retry unreadable");
                AgentOutcome::NeedInput {
                    message: REPHRASE_MESSAGE.to_string(),
                    params: D::Params::default(),
                }
            }
        };
        Ok(outcome)
    }

    /// Call the model with the full history and store its raw reply.
    async fn complete(&mut self) -> Result<String, AgentError> {
        let mut messages = Vec::with_capacity(self.history.len() + 1);
        messages.push(Message::system(D::system_prompt()));
        messages.extend(self.history.messages.iter().cloned());

        let mut request = ProviderRequest::new(&self.model, messages);
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens;

        let response = self
            .provider
            .complete(request)
            .await
            .map_err(|source| AgentError::ProcessingFailed {
                agent: D::NAME.to_string(),
                source,
            })?;

        let raw = response.message.content;
        self.remember(Message::assistant(raw.clone()));
        Ok(raw)
    }

    fn remember(&mut self, message: Message) {
        self.history.push(message);
        let evicted = self.history.retain_last(self.history_limit);
        if evicted > 0 {
            debug!(agent = D::NAME, evicted, "History trimmed");
        }
    }

    /// Sanitize, parse and validate one raw reply.
    fn interpret(raw: &str) -> Result<AgentOutcome<D>, ReplyError<D::Params>> {
        let cleaned = sanitize_reply(raw);
        let value: Value =
            serde_json::from_str(&cleaned).map_err(|e| ReplyError::Malformed(e.to_string()))?;
        let Value::Object(mut object) = value else {
            return Err(ReplyError::Malformed("top-level value is not an object".into()));
        };

        let message = match object.remove("message") {
            Some(Value::String(m)) if !m.trim().is_empty() => m,
            _ => return Err(ReplyError::MissingFields),
        };
        let status = match object.get("status").and_then(Value::as_str) {
            Some("complete") => Status::Complete,
            Some("need_input") => Status::NeedInput,
            _ => return Err(ReplyError::MissingFields),
        };
        let params: D::Params = match object.remove("params") {
            Some(v @ Value::Object(_)) => {
                serde_json::from_value(v).map_err(|e| ReplyError::Malformed(e.to_string()))?
            }
            _ => return Err(ReplyError::MissingFields),
        };

        match status {
            Status::NeedInput => Ok(AgentOutcome::NeedInput { message, params }),
            Status::Complete => match D::validate(&params) {
                Ok(request) => Ok(AgentOutcome::Complete {
                    message,
                    params,
                    request,
                }),
                Err(violation) => Err(ReplyError::Field {
                    violation,
                    message,
                    params,
                }),
            },
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
