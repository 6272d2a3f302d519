//! Agent domains.
//!
//! A domain fixes what one structured agent collects: its system prompt, the
//! loosely-typed params the model fills in, and the validated request an
//! executor can act on. Validation returns the first failing check together
//! with the corrective turn that tells the model what to fix.

use chainpilot_core::Chain;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Debug;

pub mod fast_transfer;
pub mod stake;
pub mod transfer;
pub mod wrap;

pub use fast_transfer::{FastTransferDomain, FastTransferParams, FastTransferRequest};
pub use stake::{StakeDomain, StakeParams, StakeRequest};
pub use transfer::{TransferDomain, TransferParams, TransferRequest};
pub use wrap::{WrapDomain, WrapParams, WrapRequest};

/// What a structured agent collects and how it checks completeness.
pub trait AgentDomain: Send + Sync + 'static {
    /// Step name used by the planner (e.g. `"stake_agent"`).
    const NAME: &'static str;

    /// Params as the model reports them; every field optional.
    type Params: DeserializeOwned + Serialize + Default + Clone + Debug + Send + Sync;

    /// Params after validation, with required fields present and typed.
    type Request: Serialize + Clone + Debug + Send + Sync;

    fn system_prompt() -> &'static str;

    /// Checks run only for `status = complete` replies.
    fn validate(params: &Self::Params) -> Result<Self::Request, FieldViolation>;
}

/// A failed completeness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    /// User turn pushed into history before the retry.
    pub corrective: &'static str,
}

impl FieldViolation {
    pub const fn new(field: &'static str, corrective: &'static str) -> Self {
        Self { field, corrective }
    }
}

/// Parse a required chain field (case-sensitive).
pub(crate) fn require_chain(
    value: &Option<String>,
    violation: FieldViolation,
) -> Result<Chain, FieldViolation> {
    value
        .as_deref()
        .and_then(|v| v.parse().ok())
        .ok_or(violation)
}

/// Require a non-blank text field.
pub(crate) fn require_text(
    value: &Option<String>,
    violation: FieldViolation,
) -> Result<String, FieldViolation> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(violation)
}

/// Optional amount given as a number or a numeric string.
///
/// Anything else (`null`, `"all"`, an object) reads as absent, so the
/// agent asks again rather than acting on a guess.
pub(crate) fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite()))
}

/// Optional free-text field. Non-string scalars are stringified; `null`
/// and structured values read as absent.
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}
