//! Agents and step orchestration for chainpilot.
//!
//! An utterance flows through:
//!
//! 1. **Plan**: the planner splits it into ordered agent steps
//! 2. **Collect**: each structured agent gathers its params over one or
//!    more turns, asking the user when something is missing
//! 3. **Act**: a completed request goes to its executor (staking lookup,
//!    token wrap, fast transfer)
//! 4. **Summarize**: the result is rewritten for the user
//!
//! Model replies are sanitized, parsed and validated; a rejected reply gets
//! exactly one corrective retry.

pub mod chat;
pub mod domains;
pub mod executor;
pub mod orchestrator;
pub mod planner;
pub mod sanitize;
pub mod structured;
pub mod summary;
pub mod surface;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use chat::{ChatElement, Speaker};
pub use domains::{AgentDomain, FieldViolation};
pub use executor::{ActionExecutor, ActionOutcome, BridgeSettings, ExecutionResult, ExecutionStatus};
pub use orchestrator::{APOLOGY, Orchestrator};
pub use planner::{AgentName, Plan, PlannerAgent, Step};
pub use sanitize::sanitize_reply;
pub use structured::{AgentOutcome, StructuredAgent};
pub use summary::SummaryAgent;
pub use surface::{BufferedSurface, ChannelSurface, ChatSurface};
