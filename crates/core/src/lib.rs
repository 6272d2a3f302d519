//! # chainpilot Core
//!
//! Domain types, traits, and error definitions for the chainpilot
//! cross-chain assistant. This crate has no HTTP or UI dependencies; it
//! defines the model every other crate implements against.
//!
//! Each external collaborator is a trait here:
//! - [`Provider`] for text completion
//! - [`BridgeSdk`] for attestation, routing and transfer completion
//! - [`StakingRewards`] for reward-option lookups
//! - [`Channel`] for user-facing chat transports
//!
//! Implementations live in their own crates, so agents can be tested
//! against scripted stand-ins.

pub mod bridge;
pub mod chain;
pub mod channel;
pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod staking;

// Re-export key types at crate root for ergonomics
pub use bridge::BridgeSdk;
pub use chain::Chain;
pub use channel::{Channel, ChannelId, ChannelMessage};
pub use error::{AgentError, BridgeError, Error, Result, ServiceError};
pub use event::{DomainEvent, EventBus, LogLevel, LogMessage, LogSink};
pub use message::{Conversation, ConversationId, Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use staking::{RewardOption, StakingQuery, StakingRewards};
