//! Error types for the chainpilot domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all chainpilot operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Channel errors ---
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    // --- Agent errors ---
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    // --- External HTTP services ---
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    // --- Bridging SDK ---
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Channel not configured: {0}")]
    NotConfigured(String),

    #[error("Message delivery failed to {channel}: {reason}")]
    DeliveryFailed { channel: String, reason: String },

    #[error("Channel connection lost: {0}")]
    ConnectionLost(String),
}

/// Faults that escape an agent call. Reply-shape problems never show up
/// here: they are absorbed by the agent's corrective retry.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("{agent} failed to process request: {source}")]
    ProcessingFailed {
        agent: String,
        #[source]
        source: ProviderError,
    },

    #[error("Planner reply could not be parsed: {0}")]
    InvalidPlan(String),
}

/// Failures talking to the staking-rewards or explorer HTTP APIs.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Could not decode response: {0}")]
    Decode(String),

    #[error("API returned errors: {0}")]
    Api(String),

    #[error("Service not configured: {0}")]
    NotConfigured(String),
}

/// Failures reported by the bridging SDK. Executors turn these into
/// error results instead of propagating them.
#[derive(Debug, Clone, Error)]
pub enum BridgeError {
    #[error("Bridge SDK not configured: {0}")]
    NotConfigured(String),

    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),

    #[error("Failed to initialize signer for {chain}: {reason}")]
    Signer { chain: String, reason: String },

    #[error("No route found for {0}")]
    NoRoute(String),

    #[error("Error validating route: {0}")]
    Validation(String),

    #[error("Error fetching a quote: {0}")]
    Quote(String),

    #[error("Timed out after {secs}s waiting for {what}")]
    Timeout { what: String, secs: u64 },

    #[error("Cancelled while {0}")]
    Cancelled(String),

    #[error("{0}")]
    Sdk(String),
}
