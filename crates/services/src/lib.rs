//! External service clients for chainpilot.
//!
//! - **staking** — staking-rewards GraphQL lookup
//! - **explorer** — Wormholescan REST queries
//! - **bridge** — placeholder bridging SDK for builds without signing support

pub mod bridge;
pub mod explorer;
pub mod staking;

pub use bridge::{SdkConfig, UnconfiguredBridge};
pub use explorer::WormholescanClient;
pub use staking::StakingRewardsClient;

use chainpilot_core::ServiceError;

pub(crate) fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to default HTTP client");
            reqwest::Client::new()
        })
}

pub(crate) fn transport_error(e: reqwest::Error) -> ServiceError {
    ServiceError::Network(e.to_string())
}

/// Turn a non-success response into an error, keeping the body for context.
pub(crate) async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), body = %message, "Service returned error");
    Err(ServiceError::Http {
        status: status.as_u16(),
        message,
    })
}
