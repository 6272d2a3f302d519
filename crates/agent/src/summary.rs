//! Summary agent: rewrites execution results for the user.

use std::sync::Arc;

use chainpilot_core::message::Message;
use chainpilot_core::provider::{Provider, ProviderRequest};
use tracing::warn;

pub const SUMMARY_FALLBACK: &str = "Sorry, I had trouble processing that message.";

const SUMMARY_PROMPT: &str = "You are a summary agent. You receive the output of other agents and explain it to the user.
If the output is an error, give the user a short, useful explanation of what went wrong.
If the output is a successful result, keep only the key details (such as origin and destination transaction hashes) and add a one-line natural-language summary, e.g. 'Your transfer from Ethereum to Solana succeeded. Details: ...'.
Keep it short and friendly.";

pub struct SummaryAgent {
    provider: Arc<dyn Provider>,
    model: String,
}

impl SummaryAgent {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Never fails: a provider error yields [`SUMMARY_FALLBACK`].
    pub async fn summarize(&self, input: &str) -> String {
        let request = ProviderRequest::new(
            &self.model,
            vec![Message::system(SUMMARY_PROMPT), Message::user(input)],
        );

        match self.provider.complete(request).await {
            Ok(response) => response.message.content,
            Err(e) => {
                warn!(error = %e, "Summary call failed");
                SUMMARY_FALLBACK.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use chainpilot_core::error::ProviderError;

    #[tokio::test]
    async fn returns_model_text() {
        let provider = Arc::new(SequentialMockProvider::texts(&["Your transfer succeeded."]));
        let agent = SummaryAgent::new(provider.clone(), "mock-model");

        let text = agent.summarize(r#"{"status":"success","message":"done"}"#).await;
        assert_eq!(text, "Your transfer succeeded.");
        assert_eq!(provider.requests()[0].messages[1].content, r#"{"status":"success","message":"done"}"#);
    }

    #[tokio::test]
    async fn provider_failure_falls_back() {
        let provider = Arc::new(SequentialMockProvider::scripted(vec![Err(ProviderError::Timeout(
            "120s".into(),
        ))]));
        let agent = SummaryAgent::new(provider, "mock-model");
        assert_eq!(agent.summarize("{}").await, SUMMARY_FALLBACK);
    }
}
