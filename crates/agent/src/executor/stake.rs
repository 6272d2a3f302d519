//! Staking lookup: fetch reward options for the requested asset.

use std::sync::Arc;

use async_trait::async_trait;
use chainpilot_core::event::LogSink;
use chainpilot_core::staking::{DEFAULT_TYPE_KEY, RewardOption, StakingQuery, StakingRewards};

use super::{ActionExecutor, ActionLog, ActionOutcome, ExecutionResult};
use crate::chat::ChatElement;
use crate::domains::StakeRequest;

pub struct StakeExecutor {
    staking: Arc<dyn StakingRewards>,
    limit: u32,
    log: ActionLog,
}

impl StakeExecutor {
    pub fn new(staking: Arc<dyn StakingRewards>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            staking,
            limit: 15,
            log: ActionLog::new("stake", sink),
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// A named provider is sent as the type key; otherwise liquid staking.
    pub fn query_for(&self, request: &StakeRequest) -> StakingQuery {
        let type_key = request
            .provider
            .clone()
            .unwrap_or_else(|| DEFAULT_TYPE_KEY.to_string());
        StakingQuery {
            symbols: vec![request.symbol()],
            type_keys: vec![type_key],
            limit: self.limit,
        }
    }
}

/// Whether `option` is offered by `provider` (name or slug, any case).
fn offered_by(option: &RewardOption, provider: &str) -> bool {
    option.providers.iter().any(|p| {
        p.name.eq_ignore_ascii_case(provider)
            || p.slug.as_deref().is_some_and(|slug| slug.eq_ignore_ascii_case(provider))
    })
}

/// Move the preferred provider's options to the front, keeping the
/// service's reward-rate order within each group.
fn rank_preferred(options: &mut [RewardOption], provider: Option<&str>) {
    if let Some(provider) = provider {
        options.sort_by_key(|option| !offered_by(option, provider));
    }
}

#[async_trait]
impl ActionExecutor<StakeRequest> for StakeExecutor {
    async fn execute(&self, request: &StakeRequest) -> ActionOutcome {
        let query = self.query_for(request);
        let symbol = request.symbol();
        self.log.info(format!(
            "Fetching staking options for {symbol} on {} ({})",
            request.chain,
            query.type_keys.join(", ")
        ));

        match self.staking.reward_options(&query).await {
            Ok(options) if options.is_empty() => {
                let message = format!("No staking options found for {symbol}.");
                self.log.error(&message);
                ExecutionResult::error(message).into()
            }
            Ok(mut options) => {
                let provider = request.provider.as_deref();
                rank_preferred(&mut options, provider);
                let mut message = format!("Found {} staking options for {symbol}.", options.len());
                if let Some(provider) = provider {
                    if !options.iter().any(|o| offered_by(o, provider)) {
                        message.push_str(&format!(" None of them are offered by {provider}."));
                    }
                }
                self.log.success(&message);
                ActionOutcome {
                    result: ExecutionResult::success(message),
                    display: Some(ChatElement::StakingOptions { symbol, options }),
                }
            }
            Err(e) => {
                let message = format!("Failed to fetch staking options: {e}");
                self.log.error(&message);
                ExecutionResult::error(message).into()
            }
        }
    }
}
