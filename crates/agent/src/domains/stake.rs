//! Staking lookup. Only the chain is required; token, amount and provider
//! narrow the reward-options query when present.

use super::{AgentDomain, FieldViolation, lenient_amount, lenient_text, require_chain};
use chainpilot_core::Chain;
use serde::{Deserialize, Serialize};

const BAD_CHAIN: FieldViolation = FieldViolation::new(
    "chain",
    "The chain was invalid or missing. Please specify either Ethereum or Solana.",
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StakeParams {
    #[serde(default, deserialize_with = "lenient_text")]
    pub chain: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub token: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub provider: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StakeRequest {
    pub chain: Chain,
    pub token: Option<String>,
    pub amount: Option<f64>,
    pub provider: Option<String>,
}

impl StakeRequest {
    /// Asset symbol to query: the requested token, else the chain's native asset.
    pub fn symbol(&self) -> String {
        match &self.token {
            Some(token) => token.clone(),
            None => match self.chain {
                Chain::Ethereum => "ETH".to_string(),
                Chain::Solana => "SOL".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StakeDomain;

impl AgentDomain for StakeDomain {
    const NAME: &'static str = "stake_agent";

    type Params = StakeParams;
    type Request = StakeRequest;

    fn system_prompt() -> &'static str {
        r#"You are a staking specialist. You help users stake tokens on Ethereum or Solana.

From the conversation, extract the chain, the token, the amount and the preferred staking provider if the user named one.
If the chain is unknown, ask for it and set status to "need_input". Once the chain is known, set status to "complete".

Reply with a single JSON object and nothing else (no markdown, no code fences):
{
  "message": "a short question for the user, or 'Looking up staking options...' when complete",
  "params": {
    "chain": "Ethereum or Solana",
    "token": "token to stake, or null if any token is fine",
    "amount": number or null,
    "provider": "preferred staking provider, or null"
  },
  "status": "complete" or "need_input"
}

Keep questions short: 'Which chain would you like to stake on?', 'What token would you like to stake?', 'How much would you like to stake?', 'Do you have a preferred staking provider?'"#
    }

    fn validate(params: &StakeParams) -> Result<StakeRequest, FieldViolation> {
        let chain = require_chain(&params.chain, BAD_CHAIN)?;
        Ok(StakeRequest {
            chain,
            token: params.token.clone().filter(|t| !t.trim().is_empty()),
            amount: params.amount,
            provider: params.provider.clone().filter(|p| !p.trim().is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lowercase_chain_is_rejected() {
        let p: StakeParams = serde_json::from_value(json!({ "chain": "ethereum", "token": "ETH" })).unwrap();
        assert_eq!(StakeDomain::validate(&p).unwrap_err(), BAD_CHAIN);
    }

    #[test]
    fn lido_request() {
        let p: StakeParams = serde_json::from_value(json!({
            "chain": "Ethereum", "token": "ETH", "amount": 2, "provider": "Lido"
        }))
        .unwrap();
        let request = StakeDomain::validate(&p).unwrap();
        assert_eq!(request.chain, Chain::Ethereum);
        assert_eq!(request.amount, Some(2.0));
        assert_eq!(request.provider.as_deref(), Some("Lido"));
        assert_eq!(request.symbol(), "ETH");
    }

    #[test]
    fn symbol_falls_back_to_native_asset() {
        let p: StakeParams = serde_json::from_value(json!({ "chain": "Solana", "token": null })).unwrap();
        assert_eq!(StakeDomain::validate(&p).unwrap().symbol(), "SOL");
    }
}
