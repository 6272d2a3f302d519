//! Regular bridge transfer. Completion prefills the transfer widget; no
//! executor runs for this domain.

use super::{AgentDomain, FieldViolation, lenient_amount, lenient_text, require_chain, require_text};
use chainpilot_core::Chain;
use serde::{Deserialize, Serialize};

const BAD_FROM_CHAIN: FieldViolation = FieldViolation::new(
    "fromChain",
    "The source chain was invalid or missing. Please specify either Ethereum or Solana as the source chain.",
);
const BAD_TO_CHAIN: FieldViolation = FieldViolation::new(
    "toChain",
    "The destination chain was invalid or missing. Please specify either Ethereum or Solana as the destination chain.",
);
const MISSING_TOKENS: &str = "Token information was missing. Please specify both source and destination tokens.";
const MISSING_FROM_TOKEN: FieldViolation = FieldViolation::new("fromToken", MISSING_TOKENS);
const MISSING_TO_TOKEN: FieldViolation = FieldViolation::new("toToken", MISSING_TOKENS);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferParams {
    #[serde(default, deserialize_with = "lenient_text")]
    pub from_chain: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub to_chain: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub from_token: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub to_token: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub from_chain: Chain,
    pub to_chain: Chain,
    pub from_token: String,
    pub to_token: String,
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TransferDomain;

impl AgentDomain for TransferDomain {
    const NAME: &'static str = "bridge_transfer_agent";

    type Params = TransferParams;
    type Request = TransferRequest;

    fn system_prompt() -> &'static str {
        r#"You are a bridge transfer specialist. You help users move tokens between chains.

From the conversation, extract the source chain, destination chain, source token, destination token and, if given, the amount.
When anything required is missing, ask for it and set status to "need_input".

Reply with a single JSON object and nothing else (no markdown, no code fences):
{
  "message": "a short question for the user, or 'Preparing your transfer...' when complete",
  "params": {
    "fromChain": "Ethereum or Solana",
    "toChain": "Ethereum or Solana",
    "fromToken": "source token",
    "toToken": "destination token",
    "amount": number or null
  },
  "status": "complete" or "need_input"
}

Keep questions short: 'What is the source chain?', 'What is the destination chain?', 'Which token are you sending?', 'Which token should arrive?'"#
    }

    fn validate(params: &TransferParams) -> Result<TransferRequest, FieldViolation> {
        let from_chain = require_chain(&params.from_chain, BAD_FROM_CHAIN)?;
        let to_chain = require_chain(&params.to_chain, BAD_TO_CHAIN)?;
        let from_token = require_text(&params.from_token, MISSING_FROM_TOKEN)?;
        let to_token = require_text(&params.to_token, MISSING_TO_TOKEN)?;

        Ok(TransferRequest {
            from_chain,
            to_chain,
            from_token,
            to_token,
            amount: params.amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: serde_json::Value) -> TransferParams {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn complete_params_validate() {
        let p = params(json!({
            "fromChain": "Ethereum", "toChain": "Solana",
            "fromToken": "USDC", "toToken": "USDC", "amount": "25"
        }));
        let request = TransferDomain::validate(&p).unwrap();
        assert_eq!(request.from_chain, Chain::Ethereum);
        assert_eq!(request.to_chain, Chain::Solana);
        assert_eq!(request.amount, Some(25.0));
    }

    #[test]
    fn checks_run_in_order() {
        let p = params(json!({ "fromChain": "Mars", "toChain": "Venus" }));
        assert_eq!(TransferDomain::validate(&p).unwrap_err().field, "fromChain");

        let p = params(json!({ "fromChain": "Ethereum", "toChain": "Mars" }));
        assert_eq!(TransferDomain::validate(&p).unwrap_err(), BAD_TO_CHAIN);

        let p = params(json!({ "fromChain": "Ethereum", "toChain": "Solana", "fromToken": "ETH" }));
        assert_eq!(TransferDomain::validate(&p).unwrap_err(), MISSING_TO_TOKEN);
    }

    #[test]
    fn missing_token_names_its_field() {
        let p = params(json!({ "fromChain": "Ethereum", "toChain": "Solana", "toToken": "SOL" }));
        let violation = TransferDomain::validate(&p).unwrap_err();
        assert_eq!(violation.field, "fromToken");

        let p = params(json!({ "fromChain": "Ethereum", "toChain": "Solana", "fromToken": "ETH" }));
        let violation = TransferDomain::validate(&p).unwrap_err();
        assert_eq!(violation.field, "toToken");
        assert_eq!(violation.corrective, MISSING_TOKENS);
    }

    #[test]
    fn amount_is_optional() {
        let p = params(json!({
            "fromChain": "Solana", "toChain": "Ethereum",
            "fromToken": "SOL", "toToken": "WSOL", "amount": null
        }));
        assert_eq!(TransferDomain::validate(&p).unwrap().amount, None);
    }
}
