//! Fast-finality transfer through a solver route.

use super::{AgentDomain, FieldViolation, lenient_amount, lenient_text, require_chain, require_text};
use chainpilot_core::Chain;
use serde::{Deserialize, Serialize};

const BAD_SOURCE_CHAIN: FieldViolation = FieldViolation::new(
    "sourceChain",
    "The source chain was invalid or missing. Please specify either Ethereum or Solana as the source chain.",
);
const BAD_DESTINATION_CHAIN: FieldViolation = FieldViolation::new(
    "destinationChain",
    "The destination chain was invalid or missing. Please specify either Ethereum or Solana as the destination chain.",
);
const MISSING_TOKEN: FieldViolation = FieldViolation::new(
    "token",
    "Token information was missing. Please specify the token to transfer.",
);
const MISSING_AMOUNT: FieldViolation = FieldViolation::new(
    "amount",
    "The amount was missing or not a number. Please specify how much to transfer.",
);
const MISSING_RECIPIENT: FieldViolation = FieldViolation::new(
    "recipientAddress",
    "The recipient address was missing. Please specify the address that should receive the funds.",
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FastTransferParams {
    #[serde(default, deserialize_with = "lenient_text")]
    pub source_chain: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub destination_chain: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub token: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub recipient_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FastTransferRequest {
    pub source_chain: Chain,
    pub destination_chain: Chain,
    pub token: String,
    pub amount: f64,
    pub recipient_address: String,
}

impl FastTransferRequest {
    /// Amount in the decimal-string form routes expect.
    pub fn amount_string(&self) -> String {
        self.amount.to_string()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FastTransferDomain;

impl AgentDomain for FastTransferDomain {
    const NAME: &'static str = "fast_transfer_agent";

    type Params = FastTransferParams;
    type Request = FastTransferRequest;

    fn system_prompt() -> &'static str {
        r#"You are an agent that performs fast-finality transfers between chains.

Reply with a single JSON object and nothing else (no markdown, no code fences):
{
  "message": "your message to the user",
  "params": {
    "sourceChain": "Ethereum or Solana",
    "destinationChain": "Ethereum or Solana",
    "token": "token address",
    "amount": "amount to transfer",
    "recipientAddress": "recipient address"
  },
  "status": "complete" or "need_input"
}

If you need more information, set status to "need_input", ask one short question in "message" and include whatever params you already know.
Always use double quotes for property names and string values. Never add comments or text outside the JSON object."#
    }

    fn validate(params: &FastTransferParams) -> Result<FastTransferRequest, FieldViolation> {
        let source_chain = require_chain(&params.source_chain, BAD_SOURCE_CHAIN)?;
        let destination_chain = require_chain(&params.destination_chain, BAD_DESTINATION_CHAIN)?;
        let token = require_text(&params.token, MISSING_TOKEN)?;
        let amount = params
            .amount
            .filter(|a| *a > 0.0)
            .ok_or(MISSING_AMOUNT)?;
        let recipient_address = require_text(&params.recipient_address, MISSING_RECIPIENT)?;

        Ok(FastTransferRequest {
            source_chain,
            destination_chain,
            token,
            amount,
            recipient_address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full() -> serde_json::Value {
        json!({
            "sourceChain": "Ethereum",
            "destinationChain": "Solana",
            "token": "ETH",
            "amount": "0.0026",
            "recipientAddress": "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin"
        })
    }

    #[test]
    fn string_amount_is_accepted() {
        let p: FastTransferParams = serde_json::from_value(full()).unwrap();
        let request = FastTransferDomain::validate(&p).unwrap();
        assert_eq!(request.amount_string(), "0.0026");
    }

    #[test]
    fn zero_or_missing_amount_is_rejected() {
        let mut value = full();
        value["amount"] = json!(0);
        let p: FastTransferParams = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(FastTransferDomain::validate(&p).unwrap_err(), MISSING_AMOUNT);

        value["amount"] = json!("lots");
        let p: FastTransferParams = serde_json::from_value(value).unwrap();
        assert_eq!(FastTransferDomain::validate(&p).unwrap_err().field, "amount");
    }

    #[test]
    fn recipient_required() {
        let mut value = full();
        value.as_object_mut().unwrap().remove("recipientAddress");
        let p: FastTransferParams = serde_json::from_value(value).unwrap();
        assert_eq!(FastTransferDomain::validate(&p).unwrap_err(), MISSING_RECIPIENT);
    }
}
