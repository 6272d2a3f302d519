//! Token wrapping (attestation of an origin token on a destination chain).

use super::{AgentDomain, FieldViolation, lenient_text, require_chain, require_text};
use chainpilot_core::Chain;
use serde::{Deserialize, Serialize};

const BAD_ORIGIN_CHAIN: FieldViolation = FieldViolation::new(
    "originChain",
    "The origin chain was invalid or missing. Please specify either Ethereum or Solana as the chain the token lives on.",
);
const BAD_DESTINATION_CHAIN: FieldViolation = FieldViolation::new(
    "destinationChain",
    "The destination chain was invalid or missing. Please specify either Ethereum or Solana as the chain to wrap to.",
);
const MISSING_TOKEN: FieldViolation = FieldViolation::new(
    "token",
    "Token information was missing. Please specify the address of the token to wrap.",
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrapParams {
    #[serde(default, deserialize_with = "lenient_text")]
    pub origin_chain: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub destination_chain: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WrapRequest {
    pub origin_chain: Chain,
    pub destination_chain: Chain,
    pub token: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WrapDomain;

impl AgentDomain for WrapDomain {
    const NAME: &'static str = "wrap_token_agent";

    type Params = WrapParams;
    type Request = WrapRequest;

    fn system_prompt() -> &'static str {
        r#"You are an agent that checks for and creates wrapped tokens.

Reply with a single JSON object and nothing else (no markdown, no code fences):
{
  "message": "your message to the user",
  "params": {
    "originChain": "Ethereum or Solana",
    "destinationChain": "Ethereum or Solana",
    "token": "token address"
  },
  "status": "complete" or "need_input"
}

If something is missing, set status to "need_input" and ask: 'Which chain is the original token on?', 'Which chain would you like to wrap to?', 'What token would you like to wrap?'"#
    }

    fn validate(params: &WrapParams) -> Result<WrapRequest, FieldViolation> {
        Ok(WrapRequest {
            origin_chain: require_chain(&params.origin_chain, BAD_ORIGIN_CHAIN)?,
            destination_chain: require_chain(&params.destination_chain, BAD_DESTINATION_CHAIN)?,
            token: require_text(&params.token, MISSING_TOKEN)?,
        })
    }
}
