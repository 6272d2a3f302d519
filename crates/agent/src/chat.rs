//! Chat elements: what the orchestrator asks a surface to show.

use chainpilot_core::staking::RewardOption;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::domains::TransferRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

/// Tagged rendering instruction.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatElement {
    Message { speaker: Speaker, text: String },
    Header { text: String },
    StepIndicator { index: usize, total: usize, agent: String },
    StakingOptions { symbol: String, options: Vec<RewardOption> },
    TransferWidget { transfer: TransferRequest },
    Error { text: String },
}

impl ChatElement {
    pub fn assistant(text: impl Into<String>) -> Self {
        ChatElement::Message {
            speaker: Speaker::Assistant,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        ChatElement::Message {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        ChatElement::Error { text: text.into() }
    }

    /// Plain-text rendering for terminal channels.
    pub fn render_text(&self) -> String {
        match self {
            ChatElement::Message { speaker: Speaker::User, text } => format!("> {text}"),
            ChatElement::Message { text, .. } => text.clone(),
            ChatElement::Header { text } => format!("== {text} =="),
            ChatElement::StepIndicator { index, total, agent } => {
                format!("[step {}/{}] {}", index + 1, total, agent)
            }
            ChatElement::StakingOptions { symbol, options } => render_options(symbol, options),
            ChatElement::TransferWidget { transfer } => {
                let amount = transfer
                    .amount
                    .map(|a| a.to_string())
                    .unwrap_or_else(|| "?".into());
                format!(
                    "Transfer ready: {amount} {} on {} -> {} on {}",
                    transfer.from_token, transfer.from_chain, transfer.to_token, transfer.to_chain
                )
            }
            ChatElement::Error { text } => format!("error: {text}"),
        }
    }
}

fn render_options(symbol: &str, options: &[RewardOption]) -> String {
    let mut out = format!("Staking options for {symbol}:");
    for (i, option) in options.iter().enumerate() {
        let provider = option.provider().map(|p| p.name.as_str()).unwrap_or("unknown");
        let asset = option.asset().map(|a| a.symbol.as_str()).unwrap_or("?");
        let rate = option
            .reward_rate()
            .map(|r| format!("{r:.2}%"))
            .unwrap_or_else(|| "n/a".into());
        let _ = write!(out, "\n  {}. {provider} ({asset}) reward rate {rate}", i + 1);
    }
    out.push_str("\nReply /pick <n> to stake with one of them.");
    out
}
