//! Chat surfaces: where elements are shown and user text comes from.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chainpilot_core::channel::{Channel, ChannelMessage};
use chainpilot_core::error::ChannelError;
use chainpilot_core::staking::RewardOption;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::chat::ChatElement;

/// The orchestrator's view of the UI.
#[async_trait]
pub trait ChatSurface: Send {
    async fn render(&mut self, element: ChatElement);

    /// Next line of user text; `None` once the session has ended.
    async fn next_input(&mut self) -> Option<String>;
}

/// Resolves `/pick N` against the last staking list shown.
#[derive(Debug, Default)]
struct OptionPicker {
    options: Vec<RewardOption>,
}

impl OptionPicker {
    fn observe(&mut self, element: &ChatElement) {
        if let ChatElement::StakingOptions { options, .. } = element {
            self.options = options.clone();
        }
    }

    /// The follow-up utterance for `/pick N`, or the input unchanged.
    fn resolve(&self, input: String) -> String {
        let Some(rest) = input.trim().strip_prefix("/pick") else {
            return input;
        };
        match rest.trim().parse::<usize>() {
            Ok(n) if n >= 1 && n <= self.options.len() => {
                let prompt = self.options[n - 1].stake_prompt();
                debug!(pick = n, prompt = %prompt, "Staking option picked");
                prompt
            }
            _ => input,
        }
    }
}

/// A surface over any [`Channel`]: elements are sent as plain text.
pub struct ChannelSurface {
    channel: Arc<dyn Channel>,
    inbox: mpsc::Receiver<Result<ChannelMessage, ChannelError>>,
    chat_id: String,
    picker: OptionPicker,
}

impl ChannelSurface {
    /// Start `channel` and attach to its inbox.
    pub async fn start(channel: Arc<dyn Channel>, chat_id: impl Into<String>) -> Result<Self, ChannelError> {
        let inbox = channel.start().await?;
        Ok(Self {
            channel,
            inbox,
            chat_id: chat_id.into(),
            picker: OptionPicker::default(),
        })
    }
}

#[async_trait]
impl ChatSurface for ChannelSurface {
    async fn render(&mut self, element: ChatElement) {
        self.picker.observe(&element);
        if let Err(e) = self.channel.send(&self.chat_id, &element.render_text()).await {
            warn!(channel = self.channel.name(), error = %e, "Failed to render element");
        }
    }

    async fn next_input(&mut self) -> Option<String> {
        loop {
            match self.inbox.recv().await? {
                Ok(message) => {
                    self.chat_id = message.chat_id;
                    return Some(self.picker.resolve(message.content));
                }
                Err(e) => warn!(channel = self.channel.name(), error = %e, "Channel error, waiting for next input"),
            }
        }
    }
}

/// A surface fed from a fixed list of inputs that keeps every element it
/// is asked to render. Used for one-shot runs.
#[derive(Debug, Default)]
pub struct BufferedSurface {
    inputs: VecDeque<String>,
    rendered: Vec<ChatElement>,
    picker: OptionPicker,
}

impl BufferedSurface {
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn rendered(&self) -> &[ChatElement] {
        &self.rendered
    }

    pub fn take_rendered(&mut self) -> Vec<ChatElement> {
        std::mem::take(&mut self.rendered)
    }
}

#[async_trait]
impl ChatSurface for BufferedSurface {
    async fn render(&mut self, element: ChatElement) {
        self.picker.observe(&element);
        self.rendered.push(element);
    }

    async fn next_input(&mut self) -> Option<String> {
        let input = self.inputs.pop_front()?;
        Some(self.picker.resolve(input))
    }
}
