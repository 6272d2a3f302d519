//! CLI channel: interactive terminal chat.
//!
//! Reads lines from stdin (or any async reader), writes replies to stdout.
//! Used by `chainpilot chat`.

use std::sync::Mutex;

use async_trait::async_trait;
use chainpilot_core::channel::{Channel, ChannelId, ChannelMessage};
use chainpilot_core::error::ChannelError;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

pub const CLI_CHAT_ID: &str = "cli_session";

type Input = Box<dyn AsyncBufRead + Send + Unpin>;

/// Interactive CLI channel for terminal-based chat.
pub struct CliChannel {
    id: ChannelId,
    /// Taken by the first `start`.
    input: Mutex<Option<Input>>,
}

impl CliChannel {
    pub fn new() -> Self {
        Self::with_reader(BufReader::new(io::stdin()))
    }

    /// Read user lines from `reader` instead of stdin.
    pub fn with_reader(reader: impl AsyncBufRead + Send + Unpin + 'static) -> Self {
        Self {
            id: ChannelId("cli".into()),
            input: Mutex::new(Some(Box::new(reader))),
        }
    }
}

impl Default for CliChannel {
    fn default() -> Self {
        Self::new()
    }
}

fn is_exit(line: &str) -> bool {
    matches!(line, "exit" | "quit" | "/exit" | "/quit" | ":q")
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    fn id(&self) -> &ChannelId {
        &self.id
    }

    async fn start(&self) -> Result<mpsc::Receiver<Result<ChannelMessage, ChannelError>>, ChannelError> {
        let reader = self
            .input
            .lock()
            .map_err(|_| ChannelError::ConnectionLost("input lock poisoned".into()))?
            .take()
            .ok_or_else(|| ChannelError::NotConfigured("CLI channel already started".into()))?;

        let (tx, rx) = mpsc::channel(32);
        let channel_id = self.id.clone();

        tokio::spawn(async move {
            let mut lines = reader.lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim().to_string();
                        if line.is_empty() {
                            continue;
                        }
                        if is_exit(&line) {
                            debug!("Exit command received");
                            break;
                        }

                        let msg = ChannelMessage::new(channel_id.clone(), CLI_CHAT_ID, line);
                        if tx.send(Ok(msg)).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF (Ctrl+D)
                    Err(e) => {
                        let _ = tx.send(Err(ChannelError::ConnectionLost(e.to_string()))).await;
                        break;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn send(&self, _chat_id: &str, content: &str) -> Result<(), ChannelError> {
        println!("{content}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn cli_channel_properties() {
        let ch = CliChannel::new();
        assert_eq!(ch.name(), "cli");
        assert_eq!(ch.id().0, "cli");
    }

    #[tokio::test]
    async fn skips_blank_lines_and_stops_on_exit() {
        let ch = CliChannel::with_reader(Cursor::new(b"stake ETH\n\n  \nEthereum\nexit\nignored\n".to_vec()));
        let mut rx = ch.start().await.unwrap();

        let first = rx.recv().await.unwrap().unwrap();
        assert_eq!(first.content, "stake ETH");
        assert_eq!(first.chat_id, CLI_CHAT_ID);
        assert_eq!(rx.recv().await.unwrap().unwrap().content, "Ethereum");
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn second_start_is_rejected() {
        let ch = CliChannel::with_reader(Cursor::new(Vec::new()));
        let _rx = ch.start().await.unwrap();
        assert!(matches!(ch.start().await, Err(ChannelError::NotConfigured(_))));
    }
}
