//! `chainpilot chat` — Interactive or single-message chat mode.

use std::io::Write;
use std::sync::Arc;

use chainpilot_agent::{BufferedSurface, ChannelSurface, ChatElement, ChatSurface, Orchestrator};
use chainpilot_channels::{CliChannel, cli::CLI_CHAT_ID};
use chainpilot_config::AppConfig;
use chainpilot_core::bridge::BridgeSdk;
use chainpilot_core::event::{DomainEvent, EventBus, LogLevel};
use chainpilot_services::{SdkConfig, StakingRewardsClient, UnconfiguredBridge};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;

    if !config.has_api_key() && config.providers.is_empty() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    OPENAI_API_KEY      = 'sk-...'        (OpenAI)");
        eprintln!("    OPENROUTER_API_KEY  = 'sk-or-v1-...'  (OpenRouter)");
        eprintln!("    CHAINPILOT_API_KEY  = '...'           (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let router = chainpilot_providers::build_from_config(&config);
    let provider = router.default().ok_or("No default provider configured")?;
    let staking = Arc::new(StakingRewardsClient::from_config(&config.staking));
    let sdk_config = SdkConfig::from_config(&config.bridge);
    let bridge: Arc<dyn BridgeSdk> = Arc::new(UnconfiguredBridge::from_sdk_config(&sdk_config));

    let mut orchestrator = Orchestrator::new(provider, bridge, staking, &config);
    let cancel = orchestrator.cancellation_token();
    let echo = tokio::spawn(echo_action_logs(orchestrator.event_bus()));
    let interrupt = tokio::spawn(cancel_on_interrupt(cancel.clone()));

    if let Some(msg) = message {
        // Single message mode: follow-up questions end the session.
        let mut surface = BufferedSurface::default();
        println!("{}", ChatElement::user(&msg).render_text());
        for element in orchestrator.handle(&msg, &mut surface).await {
            println!("{}", element.render_text());
        }
    } else {
        println!();
        println!("  ╔══════════════════════════════════════════════╗");
        println!("  ║       chainpilot — Interactive Mode          ║");
        println!("  ╚══════════════════════════════════════════════╝");
        println!();
        println!("  Provider:  {}", config.default_provider);
        println!("  Model:     {}", config.default_model);
        println!("  Network:   {}", config.bridge.network);
        println!();
        println!("  Try: \"stake 2 ETH on ethereum with Lido\" or \"bridge some tokens\".");
        println!("  Type 'exit' or Ctrl+D to quit.");
        println!();

        let channel = Arc::new(CliChannel::new());
        let mut surface = ChannelSurface::start(channel, CLI_CHAT_ID)
            .await
            .map_err(|e| format!("Channel error: {e}"))?;

        loop {
            print!("  You > ");
            std::io::stdout().flush()?;

            let input = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                input = surface.next_input() => input,
            };
            let Some(input) = input else {
                break;
            };
            let elements = orchestrator.handle(&input, &mut surface).await;
            debug!(elements = elements.len(), "Utterance handled");
            if elements.iter().any(|e| matches!(e, ChatElement::Error { .. })) {
                warn!("Utterance ended with an error");
            }
            println!();
            if cancel.is_cancelled() {
                break;
            }
        }

        println!();
        println!("  Goodbye!");
        println!();
    }

    cancel.cancel();
    interrupt.abort();
    echo.abort();
    Ok(())
}

/// Ctrl-C ends the session: pending executor waits stop and the input loop
/// exits.
async fn cancel_on_interrupt(cancel: CancellationToken) {
    tokio::select! {
        _ = cancel.cancelled() => {}
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("Interrupted, ending session"),
                Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C, ending session"),
            }
            cancel.cancel();
        }
    }
}

/// Print executor progress as it is published.
async fn echo_action_logs(events: Arc<EventBus>) {
    let mut rx = events.subscribe();
    loop {
        match rx.recv().await {
            Ok(event) => {
                if let DomainEvent::ActionLogged(entry) = event.as_ref() {
                    let marker = match entry.level {
                        LogLevel::Info => "·",
                        LogLevel::Success => "✓",
                        LogLevel::Error => "✗",
                    };
                    eprintln!("  {marker} [{}] {}", entry.source, entry.message);
                }
            }
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "Action log echo lagged"),
            Err(RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn interrupt_watcher_exits_when_session_ends() {
        let cancel = CancellationToken::new();
        let watcher = tokio::spawn(cancel_on_interrupt(cancel.clone()));

        cancel.cancel();

        tokio::time::timeout(std::time::Duration::from_secs(1), watcher)
            .await
            .expect("watcher stops with the session")
            .unwrap();
    }
}
