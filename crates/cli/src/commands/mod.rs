//! CLI subcommands, one module per command.

pub mod chat;
pub mod explorer;
pub mod onboard;
pub mod staking;
pub mod status;

use chainpilot_config::AppConfig;

/// Load the config, turning the error into a readable message.
pub(crate) fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    AppConfig::load().map_err(|e| format!("Failed to load config: {e}").into())
}
