//! chainpilot CLI — the main entry point.
//!
//! Commands:
//! - `onboard`   — Write the default config
//! - `chat`      — Interactive or single-message chat with the agents
//! - `staking`   — Look up staking reward options
//! - `explorer`  — Query Wormholescan
//! - `status`    — Show configuration and provider health

use clap::{Parser, Subcommand};

mod commands;

use commands::explorer::ExplorerCommand;

#[derive(Parser)]
#[command(
    name = "chainpilot",
    about = "chainpilot — conversational cross-chain assistant",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Chat with the agents
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Look up staking reward options
    Staking {
        /// Asset symbols to look up (repeatable)
        #[arg(short, long = "symbol", default_values_t = ["ETH".to_string(), "SOL".to_string()])]
        symbols: Vec<String>,

        /// Reward type key
        #[arg(short, long, default_value = chainpilot_core::staking::DEFAULT_TYPE_KEY)]
        type_key: String,

        /// Maximum number of options (defaults to the configured limit)
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Query the Wormholescan explorer
    Explorer {
        #[command(subcommand)]
        command: ExplorerCommand,
    },

    /// Show configuration and provider health
    Status,
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    // Logs go to stderr so command output stays pipeable.
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Chat { message } => commands::chat::run(message).await?,
        Commands::Staking {
            symbols,
            type_key,
            limit,
        } => commands::staking::run(symbols, type_key, limit).await?,
        Commands::Explorer { command } => commands::explorer::run(command).await?,
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}
