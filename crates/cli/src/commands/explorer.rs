//! `chainpilot explorer` — Wormholescan queries.

use chainpilot_services::WormholescanClient;
use chainpilot_services::explorer::{ActivityQuery, Observation, ObservationQuery, SortOrder};
use chrono::{Duration, SecondsFormat, Utc};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum ExplorerCommand {
    /// Latest Wormhole transactions
    LastTxs {
        /// Time window, e.g. "1d"
        #[arg(long)]
        timespan: Option<String>,

        /// Sampling rate
        #[arg(long)]
        sample_rate: Option<u32>,
    },

    /// Top cross-chain activity in a time window
    Activity {
        /// Bucket size, e.g. "1d" or "7d"
        #[arg(long, default_value = "1d")]
        timespan: String,

        /// RFC 3339 start (defaults to 7 days ago)
        #[arg(long)]
        from: Option<String>,

        /// RFC 3339 end (defaults to now)
        #[arg(long)]
        to: Option<String>,

        /// Restrict to one application id
        #[arg(long)]
        app_id: Option<String>,
    },

    /// Guardian observations for a transaction
    Observations {
        /// Transaction hash
        tx_hash: String,

        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = 10)]
        page_size: u32,

        /// Oldest first
        #[arg(long)]
        asc: bool,
    },
}

pub async fn run(command: ExplorerCommand) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let client = WormholescanClient::from_config(&config.explorer);

    match command {
        ExplorerCommand::LastTxs { timespan, sample_rate } => {
            let txs = client
                .last_transactions(timespan.as_deref(), sample_rate)
                .await
                .map_err(|e| format!("Failed to fetch transactions: {e}"))?;
            println!("{}", serde_json::to_string_pretty(&txs)?);
        }
        ExplorerCommand::Activity {
            timespan,
            from,
            to,
            app_id,
        } => {
            let now = Utc::now();
            let query = ActivityQuery {
                timespan,
                from: from.unwrap_or_else(|| rfc3339(now - Duration::days(7))),
                to: to.unwrap_or_else(|| rfc3339(now)),
                app_id,
            };
            let activity = client
                .cross_chain_activity(&query)
                .await
                .map_err(|e| format!("Failed to fetch activity: {e}"))?;
            println!("{}", serde_json::to_string_pretty(&activity)?);
        }
        ExplorerCommand::Observations {
            tx_hash,
            page,
            page_size,
            asc,
        } => {
            let query = ObservationQuery {
                page,
                page_size,
                sort_order: if asc { SortOrder::Asc } else { SortOrder::Desc },
                ..ObservationQuery::for_tx(tx_hash)
            };
            let observations = client
                .observations(&query)
                .await
                .map_err(|e| format!("Failed to fetch observations: {e}"))?;
            if observations.is_empty() {
                println!("No observations found for {}.", query.tx_hash);
            }
            for observation in &observations {
                println!("{}", format_observation(observation));
            }
        }
    }

    Ok(())
}

fn rfc3339(at: chrono::DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn format_observation(observation: &Observation) -> String {
    let chain = observation
        .emitter_chain_name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("chain {}", observation.emitter_chain));
    format!(
        "{chain} seq {} guardian {} sig {}",
        observation.sequence,
        observation.guardian_address,
        observation.short_signature().unwrap_or_else(|| "-".into())
    )
}
