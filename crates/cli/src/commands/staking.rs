//! `chainpilot staking` — Look up staking reward options.

use chainpilot_core::staking::{RewardOption, StakingQuery, StakingRewards};
use chainpilot_services::StakingRewardsClient;

pub async fn run(
    symbols: Vec<String>,
    type_key: String,
    limit: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;

    let query = StakingQuery {
        symbols: symbols.iter().map(|s| s.to_uppercase()).collect(),
        type_keys: vec![type_key],
        limit: limit.unwrap_or(config.staking.limit),
    };
    let client = StakingRewardsClient::from_config(&config.staking);
    let options = client
        .reward_options(&query)
        .await
        .map_err(|e| format!("Failed to fetch staking options: {e}"))?;

    if options.is_empty() {
        println!("No staking options found for {}.", query.symbols.join(", "));
        return Ok(());
    }

    println!("{:<4} {:<28} {:<12} {:>12}", "#", "Provider", "Asset", "Reward rate");
    for (i, option) in options.iter().enumerate() {
        println!("{}", format_row(i + 1, option));
    }
    Ok(())
}

fn format_row(rank: usize, option: &RewardOption) -> String {
    let provider = option.provider().map(|p| p.name.as_str()).unwrap_or("unknown");
    let asset = option.asset().map(|a| a.symbol.as_str()).unwrap_or("?");
    let rate = option
        .reward_rate()
        .map(|r| format!("{r:.2}%"))
        .unwrap_or_else(|| "n/a".into());
    format!("{rank:<4} {provider:<28} {asset:<12} {rate:>12}")
}
