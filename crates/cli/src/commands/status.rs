//! `chainpilot status` — Show configuration and provider health.

use chainpilot_config::AppConfig;
use chainpilot_core::Chain;
use chainpilot_services::SdkConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;

    let sdk = SdkConfig::from_config(&config.bridge);
    let set = |present: bool| if present { "set" } else { "not set" };

    println!("chainpilot Status");
    println!("=================");
    println!("  Config dir:     {}", AppConfig::config_dir().display());
    println!("  Provider:       {}", config.default_provider);
    println!("  Model:          {}", config.default_model);
    println!("  Planner model:  {}", config.planner_model());
    println!("  Summary model:  {}", config.summary_model());
    println!("  Temperature:    {}", config.default_temperature);
    println!("  History limit:  {}", config.agents.history_limit);
    println!("  API key:        {}", set(config.has_api_key()));
    println!("  Network:        {}", config.bridge.network);
    println!("  Ethereum RPC:   {}", sdk.rpc(Chain::Ethereum));
    println!("  Solana RPC:     {}", sdk.rpc(Chain::Solana));
    match sdk.missing_keys().as_slice() {
        [] => println!("  Signing keys:   set"),
        missing => println!("  Signing keys:   missing {}", missing.join(", ")),
    }
    println!("  Staking API:    {} (key {})", config.staking.endpoint, set(config.staking.api_key.is_some()));
    println!("  Explorer:       {}", config.explorer.base_url);

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `chainpilot onboard` first");
    }

    let router = chainpilot_providers::build_from_config(&config);
    match router.default() {
        Some(provider) => match provider.health_check().await {
            Ok(true) => println!("  ✅ Provider {} reachable", provider.name()),
            Ok(false) => println!("  ⚠️  Provider {} not healthy", provider.name()),
            Err(e) => println!("  ❌ Provider {} unreachable: {e}", provider.name()),
        },
        None => println!("  ❌ No default provider configured"),
    }

    Ok(())
}
