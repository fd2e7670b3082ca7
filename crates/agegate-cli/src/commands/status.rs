//! `agegate status` — Query the deployment a node is hosting.

use clap::Args;

use super::{fetch_registry_info, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

pub async fn run(args: &StatusArgs) -> anyhow::Result<()> {
    let info = fetch_registry_info(&args.endpoint).await?;

    println!("Registry Status:");
    println!("  Version:    {}", info.version);
    println!("  Scope:      {}", info.scope);
    println!("  Hub:        {}", info.hub_address);
    println!("  Owner:      {}", info.owner);
    match info.registry_address {
        Some(address) => println!("  Endpoint:   {} ({})", address, info.mode),
        None => println!("  Endpoint:   (not configured)"),
    }
    println!(
        "  18+ config: {}",
        info.config_18_plus.as_deref().unwrap_or("(none)")
    );
    println!(
        "  21+ config: {}",
        info.config_21_plus.as_deref().unwrap_or("(none)")
    );
    println!("  Records:    {}", info.records);
    println!("  Uptime:     {}s", info.uptime_secs);

    Ok(())
}
