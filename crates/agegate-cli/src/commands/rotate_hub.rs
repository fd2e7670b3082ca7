//! `agegate rotate-hub` — Replace the hub allowed to record verifications.

use clap::Args;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use agegate_core::{rotate_hub_message, Address};

use super::{bail_on_error, fetch_registry_info, load_key, unreachable, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct RotateHubArgs {
    /// File holding the registry owner's secret key (hex).
    #[arg(long)]
    pub key_file: PathBuf,

    /// The new hub address.
    #[arg(long)]
    pub new_hub: Address,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Serialize)]
struct RotateHubRequest {
    new_hub: String,
    public_key: String,
    signature: String,
}

#[derive(Deserialize)]
struct RotateHubResponse {
    hub_address: Address,
}

pub async fn run(args: &RotateHubArgs) -> anyhow::Result<()> {
    let key = load_key(&args.key_file)?;
    let current = fetch_registry_info(&args.endpoint).await?.hub_address;
    let signature = key.sign(&rotate_hub_message(&current, &args.new_hub));

    let url = format!("{}/api/v1/admin/hub", args.endpoint);
    let body = RotateHubRequest {
        new_hub: args.new_hub.to_string(),
        public_key: key.public_key().to_hex(),
        signature: signature.to_hex(),
    };

    let client = reqwest::Client::new();
    let resp = client
        .post(&url)
        .json(&body)
        .send()
        .await
        .map_err(|e| unreachable(&args.endpoint, e))?;

    if !resp.status().is_success() {
        return bail_on_error("hub rotation", resp).await;
    }

    let data: RotateHubResponse = resp.json().await?;
    println!("Hub rotated.");
    println!("  From:  {}", current);
    println!("  To:    {}", data.hub_address);

    Ok(())
}
