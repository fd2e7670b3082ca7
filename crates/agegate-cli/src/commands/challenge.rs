//! `agegate challenge` — Print the proof challenge a site would present.

use clap::Args;

use agegate_client::ProofChallenge;
use agegate_core::{Address, AgeTier};

use super::{challenge_settings, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct ChallengeArgs {
    /// Address the proof will be generated for.
    pub address: Address,

    /// Age tier to request (18 or 21).
    #[arg(short, long, default_value_t = 18)]
    pub tier: u64,

    /// Site name shown in the proof app.
    #[arg(long, default_value = "AgeGate")]
    pub site_name: String,

    /// Endpoint address for the proof callback (defaults to the node's).
    #[arg(long)]
    pub registry_address: Option<Address>,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

pub async fn run(args: &ChallengeArgs) -> anyhow::Result<()> {
    let tier = AgeTier::from_years(args.tier)?;
    let settings = challenge_settings(&args.endpoint, args.registry_address).await?;
    let challenge = ProofChallenge::build(&settings, &args.site_name, tier, &args.address);
    println!("{}", serde_json::to_string_pretty(&challenge)?);
    Ok(())
}
