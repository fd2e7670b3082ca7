//! `agegate check` — Check whether an address is verified for a tier.

use clap::Args;

use agegate_client::{HttpRegistryReader, RegistryReader};
use agegate_core::Address;

use super::DEFAULT_ENDPOINT;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Address to check.
    pub address: Address,

    /// Age threshold to check against.
    #[arg(short, long, default_value_t = 18)]
    pub tier: u64,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

pub async fn run(args: &CheckArgs) -> anyhow::Result<()> {
    let reader = HttpRegistryReader::new(args.endpoint.clone());
    let verified = reader.is_verified_for_tier(&args.address, args.tier).await?;

    if verified {
        println!("{} is verified for {}+", args.address, args.tier);
    } else {
        println!("{} is NOT verified for {}+", args.address, args.tier);
    }

    Ok(())
}
