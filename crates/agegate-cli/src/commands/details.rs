//! `agegate details` — Show the verification record of an address.

use clap::Args;

use agegate_client::{HttpRegistryReader, RegistryReader};
use agegate_core::Address;

use super::DEFAULT_ENDPOINT;

#[derive(Args, Debug)]
pub struct DetailsArgs {
    /// Address to look up.
    pub address: Address,

    /// Print the raw JSON record.
    #[arg(long)]
    pub json: bool,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

pub async fn run(args: &DetailsArgs) -> anyhow::Result<()> {
    let reader = HttpRegistryReader::new(args.endpoint.clone());
    let details = reader.verification_details(&args.address).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&details)?);
        return Ok(());
    }

    println!("Verification record for {}:", args.address);
    if details.is_verified {
        println!("  Verified:   yes");
        println!("  Min age:    {}+", details.min_age);
        println!("  Timestamp:  {}", details.timestamp);
    } else {
        println!("  Verified:   no");
    }

    Ok(())
}
