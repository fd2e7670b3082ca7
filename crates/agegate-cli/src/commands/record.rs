//! `agegate record` — Submit a signed hub verification callback.

use clap::Args;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use agegate_core::{record_message, Address, HubAttestation};

use super::{bail_on_error, load_key, unreachable, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct RecordArgs {
    /// File holding the hub's secret key (hex).
    #[arg(long)]
    pub key_file: PathBuf,

    /// Address the proof was generated for.
    #[arg(long)]
    pub prover: Address,

    /// Scope the proof was generated under.
    #[arg(long, default_value = agegate_core::DEFAULT_SCOPE)]
    pub scope: String,

    /// Requested tier as carried in the proof's user-defined data.
    #[arg(long, default_value = "18")]
    pub user_data: String,

    /// Minimum age the proof discloses.
    #[arg(long)]
    pub disclosed_min_age: u64,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Serialize)]
struct RecordRequest {
    prover: String,
    scope: String,
    user_defined_data: String,
    disclosed_min_age: u64,
    public_key: String,
    signature: String,
}

#[derive(Deserialize)]
struct RecordResponse {
    prover: Address,
    outcome: String,
    details: RecordDetails,
}

#[derive(Deserialize)]
struct RecordDetails {
    min_age: u64,
    timestamp: u64,
}

pub async fn run(args: &RecordArgs) -> anyhow::Result<()> {
    let key = load_key(&args.key_file)?;
    let attestation = HubAttestation {
        prover: args.prover,
        scope: args.scope.clone(),
        user_defined_data: args.user_data.clone(),
        disclosed_min_age: args.disclosed_min_age,
    };
    let signature = key.sign(&record_message(&attestation));

    let url = format!("{}/api/v1/verifications", args.endpoint);
    let body = RecordRequest {
        prover: attestation.prover.to_string(),
        scope: attestation.scope,
        user_defined_data: attestation.user_defined_data,
        disclosed_min_age: attestation.disclosed_min_age,
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
        return bail_on_error("recording", resp).await;
    }

    let data: RecordResponse = resp.json().await?;
    println!("Verification recorded!");
    println!("  Prover:     {}", data.prover);
    println!("  Outcome:    {}", data.outcome);
    println!("  Min age:    {}+", data.details.min_age);
    println!("  Timestamp:  {}", data.details.timestamp);

    Ok(())
}
