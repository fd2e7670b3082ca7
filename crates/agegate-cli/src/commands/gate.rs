//! `agegate gate` — Run the age gate for an address against a node.
//!
//! Prints `Verified` when the registry already holds a qualifying record,
//! otherwise the proof challenge to complete. With `--await-proof` the
//! command then waits for the proof to land in the registry.

use clap::Args;
use std::time::Duration;

use agegate_client::{AgeGateWidget, HttpRegistryReader, SettlePolicy, WidgetConfig};
use agegate_core::{Address, AgeTier, WidgetState};

use super::{challenge_settings, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct GateArgs {
    /// Connected wallet address.
    pub address: Address,

    /// Age tier the site requires (18 or 21).
    #[arg(short, long, default_value_t = 18)]
    pub tier: u64,

    /// Site name shown in the proof app.
    #[arg(long, default_value = "AgeGate")]
    pub site_name: String,

    /// Endpoint address for the proof callback (defaults to the node's).
    #[arg(long)]
    pub registry_address: Option<Address>,

    /// After printing the challenge, wait for the proof to be recorded.
    #[arg(long)]
    pub await_proof: bool,

    /// Seconds to wait for a completed proof to become visible.
    #[arg(long, default_value_t = 30)]
    pub max_wait: u64,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

pub async fn run(args: &GateArgs) -> anyhow::Result<()> {
    let tier = AgeTier::from_years(args.tier)?;
    let challenge = challenge_settings(&args.endpoint, args.registry_address).await?;
    let config = WidgetConfig {
        site_name: args.site_name.clone(),
        tier,
        challenge,
        settle: SettlePolicy {
            max_wait: Duration::from_secs(args.max_wait),
            ..SettlePolicy::default()
        },
    };

    let mut widget = AgeGateWidget::new(HttpRegistryReader::new(args.endpoint.clone()), config);
    let mut state = widget.load(Some(args.address)).await;

    if state == WidgetState::NeedsProof {
        if let Some(challenge) = widget.challenge() {
            println!("{} is not verified for {}. Complete this proof:", args.address, tier);
            println!("{}", serde_json::to_string_pretty(&challenge)?);
        }
        if args.await_proof {
            println!();
            println!("Waiting up to {}s for the proof to be recorded...", args.max_wait);
            state = widget.on_proof_success().await?;
        }
    }

    report(&widget, state)
}

fn report(widget: &AgeGateWidget<HttpRegistryReader>, state: WidgetState) -> anyhow::Result<()> {
    match state {
        WidgetState::Verified => {
            println!("Verified for {}", widget.tier());
            if let Some(at) = widget.verified_at() {
                println!("  Since:  {}", at.to_rfc3339());
            }
            Ok(())
        }
        WidgetState::NeedsProof => Ok(()),
        WidgetState::CheckFailed => {
            let message = widget.message().unwrap_or("check failed");
            match widget.last_error() {
                Some(e) => anyhow::bail!("{}: {}", message, e),
                None => anyhow::bail!("{}", message),
            }
        }
        other => anyhow::bail!("gate ended in unexpected state {}", other),
    }
}
