//! AgeGate CLI — Command-line interface for the shared age verification registry.
//!
//! Subcommands: status, details, check, record, challenge, gate, rotate-hub,
//! keygen.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// AgeGate — Shared age verification registry.
#[derive(Parser, Debug)]
#[command(name = "agegate", version, about, long_about = None)]
struct Cli {
    /// Log level for client-side diagnostics.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Query the deployment a node is hosting.
    Status(commands::status::StatusArgs),
    /// Show the verification record of an address.
    Details(commands::details::DetailsArgs),
    /// Check whether an address is verified for a tier.
    Check(commands::check::CheckArgs),
    /// Submit a hub verification callback.
    Record(commands::record::RecordArgs),
    /// Print the proof challenge a site would present.
    Challenge(commands::challenge::ChallengeArgs),
    /// Run the age gate for an address.
    Gate(commands::gate::GateArgs),
    /// Replace the hub allowed to record verifications.
    RotateHub(commands::rotate_hub::RotateHubArgs),
    /// Generate a hub or owner signing key.
    Keygen(commands::keygen::KeygenArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Status(args) => commands::status::run(args).await,
        Commands::Details(args) => commands::details::run(args).await,
        Commands::Check(args) => commands::check::run(args).await,
        Commands::Record(args) => commands::record::run(args).await,
        Commands::Challenge(args) => commands::challenge::run(args).await,
        Commands::Gate(args) => commands::gate::run(args).await,
        Commands::RotateHub(args) => commands::rotate_hub::run(args).await,
        Commands::Keygen(args) => commands::keygen::run(args),
    }
}
