//! `agegate keygen` — Generate a hub or owner signing key.

use clap::Args;
use std::path::PathBuf;

use agegate_core::KeyPair;

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Write the secret key (hex) to this file.
    #[arg(short, long)]
    pub out: PathBuf,
}

pub fn run(args: &KeygenArgs) -> anyhow::Result<()> {
    if args.out.exists() {
        anyhow::bail!("{} already exists; refusing to overwrite", args.out.display());
    }
    let kp = KeyPair::generate();
    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&args.out, kp.secret_hex())?;

    println!("Key written to {}", args.out.display());
    println!("  Public key:  {}", kp.public_key().to_hex());
    println!("  Address:     {}", kp.address());
    println!();
    println!("Use the address as hub_address or owner under [registry].");
    Ok(())
}
