//! CLI subcommands and the node responses they share.

pub mod challenge;
pub mod check;
pub mod details;
pub mod gate;
pub mod keygen;
pub mod record;
pub mod rotate_hub;
pub mod status;

use serde::Deserialize;

use agegate_core::{Address, EndpointMode};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:9101";

/// Body of `GET /api/v1/registry`.
#[derive(Deserialize)]
pub struct RegistryInfo {
    pub version: String,
    pub scope: String,
    pub hub_address: Address,
    pub owner: Address,
    pub registry_address: Option<Address>,
    pub mode: EndpointMode,
    pub config_18_plus: Option<String>,
    pub config_21_plus: Option<String>,
    pub records: usize,
    pub uptime_secs: u64,
}

#[derive(Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

/// Fetch the deployment a node is hosting.
pub async fn fetch_registry_info(endpoint: &str) -> anyhow::Result<RegistryInfo> {
    let url = format!("{}/api/v1/registry", endpoint);
    let resp = reqwest::get(&url)
        .await
        .map_err(|e| anyhow::anyhow!("could not reach node at {}: {}", endpoint, e))?;
    if !resp.status().is_success() {
        anyhow::bail!("node returned HTTP {}", resp.status());
    }
    Ok(resp.json().await?)
}

/// Turn a non-success response into an error carrying the node's message.
pub async fn bail_on_error(what: &str, resp: reqwest::Response) -> anyhow::Result<()> {
    let status = resp.status();
    if let Ok(err) = resp.json::<ErrorResponse>().await {
        anyhow::bail!("{} failed (HTTP {}, {}): {}", what, status, err.kind, err.error);
    } else {
        anyhow::bail!("{} failed (HTTP {})", what, status);
    }
}

/// Error for a write that never reached the node.
pub fn unreachable(endpoint: &str, e: reqwest::Error) -> anyhow::Error {
    anyhow::anyhow!(
        "could not reach node at {}: {} (is it running? start it with: agegate-node)",
        endpoint,
        e
    )
}

/// Load a hex-encoded signing key from a file.
pub fn load_key(path: &std::path::Path) -> anyhow::Result<agegate_core::KeyPair> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("could not read key file {}: {}", path.display(), e))?;
    Ok(agegate_core::KeyPair::from_hex(&contents)?)
}

/// Challenge settings for the deployment behind `endpoint`.
///
/// `registry_address` overrides the endpoint address the node advertises.
pub async fn challenge_settings(
    endpoint: &str,
    registry_address: Option<Address>,
) -> anyhow::Result<agegate_client::ChallengeSettings> {
    let info = fetch_registry_info(endpoint).await?;
    let registry_address = registry_address
        .or(info.registry_address)
        .ok_or_else(|| {
            anyhow::anyhow!("node has no registry_address configured; pass --registry-address")
        })?;
    Ok(agegate_client::ChallengeSettings {
        scope: info.scope,
        registry_address,
        mode: info.mode,
    })
}
