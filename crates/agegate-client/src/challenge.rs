use serde::{Deserialize, Serialize};

use agegate_core::{Address, AgeTier, EndpointMode};

/// Version of the proof-request format understood by the hub's mobile flow.
pub const PROTOCOL_VERSION: u32 = 2;

/// Deployment values every challenge from a site must share with the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeSettings {
    /// Must equal the registry's scope or the registry rejects the proof.
    pub scope: String,
    /// Registry the hub calls back into.
    pub registry_address: Address,
    pub mode: EndpointMode,
}

/// Disclosures the proof must satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisclosureRequest {
    pub minimum_age: u64,
    pub excluded_countries: Vec<String>,
    pub ofac_check: bool,
}

/// The request a relying site hands to the external proof flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofChallenge {
    pub protocol_version: u32,
    pub application_name: String,
    pub scope_identifier: String,
    /// Registry address, lowercase.
    pub endpoint_address: String,
    pub endpoint_mode: EndpointMode,
    pub requester_address: String,
    pub requester_id_type: String,
    /// The requested tier; the registry decodes it on callback.
    pub user_defined_data: String,
    pub disclosure_request: DisclosureRequest,
}

impl ProofChallenge {
    /// Build the challenge asking `requester` to prove `tier` for `site_name`.
    pub fn build(
        settings: &ChallengeSettings,
        site_name: &str,
        tier: AgeTier,
        requester: &Address,
    ) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            application_name: format!("{} Age Verification", site_name),
            scope_identifier: settings.scope.clone(),
            endpoint_address: settings.registry_address.to_string().to_lowercase(),
            endpoint_mode: settings.mode,
            requester_address: requester.to_string(),
            requester_id_type: "hex".into(),
            user_defined_data: tier.user_defined_data(),
            disclosure_request: DisclosureRequest {
                minimum_age: tier.years(),
                excluded_countries: Vec::new(),
                ofac_check: false,
            },
        }
    }

    /// The tier this challenge requests.
    pub fn requested_tier(&self) -> Option<AgeTier> {
        AgeTier::from_user_defined_data(&self.user_defined_data).ok()
    }
}
