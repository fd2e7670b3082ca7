use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::CoreError;
use crate::types::{Address, AgeTier, DisclosurePolicy};

/// Scope seed every accepted proof must carry.
pub const DEFAULT_SCOPE: &str = "agegate-ai-v1";

/// Proof verification hub on Celo Sepolia.
pub const DEFAULT_HUB_ADDRESS: &str = "0x16ECBA51e18a4a7e61fdC417f0d47AFEeDfbed74";

/// Deployment-time configuration of a verification registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Sole caller allowed to record verifications.
    pub hub_address: Address,
    /// Account allowed to rotate the hub.
    pub owner: Address,
    /// Scope identifier proofs must be minted for.
    pub scope: String,
    /// One disclosure policy per supported tier.
    pub policies: Vec<DisclosurePolicy>,
}

impl RegistryConfig {
    /// Config with the default age-only policy for every supported tier.
    pub fn new(hub_address: Address, owner: Address, scope: impl Into<String>) -> Self {
        Self {
            hub_address,
            owner,
            scope: scope.into(),
            policies: AgeTier::ALL
                .iter()
                .map(|tier| DisclosurePolicy::minimum_age(tier.years()))
                .collect(),
        }
    }

    /// The policy configured for a tier, if any.
    pub fn policy(&self, tier: AgeTier) -> Option<&DisclosurePolicy> {
        self.policies
            .iter()
            .find(|p| p.minimum_age == tier.years())
    }

    /// Check the configuration is usable for a deployment.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.scope.trim().is_empty() {
            return Err(CoreError::InvalidConfig("scope must not be empty".into()));
        }
        if self.hub_address.is_zero() {
            return Err(CoreError::InvalidConfig(
                "hub address must not be the zero address".into(),
            ));
        }
        if self.policies.is_empty() {
            return Err(CoreError::InvalidConfig(
                "at least one tier policy is required".into(),
            ));
        }
        let mut seen = HashSet::new();
        for policy in &self.policies {
            AgeTier::from_years(policy.minimum_age).map_err(|_| {
                CoreError::InvalidConfig(format!(
                    "policy minimum age {} is not a supported tier",
                    policy.minimum_age
                ))
            })?;
            if !seen.insert(policy.minimum_age) {
                return Err(CoreError::InvalidConfig(format!(
                    "duplicate policy for tier {}",
                    policy.minimum_age
                )));
            }
        }
        Ok(())
    }
}
