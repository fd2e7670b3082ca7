//! Fixtures shared by the cross-crate tests: a registry deployment with a
//! controllable clock, and a `RegistryReader` that talks to it in-process.

use async_trait::async_trait;
use std::sync::Arc;

use agegate_client::{ClientError, RegistryReader};
use agegate_core::{Address, HubAttestation, RegistryConfig, VerificationDetails, DEFAULT_SCOPE};
use agegate_registry::{ManualClock, RecordOutcome, RegistryError, VerificationRegistry};

pub const START_TIME: u64 = 1_750_000_000;

pub fn hub() -> Address {
    Address::from_bytes([0x16; 20])
}

pub fn owner() -> Address {
    Address::from_bytes([0xee; 20])
}

pub fn user(n: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[0] = 0xa0;
    bytes[19] = n;
    Address::from_bytes(bytes)
}

/// A registry under test together with the clock it reads.
pub struct Deployment {
    pub registry: Arc<VerificationRegistry>,
    pub clock: Arc<ManualClock>,
}

impl Deployment {
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::new(START_TIME));
        let config = RegistryConfig::new(hub(), owner(), DEFAULT_SCOPE);
        let registry = VerificationRegistry::new(config, clock.clone())
            .expect("default deployment is valid");
        Self {
            registry: Arc::new(registry),
            clock,
        }
    }

    /// Deliver a hub callback for `prover` asking for `requested` and disclosing `disclosed`.
    pub fn hub_callback(
        &self,
        prover: Address,
        requested: &str,
        disclosed: u64,
    ) -> Result<RecordOutcome, RegistryError> {
        self.registry.record_verification(
            &self.registry.hub_address(),
            &HubAttestation {
                prover,
                scope: DEFAULT_SCOPE.into(),
                user_defined_data: requested.into(),
                disclosed_min_age: disclosed,
            },
        )
    }

    pub fn reader(&self) -> LocalReader {
        LocalReader {
            registry: self.registry.clone(),
        }
    }
}

impl Default for Deployment {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads straight from an in-process registry.
#[derive(Clone)]
pub struct LocalReader {
    registry: Arc<VerificationRegistry>,
}

#[async_trait]
impl RegistryReader for LocalReader {
    async fn verification_details(
        &self,
        address: &Address,
    ) -> Result<VerificationDetails, ClientError> {
        Ok(self.registry.get_verification_details(address))
    }
}
