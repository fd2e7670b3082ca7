use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::broadcast;

use agegate_core::{
    Address, AgeTier, DisclosurePolicy, HubAttestation, RegistryConfig, VerificationDetails,
    VerificationRecord,
};

use crate::clock::Clock;
use crate::error::RegistryError;
use crate::event::{EventLog, VerificationEvent};
use crate::store::{MemoryStore, RecordStore};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// What a successful `record_verification` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecordOutcome {
    /// First verification for this address.
    Created { min_age: u64 },
    /// The address proved a higher tier than before.
    Upgraded { from: u64, to: u64 },
    /// The address already held this tier or higher; nothing was written.
    Unchanged { min_age: u64 },
}

/// The shared verification registry.
///
/// Writes are serialized and all-or-nothing: validation happens before any
/// mutation, and the record is persisted before it becomes visible. Reads go
/// straight to the record map and never block on a write in progress.
pub struct VerificationRegistry {
    config: RegistryConfig,
    /// Current hub; starts as `config.hub_address`, changed only by rotation.
    hub: RwLock<Address>,
    records: DashMap<Address, VerificationRecord>,
    events: EventLog,
    write_lock: Mutex<()>,
    clock: Arc<dyn Clock>,
    store: Arc<dyn RecordStore>,
}

impl VerificationRegistry {
    /// Create an in-memory registry.
    pub fn new(config: RegistryConfig, clock: Arc<dyn Clock>) -> Result<Self, RegistryError> {
        Self::with_store(config, clock, Arc::new(MemoryStore))
    }

    /// Create a registry backed by `store`, restoring whatever it holds.
    pub fn with_store(
        config: RegistryConfig,
        clock: Arc<dyn Clock>,
        store: Arc<dyn RecordStore>,
    ) -> Result<Self, RegistryError> {
        config.validate()?;
        let stored = store.load()?;

        let records = DashMap::new();
        for (address, record) in stored.records {
            records.insert(address, record);
        }
        let hub = stored.hub_override.unwrap_or(config.hub_address);

        tracing::info!(
            scope = %config.scope,
            hub = %hub,
            records = records.len(),
            events = stored.events.len(),
            "verification registry initialized"
        );

        Ok(Self {
            config,
            hub: RwLock::new(hub),
            records,
            events: EventLog::restore(EVENT_CHANNEL_CAPACITY, stored.events),
            write_lock: Mutex::new(()),
            clock,
            store,
        })
    }

    /// Hub callback: record that `attestation.prover` proved an age tier.
    ///
    /// Checks, in order: the caller is the hub, the scope matches, the
    /// user-defined data names a supported tier, and the disclosed age meets
    /// that tier's policy. The stored tier never decreases; repeating a call
    /// is a no-op.
    pub fn record_verification(
        &self,
        caller: &Address,
        attestation: &HubAttestation,
    ) -> Result<RecordOutcome, RegistryError> {
        // Held across the hub check so a rotation cannot interleave.
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let hub = self.hub_address();
        if *caller != hub {
            tracing::warn!(caller = %caller, prover = %attestation.prover, "verification callback from non-hub caller");
            return Err(RegistryError::Unauthorized { caller: *caller });
        }

        if attestation.scope != self.config.scope {
            tracing::warn!(
                prover = %attestation.prover,
                expected = %self.config.scope,
                got = %attestation.scope,
                "proof scope mismatch"
            );
            return Err(RegistryError::ScopeMismatch {
                expected: self.config.scope.clone(),
                got: attestation.scope.clone(),
            });
        }

        let tier = self.requested_tier(&attestation.user_defined_data)?;
        let policy = self
            .config
            .policy(tier)
            .ok_or_else(|| RegistryError::UnsupportedTier(attestation.user_defined_data.clone()))?;

        if attestation.disclosed_min_age < policy.minimum_age {
            tracing::info!(
                prover = %attestation.prover,
                required = policy.minimum_age,
                disclosed = attestation.disclosed_min_age,
                "age requirement not met"
            );
            return Err(RegistryError::AgeRequirementNotMet {
                required: policy.minimum_age,
                disclosed: attestation.disclosed_min_age,
            });
        }

        self.upsert(attestation.prover, tier)
    }

    fn requested_tier(&self, user_defined_data: &str) -> Result<AgeTier, RegistryError> {
        AgeTier::from_user_defined_data(user_defined_data).map_err(|_| {
            tracing::info!(data = %user_defined_data, "unsupported tier requested");
            RegistryError::UnsupportedTier(user_defined_data.to_string())
        })
    }

    /// Caller must hold `write_lock`.
    fn upsert(&self, prover: Address, tier: AgeTier) -> Result<RecordOutcome, RegistryError> {
        let new_age = tier.years();
        let previous = self.records.get(&prover).map(|r| r.min_age_verified);
        if let Some(current) = previous {
            if current >= new_age {
                tracing::debug!(prover = %prover, min_age = current, "verification already recorded");
                return Ok(RecordOutcome::Unchanged { min_age: current });
            }
        }

        let now = self.clock.now();
        let record = VerificationRecord {
            min_age_verified: new_age,
            verified_at: now,
        };
        let event = VerificationEvent {
            sequence: self.events.next_sequence(),
            prover,
            min_age: new_age,
            timestamp: now,
        };

        self.store.persist_write(&prover, &record, &event)?;
        self.records.insert(prover, record);
        self.events.append(event);

        let outcome = match previous {
            Some(from) => RecordOutcome::Upgraded { from, to: new_age },
            None => RecordOutcome::Created { min_age: new_age },
        };
        tracing::info!(prover = %prover, min_age = new_age, timestamp = now, ?outcome, "verification recorded");
        Ok(outcome)
    }

    /// `(min_age, timestamp, is_verified)` for an address; all zero when unknown.
    pub fn get_verification_details(&self, address: &Address) -> VerificationDetails {
        self.records
            .get(address)
            .map(|r| r.details())
            .unwrap_or_else(VerificationDetails::unverified)
    }

    /// Whether an address has proven at least `requested_age`.
    pub fn is_verified_for_tier(&self, address: &Address, requested_age: u64) -> bool {
        self.get_verification_details(address).meets(requested_age)
    }

    /// Replace the hub. Only the owner may do this; a zero owner disables rotation.
    pub fn rotate_hub(&self, caller: &Address, new_hub: Address) -> Result<(), RegistryError> {
        self.rotate(caller, None, new_hub)
    }

    /// Replace the hub only if it is still `expected`.
    pub fn rotate_hub_from(
        &self,
        caller: &Address,
        expected: Address,
        new_hub: Address,
    ) -> Result<(), RegistryError> {
        self.rotate(caller, Some(expected), new_hub)
    }

    fn rotate(
        &self,
        caller: &Address,
        expected: Option<Address>,
        new_hub: Address,
    ) -> Result<(), RegistryError> {
        if self.config.owner.is_zero() || *caller != self.config.owner {
            tracing::warn!(caller = %caller, "hub rotation from non-owner");
            return Err(RegistryError::Unauthorized { caller: *caller });
        }
        if new_hub.is_zero() {
            return Err(RegistryError::InvalidHub(new_hub));
        }

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.hub_address();
        if let Some(expected) = expected {
            if current != expected {
                return Err(RegistryError::StaleHub { expected, current });
            }
        }
        self.store.persist_hub(&new_hub)?;
        *self.hub.write().unwrap_or_else(PoisonError::into_inner) = new_hub;
        tracing::info!(from = %current, to = %new_hub, "hub rotated");
        Ok(())
    }

    pub fn hub_address(&self) -> Address {
        *self.hub.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn owner(&self) -> Address {
        self.config.owner
    }

    pub fn scope(&self) -> &str {
        &self.config.scope
    }

    pub fn tier_policy(&self, tier: AgeTier) -> Option<&DisclosurePolicy> {
        self.config.policy(tier)
    }

    /// Config id of the 18+ disclosure policy.
    pub fn config_18_plus(&self) -> Option<String> {
        self.tier_policy(AgeTier::Eighteen).map(|p| p.config_id())
    }

    /// Config id of the 21+ disclosure policy.
    pub fn config_21_plus(&self) -> Option<String> {
        self.tier_policy(AgeTier::TwentyOne).map(|p| p.config_id())
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn events_since(&self, from: u64) -> Vec<VerificationEvent> {
        self.events.since(from)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<VerificationEvent> {
        self.events.subscribe()
    }
}
