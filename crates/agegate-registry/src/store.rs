use agegate_core::{Address, VerificationRecord};

use crate::error::RegistryError;
use crate::event::VerificationEvent;

/// Everything a registry needs to resume after a restart.
#[derive(Debug, Clone, Default)]
pub struct StoredState {
    pub records: Vec<(Address, VerificationRecord)>,
    pub events: Vec<VerificationEvent>,
    /// Hub set by a rotation, overriding the configured one.
    pub hub_override: Option<Address>,
}

/// Durable backing for registry writes.
///
/// `persist_write` must store the record and its event together or not at
/// all. The registry calls it before the write becomes visible in memory.
pub trait RecordStore: Send + Sync {
    fn load(&self) -> Result<StoredState, RegistryError>;

    fn persist_write(
        &self,
        prover: &Address,
        record: &VerificationRecord,
        event: &VerificationEvent,
    ) -> Result<(), RegistryError>;

    fn persist_hub(&self, hub: &Address) -> Result<(), RegistryError>;
}

/// A store that keeps nothing. State lives only in the registry's memory.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryStore;

impl RecordStore for MemoryStore {
    fn load(&self) -> Result<StoredState, RegistryError> {
        Ok(StoredState::default())
    }

    fn persist_write(
        &self,
        _prover: &Address,
        _record: &VerificationRecord,
        _event: &VerificationEvent,
    ) -> Result<(), RegistryError> {
        Ok(())
    }

    fn persist_hub(&self, _hub: &Address) -> Result<(), RegistryError> {
        Ok(())
    }
}
