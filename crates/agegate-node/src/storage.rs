//! RocksDB storage backend for the AgeGate node.

use anyhow::Result;
use rocksdb::{ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use std::path::Path;

use agegate_core::{Address, VerificationRecord};
use agegate_registry::{RecordStore, RegistryError, StoredState, VerificationEvent};

/// Column family names for different data types.
const CF_RECORDS: &str = "records";
const CF_EVENTS: &str = "events";
const CF_STATE: &str = "state";

/// Key under `CF_STATE` holding the rotated hub address.
const KEY_HUB: &str = "hub_address";

/// RocksDB-backed storage for the AgeGate node.
pub struct Storage {
    db: DB,
}

impl Storage {
    /// Open or create a RocksDB database at the given path with column families.
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_RECORDS, Options::default()),
            ColumnFamilyDescriptor::new(CF_EVENTS, Options::default()),
            ColumnFamilyDescriptor::new(CF_STATE, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;

        Ok(Self { db })
    }

    /// Put a value into a column family.
    pub fn put(&self, cf_name: &str, key: &[u8], value: &[u8]) -> Result<()> {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| anyhow::anyhow!("column family '{}' not found", cf_name))?;
        self.db.put_cf(&cf, key, value)?;
        Ok(())
    }

    /// Get a value from a column family.
    pub fn get(&self, cf_name: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| anyhow::anyhow!("column family '{}' not found", cf_name))?;
        let value = self.db.get_cf(&cf, key)?;
        Ok(value)
    }

    /// All key/value pairs of a column family, in key order.
    fn scan(&self, cf_name: &str) -> Result<Vec<(Box<[u8]>, Box<[u8]>)>> {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| anyhow::anyhow!("column family '{}' not found", cf_name))?;
        let mut entries = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            entries.push(item?);
        }
        Ok(entries)
    }

    /// Get a verification record.
    pub fn get_record(&self, address: &Address) -> Result<Option<VerificationRecord>> {
        match self.get(CF_RECORDS, address.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Store a record and its event in one atomic batch.
    pub fn write_verification(
        &self,
        prover: &Address,
        record: &VerificationRecord,
        event: &VerificationEvent,
    ) -> Result<()> {
        let records = self
            .db
            .cf_handle(CF_RECORDS)
            .ok_or_else(|| anyhow::anyhow!("column family '{}' not found", CF_RECORDS))?;
        let events = self
            .db
            .cf_handle(CF_EVENTS)
            .ok_or_else(|| anyhow::anyhow!("column family '{}' not found", CF_EVENTS))?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&records, prover.as_bytes(), serde_json::to_vec(record)?);
        // Big-endian keys keep the iterator in sequence order.
        batch.put_cf(&events, event.sequence.to_be_bytes(), serde_json::to_vec(event)?);
        self.db.write(batch)?;
        Ok(())
    }

    /// Load every persisted record, event, and the rotated hub.
    pub fn load_state(&self) -> Result<StoredState> {
        let mut records = Vec::new();
        for (key, value) in self.scan(CF_RECORDS)? {
            let bytes: [u8; 20] = key
                .as_ref()
                .try_into()
                .map_err(|_| anyhow::anyhow!("corrupt record key of {} bytes", key.len()))?;
            let record: VerificationRecord = serde_json::from_slice(&value)?;
            records.push((Address::from_bytes(bytes), record));
        }

        let mut events = Vec::new();
        for (_, value) in self.scan(CF_EVENTS)? {
            let event: VerificationEvent = serde_json::from_slice(&value)?;
            events.push(event);
        }

        let hub_override = match self.get(CF_STATE, KEY_HUB.as_bytes())? {
            Some(bytes) => Some(Address::parse(std::str::from_utf8(&bytes)?)?),
            None => None,
        };

        Ok(StoredState {
            records,
            events,
            hub_override,
        })
    }

    /// Persist a rotated hub address.
    pub fn put_hub(&self, hub: &Address) -> Result<()> {
        self.put(CF_STATE, KEY_HUB.as_bytes(), hub.to_string().as_bytes())
    }
}

fn storage_error(e: anyhow::Error) -> RegistryError {
    RegistryError::Storage(e.to_string())
}

impl RecordStore for Storage {
    fn load(&self) -> Result<StoredState, RegistryError> {
        self.load_state().map_err(storage_error)
    }

    fn persist_write(
        &self,
        prover: &Address,
        record: &VerificationRecord,
        event: &VerificationEvent,
    ) -> Result<(), RegistryError> {
        self.write_verification(prover, record, event)
            .map_err(storage_error)
    }

    fn persist_hub(&self, hub: &Address) -> Result<(), RegistryError> {
        self.put_hub(hub).map_err(storage_error)
    }
}
