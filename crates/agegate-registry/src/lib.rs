//! AgeGate Registry — The shared record of which addresses have proven which
//! age tier.
//!
//! Only the configured proof hub may write; anyone may read. Records are keyed
//! by address, upgraded monotonically, and never deleted.

pub mod clock;
pub mod error;
pub mod event;
pub mod registry;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::RegistryError;
pub use event::{EventLog, VerificationEvent};
pub use registry::{RecordOutcome, VerificationRegistry};
pub use store::{MemoryStore, RecordStore, StoredState};
