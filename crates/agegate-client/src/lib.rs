//! AgeGate Client — What a relying site needs to gate content on the shared
//! registry:
//! - Proof challenges handed to the external passport-proof flow
//! - A `RegistryReader` seam with an HTTP implementation
//! - `AgeGateWidget`, which drives the widget state machine end to end

pub mod challenge;
pub mod error;
pub mod reader;
pub mod widget;

pub use challenge::{ChallengeSettings, DisclosureRequest, ProofChallenge};
pub use error::ClientError;
pub use reader::{HttpRegistryReader, RegistryReader};
pub use widget::{AgeGateWidget, CheckTicket, SettlePolicy, WidgetConfig};
