//! AgeGate Core — Fundamental types, errors, and configuration shared by the
//! verification registry, relying-site clients, and the node.

pub mod config;
pub mod error;
pub mod signing;
pub mod types;
pub mod widget_state;

pub use config::{RegistryConfig, DEFAULT_HUB_ADDRESS, DEFAULT_SCOPE};
pub use error::CoreError;
pub use signing::{record_message, rotate_hub_message, KeyPair, PublicKey, Signature};
pub use types::{
    Address, AgeTier, DisclosurePolicy, EndpointMode, HubAttestation, VerificationDetails,
    VerificationRecord,
};
pub use widget_state::{WidgetEvent, WidgetState, WidgetStateMachine};
