//! Shared node state for the HTTP handlers.

use std::sync::Arc;
use std::time::Instant;

use agegate_core::{Address, EndpointMode};
use agegate_registry::VerificationRegistry;

/// Shared state for the running node, accessible from HTTP handlers.
pub struct NodeState {
    /// The registry instance every relying site reads from.
    pub registry: Arc<VerificationRegistry>,
    /// Address advertised as the proof callback endpoint.
    pub registry_address: Option<Address>,
    /// Hub deployment proofs target.
    pub mode: EndpointMode,
    /// When the node started.
    pub start_time: Instant,
}

impl NodeState {
    pub fn new(
        registry: Arc<VerificationRegistry>,
        registry_address: Option<Address>,
        mode: EndpointMode,
    ) -> Self {
        Self {
            registry,
            registry_address,
            mode,
            start_time: Instant::now(),
        }
    }
}
