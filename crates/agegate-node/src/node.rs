//! The AgeGate node orchestrator.
//!
//! Opens storage, restores the registry from it, serves the HTTP API in a
//! background task, and logs verification events as they are recorded.

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast;

use agegate_registry::{SystemClock, VerificationEvent, VerificationRegistry};

use crate::config::AgeGateConfig;
use crate::state::NodeState;
use crate::storage::Storage;

/// A node hosting one shared verification registry.
pub struct AgeGateNode {
    /// Node configuration.
    config: AgeGateConfig,
    /// The registry (None until started).
    registry: Option<Arc<VerificationRegistry>>,
    /// Shared state accessible from HTTP handlers.
    node_state: Option<Arc<NodeState>>,
    /// Receives verification events from the registry.
    event_rx: Option<broadcast::Receiver<VerificationEvent>>,
}

impl AgeGateNode {
    /// Create a new node with the given config.
    pub fn new(config: AgeGateConfig) -> Result<Self> {
        // Fail fast on a bad deployment before touching storage.
        config.registry_config()?;
        tracing::info!(scope = %config.registry.scope, "AgeGate node created");
        Ok(Self {
            config,
            registry: None,
            node_state: None,
            event_rx: None,
        })
    }

    /// Initialize and start the node: storage, registry, HTTP API.
    pub async fn start(&mut self) -> Result<()> {
        tracing::info!("starting AgeGate node");

        let storage = Arc::new(Storage::open(&self.config.storage.data_dir)?);
        tracing::info!(path = %self.config.storage.data_dir.display(), "storage initialized");

        let registry = Arc::new(VerificationRegistry::with_store(
            self.config.registry_config()?,
            Arc::new(SystemClock),
            storage,
        )?);
        let event_rx = registry.subscribe();

        let node_state = Arc::new(NodeState::new(
            registry.clone(),
            self.config.registry.registry_address,
            self.config.registry.mode,
        ));

        let api_addr: SocketAddr = self.config.api_addr().parse()?;
        let api_state = node_state.clone();
        tokio::spawn(async move {
            if let Err(e) = crate::api::start_api_server(api_addr, api_state).await {
                tracing::error!(error = %e, "HTTP API server error");
            }
        });

        self.registry = Some(registry);
        self.node_state = Some(node_state);
        self.event_rx = Some(event_rx);

        Ok(())
    }

    /// Run the node's main loop: logs every verification event.
    pub async fn run(&mut self) -> Result<()> {
        let mut event_rx = self
            .event_rx
            .take()
            .ok_or_else(|| anyhow::anyhow!("node not started"))?;

        tracing::info!("entering main event loop");

        loop {
            match event_rx.recv().await {
                Ok(event) => {
                    tracing::info!(
                        sequence = event.sequence,
                        prover = %event.prover,
                        min_age = event.min_age,
                        timestamp = event.timestamp,
                        "verification event"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(missed = n, "event receiver lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("event channel closed");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Gracefully shut down the node.
    pub async fn shutdown(&mut self) -> Result<()> {
        tracing::info!("shutting down AgeGate node");

        self.event_rx = None;
        self.node_state = None;
        if let Some(registry) = self.registry.take() {
            tracing::info!(records = registry.record_count(), "registry closed");
        }

        tracing::info!("AgeGate node shut down");
        Ok(())
    }

    /// The hosted registry, once started.
    pub fn registry(&self) -> Option<&Arc<VerificationRegistry>> {
        self.registry.as_ref()
    }
}
