use crate::widget_state::{WidgetEvent, WidgetState};

/// Core protocol errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("invalid widget transition from {from} on {event:?}")]
    InvalidStateTransition {
        from: WidgetState,
        event: WidgetEvent,
    },

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("unsupported age tier: {0:?}")]
    UnsupportedTier(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("signature verification failed")]
    SignatureVerificationFailed,
}
