use std::fmt;

use crate::error::CoreError;

/// The states of a relying site's age-gate widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum WidgetState {
    /// Page just loaded; wallet status unknown.
    Loading,
    /// No wallet is connected.
    NotConnected,
    /// A registry query is in flight.
    CheckingRegistry,
    /// The registry confirmed the address meets the tier.
    Verified,
    /// The registry confirmed the address does not meet the tier yet.
    NeedsProof,
    /// The registry query did not complete. Verification status is unknown.
    CheckFailed,
}

impl WidgetState {
    /// Whether a proof challenge should be shown in this state.
    pub fn shows_challenge(&self) -> bool {
        matches!(self, Self::NeedsProof)
    }
}

impl fmt::Display for WidgetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "Loading"),
            Self::NotConnected => write!(f, "NotConnected"),
            Self::CheckingRegistry => write!(f, "CheckingRegistry"),
            Self::Verified => write!(f, "Verified"),
            Self::NeedsProof => write!(f, "NeedsProof"),
            Self::CheckFailed => write!(f, "CheckFailed"),
        }
    }
}

/// Events that drive widget state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum WidgetEvent {
    /// No wallet connection is present (or it was dropped).
    WalletMissing,
    /// A wallet connected, or the connected account changed.
    WalletConnected,
    /// The registry reported the address meets the tier.
    QueryVerified,
    /// The registry reported the address does not meet the tier.
    QueryUnverified,
    /// The registry query errored.
    QueryFailed,
    /// The external proof flow signalled success.
    ProofSucceeded,
    /// The external proof flow signalled an error.
    ProofFailed,
    /// The user asked to retry a failed check.
    Retry,
}

/// Manages widget state transitions.
///
/// Valid transitions:
/// - any → NotConnected (WalletMissing)
/// - any → CheckingRegistry (WalletConnected)
/// - CheckingRegistry → Verified (QueryVerified)
/// - CheckingRegistry → NeedsProof (QueryUnverified)
/// - any → CheckFailed (QueryFailed)
/// - CheckFailed → CheckingRegistry (Retry)
/// - NeedsProof → CheckingRegistry (ProofSucceeded)
/// - NeedsProof → NeedsProof (ProofFailed)
pub struct WidgetStateMachine;

impl WidgetStateMachine {
    /// Attempt a state transition based on an event.
    pub fn transition(current: WidgetState, event: WidgetEvent) -> Result<WidgetState, CoreError> {
        let new_state = match (current, event) {
            (_, WidgetEvent::WalletMissing) => WidgetState::NotConnected,
            (_, WidgetEvent::WalletConnected) => WidgetState::CheckingRegistry,
            (_, WidgetEvent::QueryFailed) => WidgetState::CheckFailed,

            (WidgetState::CheckingRegistry, WidgetEvent::QueryVerified) => WidgetState::Verified,
            (WidgetState::CheckingRegistry, WidgetEvent::QueryUnverified) => {
                WidgetState::NeedsProof
            }

            (WidgetState::CheckFailed, WidgetEvent::Retry) => WidgetState::CheckingRegistry,

            (WidgetState::NeedsProof, WidgetEvent::ProofSucceeded) => {
                WidgetState::CheckingRegistry
            }
            // A failed proof attempt keeps the same challenge on screen.
            (WidgetState::NeedsProof, WidgetEvent::ProofFailed) => WidgetState::NeedsProof,

            _ => {
                return Err(CoreError::InvalidStateTransition {
                    from: current,
                    event,
                });
            }
        };

        tracing::debug!(
            from = %current,
            to = %new_state,
            event = ?event,
            "widget state transition"
        );

        Ok(new_state)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: WidgetState, event: WidgetEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
