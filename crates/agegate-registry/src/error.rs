use agegate_core::{Address, CoreError};

/// Verification registry errors.
///
/// Every variant aborts the call before any state is touched.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("unauthorized caller: {caller}")]
    Unauthorized { caller: Address },

    #[error("scope mismatch: expected {expected:?}, got {got:?}")]
    ScopeMismatch { expected: String, got: String },

    #[error("unsupported age tier: {0:?}")]
    UnsupportedTier(String),

    #[error("age requirement not met: required {required}, disclosed {disclosed}")]
    AgeRequirementNotMet { required: u64, disclosed: u64 },

    #[error("invalid hub address: {0}")]
    InvalidHub(Address),

    #[error("hub changed: expected {expected}, current {current}")]
    StaleHub { expected: Address, current: Address },

    #[error("configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("storage error: {0}")]
    Storage(String),
}

impl RegistryError {
    /// Whether this is an expected "proof did not qualify" outcome rather
    /// than an integrity or system problem.
    pub fn is_policy_rejection(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedTier(_) | Self::AgeRequirementNotMet { .. }
        )
    }
}
