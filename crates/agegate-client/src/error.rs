use std::time::Duration;

use agegate_core::CoreError;

/// Client-side errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// The registry could not be read. Verification status is unknown.
    #[error("registry query failed: {0}")]
    RegistryQueryFailed(String),

    /// The external proof flow reported an error.
    #[error("proof flow failed: {reason}")]
    ExternalProofFailed {
        code: Option<String>,
        reason: String,
    },

    /// A reported proof success never showed up in the registry.
    #[error("verification not visible in registry after {waited:?}")]
    WriteNotVisible { waited: Duration },

    #[error("no wallet connected")]
    NotConnected,

    #[error(transparent)]
    State(#[from] CoreError),
}
