use async_trait::async_trait;
use std::sync::Arc;

use agegate_core::{Address, VerificationDetails};

use crate::error::ClientError;

/// Read access to a verification registry.
///
/// Implementations must report transport failures as
/// `ClientError::RegistryQueryFailed`, never as an unverified answer.
#[async_trait]
pub trait RegistryReader: Send + Sync {
    /// Fetch `(min_age, timestamp, is_verified)` for an address.
    async fn verification_details(
        &self,
        address: &Address,
    ) -> Result<VerificationDetails, ClientError>;

    /// Whether an address has proven at least `requested_age`.
    async fn is_verified_for_tier(
        &self,
        address: &Address,
        requested_age: u64,
    ) -> Result<bool, ClientError> {
        Ok(self
            .verification_details(address)
            .await?
            .meets(requested_age))
    }
}

#[async_trait]
impl<T: RegistryReader + ?Sized> RegistryReader for Arc<T> {
    async fn verification_details(
        &self,
        address: &Address,
    ) -> Result<VerificationDetails, ClientError> {
        (**self).verification_details(address).await
    }
}

/// Reads from an AgeGate node's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpRegistryReader {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpRegistryReader {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(endpoint, reqwest::Client::new())
    }

    pub fn with_client(endpoint: impl Into<String>, client: reqwest::Client) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self { endpoint, client }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RegistryReader for HttpRegistryReader {
    async fn verification_details(
        &self,
        address: &Address,
    ) -> Result<VerificationDetails, ClientError> {
        let url = format!("{}/api/v1/verifications/{}", self.endpoint, address);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::RegistryQueryFailed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ClientError::RegistryQueryFailed(format!(
                "registry returned HTTP {}",
                resp.status()
            )));
        }

        resp.json::<VerificationDetails>()
            .await
            .map_err(|e| ClientError::RegistryQueryFailed(format!("invalid response: {}", e)))
    }
}
