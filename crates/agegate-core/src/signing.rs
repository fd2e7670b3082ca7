//! Ed25519 keys and the signed messages that authenticate registry writes.
//!
//! A caller's `Address` is derived from its public key, so a request whose
//! signature verifies under key `K` acts as `K.address()` and nothing else.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use zeroize::Zeroize;

use crate::error::CoreError;
use crate::types::{Address, HubAttestation};

const ADDRESS_DOMAIN: &[u8] = b"agegate:address:v1";
const RECORD_DOMAIN: &[u8] = b"agegate:record:v1";
const ROTATE_HUB_DOMAIN: &[u8] = b"agegate:rotate-hub:v1";

/// Ed25519 key pair held by a hub or registry owner.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a new random key pair using OS-provided entropy.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Create a key pair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Parse a hex-encoded 32-byte secret (optional `0x` prefix, whitespace trimmed).
    pub fn from_hex(input: &str) -> Result<Self, CoreError> {
        let input = input.trim();
        let digits = input.strip_prefix("0x").unwrap_or(input);
        let mut bytes =
            hex::decode(digits).map_err(|e| CoreError::InvalidKey(e.to_string()))?;
        if bytes.len() != 32 {
            let len = bytes.len();
            bytes.zeroize();
            return Err(CoreError::InvalidKey(format!(
                "secret key must be 32 bytes, got {}",
                len
            )));
        }
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&bytes);
        let kp = Self::from_seed(&seed);
        seed.zeroize();
        bytes.zeroize();
        Ok(kp)
    }

    /// Hex encoding of the secret key.
    pub fn secret_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    /// The address this key signs as.
    pub fn address(&self) -> Address {
        self.public_key().address()
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature {
            inner: self.signing_key.sign(message),
        }
    }
}

/// Ed25519 public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    verifying_key: VerifyingKey,
}

impl PublicKey {
    /// Parse a hex-encoded 32-byte public key.
    pub fn from_hex(input: &str) -> Result<Self, CoreError> {
        let input = input.trim();
        let digits = input.strip_prefix("0x").unwrap_or(input);
        let bytes = hex::decode(digits).map_err(|e| CoreError::InvalidKey(e.to_string()))?;
        let arr: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            CoreError::InvalidKey(format!("public key must be 32 bytes, got {}", bytes.len()))
        })?;
        let verifying_key =
            VerifyingKey::from_bytes(&arr).map_err(|e| CoreError::InvalidKey(e.to_string()))?;
        Ok(Self { verifying_key })
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.verifying_key.to_bytes())
    }

    /// Address derived from this key: the last 20 bytes of a domain-separated BLAKE3 hash.
    pub fn address(&self) -> Address {
        let mut hasher = blake3::Hasher::new();
        hasher.update(ADDRESS_DOMAIN);
        hasher.update(self.verifying_key.as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest.as_bytes()[12..]);
        Address::from_bytes(bytes)
    }

    /// Verify `signature` over `message`.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), CoreError> {
        self.verifying_key
            .verify(message, &signature.inner)
            .map_err(|_| CoreError::SignatureVerificationFailed)
    }
}

/// Ed25519 signature (64 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    inner: ed25519_dalek::Signature,
}

impl Signature {
    pub fn to_hex(&self) -> String {
        hex::encode(self.inner.to_bytes())
    }

    pub fn from_hex(input: &str) -> Result<Self, CoreError> {
        let input = input.trim();
        let digits = input.strip_prefix("0x").unwrap_or(input);
        let bytes = hex::decode(digits).map_err(|e| CoreError::InvalidKey(e.to_string()))?;
        let arr: [u8; 64] = bytes.as_slice().try_into().map_err(|_| {
            CoreError::InvalidKey(format!("signature must be 64 bytes, got {}", bytes.len()))
        })?;
        Ok(Self {
            inner: ed25519_dalek::Signature::from_bytes(&arr),
        })
    }
}

fn put_str(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u64).to_be_bytes());
    buf.extend_from_slice(s.as_bytes());
}

/// Bytes a hub signs to submit `attestation`.
pub fn record_message(attestation: &HubAttestation) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128);
    buf.extend_from_slice(RECORD_DOMAIN);
    buf.extend_from_slice(attestation.prover.as_bytes());
    put_str(&mut buf, &attestation.scope);
    put_str(&mut buf, &attestation.user_defined_data);
    buf.extend_from_slice(&attestation.disclosed_min_age.to_be_bytes());
    buf
}

/// Bytes the owner signs to move the hub from `current_hub` to `new_hub`.
///
/// Binding the current hub means a rotation cannot be replayed once the hub
/// has moved on.
pub fn rotate_hub_message(current_hub: &Address, new_hub: &Address) -> Vec<u8> {
    let mut buf = Vec::with_capacity(ROTATE_HUB_DOMAIN.len() + 40);
    buf.extend_from_slice(ROTATE_HUB_DOMAIN);
    buf.extend_from_slice(current_hub.as_bytes());
    buf.extend_from_slice(new_hub.as_bytes());
    buf
}
