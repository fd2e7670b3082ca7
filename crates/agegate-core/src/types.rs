use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// A 20-byte account address.
///
/// Parsed case-insensitively, with or without the `0x` prefix, and always
/// rendered as lowercase `0x…` so that two spellings of the same address
/// compare and hash equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    /// The all-zero address. Never a valid hub.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Create an address from raw bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Parse an address from its hex representation.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let trimmed = input.trim();
        let hex_part = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if hex_part.len() != 40 {
            return Err(CoreError::InvalidAddress(format!(
                "expected 40 hex characters, got {}: {}",
                hex_part.len(),
                input
            )));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(hex_part, &mut bytes)
            .map_err(|e| CoreError::InvalidAddress(format!("{}: {}", input, e)))?;
        Ok(Self(bytes))
    }

    /// Raw address bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Age tiers a relying site can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum AgeTier {
    Eighteen,
    TwentyOne,
}

impl AgeTier {
    /// All supported tiers, lowest first.
    pub const ALL: [AgeTier; 2] = [AgeTier::Eighteen, AgeTier::TwentyOne];

    /// Minimum age in years for this tier.
    pub fn years(&self) -> u64 {
        match self {
            Self::Eighteen => 18,
            Self::TwentyOne => 21,
        }
    }

    /// Look up the tier for an age in years.
    pub fn from_years(years: u64) -> Result<Self, CoreError> {
        match years {
            18 => Ok(Self::Eighteen),
            21 => Ok(Self::TwentyOne),
            other => Err(CoreError::UnsupportedTier(other.to_string())),
        }
    }

    /// Decode the tier a relying site encoded into a proof's user-defined data.
    ///
    /// The payload is the requested age as a decimal string (e.g. `"18"`).
    pub fn from_user_defined_data(data: &str) -> Result<Self, CoreError> {
        let years: u64 = data
            .trim()
            .parse()
            .map_err(|_| CoreError::UnsupportedTier(data.to_string()))?;
        Self::from_years(years).map_err(|_| CoreError::UnsupportedTier(data.to_string()))
    }

    /// The user-defined data a challenge carries for this tier.
    pub fn user_defined_data(&self) -> String {
        self.years().to_string()
    }
}

impl fmt::Display for AgeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+", self.years())
    }
}

impl From<AgeTier> for u64 {
    fn from(tier: AgeTier) -> u64 {
        tier.years()
    }
}

impl TryFrom<u64> for AgeTier {
    type Error = CoreError;

    fn try_from(years: u64) -> Result<Self, Self::Error> {
        Self::from_years(years)
    }
}

/// The stored verification state of one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    /// Highest age tier (in years) this address has proven.
    pub min_age_verified: u64,
    /// Unix seconds of the write that set `min_age_verified`.
    pub verified_at: u64,
}

impl VerificationRecord {
    pub fn details(&self) -> VerificationDetails {
        VerificationDetails {
            min_age: self.min_age_verified,
            timestamp: self.verified_at,
            is_verified: self.min_age_verified > 0,
        }
    }
}

/// The public view of an address's verification, as returned to relying sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VerificationDetails {
    pub min_age: u64,
    pub timestamp: u64,
    pub is_verified: bool,
}

impl VerificationDetails {
    /// The answer for an address that has never been verified.
    pub fn unverified() -> Self {
        Self::default()
    }

    /// Whether these details satisfy a requested minimum age.
    pub fn meets(&self, requested_age: u64) -> bool {
        self.is_verified && self.min_age >= requested_age
    }
}

/// What the proof hub attests when it calls back into the registry.
///
/// Fields are taken verbatim from the hub; the registry validates them before
/// anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubAttestation {
    /// Address that generated the proof.
    pub prover: Address,
    /// Scope the proof was minted for.
    pub scope: String,
    /// Site-supplied payload; carries the requested tier.
    pub user_defined_data: String,
    /// Minimum age the proof disclosed.
    pub disclosed_min_age: u64,
}

/// Disclosure predicate the hub must have checked for a tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisclosurePolicy {
    pub minimum_age: u64,
    #[serde(default)]
    pub excluded_countries: Vec<String>,
    #[serde(default)]
    pub ofac: bool,
}

impl DisclosurePolicy {
    /// Age-only policy: no excluded countries, no OFAC screening.
    pub fn minimum_age(minimum_age: u64) -> Self {
        Self {
            minimum_age,
            excluded_countries: Vec::new(),
            ofac: false,
        }
    }

    /// Deterministic identifier of this policy (hex BLAKE3).
    pub fn config_id(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"agegate:disclosure:v1");
        hasher.update(&self.minimum_age.to_be_bytes());
        hasher.update(&(self.excluded_countries.len() as u64).to_be_bytes());
        for country in &self.excluded_countries {
            hasher.update(&(country.len() as u64).to_be_bytes());
            hasher.update(country.as_bytes());
        }
        hasher.update(&[u8::from(self.ofac)]);
        hasher.finalize().to_hex().to_string()
    }
}

/// Which hub deployment a proof challenge targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EndpointMode {
    #[default]
    Testnet,
    Mainnet,
}

impl fmt::Display for EndpointMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Testnet => write!(f, "testnet"),
            Self::Mainnet => write!(f, "mainnet"),
        }
    }
}
