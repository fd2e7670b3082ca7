//! Node configuration loading and management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use agegate_core::{
    Address, AgeTier, DisclosurePolicy, EndpointMode, RegistryConfig, DEFAULT_HUB_ADDRESS,
    DEFAULT_SCOPE,
};

/// Full configuration for the AgeGate node.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AgeGateConfig {
    /// Registry deployment settings.
    #[serde(default)]
    pub registry: RegistrySection,

    /// API server settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySection {
    /// Proof hub allowed to record verifications: the address of its signing key.
    #[serde(default = "default_hub_address")]
    pub hub_address: Address,
    /// Key address allowed to rotate the hub; zero disables rotation.
    #[serde(default = "default_owner")]
    pub owner: Address,
    /// Scope identifier proofs must carry.
    #[serde(default = "default_scope")]
    pub scope: String,
    /// Address relying sites put in proof challenges as the callback endpoint.
    #[serde(default)]
    pub registry_address: Option<Address>,
    /// Hub deployment proofs are generated against.
    #[serde(default)]
    pub mode: EndpointMode,
    /// Per-tier disclosure policies.
    #[serde(default = "default_policies")]
    pub policies: Vec<DisclosurePolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API listen address.
    #[serde(default = "default_api_addr")]
    pub listen_addr: String,
    /// API port.
    #[serde(default = "default_api_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the data directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_hub_address() -> Address {
    Address::parse(DEFAULT_HUB_ADDRESS).unwrap_or(Address::ZERO)
}
fn default_owner() -> Address {
    Address::ZERO
}
fn default_scope() -> String {
    DEFAULT_SCOPE.into()
}
fn default_policies() -> Vec<DisclosurePolicy> {
    AgeTier::ALL
        .iter()
        .map(|tier| DisclosurePolicy::minimum_age(tier.years()))
        .collect()
}
fn default_api_addr() -> String {
    "127.0.0.1".into()
}
fn default_api_port() -> u16 {
    9101
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            hub_address: default_hub_address(),
            owner: default_owner(),
            scope: default_scope(),
            registry_address: None,
            mode: EndpointMode::default(),
            policies: default_policies(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_api_addr(),
            port: default_api_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl AgeGateConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: AgeGateConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// The registry configuration this node deploys.
    pub fn registry_config(&self) -> anyhow::Result<RegistryConfig> {
        let config = RegistryConfig {
            hub_address: self.registry.hub_address,
            owner: self.registry.owner,
            scope: self.registry.scope.clone(),
            policies: self.registry.policies.clone(),
        };
        config.validate()?;
        Ok(config)
    }

    /// The API listen socket address string.
    pub fn api_addr(&self) -> String {
        format!("{}:{}", self.api.listen_addr, self.api.port)
    }
}
