use crate::{ConfigError, ConfigResult, EXAMPLE_ADDRESS_CONFIG};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;

/// Mining target and payment recipients, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressConfig {
    /// Address credited with produced blocks
    pub mining_address: String,
    /// Pool of payment recipients, in file order
    pub recipient_addresses: Vec<String>,
}

/// On-disk shape; `mining_address` is optional here so that its absence is
/// reported as a configuration error rather than a serde message.
#[derive(Debug, Deserialize)]
struct RawAddressConfig {
    mining_address: Option<String>,
    #[serde(default)]
    recipient_addresses: Vec<String>,
}

impl AddressConfig {
    /// Creates a validated configuration
    pub fn new(
        mining_address: impl Into<String>,
        recipient_addresses: Vec<String>,
    ) -> ConfigResult<Self> {
        let mining_address = mining_address.into();
        if mining_address.is_empty() {
            return Err(ConfigError::EmptyMiningAddress);
        }
        Ok(Self {
            mining_address,
            recipient_addresses,
        })
    }

    /// Loads and validates the configuration file at `path`
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ConfigError::NotFound {
                path: path.to_path_buf(),
                example: EXAMPLE_ADDRESS_CONFIG,
            },
            _ => ConfigError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        Self::from_json_str(&content)
    }

    /// Parses and validates configuration JSON
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        let raw: RawAddressConfig = serde_json::from_str(content)?;
        let mining_address = raw
            .mining_address
            .ok_or(ConfigError::MissingMiningAddress)?;
        Self::new(mining_address, raw.recipient_addresses)
    }

    /// Number of configured payment recipients
    pub fn recipient_count(&self) -> usize {
        self.recipient_addresses.len()
    }

    /// Whether payments can be injected when `requested`.
    ///
    /// Injection needs at least one recipient; an empty pool turns a request
    /// into a no-op instead of an error.
    pub fn transactions_allowed(&self, requested: bool) -> bool {
        requested && !self.recipient_addresses.is_empty()
    }
}
