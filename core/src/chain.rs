//! Chains, addresses and the network table.
//!
//! Every name suffix belongs to exactly one network. The network table is the
//! single place that maps a suffix to a chain id and a chain id to the
//! registrar contracts deployed there.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An EIP-155 chain id (8453 for Base, 84532 for Base Sepolia).
pub type ChainId = u64;

pub const BASE_MAINNET: ChainId = 8453;
pub const BASE_SEPOLIA: ChainId = 84532;

/// A 20-byte account or contract address in `0x`-prefixed hex form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix("0x")
            .ok_or_else(|| format!("address `{s}` must start with 0x"))?;
        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("address `{s}` must be 20 bytes of hex"));
        }
        Ok(Address(format!("0x{}", hex.to_ascii_lowercase())))
    }
}

impl TryFrom<String> for Address {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One network names can live on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Display name, e.g. `"base"`.
    pub name: String,
    pub chain_id: ChainId,
    /// Name suffix without the leading dot, e.g. `"base.eth"`.
    pub suffix: String,
    /// Registrar controller used for `register` and `renew`.
    #[serde(default)]
    pub registrar_controller: Option<Address>,
    /// Resolver attached to newly registered names.
    #[serde(default)]
    pub resolver: Option<Address>,
    #[serde(default)]
    pub testnet: bool,
}

impl NetworkConfig {
    pub fn base_mainnet() -> Self {
        Self {
            name: "base".to_string(),
            chain_id: BASE_MAINNET,
            suffix: "base.eth".to_string(),
            registrar_controller: "0x4cCb0BB02FCABA27e82a56646E81d8c5bC4119a5".parse().ok(),
            resolver: "0xC6d566A56A1aFf6508b41f6c90ff131615583BCD".parse().ok(),
            testnet: false,
        }
    }

    pub fn base_sepolia() -> Self {
        Self {
            name: "base-sepolia".to_string(),
            chain_id: BASE_SEPOLIA,
            suffix: "basetest.eth".to_string(),
            registrar_controller: "0x49aE3cC2e3AA768B1e5654f5D3C6002144A59581".parse().ok(),
            resolver: "0x6533C94869D28fAA8dF77cc63f9e2b2D6Cf77eBA".parse().ok(),
            testnet: true,
        }
    }
}

/// The lookup table behind suffix and chain resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Networks {
    entries: Vec<NetworkConfig>,
    default_suffix: String,
}

impl Networks {
    /// Builds a table; the caller is responsible for validation
    /// (see [`crate::config::FlowConfig::validate`]).
    pub fn new(entries: Vec<NetworkConfig>, default_suffix: impl Into<String>) -> Self {
        Self {
            entries,
            default_suffix: default_suffix.into(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &NetworkConfig> {
        self.entries.iter()
    }

    pub fn default_network(&self) -> Option<&NetworkConfig> {
        self.by_suffix(&self.default_suffix)
    }

    pub fn by_suffix(&self, suffix: &str) -> Option<&NetworkConfig> {
        let suffix = suffix.trim_start_matches('.');
        self.entries
            .iter()
            .find(|n| n.suffix.eq_ignore_ascii_case(suffix))
    }

    pub fn by_chain_id(&self, chain_id: ChainId) -> Option<&NetworkConfig> {
        self.entries.iter().find(|n| n.chain_id == chain_id)
    }

    /// Required chain for a suffix. Same input, same answer.
    pub fn chain_for_suffix(&self, suffix: &str) -> Option<ChainId> {
        self.by_suffix(suffix).map(|n| n.chain_id)
    }

    /// Registrar controller deployed on `chain_id`, if any.
    pub fn registrar_controller(&self, chain_id: ChainId) -> Option<&Address> {
        self.by_chain_id(chain_id)
            .and_then(|n| n.registrar_controller.as_ref())
    }
}

impl Default for Networks {
    fn default() -> Self {
        Self::new(
            vec![NetworkConfig::base_mainnet(), NetworkConfig::base_sepolia()],
            "base.eth",
        )
    }
}
