//! Flow configuration.
//!
//! Feature flags and the network table are passed to every flow at
//! construction, so a flow can be built with renewals on or off without any
//! process-wide state.
//!
//! ```toml
//! renewals_enabled = true
//! registrations_enabled = true
//! default_years = 1
//! max_years = 99
//! default_suffix = "base.eth"
//!
//! [[networks]]
//! name = "base"
//! chain_id = 8453
//! suffix = "base.eth"
//! registrar_controller = "0x4cCb0BB02FCABA27e82a56646E81d8c5bC4119a5"
//! ```

use crate::FlowKind;
use crate::chain::{NetworkConfig, Networks};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowConfig {
    #[serde(default = "enabled")]
    pub renewals_enabled: bool,
    #[serde(default = "enabled")]
    pub registrations_enabled: bool,
    #[serde(default = "default_years")]
    pub default_years: u64,
    #[serde(default = "max_years")]
    pub max_years: u64,
    #[serde(default = "default_suffix")]
    pub default_suffix: String,
    #[serde(default = "default_networks")]
    pub networks: Vec<NetworkConfig>,
}

fn enabled() -> bool {
    true
}

fn default_years() -> u64 {
    1
}

fn max_years() -> u64 {
    99
}

fn default_suffix() -> String {
    "base.eth".to_string()
}

fn default_networks() -> Vec<NetworkConfig> {
    vec![NetworkConfig::base_mainnet(), NetworkConfig::base_sepolia()]
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            renewals_enabled: enabled(),
            registrations_enabled: enabled(),
            default_years: default_years(),
            max_years: max_years(),
            default_suffix: default_suffix(),
            networks: default_networks(),
        }
    }
}

impl FlowConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: FlowConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), networks = config.networks.len(), "loaded flow config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.networks.is_empty() {
            return Err(ConfigError::Invalid("no networks configured".into()));
        }

        let mut suffixes = HashSet::new();
        let mut chains = HashSet::new();
        for network in &self.networks {
            let suffix = network.suffix.trim_start_matches('.').to_ascii_lowercase();
            if suffix.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "network `{}` has an empty suffix",
                    network.name
                )));
            }
            if !suffixes.insert(suffix) {
                return Err(ConfigError::Invalid(format!(
                    "suffix `{}` is configured twice",
                    network.suffix
                )));
            }
            if !chains.insert(network.chain_id) {
                return Err(ConfigError::Invalid(format!(
                    "chain {} is configured twice",
                    network.chain_id
                )));
            }
        }

        if self.networks().default_network().is_none() {
            return Err(ConfigError::Invalid(format!(
                "default suffix `{}` matches no network",
                self.default_suffix
            )));
        }

        if self.max_years == 0 || !(1..=self.max_years).contains(&self.default_years) {
            return Err(ConfigError::Invalid(format!(
                "default_years {} must be within 1..={}",
                self.default_years, self.max_years
            )));
        }

        Ok(())
    }

    pub fn networks(&self) -> Networks {
        Networks::new(self.networks.clone(), self.default_suffix.clone())
    }

    pub fn is_enabled(&self, kind: FlowKind) -> bool {
        match kind {
            FlowKind::Registration => self.registrations_enabled,
            FlowKind::Renewal => self.renewals_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::BASE_MAINNET;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = FlowConfig::default();
        config.validate().unwrap();
        assert!(config.is_enabled(FlowKind::Renewal));
        assert_eq!(
            config.networks().default_network().map(|n| n.chain_id),
            Some(BASE_MAINNET)
        );
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = FlowConfig::from_toml_str("renewals_enabled = false\n").unwrap();
        assert!(!config.is_enabled(FlowKind::Renewal));
        assert!(config.is_enabled(FlowKind::Registration));
        assert_eq!(config.networks.len(), 2);
    }

    #[test]
    fn test_rejects_duplicate_suffix() {
        let raw = r#"
            default_suffix = "base.eth"

            [[networks]]
            name = "a"
            chain_id = 1
            suffix = "base.eth"

            [[networks]]
            name = "b"
            chain_id = 2
            suffix = ".base.eth"
        "#;
        let err = FlowConfig::from_toml_str(raw).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("twice")));
    }

    #[test]
    fn test_rejects_unknown_default_suffix() {
        let err = FlowConfig::from_toml_str("default_suffix = \"op.eth\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_bad_years() {
        let err = FlowConfig::from_toml_str("default_years = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_malformed_address() {
        let raw = r#"
            [[networks]]
            name = "base"
            chain_id = 8453
            suffix = "base.eth"
            registrar_controller = "0x1234"
        "#;
        assert!(matches!(
            FlowConfig::from_toml_str(raw),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "registrations_enabled = false").unwrap();
        writeln!(file, "max_years = 10").unwrap();

        let config = FlowConfig::load(file.path()).unwrap();
        assert!(!config.registrations_enabled);
        assert_eq!(config.max_years, 10);

        let missing = FlowConfig::load("/definitely/not/here.toml");
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
