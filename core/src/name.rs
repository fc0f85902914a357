//! Name parsing and formatting.

use crate::chain::{ChainId, Networks};
use crate::error::NameError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A name bound to the network its suffix selects.
///
/// The formatted form (`label.suffix`) and the required chain are both
/// derived from the label and suffix and never stored separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetName {
    label: String,
    suffix: String,
    chain_id: ChainId,
}

impl TargetName {
    /// Parses either a bare label (`alice`) or a formatted name
    /// (`alice.base.eth`). Bare labels get the default suffix.
    pub fn parse(input: &str, networks: &Networks) -> Result<Self, NameError> {
        let input = input.trim().to_lowercase();
        if input.is_empty() {
            return Err(NameError::Empty);
        }

        let (label, network) = match input.split_once('.') {
            Some((label, suffix)) => {
                let network = networks
                    .by_suffix(suffix)
                    .ok_or_else(|| NameError::UnknownSuffix(suffix.to_string()))?;
                (label, network)
            }
            None => {
                let network = networks
                    .default_network()
                    .ok_or_else(|| NameError::UnknownSuffix(String::new()))?;
                (input.as_str(), network)
            }
        };

        validate_label(label)?;

        Ok(Self {
            label: label.to_string(),
            suffix: network.suffix.clone(),
            chain_id: network.chain_id,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn formatted(&self) -> String {
        format!("{}.{}", self.label, self.suffix)
    }

    /// Chain the name must be registered or renewed on.
    pub fn required_chain_id(&self) -> ChainId {
        self.chain_id
    }
}

impl fmt::Display for TargetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.label, self.suffix)
    }
}

fn validate_label(label: &str) -> Result<(), NameError> {
    if label.is_empty() {
        return Err(NameError::Empty);
    }
    let valid = label
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        && !label.starts_with('-')
        && !label.ends_with('-');
    if valid {
        Ok(())
    } else {
        Err(NameError::InvalidLabel(label.to_string()))
    }
}
