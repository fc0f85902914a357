//! Basename Core - chain, name and collaborator contracts
//!
//! This crate holds everything a lifecycle flow needs to know about the
//! outside world, without depending on an async runtime:
//! - `Networks` / `TargetName`: suffix to chain resolution and formatting
//! - `WalletProvider`, `TransactionSubmitter`, `AnalyticsSink`: injected collaborators
//! - `FlowConfig`: feature flags and the network table

pub mod capabilities;
pub mod chain;
pub mod config;
pub mod error;
pub mod event;
pub mod name;
pub mod transaction;
pub mod wallet;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use capabilities::Capabilities;
pub use chain::{Address, ChainId, NetworkConfig, Networks};
pub use config::FlowConfig;
pub use error::{ConfigError, FlowError, FlowResult, NameError, TxError, WalletError};
pub use event::{AnalyticsSink, FlowEvent, FlowEventKind, NoopAnalytics, TracingAnalytics};
pub use name::TargetName;
pub use transaction::{
    ContractCall, Receipt, ReceiptStatus, TransactionSubmitter, TxHash, TxStatus,
};
pub use wallet::WalletProvider;

/// Which operation a flow drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowKind {
    Registration,
    Renewal,
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowKind::Registration => f.write_str("registration"),
            FlowKind::Renewal => f.write_str("renewal"),
        }
    }
}

pub mod prelude {
    pub use crate::FlowKind;
    pub use crate::capabilities::Capabilities;
    pub use crate::chain::{Address, ChainId, Networks};
    pub use crate::config::FlowConfig;
    pub use crate::error::{FlowError, FlowResult, TxError, WalletError};
    pub use crate::event::{AnalyticsSink, FlowEvent, FlowEventKind};
    pub use crate::name::TargetName;
    pub use crate::transaction::{ContractCall, Receipt, TransactionSubmitter, TxHash, TxStatus};
    pub use crate::wallet::WalletProvider;
}
