use crate::chain::ChainId;
use crate::transaction::TxHash;
use crate::FlowKind;
use thiserror::Error;

/// Problems with a user-supplied name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("name is empty")]
    Empty,
    #[error("invalid name label `{0}`")]
    InvalidLabel(String),
    #[error("unknown name suffix `{0}`")]
    UnknownSuffix(String),
}

/// Failures reported by a wallet provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("request rejected in wallet")]
    Rejected,
    #[error("wallet not connected")]
    NotConnected,
    #[error("wallet unavailable: {0}")]
    Unavailable(String),
}

/// Failures of a submitted (or about to be submitted) transaction.
///
/// These never escape the flow; they are turned into an inline message and a
/// return to the editable step.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TxError {
    #[error("transaction was rejected in the wallet")]
    UserRejected,
    #[error("network request failed: {0}")]
    Network(String),
    #[error("transaction {0} reverted on-chain")]
    Reverted(TxHash),
}

impl From<WalletError> for TxError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::Rejected => TxError::UserRejected,
            other => TxError::Network(other.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors returned to the caller of a flow operation.
///
/// Transaction failures are not in here; see [`TxError`].
#[derive(Error, Debug)]
pub enum FlowError {
    #[error(transparent)]
    Name(#[from] NameError),
    #[error("no registrar contract is configured for chain {0}")]
    UnsupportedChain(ChainId),
    #[error("{0} is disabled")]
    Disabled(FlowKind),
    #[error("cannot {trigger} while in step {step}")]
    InvalidTransition { step: String, trigger: String },
    #[error("duration of {0} years is out of range")]
    InvalidYears(u64),
    #[error("flow has been unmounted")]
    Unmounted,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type FlowResult<T> = Result<T, FlowError>;
