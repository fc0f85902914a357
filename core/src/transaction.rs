use crate::chain::{Address, ChainId};
use crate::error::TxError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(pub String);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A contract write as handed to the submitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractCall {
    pub chain_id: ChainId,
    pub address: Address,
    pub function: String,
    pub args: Vec<serde_json::Value>,
    /// Native value attached to the call, in wei.
    pub value: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptStatus {
    Success,
    Reverted,
}

/// Confirmation data for a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub transaction_hash: TxHash,
    pub block_number: u64,
    pub gas_used: u64,
    pub status: ReceiptStatus,
}

/// Lifecycle of the transaction a flow is tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    #[default]
    Idle,
    /// Handed to the wallet, no hash yet.
    Initiated,
    /// Hash known, waiting for the receipt.
    Processing,
    Success,
    Reverted,
    Error,
}

impl TxStatus {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, TxStatus::Initiated | TxStatus::Processing)
    }
}

/// Sends contract writes and reports their receipts.
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    /// Asks the wallet to sign and broadcast `call`.
    async fn write_contract(&self, call: ContractCall) -> Result<TxHash, TxError>;

    /// Resolves once `hash` is mined. A reverted transaction is a receipt, not
    /// an error.
    async fn wait_for_receipt(&self, hash: &TxHash) -> Result<Receipt, TxError>;
}
