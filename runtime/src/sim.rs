//! Simulated collaborators.
//!
//! In-memory stand-ins for a wallet, a transaction submitter and an
//! analytics sink. The CLI runs flows against them and the integration tests
//! script them.

use async_trait::async_trait;
use basename_core::{
    Address, AnalyticsSink, ChainId, ContractCall, FlowEvent, FlowEventKind, Receipt,
    ReceiptStatus, TransactionSubmitter, TxError, TxHash, WalletError, WalletProvider,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Notify;

/// How the simulated user answers a network switch prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwitchResponse {
    /// Switches immediately.
    #[default]
    Accept,
    /// Declines in the wallet.
    Decline,
    /// Leaves the prompt open; the chain only changes via `set_chain`.
    Ignore,
}

#[derive(Debug, Default)]
pub struct SimulatedWallet {
    account: Mutex<Option<Address>>,
    chain: Mutex<Option<ChainId>>,
    response: Mutex<SwitchResponse>,
    switch_requests: Mutex<Vec<ChainId>>,
}

impl SimulatedWallet {
    pub fn connected(account: Address, chain_id: ChainId) -> Self {
        Self {
            account: Mutex::new(Some(account)),
            chain: Mutex::new(Some(chain_id)),
            ..Self::default()
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn with_response(self, response: SwitchResponse) -> Self {
        *self.response.lock() = response;
        self
    }

    pub fn connect(&self, account: Address, chain_id: ChainId) {
        *self.account.lock() = Some(account);
        *self.chain.lock() = Some(chain_id);
    }

    pub fn disconnect(&self) {
        *self.account.lock() = None;
        *self.chain.lock() = None;
    }

    /// The user switched networks from the wallet UI.
    pub fn set_chain(&self, chain_id: ChainId) {
        *self.chain.lock() = Some(chain_id);
    }

    pub fn switch_requests(&self) -> Vec<ChainId> {
        self.switch_requests.lock().clone()
    }
}

#[async_trait]
impl WalletProvider for SimulatedWallet {
    fn account(&self) -> Option<Address> {
        self.account.lock().clone()
    }

    fn chain_id(&self) -> Option<ChainId> {
        *self.chain.lock()
    }

    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), WalletError> {
        self.switch_requests.lock().push(chain_id);
        if self.account.lock().is_none() {
            return Err(WalletError::NotConnected);
        }
        let response = *self.response.lock();
        match response {
            SwitchResponse::Accept => {
                *self.chain.lock() = Some(chain_id);
                Ok(())
            }
            SwitchResponse::Decline => Err(WalletError::Rejected),
            SwitchResponse::Ignore => Ok(()),
        }
    }
}

/// What happens to the next transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxScript {
    #[default]
    Confirm,
    Revert,
    /// The user rejects the signature prompt.
    Reject,
    /// The receipt request fails.
    NetworkFailure,
}

#[derive(Debug, Default)]
pub struct SimulatedSubmitter {
    script: Mutex<TxScript>,
    calls: Mutex<Vec<ContractCall>>,
    nonce: AtomicU64,
    /// When set, receipts wait for [`SimulatedSubmitter::release`].
    gate: Option<Arc<Notify>>,
}

impl SimulatedSubmitter {
    pub fn new(script: TxScript) -> Self {
        Self {
            script: Mutex::new(script),
            ..Self::default()
        }
    }

    /// Receipts are held until `release` is called once per transaction.
    pub fn gated(script: TxScript) -> Self {
        Self {
            gate: Some(Arc::new(Notify::new())),
            ..Self::new(script)
        }
    }

    pub fn set_script(&self, script: TxScript) {
        *self.script.lock() = script;
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn calls(&self) -> Vec<ContractCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl TransactionSubmitter for SimulatedSubmitter {
    async fn write_contract(&self, call: ContractCall) -> Result<TxHash, TxError> {
        self.calls.lock().push(call);
        if *self.script.lock() == TxScript::Reject {
            return Err(TxError::UserRejected);
        }
        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(TxHash(format!("0x{nonce:064x}")))
    }

    async fn wait_for_receipt(&self, hash: &TxHash) -> Result<Receipt, TxError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let script = *self.script.lock();
        let status = match script {
            TxScript::Confirm => ReceiptStatus::Success,
            TxScript::Revert => ReceiptStatus::Reverted,
            TxScript::NetworkFailure => {
                return Err(TxError::Network("receipt request timed out".to_string()));
            }
            TxScript::Reject => return Err(TxError::UserRejected),
        };
        Ok(Receipt {
            transaction_hash: hash.clone(),
            block_number: 19_000_000 + self.nonce.load(Ordering::SeqCst),
            gas_used: 21_000,
            status,
        })
    }
}

/// Keeps every event for later inspection.
#[derive(Debug, Default)]
pub struct RecordingAnalytics {
    events: Mutex<Vec<FlowEvent>>,
}

impl RecordingAnalytics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FlowEvent> {
        self.events.lock().clone()
    }

    pub fn kinds(&self) -> Vec<FlowEventKind> {
        self.events.lock().iter().map(|e| e.kind.clone()).collect()
    }
}

#[async_trait]
impl AnalyticsSink for RecordingAnalytics {
    async fn record(&self, event: FlowEvent) {
        self.events.lock().push(event);
    }
}
