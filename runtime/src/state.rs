use basename_core::{ChainId, FlowKind, Receipt, TargetName, TxHash, TxStatus};
use basename_flow::Step;
use serde::Serialize;
use uuid::Uuid;

/// Everything an observer of a flow can see.
///
/// Published on the flow's watch channel after every change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowState<S> {
    pub id: Uuid,
    pub kind: FlowKind,
    pub step: S,
    pub target: Option<TargetName>,
    /// `label.suffix`; follows `target`.
    pub formatted_name: Option<String>,
    pub years: u64,
    pub tx_status: TxStatus,
    pub tx_hash: Option<TxHash>,
    pub receipt: Option<Receipt>,
    /// Message of the last failed attempt.
    pub error: Option<String>,
    pub mounted: bool,
}

impl<S: Step> FlowState<S> {
    pub(crate) fn new(target: Option<TargetName>, years: u64) -> Self {
        let formatted_name = target.as_ref().map(TargetName::formatted);
        Self {
            id: Uuid::new_v4(),
            kind: S::KIND,
            step: S::initial(),
            target,
            formatted_name,
            years,
            tx_status: TxStatus::Idle,
            tx_hash: None,
            receipt: None,
            error: None,
            mounted: true,
        }
    }

    pub fn required_chain_id(&self) -> Option<ChainId> {
        self.target.as_ref().map(TargetName::required_chain_id)
    }

    pub(crate) fn set_target(&mut self, target: Option<TargetName>) {
        self.formatted_name = target.as_ref().map(TargetName::formatted);
        self.target = target;
    }

    pub(crate) fn clear_transaction(&mut self) {
        self.tx_status = TxStatus::Idle;
        self.tx_hash = None;
        self.receipt = None;
        self.error = None;
    }
}
