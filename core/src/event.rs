use crate::chain::ChainId;
use crate::transaction::TxHash;
use crate::FlowKind;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Something worth reporting happened in a flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowEvent {
    pub flow_id: Uuid,
    pub flow: FlowKind,
    /// Formatted name, if the flow has one yet.
    pub name: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub kind: FlowEventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlowEventKind {
    StepChanged { from: String, to: String },
    SwitchChainRequested { chain_id: ChainId },
    TransactionSubmitted { hash: TxHash },
    TransactionConfirmed { hash: TxHash, block_number: u64 },
    TransactionFailed { message: String },
}

/// Receives flow events (analytics, audit, logs).
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn record(&self, event: FlowEvent);
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnalytics;

#[async_trait]
impl AnalyticsSink for NoopAnalytics {
    async fn record(&self, _event: FlowEvent) {}
}

/// Writes every event to the `basenames::analytics` tracing target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAnalytics;

#[async_trait]
impl AnalyticsSink for TracingAnalytics {
    async fn record(&self, event: FlowEvent) {
        tracing::info!(
            target: "basenames::analytics",
            flow_id = %event.flow_id,
            flow = %event.flow,
            name = event.name.as_deref().unwrap_or("-"),
            kind = ?event.kind,
            "flow event"
        );
    }
}
