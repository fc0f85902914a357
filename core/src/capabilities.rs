use crate::event::{AnalyticsSink, NoopAnalytics};
use crate::transaction::TransactionSubmitter;
use crate::wallet::WalletProvider;
use std::sync::Arc;

/// Everything a flow talks to, injected at construction.
#[derive(Clone)]
pub struct Capabilities {
    pub wallet: Arc<dyn WalletProvider>,
    pub submitter: Arc<dyn TransactionSubmitter>,
    pub analytics: Arc<dyn AnalyticsSink>,
}

impl Capabilities {
    pub fn new(wallet: Arc<dyn WalletProvider>, submitter: Arc<dyn TransactionSubmitter>) -> Self {
        Self {
            wallet,
            submitter,
            analytics: Arc::new(NoopAnalytics),
        }
    }

    pub fn with_analytics(mut self, analytics: Arc<dyn AnalyticsSink>) -> Self {
        self.analytics = analytics;
        self
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("wallet_chain", &self.wallet.chain_id())
            .finish_non_exhaustive()
    }
}
