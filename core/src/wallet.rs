use crate::chain::{Address, ChainId};
use crate::error::WalletError;
use async_trait::async_trait;

/// The connected wallet session.
///
/// `account` and `chain_id` are read on demand; the host notifies the flow
/// when either may have changed.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn account(&self) -> Option<Address>;

    fn chain_id(&self) -> Option<ChainId>;

    /// Asks the wallet to move to `chain_id`. Best effort; the user may
    /// decline.
    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), WalletError>;

    /// Chain id of the session, or `None` while no account is connected.
    fn connected_chain_id(&self) -> Option<ChainId> {
        self.account().and(self.chain_id())
    }
}
