//! ChainGuard - Network Synchronisation Decisions
//!
//! The guard compares the chain a name requires with the chain the wallet is
//! on. It remembers the last pair it saw and only produces a switch request
//! when that pair changes, so it can be evaluated on every render.

use basename_core::ChainId;

/// What the caller should do after an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Same inputs as last time; nothing to do.
    Unchanged,
    /// No wallet connected; show the connect affordance.
    Disconnected,
    /// Wallet already on the required chain.
    Matched,
    /// Ask the wallet to switch to this chain.
    Switch(ChainId),
}

#[derive(Debug, Clone, Default)]
pub struct ChainGuard {
    last: Option<(ChainId, Option<ChainId>)>,
}

impl ChainGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-evaluates the guard for the current inputs.
    pub fn evaluate(&mut self, required: ChainId, connected: Option<ChainId>) -> GuardDecision {
        let inputs = (required, connected);
        if self.last == Some(inputs) {
            return GuardDecision::Unchanged;
        }
        self.last = Some(inputs);
        Self::decide(required, connected)
    }

    /// Stateless check used when the user presses the action button.
    pub fn decide(required: ChainId, connected: Option<ChainId>) -> GuardDecision {
        match connected {
            None => GuardDecision::Disconnected,
            Some(chain) if chain == required => GuardDecision::Matched,
            Some(_) => GuardDecision::Switch(required),
        }
    }

    /// Forgets the last inputs; the next evaluation acts again.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_requests_switch_once() {
        let mut guard = ChainGuard::new();
        assert_eq!(guard.evaluate(8453, Some(1)), GuardDecision::Switch(8453));
        assert_eq!(guard.evaluate(8453, Some(1)), GuardDecision::Unchanged);
        assert_eq!(guard.evaluate(8453, Some(1)), GuardDecision::Unchanged);
    }

    #[test]
    fn test_each_change_is_evaluated() {
        let mut guard = ChainGuard::new();
        assert_eq!(guard.evaluate(8453, Some(1)), GuardDecision::Switch(8453));
        assert_eq!(guard.evaluate(8453, Some(10)), GuardDecision::Switch(8453));
        assert_eq!(guard.evaluate(84532, Some(10)), GuardDecision::Switch(84532));
        assert_eq!(guard.evaluate(84532, Some(84532)), GuardDecision::Matched);
    }

    #[test]
    fn test_disconnected_never_switches() {
        let mut guard = ChainGuard::new();
        assert_eq!(guard.evaluate(8453, None), GuardDecision::Disconnected);
        assert_eq!(guard.evaluate(84532, None), GuardDecision::Disconnected);
    }

    #[test]
    fn test_reset_allows_repeat() {
        let mut guard = ChainGuard::new();
        guard.evaluate(8453, Some(1));
        guard.reset();
        assert_eq!(guard.evaluate(8453, Some(1)), GuardDecision::Switch(8453));
    }
}
