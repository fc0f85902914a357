//! # NameLifecycleFlow: Register and Renew Driver
//!
//! One flow instance drives one name through its steps. The flow owns a
//! single state container; every change happens under its lock and is then
//! published on a watch channel.
//!
//! * **Chain guard**: `sync_chain` keeps the wallet on the name's chain
//! * **Submit**: `Form/Claim -> Pending`, then a background task follows the
//!   transaction to `Success` or back to the editable step
//! * **Unmount**: stops observation; late results are fenced off
//!
//! ## Example
//!
//! ```rust,ignore
//! let flow = RenewalFlow::mount("alice", config, capabilities).await?;
//! flow.sync_chain().await;
//! match flow.submit(price_wei).await? {
//!     SubmitOutcome::Submitted => { /* watch flow.subscribe() */ }
//!     other => { /* prompt the user */ }
//! }
//! ```

use crate::call::build_call;
use crate::state::FlowState;
use crate::timeline::Timeline;
use basename_core::{
    Capabilities, ChainId, ContractCall, FlowConfig, FlowError, FlowEvent, FlowEventKind, FlowResult,
    Networks, Receipt, ReceiptStatus, TargetName, TxError, TxStatus,
};
use basename_flow::{
    ChainGuard, GuardDecision, RegistrationStep, RenewalStep, Step, StepTransition, Trigger,
};
use chrono::Utc;
use futures_util::future::join_all;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::Instrument;
use uuid::Uuid;

pub type RenewalFlow = NameLifecycleFlow<RenewalStep>;
pub type RegistrationFlow = NameLifecycleFlow<RegistrationStep>;

/// Result of pressing the register/renew button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Moved to `Pending`; the transaction is on its way.
    Submitted,
    /// Not in the editable step (already pending, or finished).
    Ignored,
    /// No wallet connected.
    ConnectWallet,
    /// Wrong network; a switch to this chain was requested instead.
    SwitchRequested { chain_id: ChainId },
}

/// The flow handle. Dropping it unmounts the flow.
pub struct NameLifecycleFlow<S: Step> {
    shared: Arc<Shared<S>>,
}

struct Shared<S: Step> {
    id: Uuid,
    config: Arc<FlowConfig>,
    networks: Networks,
    caps: Capabilities,
    inner: Mutex<Inner<S>>,
    publisher: watch::Sender<FlowState<S>>,
    tasks: Mutex<Tasks>,
    span: tracing::Span,
}

/// Background work of one flow. `settled` takes the join handles; the abort
/// handles stay behind so `unmount` can still stop a task that a dropped
/// `settled` future was waiting on.
#[derive(Default)]
struct Tasks {
    pending: Vec<JoinHandle<()>>,
    aborts: Vec<AbortHandle>,
}

struct Inner<S: Step> {
    state: FlowState<S>,
    guard: ChainGuard,
    /// Bumped on unmount and retarget; background work from an older
    /// generation must not touch `state`.
    generation: u64,
    timeline: Timeline<S>,
}

impl<S: Step> Inner<S> {
    fn apply(&mut self, trigger: Trigger) -> FlowResult<StepTransition<S>> {
        let transition = StepTransition::apply(self.state.step, trigger)?;
        self.state.step = transition.to;
        self.timeline.record_step(transition);
        Ok(transition)
    }
}

fn step_changed<S: Step>(transition: &StepTransition<S>) -> FlowEventKind {
    FlowEventKind::StepChanged {
        from: transition.from.to_string(),
        to: transition.to.to_string(),
    }
}

enum Prepared<S> {
    Done(SubmitOutcome),
    Switch(ChainId),
    Submit {
        formatted: Option<String>,
        transition: StepTransition<S>,
        generation: u64,
        call: ContractCall,
    },
}

impl NameLifecycleFlow<RenewalStep> {
    /// Mounts a renewal flow for `name` (bare label or formatted).
    pub async fn mount(
        name: &str,
        config: Arc<FlowConfig>,
        caps: Capabilities,
    ) -> FlowResult<Self> {
        let target = TargetName::parse(name, &config.networks())?;
        let flow = Self::build(Some(target), config, caps);
        flow.sync_chain().await;
        Ok(flow)
    }

    /// Points the flow at another name: back to `Form`, fresh transaction
    /// state, and a guard evaluation for the new chain.
    pub async fn navigate(&self, name: &str) -> FlowResult<()> {
        let target = TargetName::parse(name, &self.shared.networks)?;
        let (formatted, transition) = {
            let mut inner = self.shared.inner.lock();
            if !inner.state.mounted {
                return Err(FlowError::Unmounted);
            }
            // Form stays Form; Success moves back, Pending is refused
            let transition = if inner.state.step == RenewalStep::initial() {
                None
            } else {
                Some(inner.apply(Trigger::Navigate)?)
            };
            tracing::info!(parent: &self.shared.span, from = ?inner.state.formatted_name, to = %target, "navigating");
            inner.generation += 1;
            inner.state.years = self.shared.config.default_years;
            inner.state.clear_transaction();
            inner.state.set_target(Some(target));
            self.shared.publish(&inner);
            (inner.state.formatted_name.clone(), transition)
        };
        if let Some(transition) = transition {
            self.shared
                .record(formatted, vec![step_changed(&transition)])
                .await;
        }
        self.sync_chain().await;
        Ok(())
    }
}

impl NameLifecycleFlow<RegistrationStep> {
    /// Mounts a registration flow in `Search`.
    pub async fn mount(config: Arc<FlowConfig>, caps: Capabilities) -> FlowResult<Self> {
        let flow = Self::build(None, config, caps);
        flow.sync_chain().await;
        Ok(flow)
    }

    /// `Search -> Claim` with the chosen name; the guard starts watching its
    /// chain.
    pub async fn select_name(&self, name: &str) -> FlowResult<()> {
        let target = TargetName::parse(name, &self.shared.networks)?;
        let (formatted, transition) = {
            let mut inner = self.shared.inner.lock();
            if !inner.state.mounted {
                return Err(FlowError::Unmounted);
            }
            let transition = inner.apply(Trigger::SelectName)?;
            inner.state.set_target(Some(target));
            self.shared.publish(&inner);
            (inner.state.formatted_name.clone(), transition)
        };
        self.shared
            .record(formatted, vec![step_changed(&transition)])
            .await;
        self.sync_chain().await;
        Ok(())
    }

    /// `Success -> Profile`. The guard is idle from here on.
    pub async fn view_profile(&self) -> FlowResult<()> {
        self.transition(Trigger::ViewProfile, |_| {}).await
    }
}

impl<S: Step> NameLifecycleFlow<S> {
    fn build(target: Option<TargetName>, config: Arc<FlowConfig>, caps: Capabilities) -> Self {
        let state = FlowState::<S>::new(target, config.default_years);
        let span = tracing::info_span!(
            "name_flow",
            flow = %S::KIND,
            flow_id = %state.id,
        );
        tracing::info!(parent: &span, name = ?state.formatted_name, "flow mounted");

        let (publisher, _) = watch::channel(state.clone());
        let shared = Shared {
            id: state.id,
            networks: config.networks(),
            config,
            caps,
            inner: Mutex::new(Inner {
                state,
                guard: ChainGuard::new(),
                generation: 0,
                timeline: Timeline::new(),
            }),
            publisher,
            tasks: Mutex::new(Tasks::default()),
            span,
        };
        Self {
            shared: Arc::new(shared),
        }
    }

    /// Current state.
    pub fn snapshot(&self) -> FlowState<S> {
        self.shared.inner.lock().state.clone()
    }

    /// Receives a new state after every change.
    pub fn subscribe(&self) -> watch::Receiver<FlowState<S>> {
        self.shared.publisher.subscribe()
    }

    pub fn timeline(&self) -> Timeline<S> {
        self.shared.inner.lock().timeline.clone()
    }

    /// Whether the action button would submit right now.
    pub fn can_submit(&self) -> bool {
        if !self.shared.config.is_enabled(S::KIND) {
            return false;
        }
        let connected = self.shared.caps.wallet.connected_chain_id();
        let inner = self.shared.inner.lock();
        inner.state.mounted
            && inner.state.step.is_editable()
            && !inner.state.tx_status.is_in_flight()
            && inner
                .state
                .required_chain_id()
                .is_some_and(|required| connected == Some(required))
    }

    /// Re-evaluates the chain guard against the wallet's current chain.
    ///
    /// Call on every change of the wallet session; repeated calls with the
    /// same inputs are no-ops.
    pub async fn sync_chain(&self) -> GuardDecision {
        let connected = self.shared.caps.wallet.connected_chain_id();
        let decision = {
            let mut inner = self.shared.inner.lock();
            if !inner.state.mounted || !inner.state.step.guards_chain() {
                return GuardDecision::Unchanged;
            }
            let Some(required) = inner.state.required_chain_id() else {
                return GuardDecision::Unchanged;
            };
            inner.guard.evaluate(required, connected)
        };

        match decision {
            GuardDecision::Switch(chain_id) => {
                tracing::debug!(parent: &self.shared.span, ?connected, chain_id, "wallet on wrong chain");
                self.shared.request_switch(chain_id).await;
            }
            GuardDecision::Disconnected => {
                tracing::debug!(parent: &self.shared.span, "no wallet connected");
            }
            GuardDecision::Matched => {
                tracing::debug!(parent: &self.shared.span, ?connected, "wallet on required chain");
            }
            GuardDecision::Unchanged => {}
        }
        decision
    }

    /// Sets the duration; only in the editable step.
    pub fn set_years(&self, years: u64) -> FlowResult<()> {
        if !(1..=self.shared.config.max_years).contains(&years) {
            return Err(FlowError::InvalidYears(years));
        }
        let mut inner = self.shared.inner.lock();
        if !inner.state.mounted {
            return Err(FlowError::Unmounted);
        }
        if !inner.state.step.is_editable() {
            return Err(FlowError::InvalidTransition {
                step: inner.state.step.to_string(),
                trigger: "change duration".to_string(),
            });
        }
        inner.state.years = years;
        self.shared.publish(&inner);
        Ok(())
    }

    /// The register/renew button.
    ///
    /// `value` is the price in wei attached to the call.
    pub async fn submit(&self, value: u128) -> FlowResult<SubmitOutcome> {
        let shared = &self.shared;
        async move {
            if !shared.config.is_enabled(S::KIND) {
                tracing::warn!("submit while {} is disabled", S::KIND);
                return Err(FlowError::Disabled(S::KIND));
            }

            let (formatted, transition, generation, call) = match shared.prepare(value)? {
                Prepared::Submit {
                    formatted,
                    transition,
                    generation,
                    call,
                } => (formatted, transition, generation, call),
                Prepared::Switch(chain_id) => {
                    shared.request_switch(chain_id).await;
                    return Ok(SubmitOutcome::SwitchRequested { chain_id });
                }
                Prepared::Done(outcome) => {
                    tracing::debug!(?outcome, "submit not sent");
                    return Ok(outcome);
                }
            };

            tracing::info!(function = %call.function, chain_id = call.chain_id, "submitting");
            shared
                .record(formatted, vec![step_changed(&transition)])
                .await;

            let watcher = Arc::clone(shared);
            let handle = tokio::spawn(
                async move { watcher.follow_transaction(generation, call).await }
                    .instrument(shared.span.clone()),
            );
            shared.track(handle);

            Ok(SubmitOutcome::Submitted)
        }
        .instrument(shared.span.clone())
        .await
    }

    /// "Do it again" from `Success`.
    pub async fn restart(&self) -> FlowResult<()> {
        let default_years = self.shared.config.default_years;
        self.transition(Trigger::Restart, |inner| {
            inner.state.clear_transaction();
            inner.state.years = default_years;
            // registration starts over from an empty search
            if inner.state.step == S::initial() && !inner.state.step.guards_chain() {
                inner.state.set_target(None);
                inner.guard.reset();
            }
        })
        .await
    }

    /// Stops observing. The state container is frozen from here on and any
    /// background task is aborted; a submitted transaction is not cancelled.
    pub fn unmount(&self) {
        let in_flight = {
            let mut inner = self.shared.inner.lock();
            if !inner.state.mounted {
                return;
            }
            inner.state.mounted = false;
            inner.generation += 1;
            self.shared.publish(&inner);
            inner.state.tx_status.is_in_flight()
        };
        let mut tasks = self.shared.tasks.lock();
        tasks.pending.clear();
        for handle in tasks.aborts.drain(..) {
            handle.abort();
        }
        drop(tasks);
        if in_flight {
            tracing::debug!(parent: &self.shared.span, "transaction left in flight, no longer observed");
        }
        tracing::info!(parent: &self.shared.span, "flow unmounted");
    }

    /// Waits for outstanding switch requests and transaction watchers.
    pub async fn settled(&self) {
        loop {
            let handles: Vec<_> = self.shared.tasks.lock().pending.drain(..).collect();
            if handles.is_empty() {
                return;
            }
            join_all(handles).await;
        }
    }

    async fn transition(
        &self,
        trigger: Trigger,
        update: impl FnOnce(&mut Inner<S>),
    ) -> FlowResult<()> {
        let (formatted, transition) = {
            let mut inner = self.shared.inner.lock();
            if !inner.state.mounted {
                return Err(FlowError::Unmounted);
            }
            let transition = inner.apply(trigger)?;
            update(&mut *inner);
            self.shared.publish(&inner);
            (inner.state.formatted_name.clone(), transition)
        };
        tracing::info!(parent: &self.shared.span, from = %transition.from, to = %transition.to, "step changed");
        self.shared
            .record(formatted, vec![step_changed(&transition)])
            .await;
        Ok(())
    }
}

impl<S: Step> Drop for NameLifecycleFlow<S> {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl<S: Step> std::fmt::Debug for NameLifecycleFlow<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.inner.lock();
        f.debug_struct("NameLifecycleFlow")
            .field("id", &inner.state.id)
            .field("step", &inner.state.step)
            .field("name", &inner.state.formatted_name)
            .finish()
    }
}

impl<S: Step> Shared<S> {
    /// Checks every precondition of a submit and, when they hold, moves to
    /// `Pending` under the same lock, so a second press sees `Pending`.
    fn prepare(&self, value: u128) -> FlowResult<Prepared<S>> {
        let account = self.caps.wallet.account();
        let chain = self.caps.wallet.chain_id();

        let mut inner = self.inner.lock();
        if !inner.state.mounted {
            return Err(FlowError::Unmounted);
        }
        if !inner.state.step.is_editable() {
            return Ok(Prepared::Done(SubmitOutcome::Ignored));
        }
        let Some(target) = inner.state.target.clone() else {
            return Err(FlowError::InvalidTransition {
                step: inner.state.step.to_string(),
                trigger: Trigger::Submit.to_string(),
            });
        };
        let (Some(owner), Some(connected)) = (account, chain) else {
            return Ok(Prepared::Done(SubmitOutcome::ConnectWallet));
        };

        match ChainGuard::decide(target.required_chain_id(), Some(connected)) {
            GuardDecision::Switch(chain_id) => return Ok(Prepared::Switch(chain_id)),
            GuardDecision::Disconnected => {
                return Ok(Prepared::Done(SubmitOutcome::ConnectWallet));
            }
            GuardDecision::Matched | GuardDecision::Unchanged => {}
        }

        let call = build_call(
            S::KIND,
            &self.networks,
            &target,
            &owner,
            inner.state.years,
            value,
        )
        .inspect_err(|err| tracing::error!(%err, "refusing to submit"))?;

        let transition = inner.apply(Trigger::Submit)?;
        inner.state.clear_transaction();
        inner.state.tx_status = TxStatus::Initiated;
        self.publish(&inner);

        Ok(Prepared::Submit {
            formatted: inner.state.formatted_name.clone(),
            transition,
            generation: inner.generation,
            call,
        })
    }

    fn publish(&self, inner: &Inner<S>) {
        self.publisher.send_replace(inner.state.clone());
    }

    fn track(&self, handle: JoinHandle<()>) {
        let mut tasks = self.tasks.lock();
        tasks.pending.retain(|h| !h.is_finished());
        tasks.aborts.retain(|h| !h.is_finished());
        tasks.aborts.push(handle.abort_handle());
        tasks.pending.push(handle);
    }

    async fn record(&self, name: Option<String>, kinds: Vec<FlowEventKind>) {
        for kind in kinds {
            let event = FlowEvent {
                flow_id: self.id,
                flow: S::KIND,
                name: name.clone(),
                timestamp: Utc::now(),
                kind,
            };
            self.caps.analytics.record(event).await;
        }
    }

    /// Fire-and-forget network switch. The answer is only logged; a declined
    /// switch leaves the mismatch (and the disabled button) in place.
    async fn request_switch(self: &Arc<Self>, chain_id: ChainId) {
        let name = {
            let mut inner = self.inner.lock();
            inner.timeline.record_switch(chain_id);
            inner.state.formatted_name.clone()
        };

        let wallet = Arc::clone(&self.caps.wallet);
        let handle = tokio::spawn(
            async move {
                match wallet.switch_chain(chain_id).await {
                    Ok(()) => tracing::info!(chain_id, "wallet switched chain"),
                    Err(err) => tracing::warn!(chain_id, %err, "chain switch not completed"),
                }
            }
            .instrument(self.span.clone()),
        );
        self.track(handle);

        self.record(name, vec![FlowEventKind::SwitchChainRequested { chain_id }])
            .await;
    }

    /// Applies `update` if `generation` is still current. Returns `None` for
    /// stale work.
    fn update<R>(
        &self,
        generation: u64,
        update: impl FnOnce(&mut Inner<S>) -> R,
    ) -> Option<(R, Option<String>)> {
        let mut inner = self.inner.lock();
        if inner.generation != generation || !inner.state.mounted {
            tracing::debug!(generation, current = inner.generation, "dropping stale result");
            return None;
        }
        let result = update(&mut *inner);
        self.publish(&inner);
        Some((result, inner.state.formatted_name.clone()))
    }

    async fn follow_transaction(self: Arc<Self>, generation: u64, call: ContractCall) {
        let hash = match self.caps.submitter.write_contract(call).await {
            Ok(hash) => hash,
            Err(err) => return self.fail(generation, err, None).await,
        };

        let Some(((), name)) = self.update(generation, |inner| {
            inner.state.tx_hash = Some(hash.clone());
            inner.state.tx_status = TxStatus::Processing;
        }) else {
            return;
        };
        tracing::info!(%hash, "transaction sent");
        self.record(
            name,
            vec![FlowEventKind::TransactionSubmitted { hash: hash.clone() }],
        )
        .await;

        match self.caps.submitter.wait_for_receipt(&hash).await {
            Ok(receipt) if receipt.status == ReceiptStatus::Success => {
                self.confirm(generation, receipt).await
            }
            Ok(receipt) => {
                let err = TxError::Reverted(receipt.transaction_hash.clone());
                self.fail(generation, err, Some(receipt)).await
            }
            Err(err) => self.fail(generation, err, None).await,
        }
    }

    async fn confirm(&self, generation: u64, receipt: Receipt) {
        let hash = receipt.transaction_hash.clone();
        let block_number = receipt.block_number;
        let Some((transition, name)) = self.update(generation, |inner| {
            inner.state.tx_status = TxStatus::Success;
            inner.state.receipt = Some(receipt);
            inner.apply(Trigger::Confirmed)
        }) else {
            return;
        };

        match transition {
            Ok(transition) => {
                tracing::info!(%hash, block_number, "transaction confirmed");
                self.record(
                    name,
                    vec![
                        FlowEventKind::TransactionConfirmed { hash, block_number },
                        step_changed(&transition),
                    ],
                )
                .await;
            }
            Err(err) => tracing::error!(%err, "confirmation outside of pending"),
        }
    }

    async fn fail(&self, generation: u64, err: TxError, receipt: Option<Receipt>) {
        let message = err.to_string();
        let status = match err {
            TxError::Reverted(_) => TxStatus::Reverted,
            TxError::UserRejected | TxError::Network(_) => TxStatus::Error,
        };
        let Some((transition, name)) = self.update(generation, |inner| {
            inner.state.tx_status = status;
            inner.state.error = Some(message.clone());
            inner.state.receipt = receipt;
            inner.apply(Trigger::Failed)
        }) else {
            return;
        };

        tracing::warn!(error = %message, "transaction failed");
        let mut events = vec![FlowEventKind::TransactionFailed { message }];
        if let Ok(transition) = transition {
            events.push(step_changed(&transition));
        }
        self.record(name, events).await;
    }
}
