use basename_core::chain::{BASE_MAINNET, BASE_SEPOLIA};
use basename_core::{
    Address, Capabilities, FlowConfig, FlowError, FlowEventKind, NetworkConfig, TxStatus,
};
use basename_flow::{GuardDecision, RegistrationStep, RenewalStep, Trigger};
use basename_runtime::sim::{
    RecordingAnalytics, SimulatedSubmitter, SimulatedWallet, SwitchResponse, TxScript,
};
use basename_runtime::{RegistrationFlow, RenewalFlow, SubmitOutcome};
use std::sync::Arc;
use std::time::Duration;

fn account() -> Address {
    "0x00000000000000000000000000000000000000a1".parse().unwrap()
}

struct Harness {
    wallet: Arc<SimulatedWallet>,
    submitter: Arc<SimulatedSubmitter>,
    analytics: Arc<RecordingAnalytics>,
    config: Arc<FlowConfig>,
}

impl Harness {
    fn new(wallet: SimulatedWallet, submitter: SimulatedSubmitter) -> Self {
        Self::with_config(wallet, submitter, FlowConfig::default())
    }

    fn with_config(
        wallet: SimulatedWallet,
        submitter: SimulatedSubmitter,
        config: FlowConfig,
    ) -> Self {
        Self {
            wallet: Arc::new(wallet),
            submitter: Arc::new(submitter),
            analytics: Arc::new(RecordingAnalytics::new()),
            config: Arc::new(config),
        }
    }

    fn caps(&self) -> Capabilities {
        Capabilities::new(self.wallet.clone(), self.submitter.clone())
            .with_analytics(self.analytics.clone())
    }

    async fn renewal(&self, name: &str) -> RenewalFlow {
        RenewalFlow::mount(name, self.config.clone(), self.caps())
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn test_required_chain_is_deterministic() {
    let h = Harness::new(
        SimulatedWallet::connected(account(), BASE_MAINNET),
        SimulatedSubmitter::default(),
    );
    let first = h.renewal("alice").await;
    let second = h.renewal("alice.base.eth").await;
    let test = h.renewal("alice.basetest.eth").await;

    assert_eq!(first.snapshot().required_chain_id(), Some(BASE_MAINNET));
    assert_eq!(
        first.snapshot().required_chain_id(),
        second.snapshot().required_chain_id()
    );
    assert_eq!(test.snapshot().required_chain_id(), Some(BASE_SEPOLIA));
    assert_eq!(
        first.snapshot().formatted_name.as_deref(),
        Some("alice.base.eth")
    );
}

#[tokio::test]
async fn test_no_switch_when_already_on_required_chain() {
    let h = Harness::new(
        SimulatedWallet::connected(account(), BASE_MAINNET),
        SimulatedSubmitter::default(),
    );
    let flow = h.renewal("alice").await;
    for _ in 0..5 {
        flow.sync_chain().await;
    }
    flow.settled().await;

    assert!(h.wallet.switch_requests().is_empty());
    assert!(flow.can_submit());
}

#[tokio::test]
async fn test_one_switch_request_per_change() {
    let h = Harness::new(
        SimulatedWallet::connected(account(), 1).with_response(SwitchResponse::Ignore),
        SimulatedSubmitter::default(),
    );
    let flow = h.renewal("alice").await;
    assert_eq!(flow.sync_chain().await, GuardDecision::Unchanged);
    assert_eq!(flow.sync_chain().await, GuardDecision::Unchanged);
    flow.settled().await;
    assert_eq!(h.wallet.switch_requests(), vec![BASE_MAINNET]);

    h.wallet.set_chain(10);
    assert_eq!(flow.sync_chain().await, GuardDecision::Switch(BASE_MAINNET));
    assert_eq!(flow.sync_chain().await, GuardDecision::Unchanged);
    flow.settled().await;
    assert_eq!(h.wallet.switch_requests(), vec![BASE_MAINNET, BASE_MAINNET]);

    h.wallet.set_chain(BASE_MAINNET);
    assert_eq!(flow.sync_chain().await, GuardDecision::Matched);
    flow.settled().await;
    assert_eq!(h.wallet.switch_requests().len(), 2);
    assert_eq!(flow.timeline().switch_requests().count(), 2);
}

#[tokio::test]
async fn test_declined_switch_is_not_retried() {
    let h = Harness::new(
        SimulatedWallet::connected(account(), 1).with_response(SwitchResponse::Decline),
        SimulatedSubmitter::default(),
    );
    let flow = h.renewal("alice").await;
    flow.settled().await;
    flow.sync_chain().await;
    flow.settled().await;

    assert_eq!(h.wallet.switch_requests(), vec![BASE_MAINNET]);
    assert!(!flow.can_submit());
    assert_eq!(flow.snapshot().step, RenewalStep::Form);
}

#[tokio::test]
async fn test_disconnected_wallet_never_switches() {
    let h = Harness::new(SimulatedWallet::disconnected(), SimulatedSubmitter::default());
    let flow = h.renewal("alice.basetest.eth").await;
    assert_eq!(flow.sync_chain().await, GuardDecision::Unchanged);
    flow.settled().await;

    assert_eq!(flow.submit(0).await.unwrap(), SubmitOutcome::ConnectWallet);
    flow.settled().await;
    assert!(h.wallet.switch_requests().is_empty());
    assert_eq!(flow.snapshot().step, RenewalStep::Form);

    h.wallet.connect(account(), BASE_SEPOLIA);
    assert_eq!(flow.sync_chain().await, GuardDecision::Matched);
    assert!(flow.can_submit());
}

#[tokio::test]
async fn test_rapid_clicks_submit_once() {
    let h = Harness::new(
        SimulatedWallet::connected(account(), BASE_MAINNET),
        SimulatedSubmitter::gated(TxScript::Confirm),
    );
    let flow = h.renewal("alice").await;

    assert_eq!(flow.submit(1_000).await.unwrap(), SubmitOutcome::Submitted);
    assert_eq!(flow.snapshot().step, RenewalStep::Pending);
    assert!(!flow.can_submit());
    for _ in 0..3 {
        assert_eq!(flow.submit(1_000).await.unwrap(), SubmitOutcome::Ignored);
    }

    h.submitter.release();
    flow.settled().await;

    assert_eq!(h.submitter.calls().len(), 1);
    let steps: Vec<_> = flow.timeline().transitions().map(|t| (t.from, t.to)).collect();
    assert_eq!(
        steps,
        vec![
            (RenewalStep::Form, RenewalStep::Pending),
            (RenewalStep::Pending, RenewalStep::Success),
        ]
    );
}

#[tokio::test]
async fn test_wrong_chain_click_requests_switch_instead() {
    let h = Harness::new(
        SimulatedWallet::connected(account(), 1).with_response(SwitchResponse::Ignore),
        SimulatedSubmitter::default(),
    );
    let flow = h.renewal("alice").await;

    assert_eq!(
        flow.submit(0).await.unwrap(),
        SubmitOutcome::SwitchRequested {
            chain_id: BASE_MAINNET
        }
    );
    flow.settled().await;

    assert_eq!(flow.snapshot().step, RenewalStep::Form);
    assert_eq!(flow.snapshot().tx_status, TxStatus::Idle);
    assert!(h.submitter.calls().is_empty());
    assert_eq!(h.wallet.switch_requests(), vec![BASE_MAINNET, BASE_MAINNET]);
}

#[tokio::test]
async fn test_confirmed_transaction_exposes_receipt() {
    let h = Harness::new(
        SimulatedWallet::connected(account(), BASE_MAINNET),
        SimulatedSubmitter::new(TxScript::Confirm),
    );
    let flow = h.renewal("alice").await;
    flow.set_years(3).unwrap();

    flow.submit(42).await.unwrap();
    flow.settled().await;

    let state = flow.snapshot();
    assert_eq!(state.step, RenewalStep::Success);
    assert_eq!(state.tx_status, TxStatus::Success);
    let receipt = state.receipt.expect("receipt");
    assert_eq!(Some(&receipt.transaction_hash), state.tx_hash.as_ref());
    assert!(state.error.is_none());

    let call = &h.submitter.calls()[0];
    assert_eq!(call.function, "renew");
    assert_eq!(call.value, 42);
    assert_eq!(call.chain_id, BASE_MAINNET);
}

#[tokio::test]
async fn test_failures_return_to_form_with_message() {
    let cases = [
        (TxScript::Revert, TxStatus::Reverted),
        (TxScript::Reject, TxStatus::Error),
        (TxScript::NetworkFailure, TxStatus::Error),
    ];
    for (script, status) in cases {
        let h = Harness::new(
            SimulatedWallet::connected(account(), BASE_MAINNET),
            SimulatedSubmitter::new(script),
        );
        let flow = h.renewal("alice").await;

        flow.submit(0).await.unwrap();
        flow.settled().await;

        let state = flow.snapshot();
        assert_eq!(state.step, RenewalStep::Form, "{script:?}");
        assert_eq!(state.tx_status, status, "{script:?}");
        assert!(state.error.as_deref().is_some_and(|m| !m.is_empty()));

        // the user may retry by hand
        h.submitter.set_script(TxScript::Confirm);
        assert_eq!(flow.submit(0).await.unwrap(), SubmitOutcome::Submitted);
        assert!(flow.snapshot().error.is_none());
        flow.settled().await;
        assert_eq!(flow.snapshot().step, RenewalStep::Success);
    }
}

#[tokio::test]
async fn test_unmount_while_pending_freezes_state() {
    let h = Harness::new(
        SimulatedWallet::connected(account(), BASE_MAINNET),
        SimulatedSubmitter::gated(TxScript::Confirm),
    );
    let flow = h.renewal("alice").await;
    let mut updates = flow.subscribe();

    flow.submit(0).await.unwrap();
    tokio::task::yield_now().await;
    flow.unmount();

    h.submitter.release();
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
    flow.settled().await;

    let state = flow.snapshot();
    assert!(!state.mounted);
    assert_eq!(state.step, RenewalStep::Pending);
    assert!(state.receipt.is_none());
    assert!(!updates.borrow_and_update().mounted);
    assert!(
        !h.analytics
            .kinds()
            .iter()
            .any(|k| matches!(k, FlowEventKind::TransactionConfirmed { .. }))
    );
    assert!(matches!(flow.submit(0).await, Err(FlowError::Unmounted)));
}

#[tokio::test]
async fn test_drop_unmounts() {
    let h = Harness::new(
        SimulatedWallet::connected(account(), BASE_MAINNET),
        SimulatedSubmitter::default(),
    );
    let flow = h.renewal("alice").await;
    let updates = flow.subscribe();
    drop(flow);

    assert!(!updates.borrow().mounted);
}

#[tokio::test]
async fn test_extend_again_returns_to_form() {
    let h = Harness::new(
        SimulatedWallet::connected(account(), BASE_MAINNET),
        SimulatedSubmitter::default(),
    );
    let flow = h.renewal("alice").await;
    flow.set_years(2).unwrap();
    flow.submit(0).await.unwrap();
    flow.settled().await;

    flow.restart().await.unwrap();
    let state = flow.snapshot();
    assert_eq!(state.step, RenewalStep::Form);
    assert_eq!(state.tx_status, TxStatus::Idle);
    assert_eq!(state.years, 1);
    assert_eq!(state.formatted_name.as_deref(), Some("alice.base.eth"));

    // restart is the only way back from success
    assert!(matches!(
        flow.restart().await,
        Err(FlowError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn test_registration_profile_does_not_rerun_guard() {
    let h = Harness::new(
        SimulatedWallet::connected(account(), BASE_MAINNET),
        SimulatedSubmitter::default(),
    );
    let flow = RegistrationFlow::mount(h.config.clone(), h.caps())
        .await
        .unwrap();
    assert_eq!(flow.snapshot().step, RegistrationStep::Search);
    assert_eq!(flow.submit(0).await.unwrap(), SubmitOutcome::Ignored);

    flow.select_name("newbie").await.unwrap();
    assert_eq!(flow.snapshot().step, RegistrationStep::Claim);
    flow.submit(5).await.unwrap();
    flow.settled().await;
    assert_eq!(flow.snapshot().step, RegistrationStep::Success);

    let call = &h.submitter.calls()[0];
    assert_eq!(call.function, "register");
    assert_eq!(call.args[0]["name"], "newbie");
    assert_eq!(call.args[0]["owner"], account().as_str());

    flow.view_profile().await.unwrap();
    assert_eq!(flow.snapshot().step, RegistrationStep::Profile);

    h.wallet.set_chain(1);
    assert_eq!(flow.sync_chain().await, GuardDecision::Unchanged);
    flow.settled().await;
    assert!(h.wallet.switch_requests().is_empty());
}

#[tokio::test]
async fn test_registration_restart_clears_name() {
    let h = Harness::new(
        SimulatedWallet::connected(account(), BASE_SEPOLIA),
        SimulatedSubmitter::default(),
    );
    let flow = RegistrationFlow::mount(h.config.clone(), h.caps())
        .await
        .unwrap();
    flow.select_name("tester.basetest.eth").await.unwrap();
    flow.submit(0).await.unwrap();
    flow.settled().await;

    flow.restart().await.unwrap();
    let state = flow.snapshot();
    assert_eq!(state.step, RegistrationStep::Search);
    assert!(state.target.is_none());
    assert!(state.formatted_name.is_none());
}

#[tokio::test]
async fn test_disabled_renewals() {
    let config = FlowConfig {
        renewals_enabled: false,
        ..FlowConfig::default()
    };
    let h = Harness::with_config(
        SimulatedWallet::connected(account(), BASE_MAINNET),
        SimulatedSubmitter::default(),
        config,
    );
    let flow = h.renewal("alice").await;

    assert!(!flow.can_submit());
    assert!(matches!(
        flow.submit(0).await,
        Err(FlowError::Disabled(basename_core::FlowKind::Renewal))
    ));
    assert_eq!(flow.snapshot().step, RenewalStep::Form);

    let registration = RegistrationFlow::mount(h.config.clone(), h.caps())
        .await
        .unwrap();
    registration.select_name("fresh").await.unwrap();
    assert!(registration.can_submit());
}

#[tokio::test]
async fn test_missing_registrar_fails_loudly() {
    let mut network = NetworkConfig::base_mainnet();
    network.registrar_controller = None;
    let config = FlowConfig {
        networks: vec![network],
        ..FlowConfig::default()
    };
    let h = Harness::with_config(
        SimulatedWallet::connected(account(), BASE_MAINNET),
        SimulatedSubmitter::default(),
        config,
    );
    let flow = h.renewal("alice").await;

    assert!(matches!(
        flow.submit(0).await,
        Err(FlowError::UnsupportedChain(BASE_MAINNET))
    ));
    assert_eq!(flow.snapshot().step, RenewalStep::Form);
    assert!(h.submitter.calls().is_empty());
}

#[tokio::test]
async fn test_navigate_reruns_guard_for_new_chain() {
    let h = Harness::new(
        SimulatedWallet::connected(account(), BASE_MAINNET),
        SimulatedSubmitter::default(),
    );
    let flow = h.renewal("alice").await;
    flow.settled().await;
    assert!(h.wallet.switch_requests().is_empty());

    flow.navigate("bob.basetest.eth").await.unwrap();
    flow.settled().await;

    assert_eq!(h.wallet.switch_requests(), vec![BASE_SEPOLIA]);
    let state = flow.snapshot();
    assert_eq!(state.formatted_name.as_deref(), Some("bob.basetest.eth"));
    assert_eq!(state.step, RenewalStep::Form);
}

#[tokio::test]
async fn test_invalid_inputs() {
    let h = Harness::new(
        SimulatedWallet::connected(account(), BASE_MAINNET),
        SimulatedSubmitter::default(),
    );
    assert!(matches!(
        RenewalFlow::mount("alice.eth", h.config.clone(), h.caps()).await,
        Err(FlowError::Name(_))
    ));

    let flow = h.renewal("alice").await;
    assert!(matches!(flow.set_years(0), Err(FlowError::InvalidYears(0))));
    assert!(matches!(
        flow.set_years(100),
        Err(FlowError::InvalidYears(100))
    ));
}

#[tokio::test]
async fn test_analytics_and_subscribers_see_every_step() {
    let h = Harness::new(
        SimulatedWallet::connected(account(), BASE_MAINNET),
        SimulatedSubmitter::default(),
    );
    let flow = h.renewal("alice").await;
    let mut updates = flow.subscribe();

    flow.submit(0).await.unwrap();
    assert!(updates.has_changed().unwrap());
    assert_eq!(updates.borrow_and_update().step, RenewalStep::Pending);
    flow.settled().await;
    assert_eq!(updates.borrow_and_update().step, RenewalStep::Success);

    let kinds = h.analytics.kinds();
    assert!(matches!(kinds[0], FlowEventKind::StepChanged { ref to, .. } if to == "pending"));
    assert!(matches!(kinds[1], FlowEventKind::TransactionSubmitted { .. }));
    assert!(matches!(kinds[2], FlowEventKind::TransactionConfirmed { .. }));
    assert!(matches!(kinds[3], FlowEventKind::StepChanged { ref to, .. } if to == "success"));
    assert!(
        h.analytics
            .events()
            .iter()
            .all(|e| e.name.as_deref() == Some("alice.base.eth"))
    );
    assert!(
        flow.timeline()
            .transitions()
            .all(|t| t.trigger != Trigger::Restart)
    );
}

/// Name on Base, wallet on mainnet: one switch on mount, no submit until the
/// wallet reports Base, then pending and success.
#[tokio::test]
async fn test_switch_then_renew_scenario() {
    let h = Harness::new(
        SimulatedWallet::connected(account(), 1).with_response(SwitchResponse::Ignore),
        SimulatedSubmitter::gated(TxScript::Confirm),
    );
    let flow = h.renewal("alice").await;
    flow.settled().await;
    assert_eq!(h.wallet.switch_requests(), vec![8453]);

    assert!(matches!(
        flow.submit(0).await.unwrap(),
        SubmitOutcome::SwitchRequested { chain_id: 8453 }
    ));
    assert_eq!(flow.snapshot().step, RenewalStep::Form);

    h.wallet.set_chain(8453);
    flow.sync_chain().await;
    assert_eq!(flow.submit(0).await.unwrap(), SubmitOutcome::Submitted);
    assert_eq!(flow.snapshot().step, RenewalStep::Pending);

    h.submitter.release();
    flow.settled().await;
    let state = flow.snapshot();
    assert_eq!(state.step, RenewalStep::Success);
    assert!(state.receipt.is_some());
}

#[tokio::test]
async fn test_navigate_from_success_is_recorded() {
    let h = Harness::new(
        SimulatedWallet::connected(account(), BASE_MAINNET),
        SimulatedSubmitter::default(),
    );
    let flow = h.renewal("alice").await;
    flow.submit(0).await.unwrap();
    flow.settled().await;
    assert_eq!(flow.snapshot().step, RenewalStep::Success);

    flow.navigate("bob").await.unwrap();
    let state = flow.snapshot();
    assert_eq!(state.step, RenewalStep::Form);
    assert_eq!(state.tx_status, TxStatus::Idle);
    assert!(state.receipt.is_none());

    let timeline = flow.timeline();
    let last = timeline.transitions().last().copied().unwrap();
    assert_eq!(
        (last.from, last.to, last.trigger),
        (RenewalStep::Success, RenewalStep::Form, Trigger::Navigate)
    );
    let event = h.analytics.events().pop().unwrap();
    assert_eq!(event.name.as_deref(), Some("bob.base.eth"));
    assert!(matches!(
        event.kind,
        FlowEventKind::StepChanged { ref from, ref to } if from == "success" && to == "form"
    ));

    // already in Form: no step change to record
    flow.navigate("carol").await.unwrap();
    assert_eq!(flow.timeline().transitions().count(), 3);
}

#[tokio::test]
async fn test_navigate_while_pending_is_refused() {
    let h = Harness::new(
        SimulatedWallet::connected(account(), BASE_MAINNET),
        SimulatedSubmitter::gated(TxScript::Confirm),
    );
    let flow = h.renewal("alice").await;
    flow.submit(0).await.unwrap();

    assert!(matches!(
        flow.navigate("bob").await,
        Err(FlowError::InvalidTransition { ref trigger, .. }) if trigger == "navigate"
    ));
    assert_eq!(
        flow.snapshot().formatted_name.as_deref(),
        Some("alice.base.eth")
    );

    h.submitter.release();
    flow.settled().await;
    assert_eq!(flow.snapshot().step, RenewalStep::Success);
}

#[tokio::test]
async fn test_unmount_after_abandoned_settle_stops_watcher() {
    let h = Harness::new(
        SimulatedWallet::connected(account(), BASE_MAINNET),
        SimulatedSubmitter::gated(TxScript::Confirm),
    );
    let flow = h.renewal("alice").await;
    flow.submit(0).await.unwrap();

    let waited = tokio::time::timeout(Duration::from_millis(20), flow.settled()).await;
    assert!(waited.is_err());

    flow.unmount();
    drop(flow);
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    // the receipt watcher held the last clone of the flow's collaborators
    assert_eq!(Arc::strong_count(&h.submitter), 1);
}

#[tokio::test]
async fn test_registration_failure_returns_to_claim() {
    let h = Harness::new(
        SimulatedWallet::connected(account(), BASE_MAINNET),
        SimulatedSubmitter::new(TxScript::Revert),
    );
    let flow = RegistrationFlow::mount(h.config.clone(), h.caps())
        .await
        .unwrap();
    flow.select_name("newbie").await.unwrap();

    assert_eq!(flow.submit(0).await.unwrap(), SubmitOutcome::Submitted);
    flow.settled().await;

    let state = flow.snapshot();
    assert_eq!(state.step, RegistrationStep::Claim);
    assert_eq!(state.tx_status, TxStatus::Reverted);
    assert!(state.error.as_deref().is_some_and(|m| !m.is_empty()));
    assert_eq!(state.formatted_name.as_deref(), Some("newbie.base.eth"));

    let steps: Vec<_> = flow.timeline().transitions().map(|t| (t.from, t.to)).collect();
    assert_eq!(
        steps,
        vec![
            (RegistrationStep::Search, RegistrationStep::Claim),
            (RegistrationStep::Claim, RegistrationStep::Pending),
            (RegistrationStep::Pending, RegistrationStep::Claim),
        ]
    );

    h.submitter.set_script(TxScript::Confirm);
    assert_eq!(flow.submit(0).await.unwrap(), SubmitOutcome::Submitted);
    flow.settled().await;
    assert_eq!(flow.snapshot().step, RegistrationStep::Success);
}

#[tokio::test]
async fn test_registration_select_on_wrong_chain_requests_switch() {
    let h = Harness::new(
        SimulatedWallet::connected(account(), 1).with_response(SwitchResponse::Ignore),
        SimulatedSubmitter::default(),
    );
    let flow = RegistrationFlow::mount(h.config.clone(), h.caps())
        .await
        .unwrap();
    flow.settled().await;
    assert!(h.wallet.switch_requests().is_empty());

    flow.select_name("newbie").await.unwrap();
    flow.settled().await;
    assert_eq!(h.wallet.switch_requests(), vec![BASE_MAINNET]);
    assert_eq!(flow.snapshot().step, RegistrationStep::Claim);
    assert!(!flow.can_submit());

    h.wallet.set_chain(BASE_MAINNET);
    assert_eq!(flow.sync_chain().await, GuardDecision::Matched);
    assert_eq!(flow.submit(0).await.unwrap(), SubmitOutcome::Submitted);
    flow.settled().await;

    // wallet drifts away on the success screen, then the user starts over
    h.wallet.set_chain(1);
    assert_eq!(
        flow.sync_chain().await,
        GuardDecision::Switch(BASE_MAINNET)
    );
    flow.settled().await;
    flow.restart().await.unwrap();

    flow.select_name("newbie").await.unwrap();
    flow.settled().await;
    assert_eq!(
        h.wallet.switch_requests(),
        vec![BASE_MAINNET, BASE_MAINNET, BASE_MAINNET]
    );
}
