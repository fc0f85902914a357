//! Flow simulation against in-memory collaborators

use crate::Outcome;
use anyhow::{Context, Result};
use basenames::prelude::*;
use basenames::runtime::sim::{SimulatedSubmitter, SimulatedWallet, SwitchResponse, TxScript};
use std::path::PathBuf;
use std::sync::Arc;

const SIMULATED_ACCOUNT: &str = "0x000000000000000000000000000000000000b0b0";

pub struct SimulateArgs {
    pub name: String,
    pub config: Option<PathBuf>,
    pub wallet_chain: Option<u64>,
    pub outcome: Outcome,
    pub years: Option<u64>,
    pub decline_switch: bool,
    pub json: bool,
}

impl From<Outcome> for TxScript {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Confirm => TxScript::Confirm,
            Outcome::Revert => TxScript::Revert,
            Outcome::Reject => TxScript::Reject,
            Outcome::Network => TxScript::NetworkFailure,
        }
    }
}

pub async fn run_simulate_command(args: SimulateArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => FlowConfig::load(path)?,
        None => FlowConfig::default(),
    };
    let config = Arc::new(config);

    let target = TargetName::parse(&args.name, &config.networks())?;
    tracing::info!(name = %target, outcome = ?args.outcome, "simulating renewal");
    let account: Address = SIMULATED_ACCOUNT
        .parse()
        .map_err(anyhow::Error::msg)
        .context("simulated account")?;
    let response = if args.decline_switch {
        SwitchResponse::Decline
    } else {
        SwitchResponse::Accept
    };
    let wallet = Arc::new(
        SimulatedWallet::connected(
            account,
            args.wallet_chain.unwrap_or(target.required_chain_id()),
        )
        .with_response(response),
    );
    let submitter = Arc::new(SimulatedSubmitter::new(args.outcome.into()));
    let caps = Capabilities::new(wallet.clone(), submitter)
        .with_analytics(Arc::new(basenames::core::TracingAnalytics));

    let flow = RenewalFlow::mount(&args.name, config, caps).await?;
    print_state(&flow.snapshot(), args.json)?;
    flow.settled().await;
    flow.sync_chain().await;

    if let Some(years) = args.years {
        flow.set_years(years)?;
    }

    let outcome = flow.submit(0).await?;
    if args.json {
        println!("{}", serde_json::to_string(&outcome)?);
    } else {
        println!("submit: {outcome:?}");
    }
    flow.settled().await;
    print_state(&flow.snapshot(), args.json)?;

    if !wallet.switch_requests().is_empty() && !args.json {
        println!("switch requests: {:?}", wallet.switch_requests());
    }
    Ok(())
}

fn print_state(state: &FlowState<RenewalStep>, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(state)?);
        return Ok(());
    }
    println!(
        "[{}] {} ({} year(s)) tx={:?}{}",
        state.step,
        state.formatted_name.as_deref().unwrap_or("-"),
        state.years,
        state.tx_status,
        state
            .error
            .as_deref()
            .map(|e| format!(" error: {e}"))
            .unwrap_or_default()
    );
    Ok(())
}
