//! Basenames CLI - Command-line interface for the lifecycle flow
//!
//! # Commands
//! - `basenames check-config <path>` - Validate a flow config and print its networks
//! - `basenames simulate --name <name>` - Run a renewal against simulated collaborators

mod check;
mod simulate;

use anyhow::Result;
use basenames::observe::{LogFormat, init_tracing};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Basenames lifecycle CLI
#[derive(Parser)]
#[command(name = "basenames")]
#[command(author, version, about = "Command-line interface for the Basenames lifecycle flow")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a TOML flow config
    CheckConfig {
        /// Config file path
        path: PathBuf,
    },

    /// Run a renewal flow against a simulated wallet and submitter
    Simulate {
        /// Name to renew (bare label or formatted)
        #[arg(short, long)]
        name: String,

        /// Config file path (default: built-in Base networks)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Chain the simulated wallet starts on (default: the name's chain)
        #[arg(long)]
        wallet_chain: Option<u64>,

        /// What the simulated chain does with the transaction
        #[arg(long, value_enum, default_value_t = Outcome::Confirm)]
        outcome: Outcome,

        /// Renewal duration
        #[arg(long)]
        years: Option<u64>,

        /// Decline the network switch prompt
        #[arg(long)]
        decline_switch: bool,

        /// Print snapshots as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Outcome {
    Confirm,
    Revert,
    Reject,
    Network,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_tracing(format)?;

    match cli.command {
        Commands::CheckConfig { path } => check::run_check_command(&path),
        Commands::Simulate {
            name,
            config,
            wallet_chain,
            outcome,
            years,
            decline_switch,
            json,
        } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(simulate::run_simulate_command(simulate::SimulateArgs {
                name,
                config,
                wallet_chain,
                outcome,
                years,
                decline_switch,
                json,
            }))
        }
    }
}
