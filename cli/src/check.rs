//! Config validation

use anyhow::{Context, Result};
use basenames::FlowConfig;
use std::path::Path;

/// Load and validate a config, then print what it resolves to.
pub fn run_check_command(path: &Path) -> Result<()> {
    println!("Checking flow config at: {}", path.display());

    let config = FlowConfig::load(path)
        .with_context(|| format!("config {} is not usable", path.display()))?;

    println!(
        "  renewals: {}, registrations: {}",
        enabled(config.renewals_enabled),
        enabled(config.registrations_enabled)
    );
    println!(
        "  duration: default {} year(s), max {}",
        config.default_years, config.max_years
    );
    println!("  networks:");
    for network in &config.networks {
        let marker = if network.suffix.trim_start_matches('.') == config.default_suffix {
            "*"
        } else {
            " "
        };
        let registrar = network
            .registrar_controller
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "none (submits will fail)".to_string());
        println!(
            "  {marker} {:<14} chain {:<7} .{:<14} registrar {}",
            network.name, network.chain_id, network.suffix, registrar
        );
    }

    println!();
    println!("Config OK");
    Ok(())
}

fn enabled(flag: bool) -> &'static str {
    if flag { "enabled" } else { "disabled" }
}
