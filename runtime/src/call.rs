//! Contract calls for register and renew.

use basename_core::transaction::SECONDS_PER_YEAR;
use basename_core::{Address, ContractCall, FlowError, FlowKind, Networks, TargetName};
use serde_json::json;

const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Builds the registrar call for `kind`.
///
/// Fails with [`FlowError::UnsupportedChain`] when the name's chain has no
/// registrar controller configured; a call is never built against a missing
/// address.
pub fn build_call(
    kind: FlowKind,
    networks: &Networks,
    target: &TargetName,
    owner: &Address,
    years: u64,
    value: u128,
) -> Result<ContractCall, FlowError> {
    let chain_id = target.required_chain_id();
    let network = networks
        .by_chain_id(chain_id)
        .ok_or(FlowError::UnsupportedChain(chain_id))?;
    let address = network
        .registrar_controller
        .clone()
        .ok_or(FlowError::UnsupportedChain(chain_id))?;
    let duration = years.saturating_mul(SECONDS_PER_YEAR);

    let (function, args) = match kind {
        FlowKind::Renewal => ("renew", vec![json!(target.label()), json!(duration)]),
        FlowKind::Registration => {
            let resolver = network
                .resolver
                .as_ref()
                .map(Address::as_str)
                .unwrap_or(ZERO_ADDRESS);
            (
                "register",
                vec![json!({
                    "name": target.label(),
                    "owner": owner.as_str(),
                    "duration": duration,
                    "resolver": resolver,
                    "data": [],
                    "reverseRecord": true,
                })],
            )
        }
    };

    Ok(ContractCall {
        chain_id,
        address,
        function: function.to_string(),
        args,
        value,
    })
}
