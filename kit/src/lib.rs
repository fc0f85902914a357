//! Basenames facade crate.
//!
//! This crate re-exports core, flow, runtime and observe crates with a single entry point.

pub use basename_core as core;
pub use basename_flow as flow;
#[cfg(feature = "observe")]
pub use basename_observe as observe;
pub use basename_runtime as runtime;

pub use basename_core::{Capabilities, FlowConfig, FlowError, TargetName};
pub use basename_flow::{RegistrationStep, RenewalStep, Step};
pub use basename_runtime::{RegistrationFlow, RenewalFlow, SubmitOutcome};

pub mod prelude {
    pub use basename_core::prelude::*;
    pub use basename_flow::{GuardDecision, RegistrationStep, RenewalStep, Step, Trigger};
    pub use basename_runtime::prelude::*;
}
