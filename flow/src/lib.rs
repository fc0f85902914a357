//! Basename Flow - Step State Layer
//!
//! This crate defines the **structural** aspects of a lifecycle flow:
//! - `Step`: the enum-based step graph (`RenewalStep`, `RegistrationStep`)
//! - `Trigger` / `StepTransition`: the transition table
//! - `ChainGuard`: when to ask the wallet to switch networks
//!
//! **IMPORTANT**: This layer is Pure Rust - no IO, no Async.

pub mod guard;
pub mod state;
pub mod transition;

pub use guard::{ChainGuard, GuardDecision};
pub use state::{RegistrationStep, RenewalStep, Step};
pub use transition::{InvalidTransition, StepTransition, Trigger};
