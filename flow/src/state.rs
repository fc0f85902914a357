//! Step - The Typed Step Graph
//!
//! Each flow kind is an enum of the screens a user moves through. The enum
//! owns its transition table; the runtime only ever asks it where a trigger
//! leads.
//!
//! # Example
//! ```rust
//! use basename_flow::{RenewalStep, Step, Trigger};
//!
//! let step = RenewalStep::initial();
//! assert_eq!(step.next(Trigger::Submit), Some(RenewalStep::Pending));
//! assert_eq!(step.next(Trigger::Confirmed), None);
//! ```

use crate::transition::Trigger;
use basename_core::FlowKind;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A step enum that can drive a lifecycle flow.
pub trait Step:
    Copy + Eq + Hash + Debug + Display + Serialize + Send + Sync + 'static
{
    const KIND: FlowKind;

    fn initial() -> Self;

    /// Where `trigger` leads from `self`, or `None` if it is not allowed.
    fn next(self, trigger: Trigger) -> Option<Self>;

    /// The step in which the user edits and submits.
    fn is_editable(self) -> bool;

    fn is_pending(self) -> bool;

    /// Whether the chain guard should keep the wallet on the name's chain.
    fn guards_chain(self) -> bool;
}

/// Steps of a renewal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RenewalStep {
    Form,
    Pending,
    Success,
}

impl Step for RenewalStep {
    const KIND: FlowKind = FlowKind::Renewal;

    fn initial() -> Self {
        RenewalStep::Form
    }

    fn next(self, trigger: Trigger) -> Option<Self> {
        use RenewalStep::*;
        match (self, trigger) {
            (Form, Trigger::Submit) => Some(Pending),
            (Pending, Trigger::Confirmed) => Some(Success),
            (Pending, Trigger::Failed) => Some(Form),
            // "extend again"
            (Success, Trigger::Restart) => Some(Form),
            // another name opened from the success screen
            (Success, Trigger::Navigate) => Some(Form),
            _ => None,
        }
    }

    fn is_editable(self) -> bool {
        self == RenewalStep::Form
    }

    fn is_pending(self) -> bool {
        self == RenewalStep::Pending
    }

    fn guards_chain(self) -> bool {
        true
    }
}

impl Display for RenewalStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenewalStep::Form => f.write_str("form"),
            RenewalStep::Pending => f.write_str("pending"),
            RenewalStep::Success => f.write_str("success"),
        }
    }
}

/// Steps of a registration, from search to the new profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistrationStep {
    Search,
    Claim,
    Pending,
    Success,
    Profile,
}

impl Step for RegistrationStep {
    const KIND: FlowKind = FlowKind::Registration;

    fn initial() -> Self {
        RegistrationStep::Search
    }

    fn next(self, trigger: Trigger) -> Option<Self> {
        use RegistrationStep::*;
        match (self, trigger) {
            (Search, Trigger::SelectName) => Some(Claim),
            (Claim, Trigger::Submit) => Some(Pending),
            (Pending, Trigger::Confirmed) => Some(Success),
            (Pending, Trigger::Failed) => Some(Claim),
            (Success, Trigger::ViewProfile) => Some(Profile),
            // "register another"
            (Success, Trigger::Restart) => Some(Search),
            _ => None,
        }
    }

    fn is_editable(self) -> bool {
        self == RegistrationStep::Claim
    }

    fn is_pending(self) -> bool {
        self == RegistrationStep::Pending
    }

    fn guards_chain(self) -> bool {
        !matches!(self, RegistrationStep::Search | RegistrationStep::Profile)
    }
}

impl Display for RegistrationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationStep::Search => f.write_str("search"),
            RegistrationStep::Claim => f.write_str("claim"),
            RegistrationStep::Pending => f.write_str("pending"),
            RegistrationStep::Success => f.write_str("success"),
            RegistrationStep::Profile => f.write_str("profile"),
        }
    }
}
