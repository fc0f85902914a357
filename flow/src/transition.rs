//! Transition - Step Transition Records
//!
//! A trigger is something the user or the chain did. Applying it to a step
//! either yields a `StepTransition` or an `InvalidTransition`; the step is
//! never changed implicitly.

use crate::state::Step;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What caused a step change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// A name was picked in search.
    SelectName,
    /// The register/renew button.
    Submit,
    /// The receipt came back successful.
    Confirmed,
    /// Rejected, reverted or failed to send.
    Failed,
    /// "Do it again" from success.
    Restart,
    ViewProfile,
    /// A renewal was pointed at another name.
    Navigate,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Trigger::SelectName => "select a name",
            Trigger::Submit => "submit",
            Trigger::Confirmed => "confirm",
            Trigger::Failed => "fail",
            Trigger::Restart => "restart",
            Trigger::ViewProfile => "view profile",
            Trigger::Navigate => "navigate",
        };
        f.write_str(s)
    }
}

/// A step change that is allowed by the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepTransition<S> {
    pub from: S,
    pub to: S,
    pub trigger: Trigger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition<S> {
    pub from: S,
    pub trigger: Trigger,
}

impl<S: Step> fmt::Display for InvalidTransition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot {} while in step {}", self.trigger, self.from)
    }
}

impl<S: Step> std::error::Error for InvalidTransition<S> {}

impl<S: Step> StepTransition<S> {
    /// Looks `trigger` up in the table for `from`.
    pub fn apply(from: S, trigger: Trigger) -> Result<Self, InvalidTransition<S>> {
        from.next(trigger)
            .map(|to| StepTransition { from, to, trigger })
            .ok_or(InvalidTransition { from, trigger })
    }
}

impl<S: Step> From<InvalidTransition<S>> for basename_core::FlowError {
    fn from(err: InvalidTransition<S>) -> Self {
        basename_core::FlowError::InvalidTransition {
            step: err.from.to_string(),
            trigger: err.trigger.to_string(),
        }
    }
}
