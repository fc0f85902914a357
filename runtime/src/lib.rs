//! Basename Runtime - async lifecycle driver
//!
//! Runs the step graph from `basename-flow` against real (or simulated)
//! collaborators on tokio.

pub mod call;
pub mod lifecycle;
#[cfg(feature = "sim")]
pub mod sim;
pub mod state;
pub mod timeline;

pub mod prelude {
    pub use crate::lifecycle::{
        NameLifecycleFlow, RegistrationFlow, RenewalFlow, SubmitOutcome,
    };
    pub use crate::state::FlowState;
    pub use crate::timeline::{Timeline, TimelineEvent};
}

pub use lifecycle::{NameLifecycleFlow, RegistrationFlow, RenewalFlow, SubmitOutcome};
pub use state::FlowState;
pub use timeline::{Timeline, TimelineEvent};
