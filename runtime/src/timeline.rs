use basename_core::ChainId;
use basename_flow::{Step, StepTransition};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A discrete event in a flow's history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TimelineEvent<S> {
    Step {
        transition: StepTransition<S>,
        timestamp: DateTime<Utc>,
    },
    SwitchRequested {
        chain_id: ChainId,
        timestamp: DateTime<Utc>,
    },
}

/// Ordered record of one flow instance.
#[derive(Debug, Clone, Serialize)]
pub struct Timeline<S> {
    events: Vec<TimelineEvent<S>>,
}

impl<S> Default for Timeline<S> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<S: Step> Timeline<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_step(&mut self, transition: StepTransition<S>) {
        self.events.push(TimelineEvent::Step {
            transition,
            timestamp: Utc::now(),
        });
    }

    pub fn record_switch(&mut self, chain_id: ChainId) {
        self.events.push(TimelineEvent::SwitchRequested {
            chain_id,
            timestamp: Utc::now(),
        });
    }

    pub fn events(&self) -> &[TimelineEvent<S>] {
        &self.events
    }

    /// Step transitions only, oldest first.
    pub fn transitions(&self) -> impl Iterator<Item = &StepTransition<S>> {
        self.events.iter().filter_map(|e| match e {
            TimelineEvent::Step { transition, .. } => Some(transition),
            TimelineEvent::SwitchRequested { .. } => None,
        })
    }

    pub fn switch_requests(&self) -> impl Iterator<Item = ChainId> + '_ {
        self.events.iter().filter_map(|e| match e {
            TimelineEvent::SwitchRequested { chain_id, .. } => Some(*chain_id),
            TimelineEvent::Step { .. } => None,
        })
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
