// src/engine/report.rs

//! What a single dispatch decided.

use crate::dispatch::Launch;
use crate::errors::DispatchError;
use crate::types::{EventName, SignalName};

/// Outcome of evaluating one binding (or of refusing a whole signal).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchReport {
    /// Conditions passed and the event's targets were scheduled.
    Ran {
        signal: SignalName,
        event: EventName,
        launched: usize,
    },
    /// A payload value failed the binding's condition on `key`.
    Vetoed {
        signal: SignalName,
        event: EventName,
        key: String,
    },
    /// A required argument was missing; no target of the event fired.
    Aborted {
        signal: SignalName,
        event: EventName,
        error: DispatchError,
    },
    /// The signal was not dispatched at all because its cascade is too deep.
    CascadeLimited {
        signal: SignalName,
        error: DispatchError,
    },
}

/// Decision returned by the core after handling one signal: launches the
/// IO shell should perform, plus per-binding reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchStep {
    pub launches: Vec<Launch>,
    pub reports: Vec<DispatchReport>,
}

impl DispatchStep {
    pub fn is_empty(&self) -> bool {
        self.launches.is_empty() && self.reports.is_empty()
    }

    pub fn ran_events(&self) -> Vec<&str> {
        self.reports
            .iter()
            .filter_map(|r| match r {
                DispatchReport::Ran { event, .. } => Some(event.as_str()),
                _ => None,
            })
            .collect()
    }
}
