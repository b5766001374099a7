// src/dispatch/binding.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::dispatch::event::Event;
use crate::types::{Payload, Value};

/// Leading marker that turns a condition pattern into "must not equal".
pub const NEGATION_MARKER: char = '!';

/// Expected value for one payload key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Equals(String),
    NotEquals(String),
}

impl Condition {
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_prefix(NEGATION_MARKER) {
            Some(rest) => Condition::NotEquals(rest.to_string()),
            None => Condition::Equals(pattern.to_string()),
        }
    }

    pub fn admits(&self, actual: &str) -> bool {
        match self {
            Condition::Equals(expected) => actual == expected,
            Condition::NotEquals(rejected) => actual != rejected,
        }
    }
}

impl From<&Value> for Condition {
    fn from(pattern: &Value) -> Self {
        Condition::parse(&pattern.render())
    }
}

/// Binds one event to a signal name, optionally guarded by conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalBinding {
    pub event: Arc<Event>,
    pub conditions: BTreeMap<String, Condition>,
}

impl SignalBinding {
    pub fn unconditional(event: Arc<Event>) -> Self {
        Self {
            event,
            conditions: BTreeMap::new(),
        }
    }

    pub fn with_conditions(event: Arc<Event>, conditions: BTreeMap<String, Condition>) -> Self {
        Self { event, conditions }
    }

    /// First payload key whose condition fails, in payload key order.
    ///
    /// Keys without a condition never veto, and conditions on keys that are
    /// absent from the payload are not evaluated.
    pub fn failing_condition<'p>(&self, payload: &'p Payload) -> Option<&'p str> {
        payload
            .iter()
            .find(|(key, value)| {
                self.conditions
                    .get(key.as_str())
                    .is_some_and(|cond| !cond.admits(&value.render()))
            })
            .map(|(key, _)| key.as_str())
    }

    /// Whether a payload carrying only `key = value` would pass.
    pub fn admits_single(&self, key: &str, value: &str) -> bool {
        self.conditions
            .get(key)
            .is_none_or(|cond| cond.admits(value))
    }
}
