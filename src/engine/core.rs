// src/engine/core.rs

//! Pure dispatch core.
//!
//! [`Dispatcher`] is synchronous and deterministic: it consumes a signal
//! name plus payload and produces a [`DispatchStep`] describing which
//! launches to perform. It owns the object graph and the data store but has
//! no channels, no Tokio types, and performs no IO, so it can be tested
//! without spawning anything.

use tracing::{debug, info, trace, warn};

use crate::config::graph::ConfigGraph;
use crate::config::model::Settings;
use crate::dispatch::Launch;
use crate::engine::report::{DispatchReport, DispatchStep};
use crate::engine::signals::{
    INIT, RETRIEVED_VALUE, TARGET_STARTED, TARGET_TERMINATED, UPDATED_VALUE,
};
use crate::errors::DispatchError;
use crate::store::DataStore;
use crate::types::{Payload, Value, payload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Signals dispatched deeper than this are dropped.
    pub max_cascade_depth: usize,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for DispatchOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            max_cascade_depth: settings.max_cascade_depth,
        }
    }
}

/// Owns the graph and the store; single source of truth for dispatch
/// semantics.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    graph: ConfigGraph,
    store: DataStore,
    options: DispatchOptions,
}

impl Dispatcher {
    pub fn new(graph: ConfigGraph, store: DataStore, options: DispatchOptions) -> Self {
        Self {
            graph,
            store,
            options,
        }
    }

    pub fn graph(&self) -> &ConfigGraph {
        &self.graph
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    pub fn options(&self) -> DispatchOptions {
        self.options
    }

    /// Replace the store wholesale (used by `update()`).
    pub fn replace_store(&mut self, store: DataStore) {
        self.store = store;
    }

    /// Emit the `init` signal. Called once after construction.
    pub fn init(&self) -> DispatchStep {
        info!("emitting init signal");
        self.signal(INIT, &Payload::new())
    }

    /// Dispatch a signal raised from outside any cascade.
    pub fn signal(&self, name: &str, payload: &Payload) -> DispatchStep {
        self.dispatch(name, payload, 0)
    }

    /// Dispatch a signal at the given cascade depth.
    ///
    /// Every binding registered under `name` is evaluated independently:
    /// a veto or abort of one binding does not affect its siblings.
    pub fn dispatch(&self, name: &str, payload: &Payload, depth: usize) -> DispatchStep {
        let mut step = DispatchStep::default();

        let bindings = self.graph.bindings(name);
        if bindings.is_empty() {
            trace!(signal = %name, "no bindings for signal");
            return step;
        }

        if depth > self.options.max_cascade_depth {
            let error = DispatchError::CascadeLimit {
                signal: name.to_string(),
                depth,
                limit: self.options.max_cascade_depth,
            };
            warn!(signal = %name, depth, %error, "dropping signal");
            step.reports.push(DispatchReport::CascadeLimited {
                signal: name.to_string(),
                error,
            });
            return step;
        }

        for binding in bindings {
            let event = &binding.event;

            if let Some(key) = binding.failing_condition(payload) {
                debug!(signal = %name, event = %event.name, key = %key, "binding vetoed by condition");
                step.reports.push(DispatchReport::Vetoed {
                    signal: name.to_string(),
                    event: event.name.clone(),
                    key: key.to_string(),
                });
                continue;
            }

            match event.launches(payload, &self.store, depth) {
                Ok(launches) => {
                    debug!(
                        signal = %name,
                        event = %event.name,
                        depth,
                        launches = launches.len(),
                        "event dispatched"
                    );
                    step.reports.push(DispatchReport::Ran {
                        signal: name.to_string(),
                        event: event.name.clone(),
                        launched: launches.len(),
                    });
                    step.launches.extend(launches);
                }
                Err(error) => {
                    warn!(signal = %name, event = %event.name, %error, "event aborted");
                    step.reports.push(DispatchReport::Aborted {
                        signal: name.to_string(),
                        event: event.name.clone(),
                        error,
                    });
                }
            }
        }

        step
    }

    /// `target_started` for a launch that was produced at `launch_depth`.
    pub fn target_started(&self, target: &str, launch_depth: usize) -> DispatchStep {
        self.dispatch(TARGET_STARTED, &payload([("name", target)]), launch_depth + 1)
    }

    /// `target_terminated` for a launch that was produced at `launch_depth`.
    pub fn target_terminated(&self, target: &str, launch_depth: usize) -> DispatchStep {
        self.dispatch(TARGET_TERMINATED, &payload([("name", target)]), launch_depth + 1)
    }

    /// Store a value and emit `updated_value`.
    pub fn put_value(&mut self, key: impl Into<String>, value: Value) -> DispatchStep {
        let key = key.into();
        debug!(key = %key, value = %value, "storing value");
        self.store.insert(key.clone(), value.clone());

        let payload: Payload = [
            ("value".to_string(), Value::String(key)),
            ("to".to_string(), value),
        ]
        .into_iter()
        .collect();
        self.signal(UPDATED_VALUE, &payload)
    }

    /// Emit `retrieved_value` and return the stored value, if any.
    pub fn get_value(&self, key: &str) -> (Option<Value>, DispatchStep) {
        let step = self.signal(RETRIEVED_VALUE, &payload([("value", key)]));
        (self.store.get(key).cloned(), step)
    }

    /// One fixed-prefix-only launch per registered target, in declaration
    /// order.
    pub fn run_all_targets(&self) -> Vec<Launch> {
        self.graph
            .targets()
            .map(|target| target.launch(&[], 0))
            .collect()
    }
}
