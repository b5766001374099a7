// src/config/graph.rs

//! Build the Target -> Event -> Signal object graph from a [`RawDocument`].
//!
//! Sections are resolved in dependency order: targets first, then events
//! (which reference targets by name), then signal bindings (which reference
//! events by name). References that cannot be resolved are dropped from the
//! graph and collected as [`UnresolvedReference`]s so callers can choose
//! between lenient and strict loading.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::model::{RawBinding, RawDocument};
use crate::dispatch::{ArgumentKind, ArgumentSpec, Condition, Event, SignalBinding, Target};
use crate::errors::{Result, SigdispatchError};
use crate::types::{EventName, LoadMode, SignalName, TargetName, Value};

/// A name used somewhere in the document that does not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReference {
    /// `Events.<event>.targets` lists a target that is not registered.
    UnknownTarget { event: EventName, target: TargetName },
    /// `Events.<event>` has no `targets` key and is not registered.
    EventWithoutTargets { event: EventName },
    /// `Signals.<signal>` binds an event that is not registered.
    UnknownEvent { signal: SignalName, event: EventName },
}

impl fmt::Display for UnresolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReference::UnknownTarget { event, target } => {
                write!(f, "event '{event}' references unknown target '{target}'")
            }
            UnresolvedReference::EventWithoutTargets { event } => {
                write!(f, "event '{event}' has no `targets` list")
            }
            UnresolvedReference::UnknownEvent { signal, event } => {
                write!(f, "signal '{signal}' binds unknown event '{event}'")
            }
        }
    }
}

/// The resolved, immutable object graph.
#[derive(Debug, Clone, Default)]
pub struct ConfigGraph {
    /// Registered targets in declaration order.
    targets: Vec<Arc<Target>>,
    target_index: HashMap<TargetName, usize>,
    events: BTreeMap<EventName, Arc<Event>>,
    signals: BTreeMap<SignalName, Vec<SignalBinding>>,
}

/// Result of building a graph: the graph with every resolvable piece, plus
/// whatever had to be dropped.
#[derive(Debug, Clone)]
pub struct GraphBuild {
    pub graph: ConfigGraph,
    pub unresolved: Vec<UnresolvedReference>,
}

impl GraphBuild {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Keep the partial graph; dropped references are logged.
    pub fn lenient(self) -> ConfigGraph {
        for reference in &self.unresolved {
            warn!(%reference, "dropping unresolved reference");
        }
        self.graph
    }

    /// Fail if anything had to be dropped.
    pub fn strict(self) -> Result<ConfigGraph> {
        if self.unresolved.is_empty() {
            Ok(self.graph)
        } else {
            Err(SigdispatchError::UnresolvedReferences(self.unresolved))
        }
    }

    pub fn into_graph(self, mode: LoadMode) -> Result<ConfigGraph> {
        match mode {
            LoadMode::Lenient => Ok(self.lenient()),
            LoadMode::Strict => self.strict(),
        }
    }
}

impl ConfigGraph {
    pub fn build(raw: &RawDocument) -> GraphBuild {
        let mut graph = ConfigGraph::default();
        let mut unresolved = Vec::new();

        for (name, raw_target) in &raw.register {
            let target = Target::from_raw(name.clone(), raw_target);
            debug!(target_name = %name, program = %target.program, "registered target");
            graph.target_index.insert(name.clone(), graph.targets.len());
            graph.targets.push(Arc::new(target));
        }

        for (name, raw_event) in &raw.events {
            let Some(target_names) = raw_event.targets.as_ref() else {
                unresolved.push(UnresolvedReference::EventWithoutTargets {
                    event: name.clone(),
                });
                continue;
            };

            let mut targets = Vec::with_capacity(target_names.len());
            for target_name in target_names {
                match graph.target(target_name) {
                    Some(target) => targets.push(Arc::clone(target)),
                    None => unresolved.push(UnresolvedReference::UnknownTarget {
                        event: name.clone(),
                        target: target_name.clone(),
                    }),
                }
            }

            let args: Vec<ArgumentSpec> = raw_event.args.iter().map(ArgumentSpec::from_raw).collect();
            for spec in &args {
                if let ArgumentKind::Unknown(kind) = &spec.kind {
                    debug!(event = %name, kind = %kind, "argument with unknown type contributes nothing");
                }
            }

            graph
                .events
                .insert(name.clone(), Arc::new(Event::new(name.clone(), targets, args)));
        }

        for (signal, raw_bindings) in &raw.signals {
            let mut bindings = Vec::with_capacity(raw_bindings.len());
            for raw_binding in raw_bindings {
                let event_name = raw_binding.event_name();
                let Some(event) = graph.events.get(event_name) else {
                    unresolved.push(UnresolvedReference::UnknownEvent {
                        signal: signal.clone(),
                        event: event_name.to_string(),
                    });
                    continue;
                };

                let binding = match raw_binding {
                    RawBinding::Event(_) => SignalBinding::unconditional(Arc::clone(event)),
                    RawBinding::Conditional { conditions, .. } => SignalBinding::with_conditions(
                        Arc::clone(event),
                        conditions
                            .iter()
                            .map(|(key, pattern)| {
                                (key.clone(), Condition::from(&Value::from(pattern.clone())))
                            })
                            .collect(),
                    ),
                };
                bindings.push(binding);
            }
            graph.signals.insert(signal.clone(), bindings);
        }

        GraphBuild { graph, unresolved }
    }

    pub fn targets(&self) -> impl Iterator<Item = &Arc<Target>> {
        self.targets.iter()
    }

    pub fn target(&self, name: &str) -> Option<&Arc<Target>> {
        self.target_index.get(name).map(|&idx| &self.targets[idx])
    }

    pub fn events(&self) -> impl Iterator<Item = &Arc<Event>> {
        self.events.values()
    }

    pub fn event(&self, name: &str) -> Option<&Arc<Event>> {
        self.events.get(name)
    }

    /// Bindings registered under `signal`, in declaration order.
    pub fn bindings(&self, signal: &str) -> &[SignalBinding] {
        self.signals.get(signal).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn signal_names(&self) -> impl Iterator<Item = &str> {
        self.signals.keys().map(String::as_str)
    }
}
