// src/dispatch/event.rs

use std::sync::Arc;

use crate::dispatch::argument::ArgumentSpec;
use crate::dispatch::target::{Launch, Target};
use crate::errors::DispatchError;
use crate::store::DataStore;
use crate::types::{EventName, Payload};

/// A named fan-out: every target receives the same resolved arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub name: EventName,
    pub targets: Vec<Arc<Target>>,
    pub args: Vec<ArgumentSpec>,
}

impl Event {
    pub fn new(name: impl Into<EventName>, targets: Vec<Arc<Target>>, args: Vec<ArgumentSpec>) -> Self {
        Self {
            name: name.into(),
            targets,
            args,
        }
    }

    /// Resolve every argument recipe once, in declared order.
    ///
    /// The first required argument that cannot be resolved aborts the whole
    /// event, so either all targets fire with the same vector or none do.
    pub fn resolve_arguments(
        &self,
        payload: &Payload,
        store: &DataStore,
    ) -> Result<Vec<String>, DispatchError> {
        let mut resolved = Vec::with_capacity(self.args.len());
        for spec in &self.args {
            if let Some(arg) = spec.resolve(&self.name, payload, store)? {
                resolved.push(arg);
            }
        }
        Ok(resolved)
    }

    /// Resolve arguments and build one launch per target.
    pub fn launches(
        &self,
        payload: &Payload,
        store: &DataStore,
        depth: usize,
    ) -> Result<Vec<Launch>, DispatchError> {
        let args = self.resolve_arguments(payload, store)?;
        Ok(self
            .targets
            .iter()
            .map(|target| target.launch(&args, depth))
            .collect())
    }

    pub fn target_names(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().map(|t| t.name.as_str())
    }
}
