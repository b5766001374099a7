// src/dispatch/target.rs

use std::fmt;

use crate::config::model::RawTarget;
use crate::types::{TargetName, Value};

/// A registered executable plus its fixed argument prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: TargetName,
    pub program: String,
    pub fixed_args: Vec<String>,
}

impl Target {
    pub fn new(name: impl Into<TargetName>, program: impl Into<String>, fixed_args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            fixed_args,
        }
    }

    pub fn from_raw(name: TargetName, raw: &RawTarget) -> Self {
        match raw {
            RawTarget::Path(path) => Self::new(name, path.clone(), Vec::new()),
            RawTarget::Full { path, args } => Self::new(
                name,
                path.clone(),
                args.iter()
                    .map(|a| Value::from(a.clone()).render())
                    .collect(),
            ),
        }
    }

    /// Build the concrete launch for this target: fixed prefix first, then
    /// the resolved event arguments.
    pub fn launch(&self, extra_args: &[String], depth: usize) -> Launch {
        let mut args = Vec::with_capacity(self.fixed_args.len() + extra_args.len());
        args.extend(self.fixed_args.iter().cloned());
        args.extend(extra_args.iter().cloned());

        Launch {
            target: self.name.clone(),
            program: self.program.clone(),
            args,
            depth,
        }
    }
}

/// A fully resolved process launch handed to the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    pub target: TargetName,
    pub program: String,
    /// Everything after the program: fixed prefix + resolved arguments.
    pub args: Vec<String>,
    /// Cascade depth of the dispatch that produced this launch. Lifecycle
    /// signals of this launch are dispatched at `depth + 1`.
    pub depth: usize,
}

impl fmt::Display for Launch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
