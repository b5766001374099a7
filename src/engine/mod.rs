// src/engine/mod.rs

//! Dispatch engine for sigdispatch.
//!
//! This module ties together:
//! - the pure dispatch core ([`core`]): binding evaluation, argument
//!   resolution, store access, cascade limits
//! - the async runtime loop ([`runtime`]) that owns the core and serialises
//!   everything that touches it:
//!   - signals from external callers
//!   - lifecycle notifications from launch workers
//!   - store reads/writes, `update()` and `post()`
//!   - shutdown requests
//! - the cloneable [`RuntimeHandle`] external code talks to.

use tokio::sync::oneshot;

use crate::errors::Result;
use crate::types::{Payload, SignalName, TargetName, Value};

/// Names of the signals the engine emits on its own.
pub mod signals {
    /// Fired once after construction, with an empty payload.
    pub const INIT: &str = "init";
    /// Fired before a target's process is spawned; payload `{name}`.
    pub const TARGET_STARTED: &str = "target_started";
    /// Fired after a target's process exited (or failed to spawn); payload `{name}`.
    pub const TARGET_TERMINATED: &str = "target_terminated";
    /// Fired after `put_value`; payload `{value: key, to: new_value}`.
    pub const UPDATED_VALUE: &str = "updated_value";
    /// Fired on `get_value`; payload `{value: key}`.
    pub const RETRIEVED_VALUE: &str = "retrieved_value";
}

/// Outcome of a target process.
///
/// Only logged: `target_terminated` fires the same way for every outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetOutcome {
    Success,
    /// Non-zero exit, killed by a signal, or spawn failure (`-1`).
    Failed(i32),
}

/// Runtime options for the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// If true, exit the runtime once no launch is in flight and no event is
    /// pending (used for `--once`).
    pub exit_when_idle: bool,
}

/// Events flowing into the runtime from callers and launch workers.
#[derive(Debug)]
pub enum RuntimeEvent {
    /// Dispatch a signal. The reports of the dispatch are sent to `reply`
    /// when present.
    Signal {
        name: SignalName,
        payload: Payload,
        reply: Option<oneshot::Sender<Vec<DispatchReport>>>,
    },
    /// A launch worker is about to spawn the target's process.
    TargetStarted { target: TargetName, depth: usize },
    /// A target's process is gone.
    TargetTerminated {
        target: TargetName,
        outcome: TargetOutcome,
        depth: usize,
    },
    /// Store `value` under `key` (emits `updated_value`).
    PutValue {
        key: String,
        value: Value,
        reply: Option<oneshot::Sender<()>>,
    },
    /// Read `key` (emits `retrieved_value`).
    GetValue {
        key: String,
        reply: oneshot::Sender<Option<Value>>,
    },
    /// Reload store contents from the backing file.
    Update { reply: Option<oneshot::Sender<Result<()>>> },
    /// Write store contents to the backing file.
    Post { reply: Option<oneshot::Sender<Result<()>>> },
    /// Launch every registered target with its fixed prefix only.
    RunAllTargets { sequential: bool },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod handle;
pub mod report;
pub mod runtime;

pub use core::{DispatchOptions, Dispatcher};
pub use handle::RuntimeHandle;
pub use report::{DispatchReport, DispatchStep};
pub use runtime::Runtime;
