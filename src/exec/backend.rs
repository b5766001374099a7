// src/exec/backend.rs

//! Pluggable launch backend abstraction.
//!
//! The runtime talks to a `LaunchBackend` instead of a raw mpsc sender.
//! This makes it easy to swap in a fake launcher in tests while keeping the
//! production implementation in [`launcher`](super::launcher).
//!
//! - `RealLaunchBackend` is the default implementation. It wraps the
//!   `spawn_launcher` loop and just forwards launch batches over an mpsc
//!   channel.
//! - Tests can provide their own `LaunchBackend` that, for example, records
//!   which launches were requested and directly emits lifecycle events.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;

use crate::dispatch::Launch;
use crate::engine::RuntimeEvent;
use crate::errors::{Error, Result};

use super::launcher::{LaunchBatch, spawn_launcher};

/// Trait abstracting how launches are executed.
///
/// Both methods return once the launches are scheduled; process completion
/// is reported asynchronously through `TargetStarted` / `TargetTerminated`
/// runtime events.
pub trait LaunchBackend: Send {
    /// Run every launch independently and concurrently.
    fn launch(
        &mut self,
        launches: Vec<Launch>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Run the launches one after another, each waiting for the previous
    /// process to exit.
    fn launch_sequence(
        &mut self,
        launches: Vec<Launch>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Real launch backend used in production.
pub struct RealLaunchBackend {
    tx: mpsc::Sender<LaunchBatch>,
}

impl RealLaunchBackend {
    /// Create a new real backend, wiring it to the given runtime event
    /// sender.
    ///
    /// This spawns the background launcher loop immediately, so it must be
    /// called from within a Tokio runtime.
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        let tx = spawn_launcher(runtime_tx);
        Self { tx }
    }

    fn forward(
        &mut self,
        batch: LaunchBatch,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        // Clone the sender so the future doesn't borrow `self` across `await`.
        let tx = self.tx.clone();

        Box::pin(async move {
            tx.send(batch).await.map_err(Error::from)?;
            Ok(())
        })
    }
}

impl LaunchBackend for RealLaunchBackend {
    fn launch(
        &mut self,
        launches: Vec<Launch>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        self.forward(LaunchBatch {
            launches,
            sequential: false,
        })
    }

    fn launch_sequence(
        &mut self,
        launches: Vec<Launch>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        self.forward(LaunchBatch {
            launches,
            sequential: true,
        })
    }
}
