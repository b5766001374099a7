// src/exec/launcher.rs

//! Background loop that turns launch batches into running processes.

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::dispatch::Launch;
use crate::engine::RuntimeEvent;
use crate::exec::process::run_launch;

/// Launches scheduled together by one runtime command.
#[derive(Debug, Clone)]
pub struct LaunchBatch {
    pub launches: Vec<Launch>,
    /// Run one after another in a single worker instead of concurrently.
    pub sequential: bool,
}

/// Spawn the background launcher loop.
///
/// The returned `mpsc::Sender<LaunchBatch>` is what `RealLaunchBackend`
/// forwards to. Detached launches each get their own Tokio task, so the same
/// target may run several times at once; a sequential batch gets a single
/// task that awaits each process before starting the next.
pub fn spawn_launcher(runtime_tx: mpsc::Sender<RuntimeEvent>) -> mpsc::Sender<LaunchBatch> {
    let (tx, mut rx) = mpsc::channel::<LaunchBatch>(32);

    tokio::spawn(async move {
        info!("launcher loop started");

        while let Some(batch) = rx.recv().await {
            handle_batch(batch, &runtime_tx);
        }

        info!("launcher loop finished (channel closed)");
    });

    tx
}

fn handle_batch(batch: LaunchBatch, runtime_tx: &mpsc::Sender<RuntimeEvent>) {
    if batch.sequential {
        let rt_tx = runtime_tx.clone();
        tokio::spawn(async move {
            for launch in batch.launches {
                let name = launch.target.clone();
                let outcome = run_launch(launch, rt_tx.clone()).await;
                debug!(target_name = %name, ?outcome, "sequential launch finished");
            }
        });
        return;
    }

    for launch in batch.launches {
        let rt_tx = runtime_tx.clone();
        tokio::spawn(async move {
            let name = launch.target.clone();
            let outcome = run_launch(launch, rt_tx).await;
            debug!(target_name = %name, ?outcome, "launch worker finished");
        });
    }
}
