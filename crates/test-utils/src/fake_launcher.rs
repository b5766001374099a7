use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use sigdispatch::dispatch::Launch;
use sigdispatch::engine::{RuntimeEvent, TargetOutcome};
use sigdispatch::exec::LaunchBackend;
use sigdispatch::errors::Result;

/// A fake launch backend that:
/// - records every launch it was handed, in order
/// - reports `TargetStarted` then `TargetTerminated(Success)` for each one.
///
/// Reports are sent from a spawned task: the runtime is busy awaiting
/// `launch()` and cannot drain its own channel until that returns.
pub struct FakeLauncher {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    launched: Arc<Mutex<Vec<Launch>>>,
}

impl FakeLauncher {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, launched: Arc<Mutex<Vec<Launch>>>) -> Self {
        Self { runtime_tx, launched }
    }

    fn run(&mut self, launches: Vec<Launch>) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        self.launched.lock().unwrap().extend(launches.iter().cloned());

        let tx = self.runtime_tx.clone();
        tokio::spawn(async move {
            for launch in launches {
                let started = RuntimeEvent::TargetStarted {
                    target: launch.target.clone(),
                    depth: launch.depth,
                };
                let terminated = RuntimeEvent::TargetTerminated {
                    target: launch.target,
                    outcome: TargetOutcome::Success,
                    depth: launch.depth,
                };
                // The runtime may already be gone at shutdown.
                if tx.send(started).await.is_err() || tx.send(terminated).await.is_err() {
                    break;
                }
            }
        });

        Box::pin(async { Ok(()) })
    }
}

impl LaunchBackend for FakeLauncher {
    fn launch(&mut self, launches: Vec<Launch>) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        self.run(launches)
    }

    fn launch_sequence(
        &mut self,
        launches: Vec<Launch>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        self.run(launches)
    }
}

/// Names of the recorded launches, in order.
pub fn launched_names(launched: &Arc<Mutex<Vec<Launch>>>) -> Vec<String> {
    launched
        .lock()
        .unwrap()
        .iter()
        .map(|l| l.target.clone())
        .collect()
}
