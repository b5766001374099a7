// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::ConfigDocument;
use crate::dispatch::Launch;
use crate::errors::Result;
use crate::exec::LaunchBackend;

use super::core::Dispatcher;
use super::report::DispatchStep;
use super::{RuntimeEvent, RuntimeOptions, TargetOutcome};

/// Owns the [`Dispatcher`] and applies [`RuntimeEvent`]s to it one at a
/// time, delegating process execution to a [`LaunchBackend`].
///
/// Launch workers never touch the store or the graph: they only send
/// lifecycle events back into this loop, so every store mutation and every
/// dispatch happens on one task.
pub struct Runtime<E: LaunchBackend> {
    core: Dispatcher,
    document: ConfigDocument,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    executor: E,
    options: RuntimeOptions,
    /// Launches handed to the executor whose termination has not been seen.
    in_flight: usize,
}

impl<E: LaunchBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl<E: LaunchBackend> Runtime<E> {
    pub fn new(
        core: Dispatcher,
        document: ConfigDocument,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        executor: E,
        options: RuntimeOptions,
    ) -> Self {
        Self {
            core,
            document,
            event_rx,
            executor,
            options,
            in_flight: 0,
        }
    }

    /// Main event loop.
    ///
    /// - Emits `init` first.
    /// - Consumes `RuntimeEvent`s from `event_rx` in arrival order.
    /// - Hands resulting launches to the executor.
    /// - Returns the final dispatcher so callers can inspect the store.
    pub async fn run(mut self) -> Result<Dispatcher> {
        info!("sigdispatch runtime started");

        let step = self.core.init();
        self.apply(step).await?;

        loop {
            if self.is_idle() {
                info!("no launches in flight and no pending events; stopping runtime");
                break;
            }

            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            if !self.handle(event).await? {
                info!("shutdown requested; stopping runtime");
                break;
            }
        }

        info!(in_flight = self.in_flight, "runtime exiting");
        Ok(self.core)
    }

    fn is_idle(&self) -> bool {
        self.options.exit_when_idle && self.in_flight == 0 && self.event_rx.is_empty()
    }

    /// Apply one event; returns whether the loop should keep running.
    async fn handle(&mut self, event: RuntimeEvent) -> Result<bool> {
        match event {
            RuntimeEvent::Signal {
                name,
                payload,
                reply,
            } => {
                let step = self.core.signal(&name, &payload);
                let reports = step.reports.clone();
                self.apply(step).await?;
                if let Some(reply) = reply {
                    let _ = reply.send(reports);
                }
            }
            RuntimeEvent::TargetStarted { target, depth } => {
                let step = self.core.target_started(&target, depth);
                self.apply(step).await?;
            }
            RuntimeEvent::TargetTerminated {
                target,
                outcome,
                depth,
            } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                match outcome {
                    TargetOutcome::Success => debug!(target_name = %target, "target terminated"),
                    TargetOutcome::Failed(code) => {
                        warn!(target_name = %target, exit_code = code, "target terminated unsuccessfully")
                    }
                }
                let step = self.core.target_terminated(&target, depth);
                self.apply(step).await?;
            }
            RuntimeEvent::PutValue { key, value, reply } => {
                let step = self.core.put_value(key, value);
                self.apply(step).await?;
                if let Some(reply) = reply {
                    let _ = reply.send(());
                }
            }
            RuntimeEvent::GetValue { key, reply } => {
                let (value, step) = self.core.get_value(&key);
                self.apply(step).await?;
                let _ = reply.send(value);
            }
            RuntimeEvent::Update { reply } => {
                let result = self.update();
                if let Err(ref e) = result {
                    error!(error = %e, "failed to reload store from backing file");
                }
                if let Some(reply) = reply {
                    let _ = reply.send(result);
                }
            }
            RuntimeEvent::Post { reply } => {
                let result = self.post();
                if let Err(ref e) = result {
                    error!(error = %e, "failed to write store to backing file");
                }
                if let Some(reply) = reply {
                    let _ = reply.send(result);
                }
            }
            RuntimeEvent::RunAllTargets { sequential } => {
                let launches = self.core.run_all_targets();
                info!(count = launches.len(), sequential, "launching all targets");
                self.launch(launches, sequential).await?;
            }
            RuntimeEvent::ShutdownRequested => return Ok(false),
        }
        Ok(true)
    }

    /// Reload the backing document and replace the store contents. The
    /// object graph is left as loaded at startup; on error neither the
    /// document nor the store changes.
    fn update(&mut self) -> Result<()> {
        let store = self.document.reload()?;
        info!(values = store.len(), "store reloaded");
        self.core.replace_store(store);
        Ok(())
    }

    fn post(&mut self) -> Result<()> {
        self.document.set_environment(self.core.store());
        self.document.save()
    }

    async fn apply(&mut self, step: DispatchStep) -> Result<()> {
        self.launch(step.launches, false).await
    }

    async fn launch(&mut self, launches: Vec<Launch>, sequential: bool) -> Result<()> {
        if launches.is_empty() {
            return Ok(());
        }

        let names: Vec<_> = launches.iter().map(|l| l.target.as_str()).collect();
        debug!(?names, sequential, "scheduling launches");

        self.in_flight += launches.len();
        if sequential {
            self.executor.launch_sequence(launches).await
        } else {
            self.executor.launch(launches).await
        }
    }
}
