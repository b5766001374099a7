// src/engine/handle.rs

use tokio::sync::{mpsc, oneshot};

use crate::errors::{Result, SigdispatchError};
use crate::types::{Payload, Value};

use super::{DispatchReport, RuntimeEvent};

/// Cloneable entry point into a running [`Runtime`](super::Runtime).
///
/// Every call is queued behind earlier events and applied by the runtime
/// loop, so concurrent callers never race on the store.
#[derive(Debug, Clone)]
pub struct RuntimeHandle {
    tx: mpsc::Sender<RuntimeEvent>,
}

impl RuntimeHandle {
    pub fn new(tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self { tx }
    }

    /// Dispatch a signal and wait for the per-binding reports.
    pub async fn signal(
        &self,
        name: impl Into<String>,
        payload: Payload,
    ) -> Result<Vec<DispatchReport>> {
        let (reply, rx) = oneshot::channel();
        self.send(RuntimeEvent::Signal {
            name: name.into(),
            payload,
            reply: Some(reply),
        })
        .await?;
        rx.await.map_err(|_| SigdispatchError::RuntimeClosed)
    }

    /// Queue a signal without waiting for it to be dispatched.
    pub async fn emit(&self, name: impl Into<String>, payload: Payload) -> Result<()> {
        self.send(RuntimeEvent::Signal {
            name: name.into(),
            payload,
            reply: None,
        })
        .await
    }

    pub async fn put_value(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(RuntimeEvent::PutValue {
            key: key.into(),
            value: value.into(),
            reply: Some(reply),
        })
        .await?;
        rx.await.map_err(|_| SigdispatchError::RuntimeClosed)
    }

    pub async fn get_value(&self, key: impl Into<String>) -> Result<Option<Value>> {
        let (reply, rx) = oneshot::channel();
        self.send(RuntimeEvent::GetValue {
            key: key.into(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| SigdispatchError::RuntimeClosed)
    }

    /// Reload the store from the backing file, discarding unsaved changes.
    pub async fn update(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(RuntimeEvent::Update { reply: Some(reply) }).await?;
        rx.await.map_err(|_| SigdispatchError::RuntimeClosed)?
    }

    /// Write the store into the backing file.
    pub async fn post(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(RuntimeEvent::Post { reply: Some(reply) }).await?;
        rx.await.map_err(|_| SigdispatchError::RuntimeClosed)?
    }

    pub async fn run_all_targets(&self, sequential: bool) -> Result<()> {
        self.send(RuntimeEvent::RunAllTargets { sequential }).await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.send(RuntimeEvent::ShutdownRequested).await
    }

    async fn send(&self, event: RuntimeEvent) -> Result<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| SigdispatchError::RuntimeClosed)
    }
}
