// src/exec/process.rs

//! Single target process runner.

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::dispatch::Launch;
use crate::engine::{RuntimeEvent, TargetOutcome};

/// Run one launch to completion.
///
/// Sends `TargetStarted` before spawning and `TargetTerminated` after the
/// process is gone. Spawn and wait failures are logged and reported as
/// `Failed(-1)`; `TargetTerminated` is sent either way.
pub async fn run_launch(launch: Launch, runtime_tx: mpsc::Sender<RuntimeEvent>) -> TargetOutcome {
    if runtime_tx
        .send(RuntimeEvent::TargetStarted {
            target: launch.target.clone(),
            depth: launch.depth,
        })
        .await
        .is_err()
    {
        warn!(target_name = %launch.target, "runtime gone before launch; not starting process");
        return TargetOutcome::Failed(-1);
    }

    let outcome = match run_process(&launch).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(target_name = %launch.target, error = %err, "target execution error");
            TargetOutcome::Failed(-1)
        }
    };

    if runtime_tx
        .send(RuntimeEvent::TargetTerminated {
            target: launch.target.clone(),
            outcome,
            depth: launch.depth,
        })
        .await
        .is_err()
    {
        debug!(target_name = %launch.target, "runtime gone; dropping termination notice");
    }

    outcome
}

async fn run_process(launch: &Launch) -> Result<TargetOutcome> {
    info!(
        target_name = %launch.target,
        depth = launch.depth,
        command = %launch,
        "starting target process"
    );

    let mut child = Command::new(&launch.program)
        .args(&launch.args)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("spawning process for target '{}'", launch.target))?;

    // Always consume stderr so buffers don't fill; log at debug.
    if let Some(stderr) = child.stderr.take() {
        let target = launch.target.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(target_name = %target, "stderr: {}", line);
            }
        });
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of target '{}'", launch.target))?;

    let code = status.code().unwrap_or(-1);
    info!(
        target_name = %launch.target,
        exit_code = code,
        success = status.success(),
        "target process exited"
    );

    Ok(if status.success() {
        TargetOutcome::Success
    } else {
        TargetOutcome::Failed(code)
    })
}
