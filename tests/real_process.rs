// tests/real_process.rs
#![cfg(unix)]

use std::error::Error;
use std::path::Path;

use sigdispatch::dispatch::Target;
use sigdispatch::engine::{RuntimeEvent, RuntimeOptions, TargetOutcome};
use sigdispatch::exec::run_launch;
use sigdispatch::types::LoadMode;
use sigdispatch_test_utils::builders::{DocumentBuilder, EventBuilder};
use sigdispatch_test_utils::{init_tracing, with_timeout};
use tokio::sync::mpsc;

type TestResult = Result<(), Box<dyn Error>>;

/// `/bin/sh -c '<append $1 to $0>' <log>`: the first resolved argument is
/// the line written.
fn appender(builder: DocumentBuilder, name: &str, log: &Path) -> DocumentBuilder {
    let log = log.to_string_lossy();
    builder.target_with_args(
        name,
        "/bin/sh",
        &["-c", "printf '%s\\n' \"$1\" >> \"$0\"", &*log],
    )
}

fn lines(log: &Path) -> Vec<String> {
    std::fs::read_to_string(log)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

async fn run_once(builder: DocumentBuilder, dir: &Path, run_all: bool) -> TestResult {
    let config = dir.join("sigdispatch.toml");
    std::fs::write(&config, builder.to_toml_string())?;

    let (dispatcher, document) = sigdispatch::init(&config, LoadMode::Strict)?;
    let (runtime, handle) = sigdispatch::start(
        dispatcher,
        document,
        RuntimeOptions {
            exit_when_idle: true,
        },
    );
    if run_all {
        handle.run_all_targets(true).await?;
    }
    with_timeout(runtime.run()).await?;
    Ok(())
}

#[tokio::test]
async fn terminated_signal_follows_process_exit() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let log = dir.path().join("log.txt");

    let mut builder = DocumentBuilder::new();
    builder = appender(builder, "writer", &log);
    builder = appender(builder, "marker", &log);
    let builder = builder
        .event("write", EventBuilder::new().target("writer").literal("first"))
        .event("mark", EventBuilder::new().target("marker").dynamic("name"))
        .bind("init", "write")
        .bind_when("target_terminated", "mark", &[("name", "writer")]);

    run_once(builder, dir.path(), false).await?;

    assert_eq!(lines(&log), vec!["first", "writer"]);
    Ok(())
}

#[tokio::test]
async fn spawn_failure_still_reports_termination() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let log = dir.path().join("log.txt");

    let builder = appender(DocumentBuilder::new(), "marker", &log)
        .target("ghost", "/definitely/not/a/real/binary")
        .event("haunt", EventBuilder::new().target("ghost"))
        .event("mark", EventBuilder::new().target("marker").dynamic("name"))
        .bind("init", "haunt")
        .bind_when("target_started", "mark", &[("name", "ghost")])
        .bind_when("target_terminated", "mark", &[("name", "ghost")]);

    run_once(builder, dir.path(), false).await?;

    assert_eq!(lines(&log), vec!["ghost", "ghost"]);
    Ok(())
}

#[tokio::test]
async fn sequential_run_all_waits_for_each_target() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let log = dir.path().join("log.txt");
    let log_str = log.to_string_lossy().to_string();

    let script = "sleep \"$1\"; printf '%s\\n' \"$2\" >> \"$0\"";
    let builder = DocumentBuilder::new()
        .target_with_args("slow", "/bin/sh", &["-c", script, log_str.as_str(), "0.4", "slow"])
        .target_with_args("medium", "/bin/sh", &["-c", script, log_str.as_str(), "0.2", "medium"])
        .target_with_args("fast", "/bin/sh", &["-c", script, log_str.as_str(), "0", "fast"]);

    run_once(builder, dir.path(), true).await?;

    assert_eq!(lines(&log), vec!["slow", "medium", "fast"]);
    Ok(())
}

#[tokio::test]
async fn run_launch_reports_start_then_exit() -> TestResult {
    init_tracing();

    let (tx, mut rx) = mpsc::channel(8);
    let launch = Target::new("echoer", "/bin/echo", vec![]).launch(&["hi".to_string()], 2);

    let outcome = with_timeout(run_launch(launch, tx)).await;
    assert_eq!(outcome, TargetOutcome::Success);

    assert!(matches!(
        rx.recv().await,
        Some(RuntimeEvent::TargetStarted { ref target, depth: 2 }) if target == "echoer"
    ));
    assert!(matches!(
        rx.recv().await,
        Some(RuntimeEvent::TargetTerminated { ref target, outcome: TargetOutcome::Success, depth: 2 })
            if target == "echoer"
    ));
    assert!(rx.recv().await.is_none());
    Ok(())
}
