// src/lib.rs

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod store;
pub mod types;

use std::path::Path;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ConfigDocument, LoadedConfig, load_config};
use crate::dispatch::ArgumentKind;
use crate::engine::{Dispatcher, Runtime, RuntimeEvent, RuntimeHandle, RuntimeOptions};
use crate::exec::RealLaunchBackend;
use crate::types::LoadMode;

/// Load a configuration file into a dispatch core and its backing document.
///
/// Nothing is emitted yet: `init` fires when the core is driven by a
/// [`Runtime`] (or explicitly via [`Dispatcher::init`]).
pub fn init(path: impl AsRef<Path>, mode: LoadMode) -> errors::Result<(Dispatcher, ConfigDocument)> {
    Ok(load_config(path, mode)?.into_parts())
}

/// Start a runtime with the real process backend.
///
/// Must be called from within a Tokio runtime. The returned future drives
/// the engine (emitting `init` first); the handle feeds it.
pub fn start(
    dispatcher: Dispatcher,
    document: ConfigDocument,
    options: RuntimeOptions,
) -> (Runtime<RealLaunchBackend>, RuntimeHandle) {
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
    let executor = RealLaunchBackend::new(rt_tx.clone());
    let runtime = Runtime::new(dispatcher, document, rt_rx, executor, options);
    (runtime, RuntimeHandle::new(rt_tx))
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the dispatch core and runtime loop
/// - the process launcher
/// - signals and bulk launches requested on the command line
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let mode = if args.strict {
        LoadMode::Strict
    } else {
        LoadMode::Lenient
    };

    if args.dry_run {
        let loaded = load_config(&args.config, LoadMode::Lenient)?;
        print_dry_run(&loaded);
        if mode == LoadMode::Strict && !loaded.unresolved.is_empty() {
            return Err(errors::SigdispatchError::UnresolvedReferences(loaded.unresolved).into());
        }
        return Ok(());
    }

    let (dispatcher, document) = init(&args.config, mode)?;
    let options = RuntimeOptions {
        exit_when_idle: args.once,
    };
    let (runtime, handle) = start(dispatcher, document, options);

    // Ctrl-C -> graceful shutdown.
    {
        let handle = handle.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = handle.shutdown().await;
        });
    }

    // Queued now, dispatched right after `init`.
    if args.run_all {
        handle.run_all_targets(false).await?;
    }
    for spec in args.signals {
        info!(signal = %spec.name, "queueing signal from command line");
        handle.emit(spec.name, spec.payload).await?;
    }

    let dispatcher = runtime.run().await?;
    debug!(stored_values = dispatcher.store().len(), "dispatcher stopped");
    Ok(())
}

/// Simple dry-run output: targets, events, bindings and load diagnostics.
fn print_dry_run(loaded: &LoadedConfig) {
    let graph = &loaded.graph;

    println!("sigdispatch dry-run");
    println!("  config = {}", loaded.document.path().display());
    println!("  settings.max_cascade_depth = {}", loaded.settings.max_cascade_depth);
    println!("  settings.strict = {}", loaded.settings.strict);
    println!();

    println!("targets ({}):", graph.targets().count());
    for target in graph.targets() {
        println!("  - {}", target.name);
        println!("      path: {}", target.program);
        if !target.fixed_args.is_empty() {
            println!("      args: {:?}", target.fixed_args);
        }
    }
    println!();

    println!("events ({}):", graph.events().count());
    for event in graph.events() {
        println!("  - {}", event.name);
        println!("      targets: {:?}", event.target_names().collect::<Vec<_>>());
        for spec in &event.args {
            let relation = spec.relation.as_deref().unwrap_or("-");
            let optional = if spec.optional { " (optional)" } else { "" };
            match &spec.kind {
                ArgumentKind::Literal => println!(
                    "      arg: literal {}",
                    spec.value.as_ref().map(|v| v.render()).unwrap_or_default()
                ),
                ArgumentKind::Dynamic => println!("      arg: dynamic {relation}{optional}"),
                ArgumentKind::Environment => println!("      arg: environment {relation}{optional}"),
                ArgumentKind::Unknown(kind) => println!("      arg: ignored (type '{kind}')"),
            }
        }
    }
    println!();

    let signal_count = graph.signal_names().count();
    println!("signals ({signal_count}):");
    for signal in graph.signal_names() {
        println!("  - {signal}");
        for binding in graph.bindings(signal) {
            if binding.conditions.is_empty() {
                println!("      -> {}", binding.event.name);
            } else {
                println!("      -> {} when {:?}", binding.event.name, binding.conditions);
            }
        }
    }

    if !loaded.store.is_empty() {
        println!();
        println!("environment ({}):", loaded.store.len());
        for (key, value) in loaded.store.iter() {
            println!("  {key} = {value}");
        }
    }

    if !loaded.unresolved.is_empty() {
        println!();
        println!("unresolved references ({}):", loaded.unresolved.len());
        for reference in &loaded.unresolved {
            println!("  - {reference}");
        }
    }

    if !loaded.cascade_cycles.is_empty() {
        println!();
        println!("lifecycle cascade cycles ({}):", loaded.cascade_cycles.len());
        for cycle in &loaded.cascade_cycles {
            println!("  - {}", cycle.join(" -> "));
        }
    }

    debug!("dry-run complete (no execution)");
}
