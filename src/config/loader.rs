// src/config/loader.rs

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::cascade::find_cycles;
use crate::config::document::ConfigDocument;
use crate::config::graph::{ConfigGraph, UnresolvedReference};
use crate::config::model::Settings;
use crate::engine::{DispatchOptions, Dispatcher};
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::store::DataStore;
use crate::types::{EventName, LoadMode};

/// Everything produced by loading a configuration file.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub document: ConfigDocument,
    pub graph: ConfigGraph,
    pub store: DataStore,
    pub settings: Settings,
    /// References dropped from the graph (always empty in strict mode).
    pub unresolved: Vec<UnresolvedReference>,
    /// Event groups that can relaunch each other via lifecycle signals.
    pub cascade_cycles: Vec<Vec<EventName>>,
}

impl LoadedConfig {
    /// Split into the dispatch core and the backing document.
    pub fn into_parts(self) -> (Dispatcher, ConfigDocument) {
        let options = DispatchOptions::from(&self.settings);
        (Dispatcher::new(self.graph, self.store, options), self.document)
    }
}

/// Load a configuration file from the real filesystem.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Parses TOML (a parse failure is fatal).
/// - Builds targets, then events, then signal bindings.
/// - Handles unknown references per `mode` (or `[Settings].strict`).
/// - Reports lifecycle cascade cycles.
pub fn load_config(path: impl AsRef<Path>, mode: LoadMode) -> Result<LoadedConfig> {
    load_config_with(Arc::new(RealFileSystem), path, mode)
}

pub fn load_config_with(
    fs: Arc<dyn FileSystem>,
    path: impl AsRef<Path>,
    mode: LoadMode,
) -> Result<LoadedConfig> {
    let document = ConfigDocument::load_with(fs, path)?;
    from_document(document, mode)
}

/// Build a [`LoadedConfig`] from an already-parsed document.
pub fn from_document(document: ConfigDocument, mode: LoadMode) -> Result<LoadedConfig> {
    let raw = document.raw()?;
    let settings = raw.settings.clone();
    let mode = if settings.strict { LoadMode::Strict } else { mode };

    let build = ConfigGraph::build(&raw);
    let unresolved = build.unresolved.clone();
    let graph = build.into_graph(mode)?;

    let store = document.environment()?;

    let cascade_cycles = find_cycles(&graph);
    for cycle in &cascade_cycles {
        warn!(
            events = ?cycle,
            limit = settings.max_cascade_depth,
            "events can relaunch each other through lifecycle signals; cascade will be capped"
        );
    }

    info!(
        path = %document.path().display(),
        targets = graph.targets().count(),
        events = graph.events().count(),
        signals = graph.signal_names().count(),
        stored_values = store.len(),
        "configuration loaded"
    );

    Ok(LoadedConfig {
        document,
        graph,
        store,
        settings,
        unresolved,
        cascade_cycles,
    })
}
