// src/config/mod.rs

//! Configuration loading for sigdispatch.
//!
//! Responsibilities:
//! - Define the TOML-backed section model (`model.rs`).
//! - Keep the full document and its backing file (`document.rs`).
//! - Resolve sections into the object graph (`graph.rs`).
//! - Spot lifecycle cascade cycles (`cascade.rs`).
//! - Tie it together (`loader.rs`).

pub mod cascade;
pub mod document;
pub mod graph;
pub mod loader;
pub mod model;

pub use document::ConfigDocument;
pub use graph::{ConfigGraph, GraphBuild, UnresolvedReference};
pub use loader::{LoadedConfig, load_config, load_config_with};
pub use model::{RawArgument, RawBinding, RawDocument, RawEvent, RawTarget, Settings};
