// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::config::graph::UnresolvedReference;

#[derive(Error, Debug)]
pub enum SigdispatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML document error: {0}")]
    TomlEditError(#[from] toml_edit::TomlError),

    #[error("Unresolved references in configuration: {}", join_references(.0))]
    UnresolvedReferences(Vec<UnresolvedReference>),

    #[error("Runtime is no longer accepting events")]
    RuntimeClosed,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Where an argument's value is looked up at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentSource {
    /// The payload of the signal being dispatched.
    Payload,
    /// The data store (`Environment`).
    Store,
}

impl std::fmt::Display for ArgumentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgumentSource::Payload => f.write_str("signal payload"),
            ArgumentSource::Store => f.write_str("data store"),
        }
    }
}

/// Non-fatal failure of a single dispatch.
///
/// These never stop the engine; they end up in a [`DispatchReport`] and in
/// the logs.
///
/// [`DispatchReport`]: crate::engine::DispatchReport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("event '{event}' requires '{relation}' from the {origin} but it is missing")]
    MissingArgument {
        event: String,
        relation: String,
        origin: ArgumentSource,
    },

    #[error("signal '{signal}' at cascade depth {depth} exceeds the limit of {limit}")]
    CascadeLimit {
        signal: String,
        depth: usize,
        limit: usize,
    },
}

fn join_references(refs: &[UnresolvedReference]) -> String {
    refs.iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SigdispatchError>;
