// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running target processes, using
//! `tokio::process::Command`, and reporting their lifecycle back to the
//! runtime via `RuntimeEvent`s.
//!
//! - [`launcher`] owns the background loop that hands each launch its own
//!   Tokio task.
//! - [`process`] runs a single launch to completion.
//! - [`backend`] provides the `LaunchBackend` trait and the concrete
//!   `RealLaunchBackend` the runtime uses in production, which tests can
//!   replace with a fake implementation.

pub mod backend;
pub mod launcher;
pub mod process;

pub use backend::{LaunchBackend, RealLaunchBackend};
pub use launcher::{LaunchBatch, spawn_launcher};
pub use process::run_launch;
