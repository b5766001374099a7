// src/dispatch/mod.rs

//! The immutable object graph a signal is dispatched through.
//!
//! - [`target`]: launchable executables and the concrete [`Launch`]es built
//!   from them.
//! - [`argument`]: per-argument recipes resolved at dispatch time.
//! - [`event`]: named fan-outs of targets sharing one argument recipe.
//! - [`binding`]: signal-to-event bindings and their payload conditions.

pub mod argument;
pub mod binding;
pub mod event;
pub mod target;

pub use argument::{ArgumentKind, ArgumentSpec};
pub use binding::{Condition, SignalBinding};
pub use event::Event;
pub use target::{Launch, Target};
