// src/config/model.rs

use serde::Deserialize;

use crate::errors::{Result, SigdispatchError};
use crate::types::{EventName, SignalName, TargetName};

pub const REGISTER_SECTION: &str = "Register";
pub const EVENTS_SECTION: &str = "Events";
pub const SIGNALS_SECTION: &str = "Signals";
pub const ENVIRONMENT_SECTION: &str = "Environment";
pub const SETTINGS_SECTION: &str = "Settings";

/// Top-level document sections, in declaration order.
///
/// This is a direct mapping of documents like:
///
/// ```toml
/// [Register]
/// echoer = "/bin/echo"
/// greeter = { path = "/usr/bin/greet", args = ["--loud"] }
///
/// [Events.say]
/// targets = ["echoer"]
/// args = [{ type = "literal", value = "hi" }, { type = "dynamic", relation = "who" }]
///
/// [Signals]
/// go = ["say", { event = "say", conditions = { mode = "!debug" } }]
///
/// [Environment]
/// counter = 3
/// ```
///
/// Every section is optional. Unknown sections are ignored here but kept in
/// the backing [`ConfigDocument`](crate::config::ConfigDocument).
#[derive(Debug, Clone, Default)]
pub struct RawDocument {
    /// `[Register]`: target name -> executable.
    pub register: Vec<(TargetName, RawTarget)>,

    /// `[Events.<name>]`.
    pub events: Vec<(EventName, RawEvent)>,

    /// `[Signals]`: signal name -> ordered bindings.
    pub signals: Vec<(SignalName, Vec<RawBinding>)>,

    /// `[Settings]`: engine knobs.
    pub settings: Settings,
}

/// A `[Register]` entry: either a bare path or `{ path, args }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawTarget {
    Path(String),
    Full {
        path: String,
        #[serde(default)]
        args: Vec<toml::Value>,
    },
}

/// An `[Events.<name>]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEvent {
    /// Names of registered targets. An event without this key is not
    /// registered at all.
    #[serde(default)]
    pub targets: Option<Vec<String>>,

    /// Argument recipes, in final argument order.
    #[serde(default)]
    pub args: Vec<RawArgument>,
}

/// One entry of an event's `args` list.
///
/// Kept loose on purpose: a missing or unknown `type` makes the argument
/// contribute nothing instead of failing the load.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawArgument {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub relation: Option<String>,

    #[serde(default)]
    pub optional: Option<bool>,

    #[serde(default)]
    pub value: Option<toml::Value>,
}

/// One binding in a `[Signals]` list: a bare event name, or an event with
/// conditions on the payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawBinding {
    Event(String),
    Conditional {
        event: String,
        #[serde(default)]
        conditions: toml::Table,
    },
}

impl RawBinding {
    pub fn event_name(&self) -> &str {
        match self {
            RawBinding::Event(name) => name,
            RawBinding::Conditional { event, .. } => event,
        }
    }
}

/// `[Settings]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Deepest lifecycle cascade that is still dispatched.
    #[serde(default = "default_max_cascade_depth")]
    pub max_cascade_depth: usize,

    /// Refuse to start when a binding or event references something unknown.
    #[serde(default)]
    pub strict: bool,
}

fn default_max_cascade_depth() -> usize {
    16
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_cascade_depth: default_max_cascade_depth(),
            strict: false,
        }
    }
}

impl RawDocument {
    /// Split a parsed document into its sections.
    ///
    /// Only shape errors are reported (e.g. `[Register]` not being a table);
    /// references between sections are resolved later by
    /// [`ConfigGraph::build`](crate::config::ConfigGraph::build).
    pub fn from_table(table: &toml::Table) -> Result<Self> {
        let mut doc = RawDocument::default();

        if let Some(register) = section(table, REGISTER_SECTION)? {
            for (name, value) in register.iter() {
                let target: RawTarget = value.clone().try_into().map_err(|e| {
                    SigdispatchError::ConfigError(format!(
                        "[{REGISTER_SECTION}] entry '{name}' must be a path string or a table with `path`: {e}"
                    ))
                })?;
                doc.register.push((name.clone(), target));
            }
        }

        if let Some(events) = section(table, EVENTS_SECTION)? {
            for (name, value) in events.iter() {
                let event: RawEvent = value.clone().try_into().map_err(|e| {
                    SigdispatchError::ConfigError(format!(
                        "[{EVENTS_SECTION}] entry '{name}' is malformed: {e}"
                    ))
                })?;
                doc.events.push((name.clone(), event));
            }
        }

        if let Some(signals) = section(table, SIGNALS_SECTION)? {
            for (name, value) in signals.iter() {
                let bindings: Vec<RawBinding> = value.clone().try_into().map_err(|e| {
                    SigdispatchError::ConfigError(format!(
                        "[{SIGNALS_SECTION}] entry '{name}' must be a list of event names or {{ event, conditions }} tables: {e}"
                    ))
                })?;
                doc.signals.push((name.clone(), bindings));
            }
        }

        // Shape check only; the store itself is read by `ConfigDocument`.
        section(table, ENVIRONMENT_SECTION)?;

        if let Some(settings) = section(table, SETTINGS_SECTION)? {
            doc.settings = toml::Value::Table(settings.clone()).try_into()?;
        }

        if doc.settings.max_cascade_depth == 0 {
            return Err(SigdispatchError::ConfigError(format!(
                "[{SETTINGS_SECTION}].max_cascade_depth must be >= 1 (got 0)"
            )));
        }

        Ok(doc)
    }
}

fn section<'a>(table: &'a toml::Table, name: &str) -> Result<Option<&'a toml::Table>> {
    match table.get(name) {
        None => Ok(None),
        Some(toml::Value::Table(t)) => Ok(Some(t)),
        Some(other) => Err(SigdispatchError::ConfigError(format!(
            "[{name}] must be a table, found {}",
            other.type_str()
        ))),
    }
}
