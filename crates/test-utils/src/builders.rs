#![allow(dead_code)]

use sigdispatch::config::{ConfigGraph, GraphBuild, RawDocument};
use sigdispatch::engine::{DispatchOptions, Dispatcher};
use sigdispatch::store::DataStore;

/// Builder for configuration documents to simplify test setup.
///
/// Produces the same `toml::Table` a parsed file would.
pub struct DocumentBuilder {
    register: toml::Table,
    events: toml::Table,
    signals: toml::Table,
    environment: toml::Table,
    settings: toml::Table,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self {
            register: toml::Table::new(),
            events: toml::Table::new(),
            signals: toml::Table::new(),
            environment: toml::Table::new(),
            settings: toml::Table::new(),
        }
    }

    /// `name = "path"`.
    pub fn target(mut self, name: &str, path: &str) -> Self {
        self.register
            .insert(name.to_string(), toml::Value::String(path.to_string()));
        self
    }

    /// `name = { path = "...", args = [...] }`.
    pub fn target_with_args(mut self, name: &str, path: &str, args: &[&str]) -> Self {
        let mut entry = toml::Table::new();
        entry.insert("path".to_string(), toml::Value::String(path.to_string()));
        entry.insert("args".to_string(), string_array(args));
        self.register.insert(name.to_string(), toml::Value::Table(entry));
        self
    }

    pub fn event(mut self, name: &str, event: EventBuilder) -> Self {
        self.events
            .insert(name.to_string(), toml::Value::Table(event.build()));
        self
    }

    /// Append a bare-name binding to `signal`.
    pub fn bind(mut self, signal: &str, event: &str) -> Self {
        self.push_binding(signal, toml::Value::String(event.to_string()));
        self
    }

    /// Append `{ event, conditions }` to `signal`.
    pub fn bind_when(mut self, signal: &str, event: &str, conditions: &[(&str, &str)]) -> Self {
        let mut conds = toml::Table::new();
        for (key, pattern) in conditions {
            conds.insert(key.to_string(), toml::Value::String(pattern.to_string()));
        }
        let mut binding = toml::Table::new();
        binding.insert("event".to_string(), toml::Value::String(event.to_string()));
        binding.insert("conditions".to_string(), toml::Value::Table(conds));
        self.push_binding(signal, toml::Value::Table(binding));
        self
    }

    pub fn environment(mut self, key: &str, value: impl Into<toml::Value>) -> Self {
        self.environment.insert(key.to_string(), value.into());
        self
    }

    pub fn max_cascade_depth(mut self, depth: i64) -> Self {
        self.settings
            .insert("max_cascade_depth".to_string(), toml::Value::Integer(depth));
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.settings
            .insert("strict".to_string(), toml::Value::Boolean(strict));
        self
    }

    fn push_binding(&mut self, signal: &str, binding: toml::Value) {
        let entry = self
            .signals
            .entry(signal.to_string())
            .or_insert_with(|| toml::Value::Array(Vec::new()));
        if let toml::Value::Array(list) = entry {
            list.push(binding);
        }
    }

    pub fn build(self) -> toml::Table {
        let mut doc = toml::Table::new();
        let sections = [
            ("Register", self.register),
            ("Events", self.events),
            ("Signals", self.signals),
            ("Environment", self.environment),
            ("Settings", self.settings),
        ];
        for (name, section) in sections {
            if !section.is_empty() {
                doc.insert(name.to_string(), toml::Value::Table(section));
            }
        }
        doc
    }

    /// Document text with one `key = <inline value>` line per entry, so
    /// entries read back in the order they were added.
    pub fn to_toml_string(self) -> String {
        let mut out = String::new();
        for (name, section) in self.build() {
            let toml::Value::Table(entries) = section else {
                continue;
            };
            out.push_str(&format!("[{name}]\n"));
            for (key, value) in entries {
                out.push_str(&format!("{} = {}\n", toml_key(&key), value));
            }
            out.push('\n');
        }
        out
    }

    pub fn graph_build(self) -> GraphBuild {
        let raw = RawDocument::from_table(&self.build()).expect("builder produced malformed document");
        ConfigGraph::build(&raw)
    }

    /// Lenient dispatcher over the built document.
    pub fn dispatcher(self) -> Dispatcher {
        let table = self.build();
        let raw = RawDocument::from_table(&table).expect("builder produced malformed document");
        let options = DispatchOptions::from(&raw.settings);
        let store = match table.get("Environment") {
            Some(toml::Value::Table(env)) => DataStore::from_table(env),
            _ => DataStore::new(),
        };
        Dispatcher::new(ConfigGraph::build(&raw).lenient(), store, options)
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one `[Events.<name>]` table.
pub struct EventBuilder {
    targets: Option<Vec<String>>,
    args: Vec<toml::Value>,
}

impl EventBuilder {
    pub fn new() -> Self {
        Self {
            targets: Some(Vec::new()),
            args: Vec::new(),
        }
    }

    /// An event without a `targets` key at all.
    pub fn without_targets() -> Self {
        Self {
            targets: None,
            args: Vec::new(),
        }
    }

    pub fn target(mut self, name: &str) -> Self {
        self.targets.get_or_insert_with(Vec::new).push(name.to_string());
        self
    }

    pub fn literal(self, value: impl Into<toml::Value>) -> Self {
        self.arg(&[("type", "literal".into()), ("value", value.into())])
    }

    pub fn dynamic(self, relation: &str) -> Self {
        self.arg(&[("type", "dynamic".into()), ("relation", relation.into())])
    }

    pub fn optional_dynamic(self, relation: &str) -> Self {
        self.arg(&[
            ("type", "dynamic".into()),
            ("relation", relation.into()),
            ("optional", true.into()),
        ])
    }

    pub fn environment(self, relation: &str) -> Self {
        self.arg(&[("type", "environment".into()), ("relation", relation.into())])
    }

    pub fn optional_environment(self, relation: &str) -> Self {
        self.arg(&[
            ("type", "environment".into()),
            ("relation", relation.into()),
            ("optional", true.into()),
        ])
    }

    /// Raw argument table, for unusual shapes.
    pub fn arg(mut self, fields: &[(&str, toml::Value)]) -> Self {
        let mut table = toml::Table::new();
        for (key, value) in fields {
            table.insert(key.to_string(), value.clone());
        }
        self.args.push(toml::Value::Table(table));
        self
    }

    pub fn build(self) -> toml::Table {
        let mut table = toml::Table::new();
        if let Some(targets) = self.targets {
            table.insert(
                "targets".to_string(),
                toml::Value::Array(targets.into_iter().map(toml::Value::String).collect()),
            );
        }
        table.insert("args".to_string(), toml::Value::Array(self.args));
        table
    }
}

impl Default for EventBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn string_array(items: &[&str]) -> toml::Value {
    toml::Value::Array(
        items
            .iter()
            .map(|s| toml::Value::String(s.to_string()))
            .collect(),
    )
}

fn toml_key(key: &str) -> String {
    let bare = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if bare {
        key.to_string()
    } else {
        toml::Value::String(key.to_string()).to_string()
    }
}
