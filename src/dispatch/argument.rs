// src/dispatch/argument.rs

use crate::config::model::RawArgument;
use crate::errors::{ArgumentSource, DispatchError};
use crate::store::DataStore;
use crate::types::{Payload, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentKind {
    /// Looked up in the signal payload.
    Dynamic,
    /// Looked up in the data store.
    Environment,
    /// A constant.
    Literal,
    /// Missing or unrecognised `type`; contributes nothing.
    Unknown(String),
}

impl ArgumentKind {
    fn parse(kind: Option<&str>) -> Self {
        match kind {
            Some("dynamic") => ArgumentKind::Dynamic,
            Some("environment") => ArgumentKind::Environment,
            Some("literal") => ArgumentKind::Literal,
            Some(other) => ArgumentKind::Unknown(other.to_string()),
            None => ArgumentKind::Unknown(String::new()),
        }
    }
}

/// Recipe for one argument string.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentSpec {
    pub kind: ArgumentKind,
    pub relation: Option<String>,
    pub value: Option<Value>,
    pub optional: bool,
}

impl ArgumentSpec {
    pub fn literal(value: impl Into<Value>) -> Self {
        Self {
            kind: ArgumentKind::Literal,
            relation: None,
            value: Some(value.into()),
            optional: false,
        }
    }

    pub fn dynamic(relation: impl Into<String>, optional: bool) -> Self {
        Self {
            kind: ArgumentKind::Dynamic,
            relation: Some(relation.into()),
            value: None,
            optional,
        }
    }

    pub fn environment(relation: impl Into<String>, optional: bool) -> Self {
        Self {
            kind: ArgumentKind::Environment,
            relation: Some(relation.into()),
            value: None,
            optional,
        }
    }

    pub fn from_raw(raw: &RawArgument) -> Self {
        Self {
            kind: ArgumentKind::parse(raw.kind.as_deref()),
            relation: raw.relation.clone(),
            value: raw.value.clone().map(Value::from),
            optional: raw.optional.unwrap_or(false),
        }
    }

    /// Resolve this recipe against the payload and the store.
    ///
    /// - `Ok(Some(arg))`: append `arg`.
    /// - `Ok(None)`: contributes nothing (optional and absent, literal
    ///   without value, unknown kind, no relation).
    /// - `Err(MissingArgument)`: required value absent; the caller aborts
    ///   the whole event.
    pub fn resolve(
        &self,
        event: &str,
        payload: &Payload,
        store: &DataStore,
    ) -> Result<Option<String>, DispatchError> {
        match self.kind {
            ArgumentKind::Literal => Ok(self.value.as_ref().map(Value::render)),
            ArgumentKind::Dynamic => self.lookup(event, ArgumentSource::Payload, |key| payload.get(key)),
            ArgumentKind::Environment => self.lookup(event, ArgumentSource::Store, |key| store.get(key)),
            ArgumentKind::Unknown(_) => Ok(None),
        }
    }

    fn lookup<'a>(
        &self,
        event: &str,
        origin: ArgumentSource,
        get: impl FnOnce(&str) -> Option<&'a Value>,
    ) -> Result<Option<String>, DispatchError> {
        let Some(relation) = self.relation.as_deref() else {
            return Ok(None);
        };

        match get(relation) {
            Some(value) => Ok(Some(value.render())),
            None if self.optional => Ok(None),
            None => Err(DispatchError::MissingArgument {
                event: event.to_string(),
                relation: relation.to_string(),
                origin,
            }),
        }
    }
}
