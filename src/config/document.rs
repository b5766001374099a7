// src/config/document.rs

//! The full parsed configuration document and its backing file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use toml_edit::{DocumentMut, Item};
use tracing::{debug, info};

use crate::config::model::{ENVIRONMENT_SECTION, RawDocument};
use crate::errors::{Result, SigdispatchError};
use crate::fs::{FileSystem, RealFileSystem};
use crate::store::DataStore;

/// Parsed document plus where it lives.
///
/// The document is held twice: as a `toml::Table` the section model is
/// deserialized from, and as a format-preserving `toml_edit` document that
/// `save()` writes back. Only `[Environment]` is ever edited, so key order,
/// comments and layout of every other section survive `post()`.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    path: PathBuf,
    table: toml::Table,
    edit: DocumentMut,
    fs: Arc<dyn FileSystem>,
}

impl ConfigDocument {
    /// Read and parse `path` from the real filesystem.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(Arc::new(RealFileSystem), path)
    }

    pub fn load_with(fs: Arc<dyn FileSystem>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let contents = read_contents(fs.as_ref(), &path)?;
        Self::parse(fs, path, &contents)
    }

    /// Parse `contents` as the document backed by `path`; nothing is read
    /// until [`reload`].
    ///
    /// [`reload`]: ConfigDocument::reload
    pub fn parse(fs: Arc<dyn FileSystem>, path: impl AsRef<Path>, contents: &str) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let (table, edit) = parse_contents(contents)?;
        debug!(path = %path.display(), sections = table.len(), "loaded configuration document");
        Ok(Self {
            path,
            table,
            edit,
            fs,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> &toml::Table {
        &self.table
    }

    /// Split the document into its typed sections.
    pub fn raw(&self) -> Result<RawDocument> {
        RawDocument::from_table(&self.table)
    }

    /// Current `[Environment]` contents (empty if the section is absent).
    pub fn environment(&self) -> Result<DataStore> {
        environment_of(&self.table)
    }

    /// Re-read the backing file and return its `[Environment]` contents.
    ///
    /// The in-memory document is only replaced when the new file parses and
    /// its `[Environment]` is usable; on error nothing changes.
    pub fn reload(&mut self) -> Result<DataStore> {
        let contents = read_contents(self.fs.as_ref(), &self.path)?;
        let (table, edit) = parse_contents(&contents)?;
        let store = environment_of(&table)?;

        self.table = table;
        self.edit = edit;
        info!(path = %self.path.display(), values = store.len(), "reloaded configuration document");
        Ok(store)
    }

    /// Replace `[Environment]` with the store contents.
    ///
    /// Keys already in the section keep their position; new keys are
    /// appended in store order.
    pub fn set_environment(&mut self, store: &DataStore) {
        self.table.insert(
            ENVIRONMENT_SECTION.to_string(),
            toml::Value::Table(store.to_table()),
        );

        match self.edit.get_mut(ENVIRONMENT_SECTION).and_then(Item::as_table_mut) {
            Some(section) => {
                section.retain(|key, _| store.contains_key(key));
                fill_section(section, store);
            }
            None => {
                let mut section = toml_edit::Table::new();
                fill_section(&mut section, store);
                self.edit.insert(ENVIRONMENT_SECTION, Item::Table(section));
            }
        }
    }

    /// Write the document back to its file.
    pub fn save(&self) -> Result<()> {
        self.fs.write(&self.path, self.edit.to_string().as_bytes())?;
        info!(path = %self.path.display(), "wrote configuration document");
        Ok(())
    }
}

fn fill_section(section: &mut toml_edit::Table, store: &DataStore) {
    for (key, value) in store.iter() {
        section.insert(key, toml_edit::value(value));
    }
}

fn environment_of(table: &toml::Table) -> Result<DataStore> {
    match table.get(ENVIRONMENT_SECTION) {
        None => Ok(DataStore::new()),
        Some(toml::Value::Table(env)) => Ok(DataStore::from_table(env)),
        Some(other) => Err(SigdispatchError::ConfigError(format!(
            "[{ENVIRONMENT_SECTION}] must be a table, found {}",
            other.type_str()
        ))),
    }
}

fn read_contents(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    if !fs.exists(path) {
        return Err(SigdispatchError::ConfigError(format!(
            "configuration file not found: {}",
            path.display()
        )));
    }
    Ok(fs.read_to_string(path)?)
}

fn parse_contents(contents: &str) -> Result<(toml::Table, DocumentMut)> {
    let table: toml::Table = toml::from_str(contents)?;
    let edit: DocumentMut = contents.parse()?;
    Ok((table, edit))
}
