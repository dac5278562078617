use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::filetype::FileType;

/// Markdown descriptions of built-in names, per file type.
///
/// Built once at startup and shared behind an `Arc`; nothing mutates a table
/// after it has been handed to the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationTable {
    #[serde(default)]
    config: BTreeMap<String, String>,
    #[serde(default)]
    make: BTreeMap<String, String>,
}

impl DocumentationTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries_for(&self, file_type: FileType) -> &BTreeMap<String, String> {
        match file_type {
            FileType::Config => &self.config,
            FileType::Make => &self.make,
        }
    }

    /// Add or replace a description.
    pub fn insert(
        &mut self,
        file_type: FileType,
        name: impl Into<String>,
        description: impl Into<String>,
    ) {
        let entries = match file_type {
            FileType::Config => &mut self.config,
            FileType::Make => &mut self.make,
        };
        entries.insert(name.into(), description.into());
    }

    /// Builder-style [`DocumentationTable::insert`].
    pub fn with_entry(
        mut self,
        file_type: FileType,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.insert(file_type, name, description);
        self
    }

    /// Add every entry of `entries`, replacing existing names.
    pub fn extend(&mut self, file_type: FileType, entries: BTreeMap<String, String>) {
        for (name, description) in entries {
            self.insert(file_type, name, description);
        }
    }

    /// The description of `name`, if the table knows it.
    pub fn describe(&self, name: &str, file_type: FileType) -> Option<&str> {
        self.entries_for(file_type).get(name).map(String::as_str)
    }

    /// All `(name, description)` pairs of a file type, sorted by name.
    pub fn entries(&self, file_type: FileType) -> impl Iterator<Item = (&str, &str)> {
        self.entries_for(file_type)
            .iter()
            .map(|(name, description)| (name.as_str(), description.as_str()))
    }

    /// Number of entries of a file type.
    pub fn len(&self, file_type: FileType) -> usize {
        self.entries_for(file_type).len()
    }

    /// Whether the table has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.config.is_empty() && self.make.is_empty()
    }
}
