//! Named configuration sections with a reserved `default` entry.
//!
//! Every section of the `logging` tree (formatters, handlers, loggers) maps
//! an entry name to a flat key/value mapping. Looking an entry up merges the
//! `default` entry with the named one, key by key, the named entry winning.

use std::collections::BTreeMap;

use figment::value::{Dict, Tag, Value};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use validator::ValidationError;

use crate::ConfigError;

/// Name of the entry every lookup falls back to.
pub const DEFAULT_ENTRY: &str = "default";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Section {
    entries: BTreeMap<String, Dict>,
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion of an entry, replacing any previous one.
    pub fn with_entry(mut self, name: impl Into<String>, entry: Dict) -> Self {
        self.entries.insert(name.into(), entry);
        self
    }

    pub fn default_entry(&self) -> Option<&Dict> {
        self.entries.get(DEFAULT_ENTRY)
    }

    pub fn get(&self, name: &str) -> Option<&Dict> {
        self.entries.get(name)
    }

    /// Entry names other than `default`, in lexical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .keys()
            .map(String::as_str)
            .filter(|name| *name != DEFAULT_ENTRY)
    }

    /// Shallow merge of the `default` entry and the entry called `name`.
    ///
    /// A missing named entry counts as an empty override.
    pub fn merged(&self, section: &'static str, name: &str) -> Result<Dict, ConfigError> {
        let mut merged = self
            .default_entry()
            .cloned()
            .ok_or(ConfigError::MissingDefault(section))?;
        if let Some(overrides) = self.entries.get(name) {
            merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Ok(merged)
    }

    /// Merges as [`Section::merged`] and extracts a typed entry from the result.
    pub fn entry<T: DeserializeOwned>(
        &self,
        section: &'static str,
        name: &str,
    ) -> Result<T, ConfigError> {
        let merged = self.merged(section, name)?;
        Value::Dict(Tag::Default, merged)
            .deserialize()
            .map_err(|source| ConfigError::Entry {
                section,
                name: name.to_string(),
                source,
            })
    }
}

pub(crate) fn validate_has_default(section: &Section) -> Result<(), ValidationError> {
    if section.default_entry().is_some() {
        Ok(())
    } else {
        Err(ValidationError::new("missing_default_entry")
            .with_message("section must declare a `default` entry".into()))
    }
}
