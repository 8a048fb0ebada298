use std::{collections::HashMap, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MessagesError {
    #[error("failed to read validation messages from {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid validation messages: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Display text per field name and error key.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ValidationMessages {
    fields: HashMap<String, HashMap<String, String>>,
}

impl ValidationMessages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, key: &str, message: impl Into<String>) -> Self {
        self.fields
            .entry(field.to_string())
            .or_default()
            .insert(key.to_string(), message.into());
        self
    }

    /// Message for `key` on `field`, or the key itself when none is configured.
    pub fn message<'a>(&'a self, field: &str, key: &'a str) -> &'a str {
        self.fields
            .get(field)
            .and_then(|messages| messages.get(key))
            .map(String::as_str)
            .unwrap_or(key)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, MessagesError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MessagesError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| MessagesError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Entries in `overrides` replace matching entries in `self`.
    pub fn merged(mut self, overrides: ValidationMessages) -> Self {
        for (field, messages) in overrides.fields {
            self.fields.entry(field).or_default().extend(messages);
        }
        self
    }
}
