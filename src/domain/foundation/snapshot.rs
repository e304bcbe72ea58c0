//! Bulk key/value document shared by backups and remote sync.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::{Timestamp, ValidationError};

/// Mapping of slot key to its JSON value.
///
/// This is the shape of a backup file, of the remote record, and of the
/// body exchanged with the `/store` endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreSnapshot(BTreeMap<String, Value>);

impl StoreSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Entries whose key starts with `prefix`.
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a String, &'a Value)> {
        self.0.iter().filter(move |(k, _)| k.starts_with(prefix))
    }

    /// Parses a JSON document; anything other than an object is rejected.
    pub fn from_json(raw: &str) -> Result<Self, ValidationError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| ValidationError::invalid_format("snapshot", e.to_string()))?;
        Self::from_value(value)
    }

    /// Converts a JSON value; anything other than an object is rejected.
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        match value {
            Value::Object(map) => Ok(Self(map.into_iter().collect())),
            other => Err(ValidationError::invalid_format(
                "snapshot",
                format!("expected a JSON object, got {}", json_kind(&other)),
            )),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0.into_iter().collect())
    }

    /// Pretty-printed JSON, as written to backup files.
    pub fn to_json_pretty(&self) -> String {
        // A map of JSON values always serializes.
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

impl FromIterator<(String, Value)> for StoreSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// File name for a backup taken at `at`: `revenue_backup_YYYY-MM-DD.json`.
pub fn backup_file_name(at: &Timestamp) -> String {
    format!("revenue_backup_{}.json", at.date_stamp())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
