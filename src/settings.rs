//! Untyped settings snapshots.
//!
//! A snapshot is the persisted shape of a configuration: a key-value map
//! whose top-level keys are the identifiers of top-level parameters and
//! sections, a section's value being a nested map of the same shape,
//! recursively. Snapshots are schema-agnostic — collaborators read and
//! write them without compile-time knowledge of the parameter types — and
//! they travel in two encodings: JSON (the wire format) and TOML (the
//! structured-text file format).

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::error::ConfigError;
use crate::serialize::Map;

/// An untyped map of parameter values keyed by identifier.
///
/// The round-trip law holds for both encodings: loading what was saved
/// yields an equal snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings {
    map: Map,
}

impl Settings {
    pub fn new() -> Self {
        Settings::default()
    }

    pub fn from_map(map: Map) -> Self {
        Settings { map }
    }

    pub fn as_map(&self) -> &Map {
        &self.map
    }

    pub fn as_map_mut(&mut self) -> &mut Map {
        &mut self.map
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Navigate by dotted identifier path (e.g. `"server.port"`).
    pub fn value(&self, path: &str) -> Option<&Json> {
        let (path, leaf) = match path.rsplit_once('.') {
            Some((p, l)) => (Some(p), l),
            None => (None, path),
        };
        let map = match path {
            Some(path) => {
                let mut current = &self.map;
                for segment in path.split('.') {
                    current = current.get(segment)?.as_object()?;
                }
                current
            }
            None => &self.map,
        };
        map.get(leaf)
    }

    /// Decode a snapshot from persisted JSON bytes.
    pub fn from_json_bytes(raw: &[u8]) -> Result<Settings, ConfigError> {
        let value: Json =
            serde_json::from_slice(raw).map_err(|e| ConfigError::CorruptSettings {
                reason: e.to_string(),
            })?;
        match value {
            Json::Object(map) => Ok(Settings { map }),
            other => Err(ConfigError::CorruptSettings {
                reason: format!("expected an object at the top level, got {other}"),
            }),
        }
    }

    /// Encode the snapshot to JSON bytes, the inverse of
    /// [`from_json_bytes`](Self::from_json_bytes).
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        serde_json::to_vec_pretty(&self.map).map_err(|e| ConfigError::CorruptSettings {
            reason: e.to_string(),
        })
    }

    /// Decode a snapshot from its structured-text (TOML) form.
    pub fn from_toml_str(raw: &str) -> Result<Settings, ConfigError> {
        let table: toml::Table = toml::from_str(raw).map_err(|e| ConfigError::CorruptSettings {
            reason: e.to_string(),
        })?;
        let value = serde_json::to_value(&table).map_err(|e| ConfigError::CorruptSettings {
            reason: e.to_string(),
        })?;
        match value {
            Json::Object(map) => Ok(Settings { map }),
            _ => Err(ConfigError::CorruptSettings {
                reason: "expected a table at the top level".into(),
            }),
        }
    }

    /// Encode the snapshot as TOML, the inverse of
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(&self.map).map_err(|e| ConfigError::CorruptSettings {
            reason: e.to_string(),
        })
    }
}
