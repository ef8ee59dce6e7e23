//! Versioned settings migration.
//!
//! Persisted settings carry the schema version they were written under.
//! When the schema evolves, old snapshots must be reconstructed into the
//! current shape without losing data: every legacy field maps to exactly
//! one current field, and every newly introduced field takes its documented
//! default. This module holds the typed settings shapes for both schema
//! generations and the version-gated transition between them.
//!
//! Two generations exist today, split at [`BOUNDARY_VERSION`]. The version
//! comparison is isolated in [`migrate_settings`]; supporting more
//! generations later means replacing that single branch with a chain of
//! pairwise upgraders.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::schema::{DEFAULT_API_PORT, DEFAULT_UINT_VALUE};
use crate::settings::Settings;

/// The schema version this build writes.
pub const CURRENT_VERSION: &str = "0.2.0";

/// Snapshots from versions strictly below this take the legacy path.
pub const BOUNDARY_VERSION: ModuleVersion = ModuleVersion {
    major: 0,
    minor: 2,
    patch: 0,
};

/// A `major.minor.patch` version with standard ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ModuleVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl FromStr for ModuleVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        fn segment(part: Option<&str>) -> Option<u64> {
            part.and_then(|p| p.parse().ok())
        }
        let mut segments = s.split('.');
        let major = segment(segments.next());
        let minor = segment(segments.next());
        let patch = segment(segments.next());
        match (major, minor, patch, segments.next()) {
            (Some(major), Some(minor), Some(patch), None) => Ok(ModuleVersion {
                major,
                minor,
                patch,
            }),
            _ => Err(ConfigError::CorruptSettings {
                reason: format!("invalid version '{s}'"),
            }),
        }
    }
}

impl fmt::Display for ModuleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// The choice values of the example choice parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExampleOption {
    #[default]
    One,
    Two,
    Three,
}

/// The choice values of the server port-mode parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortMode {
    #[default]
    Closed,
    Localhost,
    External,
}

/// Typed values of the `subConfig` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubConfigSettings {
    #[serde(rename = "subConfigBool")]
    pub sub_example_bool: bool,

    #[serde(rename = "subConfigChoice")]
    pub sub_example_choice: ExampleOption,
}

impl Default for SubConfigSettings {
    fn default() -> Self {
        SubConfigSettings {
            sub_example_bool: false,
            sub_example_choice: ExampleOption::Two,
        }
    }
}

/// Typed values of the `server` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerSettings {
    pub port: u64,
    pub port_mode: PortMode,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            port: DEFAULT_API_PORT,
            port_mode: PortMode::Closed,
        }
    }
}

/// The settings shape written by schema generations before
/// [`BOUNDARY_VERSION`]. It lacks the unsigned integer parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegacySettings {
    pub example_bool: bool,
    pub example_int: i64,
    pub example_float: f64,
    pub example_string: String,
    pub example_choice: ExampleOption,
    pub sub_config: SubConfigSettings,
    #[serde(rename = "server")]
    pub server_config: ServerSettings,
}

impl Default for LegacySettings {
    fn default() -> Self {
        LegacySettings {
            example_bool: false,
            example_int: 0,
            example_float: 50.0,
            example_string: String::new(),
            example_choice: ExampleOption::One,
            sub_config: SubConfigSettings::default(),
            server_config: ServerSettings::default(),
        }
    }
}

/// The settings shape of the current schema generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModuleSettings {
    pub example_bool: bool,
    pub example_int: i64,
    pub example_uint: u64,
    pub example_float: f64,
    pub example_string: String,
    pub example_choice: ExampleOption,
    pub sub_config: SubConfigSettings,
    #[serde(rename = "server")]
    pub server_config: ServerSettings,
}

impl Default for ModuleSettings {
    fn default() -> Self {
        ModuleSettings {
            example_bool: false,
            example_int: 0,
            example_uint: DEFAULT_UINT_VALUE,
            example_float: 50.0,
            example_string: String::new(),
            example_choice: ExampleOption::One,
            sub_config: SubConfigSettings::default(),
            server_config: ServerSettings::default(),
        }
    }
}

impl ModuleSettings {
    /// Convert to the untyped snapshot shape.
    pub fn to_settings(&self) -> Result<Settings, ConfigError> {
        let value = serde_json::to_value(self).map_err(|e| ConfigError::CorruptSettings {
            reason: e.to_string(),
        })?;
        match value {
            serde_json::Value::Object(map) => Ok(Settings::from_map(map)),
            _ => Err(ConfigError::CorruptSettings {
                reason: "settings did not serialize to an object".into(),
            }),
        }
    }

    /// Parse from the untyped snapshot shape.
    pub fn from_settings(settings: &Settings) -> Result<ModuleSettings, ConfigError> {
        parse_shape(settings)
    }
}

/// Lift legacy settings into the current shape.
///
/// Total by construction: every legacy field is moved to its counterpart,
/// and the one field new in the current generation takes its documented
/// default.
pub fn upgrade_legacy(legacy: LegacySettings) -> ModuleSettings {
    ModuleSettings {
        example_bool: legacy.example_bool,
        example_int: legacy.example_int,
        example_uint: DEFAULT_UINT_VALUE,
        example_float: legacy.example_float,
        example_string: legacy.example_string,
        example_choice: legacy.example_choice,
        sub_config: legacy.sub_config,
        server_config: legacy.server_config,
    }
}

/// Reconstruct current-shape settings from a snapshot written under
/// `declared_version`.
///
/// Versions strictly below [`BOUNDARY_VERSION`] parse as the legacy shape
/// and are upgraded; anything else parses directly (the identity
/// migration). A snapshot that cannot be parsed into the expected shape
/// fails whole — partial migrations are never produced.
pub fn migrate_settings(
    settings: &Settings,
    declared_version: &str,
) -> Result<ModuleSettings, ConfigError> {
    let version: ModuleVersion = declared_version.parse()?;
    if version < BOUNDARY_VERSION {
        let legacy: LegacySettings = parse_shape(settings)?;
        info!(from = %version, to = CURRENT_VERSION, "upgrading legacy settings");
        Ok(upgrade_legacy(legacy))
    } else {
        debug!(%version, "settings already at the current schema generation");
        parse_shape(settings)
    }
}

fn parse_shape<T: serde::de::DeserializeOwned>(settings: &Settings) -> Result<T, ConfigError> {
    serde_json::from_value(serde_json::Value::Object(settings.as_map().clone())).map_err(|e| {
        ConfigError::CorruptSettings {
            reason: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_map() -> Settings {
        Settings::from_map(
            serde_json::json!({
                "exampleBool": true,
                "exampleInt": -5,
                "exampleFloat": 80.0,
                "exampleString": "Legacy",
                "exampleChoice": "three",
                "subConfig": {
                    "subConfigBool": true,
                    "subConfigChoice": "one"
                },
                "server": {
                    "port": 9001,
                    "portMode": "localhost"
                }
            })
            .as_object()
            .unwrap()
            .clone(),
        )
    }

    #[test]
    fn version_parsing_and_ordering() {
        let v010: ModuleVersion = "0.1.0".parse().unwrap();
        let v020: ModuleVersion = "0.2.0".parse().unwrap();
        let v0101: ModuleVersion = "0.10.1".parse().unwrap();
        assert!(v010 < v020);
        assert!(v020 < v0101);
        assert_eq!(v020, BOUNDARY_VERSION);
        assert_eq!(v0101.to_string(), "0.10.1");
    }

    #[test]
    fn bad_version_strings_are_corrupt_settings() {
        for s in ["", "1", "1.2", "1.2.x", "1.2.3.4", "v1.2.3"] {
            assert!(
                matches!(
                    s.parse::<ModuleVersion>(),
                    Err(ConfigError::CorruptSettings { .. })
                ),
                "'{s}' should not parse"
            );
        }
    }

    #[test]
    fn legacy_fields_carry_over_and_new_field_defaults() {
        let migrated = migrate_settings(&legacy_map(), "0.1.0").unwrap();
        assert!(migrated.example_bool);
        assert_eq!(migrated.example_int, -5);
        assert_eq!(migrated.example_float, 80.0);
        assert_eq!(migrated.example_string, "Legacy");
        assert_eq!(migrated.example_choice, ExampleOption::Three);
        assert!(migrated.sub_config.sub_example_bool);
        assert_eq!(migrated.sub_config.sub_example_choice, ExampleOption::One);
        assert_eq!(migrated.server_config.port, 9001);
        assert_eq!(migrated.server_config.port_mode, PortMode::Localhost);
        // The only field new in the current generation.
        assert_eq!(migrated.example_uint, DEFAULT_UINT_VALUE);
    }

    #[test]
    fn migration_is_idempotent_at_current_version() {
        let migrated = migrate_settings(&legacy_map(), "0.1.0").unwrap();
        let snapshot = migrated.to_settings().unwrap();

        let direct = ModuleSettings::from_settings(&snapshot).unwrap();
        let re_migrated = migrate_settings(&snapshot, CURRENT_VERSION).unwrap();
        assert_eq!(re_migrated, direct);
        assert_eq!(re_migrated, migrated);
    }

    #[test]
    fn later_versions_take_the_identity_path() {
        let migrated = migrate_settings(&legacy_map(), "0.1.0").unwrap();
        let snapshot = migrated.to_settings().unwrap();
        let parsed = migrate_settings(&snapshot, "0.3.7").unwrap();
        assert_eq!(parsed, migrated);
    }

    #[test]
    fn mistyped_legacy_field_fails_whole_migration() {
        let mut settings = legacy_map();
        settings
            .as_map_mut()
            .insert("exampleBool".into(), serde_json::json!("yes"));
        assert!(matches!(
            migrate_settings(&settings, "0.1.0"),
            Err(ConfigError::CorruptSettings { .. })
        ));
    }

    #[test]
    fn unknown_choice_value_fails_migration() {
        let mut settings = legacy_map();
        settings
            .as_map_mut()
            .insert("exampleChoice".into(), serde_json::json!("four"));
        assert!(matches!(
            migrate_settings(&settings, "0.1.0"),
            Err(ConfigError::CorruptSettings { .. })
        ));
    }

    #[test]
    fn invalid_declared_version_fails_migration() {
        assert!(matches!(
            migrate_settings(&legacy_map(), "not-a-version"),
            Err(ConfigError::CorruptSettings { .. })
        ));
    }

    #[test]
    fn empty_legacy_snapshot_yields_documented_defaults() {
        let migrated = migrate_settings(&Settings::new(), "0.1.0").unwrap();
        assert_eq!(migrated, ModuleSettings::default());
        assert_eq!(migrated.example_uint, DEFAULT_UINT_VALUE);
        assert_eq!(migrated.server_config.port, DEFAULT_API_PORT);
        assert_eq!(migrated.sub_config.sub_example_choice, ExampleOption::Two);
    }

    #[test]
    fn migrated_settings_apply_to_the_current_schema() {
        use crate::fixtures::test::test_schema;
        use crate::value::Value;

        let migrated = migrate_settings(&legacy_map(), "0.1.0").unwrap();
        let snapshot = migrated.to_settings().unwrap();

        let mut tree = test_schema();
        tree.apply_settings(&snapshot).unwrap();
        assert_eq!(
            tree.get_value("exampleUint").unwrap(),
            Value::Uint(DEFAULT_UINT_VALUE)
        );
        assert_eq!(
            tree.get_value("server.portMode").unwrap(),
            Value::String("localhost".into())
        );
    }

    #[test]
    fn typed_settings_round_trip_through_snapshot() {
        let settings = ModuleSettings {
            example_string: "abc".into(),
            example_choice: ExampleOption::Two,
            ..ModuleSettings::default()
        };
        let snapshot = settings.to_settings().unwrap();
        assert_eq!(
            snapshot.value("exampleChoice"),
            Some(&serde_json::json!("two"))
        );
        let back = ModuleSettings::from_settings(&snapshot).unwrap();
        assert_eq!(back, settings);
    }
}
