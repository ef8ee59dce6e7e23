#[cfg(test)]
pub mod test {
    use crate::metadata::ConfigurationMetadata;
    use crate::schema::{SchemaDefaults, build_schema};
    use crate::settings::Settings;

    /// The full module schema with stock defaults.
    pub fn test_schema() -> ConfigurationMetadata {
        build_schema(&SchemaDefaults::default())
    }

    /// A complete snapshot with every value changed from its default
    /// (except `exampleUint`, which stays at 42 to keep it in-bounds for
    /// sparse-overlay tests).
    pub fn test_settings() -> Settings {
        Settings::from_map(
            serde_json::json!({
                "exampleBool": true,
                "exampleInt": -3,
                "exampleUint": 42,
                "exampleFloat": 80.0,
                "exampleString": "Example",
                "exampleChoice": "two",
                "subConfig": {
                    "subConfigBool": true,
                    "subConfigChoice": "one"
                },
                "server": {
                    "port": 9000,
                    "portMode": "external"
                }
            })
            .as_object()
            .unwrap()
            .clone(),
        )
    }

    #[test]
    fn fixture_settings_apply_cleanly() {
        let mut tree = test_schema();
        tree.apply_settings(&test_settings()).unwrap();
    }
}
