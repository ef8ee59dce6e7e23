//! The configuration tree root: schema-wide operations over parameters and
//! sections.
//!
//! Everything here is synchronous, in-memory work bounded by the size of the
//! tree. The tree is mutable shared state with no internal locking — a host
//! embedding it in a concurrent runtime must serialize load/mutate/save
//! access itself (one exclusive owner per loaded tree, or a lock around it).

use serde_json::Value as Json;

use crate::dynamic::ResolutionContext;
use crate::error::ConfigError;
use crate::ident::Identifier;
use crate::parameter::Parameter;
use crate::section::Section;
use crate::serialize::{Map, PARAMETERS_KEY, SECTIONS_KEY, object_array};
use crate::settings::Settings;
use crate::value::Value;

/// The root of a configuration schema: ordered top-level parameters plus
/// ordered top-level sections, the same shape as a section but without
/// identity or visibility of its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigurationMetadata {
    pub parameters: Vec<Parameter>,
    pub sections: Vec<Section>,
}

impl ConfigurationMetadata {
    pub fn new() -> Self {
        ConfigurationMetadata::default()
    }

    /// Find a parameter by dotted identifier path, e.g. `"server.port"`.
    pub fn parameter(&self, path: &str) -> Result<&Parameter, ConfigError> {
        let unknown = || ConfigError::UnknownIdentifier {
            id: path.to_string(),
        };
        let (init, leaf) = split_path(path);
        let mut parameters = &self.parameters;
        let mut sections = &self.sections;
        for segment in init {
            let section = sections
                .iter()
                .find(|s| s.id == *segment)
                .ok_or_else(unknown)?;
            parameters = &section.parameters;
            sections = &section.sections;
        }
        parameters
            .iter()
            .find(|p| *p.id() == *leaf)
            .ok_or_else(unknown)
    }

    /// Mutable counterpart of [`parameter`](Self::parameter).
    pub fn parameter_mut(&mut self, path: &str) -> Result<&mut Parameter, ConfigError> {
        let unknown = || ConfigError::UnknownIdentifier {
            id: path.to_string(),
        };
        let (init, leaf) = split_path(path);
        let mut parameters = &mut self.parameters;
        let mut sections = &mut self.sections;
        for segment in init {
            let section = sections
                .iter_mut()
                .find(|s| s.id == *segment)
                .ok_or_else(unknown)?;
            parameters = &mut section.parameters;
            sections = &mut section.sections;
        }
        parameters
            .iter_mut()
            .find(|p| *p.id() == *leaf)
            .ok_or_else(unknown)
    }

    /// Read a parameter's current value by dotted identifier path.
    pub fn get_value(&self, path: &str) -> Result<Value, ConfigError> {
        Ok(self.parameter(path)?.current_value())
    }

    /// Set a parameter's value by dotted identifier path. The parameter's
    /// constraint checks re-run before anything is committed.
    pub fn set_value(&mut self, path: &str, value: &Value) -> Result<(), ConfigError> {
        self.parameter_mut(path)?.set_value(value)
    }

    /// Extract the current values of every parameter into a settings
    /// snapshot: a nested map keyed by identifier, sections becoming nested
    /// maps of their own.
    pub fn current_settings(&self) -> Settings {
        Settings::from_map(collect(&self.parameters, &self.sections))
    }

    /// Apply a settings snapshot to the tree.
    ///
    /// The snapshot may be sparse — parameters it does not mention keep
    /// their current values, which is how newly introduced parameters stay
    /// at their defaults. Every mentioned value passes through the
    /// parameter's constraint checks; a key that matches no identifier in
    /// the schema is an `UnknownIdentifier`.
    pub fn apply_settings(&mut self, settings: &Settings) -> Result<(), ConfigError> {
        apply(
            &mut self.parameters,
            &mut self.sections,
            settings.as_map(),
            "",
        )
    }

    pub fn serialize(&self) -> Result<Map, ConfigError> {
        let mut data = Map::new();
        let parameters = self
            .parameters
            .iter()
            .map(|p| p.serialize().map(Json::Object))
            .collect::<Result<Vec<_>, _>>()?;
        data.insert(PARAMETERS_KEY.into(), Json::Array(parameters));
        let sections = self
            .sections
            .iter()
            .map(|s| s.serialize().map(Json::Object))
            .collect::<Result<Vec<_>, _>>()?;
        data.insert(SECTIONS_KEY.into(), Json::Array(sections));
        Ok(data)
    }

    /// Reconstruct a configuration from its map representation; order is
    /// preserved as given in the input lists.
    pub fn deserialize(data: &Map) -> Result<ConfigurationMetadata, ConfigError> {
        let mut configuration = ConfigurationMetadata::new();
        for parameter_data in object_array(data, PARAMETERS_KEY)? {
            configuration
                .parameters
                .push(Parameter::deserialize(&parameter_data)?);
        }
        for section_data in object_array(data, SECTIONS_KEY)? {
            configuration
                .sections
                .push(Section::deserialize(&section_data)?);
        }
        Ok(configuration)
    }
}

fn split_path(path: &str) -> (Vec<&str>, &str) {
    match path.rsplit_once('.') {
        Some((init, leaf)) => (init.split('.').collect(), leaf),
        None => (Vec::new(), path),
    }
}

/// The tree is its own resolution context: rules reference parameters by
/// bare identifier, and identifiers are unique tree-wide, so lookup is a
/// depth-first search over current values.
impl ResolutionContext for ConfigurationMetadata {
    fn lookup(&self, id: &Identifier) -> Option<Value> {
        find_value(&self.parameters, &self.sections, id)
    }
}

fn find_value(parameters: &[Parameter], sections: &[Section], id: &Identifier) -> Option<Value> {
    if let Some(parameter) = parameters.iter().find(|p| p.id() == id) {
        return Some(parameter.current_value());
    }
    sections
        .iter()
        .find_map(|s| find_value(&s.parameters, &s.sections, id))
}

fn collect(parameters: &[Parameter], sections: &[Section]) -> Map {
    let mut map = Map::new();
    for parameter in parameters {
        map.insert(
            parameter.id().to_string(),
            parameter.current_value().to_json(),
        );
    }
    for section in sections {
        map.insert(
            section.id.to_string(),
            Json::Object(collect(&section.parameters, &section.sections)),
        );
    }
    map
}

fn apply(
    parameters: &mut [Parameter],
    sections: &mut [Section],
    data: &Map,
    prefix: &str,
) -> Result<(), ConfigError> {
    for (key, value) in data {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        if let Some(parameter) = parameters.iter_mut().find(|p| *p.id() == **key) {
            let scalar = Value::from_json(value).ok_or_else(|| ConfigError::TypeMismatch {
                key: path.clone(),
                got: match value {
                    Json::Null => "null",
                    Json::Array(_) => "array",
                    Json::Object(_) => "object",
                    _ => "value",
                }
                .into(),
                want: parameter.kind().as_str(),
            })?;
            parameter.set_value(&scalar)?;
        } else if let Some(section) = sections.iter_mut().find(|s| s.id == **key) {
            let nested = value
                .as_object()
                .ok_or_else(|| ConfigError::TypeMismatch {
                    key: path.clone(),
                    got: "scalar".into(),
                    want: "object",
                })?;
            apply(&mut section.parameters, &mut section.sections, nested, &path)?;
        } else {
            return Err(ConfigError::UnknownIdentifier { id: path });
        }
    }
    Ok(())
}
