//! Named, recursively nestable parameter groupings.

use crate::dynamic::DynamicProperty;
use crate::error::ConfigError;
use crate::ident::Identifier;
use crate::parameter::Parameter;
use crate::serialize::{
    DESCRIPTION_KEY, DISABLED_KEY, HIDDEN_KEY, ID_KEY, Map, NAME_KEY, PARAMETERS_KEY,
    SECTIONS_KEY, Property, deserialize_dynamic, object_array, require_property,
    serialize_dynamic,
};

/// A section of a configuration: an ordered list of parameters plus nested
/// sub-sections, with its own identity and visibility.
///
/// A section exclusively owns its contents — the tree has no sharing and no
/// cycles. Order is display order and survives (de)serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Unique ID for referencing the section behind the scenes.
    pub id: Identifier,

    /// Name of the section.
    pub name: String,

    /// Description, optionally reacting to sibling values.
    pub description: DynamicProperty<String>,

    /// Gray the section out in the UI.
    pub disabled: DynamicProperty<bool>,

    /// Hide the section from the UI.
    pub hidden: DynamicProperty<bool>,

    /// Parameters in the section, in display order.
    pub parameters: Vec<Parameter>,

    /// Nested sub-sections, in display order.
    pub sections: Vec<Section>,
}

impl Section {
    pub fn new(id: impl Into<Identifier>, name: impl Into<String>) -> Self {
        Section {
            id: id.into(),
            name: name.into(),
            description: DynamicProperty::default(),
            disabled: DynamicProperty::default(),
            hidden: DynamicProperty::default(),
            parameters: Vec::new(),
            sections: Vec::new(),
        }
    }

    /// Find a directly contained parameter by identifier.
    pub fn parameter(&self, id: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| *p.id() == *id)
    }

    /// Find a directly contained parameter by identifier, mutably.
    pub fn parameter_mut(&mut self, id: &str) -> Option<&mut Parameter> {
        self.parameters.iter_mut().find(|p| *p.id() == *id)
    }

    /// Find a directly nested sub-section by identifier.
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == *id)
    }

    pub fn serialize(&self) -> Result<Map, ConfigError> {
        let mut data = Map::new();
        data.insert(ID_KEY.into(), self.id.to_json());
        data.insert(NAME_KEY.into(), self.name.to_json());
        data.insert(
            DESCRIPTION_KEY.into(),
            serialize_dynamic(&self.description)?,
        );
        if self.disabled != DynamicProperty::default() {
            data.insert(DISABLED_KEY.into(), serialize_dynamic(&self.disabled)?);
        }
        if self.hidden != DynamicProperty::default() {
            data.insert(HIDDEN_KEY.into(), serialize_dynamic(&self.hidden)?);
        }
        let parameters = self
            .parameters
            .iter()
            .map(|p| p.serialize().map(serde_json::Value::Object))
            .collect::<Result<Vec<_>, _>>()?;
        data.insert(PARAMETERS_KEY.into(), serde_json::Value::Array(parameters));
        let sections = self
            .sections
            .iter()
            .map(|s| s.serialize().map(serde_json::Value::Object))
            .collect::<Result<Vec<_>, _>>()?;
        data.insert(SECTIONS_KEY.into(), serde_json::Value::Array(sections));
        Ok(data)
    }

    /// Reconstruct a section from its map representation, recursing into
    /// nested parameters and sub-sections. Any field failure fails the
    /// whole section.
    pub fn deserialize(data: &Map) -> Result<Section, ConfigError> {
        let mut section = Section::new(
            require_property::<Identifier>(data, ID_KEY)?,
            require_property::<String>(data, NAME_KEY)?,
        );
        section.description = deserialize_dynamic(data, DESCRIPTION_KEY, false)?;
        section.disabled = deserialize_dynamic(data, DISABLED_KEY, true)?;
        section.hidden = deserialize_dynamic(data, HIDDEN_KEY, true)?;

        for parameter_data in object_array(data, PARAMETERS_KEY)? {
            section.parameters.push(Parameter::deserialize(&parameter_data)?);
        }
        for subsection_data in object_array(data, SECTIONS_KEY)? {
            section.sections.push(Section::deserialize(&subsection_data)?);
        }
        Ok(section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::{Condition, Outcome, Rule};
    use crate::parameter::{BoolParameter, UintParameter};

    fn server_section() -> Section {
        let mut section = Section::new("server", "Service Config");
        section.description.default = "Configuration for the module's service.".into();

        let mut port = UintParameter::new("port", "API Port");
        port.core.set_default(8080);
        port.min_value = Some(0);
        port.max_value = Some(65535);
        section.parameters.push(port.into());
        section
    }

    #[test]
    fn lookup_by_identifier() {
        let section = server_section();
        assert!(section.parameter("port").is_some());
        assert!(section.parameter("portMode").is_none());
    }

    #[test]
    fn round_trip_preserves_parameter_order() {
        let mut section = server_section();
        section
            .parameters
            .push(BoolParameter::new("extra", "Extra Flag").into());

        let data = section.serialize().unwrap();
        let back = Section::deserialize(&data).unwrap();
        assert_eq!(back, section);
        let ids: Vec<&str> = back.parameters.iter().map(|p| p.id().as_str()).collect();
        assert_eq!(ids, ["port", "extra"]);
    }

    #[test]
    fn nested_sections_round_trip() {
        let mut root = Section::new("subConfig", "Sub Config");
        root.description.default = "A sub-section.".into();
        root.hidden = DynamicProperty::with_rule(
            true,
            Rule {
                condition: Condition::equals("exampleBool", true),
                then: Outcome::Literal(false),
                otherwise: Outcome::Literal(true),
            },
        );
        root.sections.push(server_section());

        let data = root.serialize().unwrap();
        let back = Section::deserialize(&data).unwrap();
        assert_eq!(back, root);
        assert_eq!(back.sections[0].id, "server");
    }

    #[test]
    fn bad_parameter_fails_whole_section() {
        let section = server_section();
        let mut data = section.serialize().unwrap();
        // Corrupt the nested parameter's type tag.
        let parameters = data.get_mut("parameters").unwrap().as_array_mut().unwrap();
        parameters[0]
            .as_object_mut()
            .unwrap()
            .insert("type".into(), serde_json::Value::String("mystery".into()));
        assert!(matches!(
            Section::deserialize(&data),
            Err(ConfigError::UnknownParameterType { tag }) if tag == "mystery"
        ));
    }

    #[test]
    fn missing_parameters_list_is_an_error() {
        let section = server_section();
        let mut data = section.serialize().unwrap();
        data.remove("parameters");
        assert!(matches!(
            Section::deserialize(&data),
            Err(ConfigError::MissingProperty { key }) if key == "parameters"
        ));
    }
}
