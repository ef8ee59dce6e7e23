//! Generic conversion between typed schema fields and the untyped key-value
//! representation.
//!
//! One routine, `deserialize_property`, is reused for every scalar field of
//! every parameter kind; `deserialize_dynamic` layers the default/rule
//! extraction of a dynamic property on top of it. Serialization mirrors the
//! same shapes. Consumers of the map representation never need compile-time
//! knowledge of the concrete parameter types behind it.

use std::collections::BTreeSet;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as Json;

use crate::dynamic::{DynamicProperty, Rule};
use crate::error::ConfigError;
use crate::ident::Identifier;
use crate::value::Value;

/// The untyped map representation every schema structure serializes to.
pub type Map = serde_json::Map<String, Json>;

// Field names shared across the schema representation.
pub(crate) const ID_KEY: &str = "id";
pub(crate) const NAME_KEY: &str = "name";
pub(crate) const DESCRIPTION_KEY: &str = "description";
pub(crate) const TYPE_KEY: &str = "type";
pub(crate) const DEFAULT_KEY: &str = "default";
pub(crate) const VALUE_KEY: &str = "value";
pub(crate) const ADVANCED_KEY: &str = "advanced";
pub(crate) const DISABLED_KEY: &str = "disabled";
pub(crate) const HIDDEN_KEY: &str = "hidden";
pub(crate) const OVERWRITE_ON_UPGRADE_KEY: &str = "overwriteOnUpgrade";
pub(crate) const AFFECTED_CONTAINERS_KEY: &str = "affectedContainers";
pub(crate) const MIN_VALUE_KEY: &str = "minValue";
pub(crate) const MAX_VALUE_KEY: &str = "maxValue";
pub(crate) const MAX_LENGTH_KEY: &str = "maxLength";
pub(crate) const REGEX_KEY: &str = "regex";
pub(crate) const OPTIONS_KEY: &str = "options";
pub(crate) const PARAMETERS_KEY: &str = "parameters";
pub(crate) const SECTIONS_KEY: &str = "sections";
pub(crate) const RULE_KEY: &str = "rule";

/// A field type the generic deserialization routine can extract from the
/// untyped map. Conversions are value-preserving; anything else is a
/// `TypeMismatch`.
pub trait Property: Sized {
    const EXPECTED: &'static str;

    fn from_json(value: &Json) -> Option<Self>;
    fn to_json(&self) -> Json;
}

impl Property for bool {
    const EXPECTED: &'static str = "boolean";

    fn from_json(value: &Json) -> Option<Self> {
        value.as_bool()
    }

    fn to_json(&self) -> Json {
        Json::Bool(*self)
    }
}

impl Property for i64 {
    const EXPECTED: &'static str = "integer";

    fn from_json(value: &Json) -> Option<Self> {
        value.as_i64()
    }

    fn to_json(&self) -> Json {
        Json::from(*self)
    }
}

impl Property for u64 {
    const EXPECTED: &'static str = "unsigned integer";

    fn from_json(value: &Json) -> Option<Self> {
        value.as_u64()
    }

    fn to_json(&self) -> Json {
        Json::from(*self)
    }
}

impl Property for f64 {
    const EXPECTED: &'static str = "float";

    fn from_json(value: &Json) -> Option<Self> {
        value.as_f64()
    }

    fn to_json(&self) -> Json {
        Json::from(*self)
    }
}

impl Property for usize {
    const EXPECTED: &'static str = "unsigned integer";

    fn from_json(value: &Json) -> Option<Self> {
        value.as_u64().and_then(|u| usize::try_from(u).ok())
    }

    fn to_json(&self) -> Json {
        Json::from(*self as u64)
    }
}

impl Property for String {
    const EXPECTED: &'static str = "string";

    fn from_json(value: &Json) -> Option<Self> {
        value.as_str().map(str::to_string)
    }

    fn to_json(&self) -> Json {
        Json::String(self.clone())
    }
}

impl Property for Identifier {
    const EXPECTED: &'static str = "identifier string";

    fn from_json(value: &Json) -> Option<Self> {
        value.as_str().map(Identifier::from)
    }

    fn to_json(&self) -> Json {
        Json::String(self.as_str().to_string())
    }
}

impl Property for Value {
    const EXPECTED: &'static str = "scalar value";

    fn from_json(value: &Json) -> Option<Self> {
        Value::from_json(value)
    }

    fn to_json(&self) -> Json {
        Value::to_json(self)
    }
}

impl Property for BTreeSet<String> {
    const EXPECTED: &'static str = "array of strings";

    fn from_json(value: &Json) -> Option<Self> {
        value
            .as_array()?
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect()
    }

    fn to_json(&self) -> Json {
        Json::Array(self.iter().map(|s| Json::String(s.clone())).collect())
    }
}

fn json_type_name(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

/// Look up `key` in `data` and convert it to `T`.
///
/// Absent and `optional` returns `Ok(None)`; absent and required is a
/// `MissingProperty`. Present but inconvertible is a `TypeMismatch` naming
/// the key and both types.
pub fn deserialize_property<T: Property>(
    data: &Map,
    key: &str,
    optional: bool,
) -> Result<Option<T>, ConfigError> {
    let Some(value) = data.get(key) else {
        if optional {
            return Ok(None);
        }
        return Err(ConfigError::MissingProperty { key: key.into() });
    };
    match T::from_json(value) {
        Some(v) => Ok(Some(v)),
        None => Err(ConfigError::TypeMismatch {
            key: key.into(),
            got: json_type_name(value).into(),
            want: T::EXPECTED,
        }),
    }
}

/// Required-field shorthand over [`deserialize_property`].
pub fn require_property<T: Property>(data: &Map, key: &str) -> Result<T, ConfigError> {
    deserialize_property(data, key, false)?
        .ok_or_else(|| ConfigError::MissingProperty { key: key.into() })
}

/// Extract a dynamic property: an object holding `default` plus an optional
/// `rule`, each sub-field read with the same generic routine. Absent and
/// `optional` yields a rule-less property over `T::default()`.
pub fn deserialize_dynamic<T>(
    data: &Map,
    key: &str,
    optional: bool,
) -> Result<DynamicProperty<T>, ConfigError>
where
    T: Property + Clone + Default + DeserializeOwned,
{
    let Some(value) = data.get(key) else {
        if optional {
            return Ok(DynamicProperty::default());
        }
        return Err(ConfigError::MissingProperty { key: key.into() });
    };
    let Some(object) = value.as_object() else {
        return Err(ConfigError::TypeMismatch {
            key: key.into(),
            got: json_type_name(value).into(),
            want: "dynamic property object",
        });
    };

    let default: T = match object.get(DEFAULT_KEY) {
        None => {
            return Err(ConfigError::MissingProperty {
                key: format!("{key}.{DEFAULT_KEY}"),
            });
        }
        Some(v) => T::from_json(v).ok_or_else(|| ConfigError::TypeMismatch {
            key: format!("{key}.{DEFAULT_KEY}"),
            got: json_type_name(v).into(),
            want: T::EXPECTED,
        })?,
    };

    let rule = match object.get(RULE_KEY) {
        None => None,
        Some(rule_value) => Some(serde_json::from_value::<Rule<T>>(rule_value.clone()).map_err(
            |e| ConfigError::MalformedSchema {
                reason: format!("invalid rule for '{key}': {e}"),
            },
        )?),
    };

    Ok(DynamicProperty { default, rule })
}

/// Serialize a dynamic property back to its map shape.
pub fn serialize_dynamic<T>(prop: &DynamicProperty<T>) -> Result<Json, ConfigError>
where
    T: Property + Serialize,
{
    let mut object = Map::new();
    object.insert(DEFAULT_KEY.into(), prop.default.to_json());
    if let Some(rule) = &prop.rule {
        let rule_json =
            serde_json::to_value(rule).map_err(|e| ConfigError::MalformedSchema {
                reason: format!("unserializable rule: {e}"),
            })?;
        object.insert(RULE_KEY.into(), rule_json);
    }
    Ok(Json::Object(object))
}

/// Extract a required array of objects (the `parameters` / `sections` /
/// `options` lists). Order is preserved as given in the input.
pub fn object_array(data: &Map, key: &str) -> Result<Vec<Map>, ConfigError> {
    let Some(value) = data.get(key) else {
        return Err(ConfigError::MissingProperty { key: key.into() });
    };
    let Some(array) = value.as_array() else {
        return Err(ConfigError::TypeMismatch {
            key: key.into(),
            got: json_type_name(value).into(),
            want: "array of objects",
        });
    };
    let mut objects = Vec::with_capacity(array.len());
    for (i, element) in array.iter().enumerate() {
        let Some(object) = element.as_object() else {
            return Err(ConfigError::TypeMismatch {
                key: format!("{key}[{i}]"),
                got: json_type_name(element).into(),
                want: "object",
            });
        };
        objects.push(object.clone());
    }
    Ok(objects)
}
