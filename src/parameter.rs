//! The polymorphic parameter model.
//!
//! Every configurable leaf is one of six kinds — bool, int, uint, float,
//! string, choice — sharing a generic common core (identity, description,
//! default/current value, visibility flags) with kind-specific constraints
//! layered on top: numeric bounds, string length/pattern, choice membership.
//!
//! The kinds are a closed set, so the polymorphism is a plain enum rather
//! than trait objects: `Parameter` is exhaustively matchable, and the
//! deserializer selects the concrete decoder from the `type` tag with a
//! fixed dispatch table. Constraints live beside the declaration so a single
//! definition is the source of truth for what values are legal and how the
//! parameter describes itself.
//!
//! Constraint checks run when a value is accepted — on load or explicit set
//! — not while the schema is being constructed, so a builder can assign
//! fields in any order.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::dynamic::DynamicProperty;
use crate::error::ConfigError;
use crate::ident::Identifier;
use crate::serialize::{
    ADVANCED_KEY, AFFECTED_CONTAINERS_KEY, DEFAULT_KEY, DESCRIPTION_KEY, DISABLED_KEY, HIDDEN_KEY,
    ID_KEY, MAX_LENGTH_KEY, MAX_VALUE_KEY, MIN_VALUE_KEY, Map, NAME_KEY, OPTIONS_KEY,
    OVERWRITE_ON_UPGRADE_KEY, Property, REGEX_KEY, TYPE_KEY, VALUE_KEY, deserialize_dynamic,
    deserialize_property, object_array, require_property, serialize_dynamic,
};
use crate::value::Value;

/// The tag that selects the concrete decoder for a serialized parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    Bool,
    Int,
    Uint,
    Float,
    String,
    Choice,
}

impl ParameterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::Bool => "bool",
            ParameterKind::Int => "int",
            ParameterKind::Uint => "uint",
            ParameterKind::Float => "float",
            ParameterKind::String => "string",
            ParameterKind::Choice => "choice",
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParameterKind {
    type Err = ConfigError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "bool" => Ok(ParameterKind::Bool),
            "int" => Ok(ParameterKind::Int),
            "uint" => Ok(ParameterKind::Uint),
            "float" => Ok(ParameterKind::Float),
            "string" => Ok(ParameterKind::String),
            "choice" => Ok(ParameterKind::Choice),
            _ => Err(ConfigError::UnknownParameterType { tag: tag.into() }),
        }
    }
}

/// A scalar type a parameter can hold, convertible to and from the
/// type-erased [`Value`].
pub trait ParameterValue: Property + Clone + PartialEq {
    fn into_value(self) -> Value;

    /// Value-preserving conversion from the erased representation; `None`
    /// when the value belongs to a different family.
    fn from_value(value: &Value) -> Option<Self>;
}

impl ParameterValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl ParameterValue for i64 {
    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            Value::Uint(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }
}

impl ParameterValue for u64 {
    fn into_value(self) -> Value {
        Value::Uint(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Uint(u) => Some(*u),
            Value::Int(i) => u64::try_from(*i).ok(),
            _ => None,
        }
    }
}

impl ParameterValue for f64 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::Uint(u) => Some(*u as f64),
            _ => None,
        }
    }
}

impl ParameterValue for String {
    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

/// The fields every parameter kind shares.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterCore<T> {
    /// Unique ID for referencing the parameter behind the scenes.
    pub id: Identifier,

    /// Human-readable name.
    pub name: String,

    /// Description, optionally reacting to sibling values.
    pub description: DynamicProperty<String>,

    /// Default value.
    pub default: T,

    /// Current effective value.
    pub value: T,

    /// Hide behind the "advanced mode" toggle.
    pub advanced: bool,

    /// Gray the parameter out in the UI.
    pub disabled: DynamicProperty<bool>,

    /// Hide the parameter from the UI entirely.
    pub hidden: DynamicProperty<bool>,

    /// Replace the value with the default on an upgrade.
    pub overwrite_on_upgrade: bool,

    /// Containers that must restart when this parameter changes.
    pub affected_containers: BTreeSet<String>,
}

impl<T: Default> ParameterCore<T> {
    pub fn new(id: impl Into<Identifier>, name: impl Into<String>) -> Self {
        ParameterCore {
            id: id.into(),
            name: name.into(),
            description: DynamicProperty::default(),
            default: T::default(),
            value: T::default(),
            advanced: false,
            disabled: DynamicProperty::default(),
            hidden: DynamicProperty::default(),
            overwrite_on_upgrade: false,
            affected_containers: BTreeSet::new(),
        }
    }
}

impl<T: Clone> ParameterCore<T> {
    /// Set the default and reset the current value to it. Schema builders
    /// use this so a freshly built tree starts at its defaults.
    pub fn set_default(&mut self, value: T) {
        self.default = value.clone();
        self.value = value;
    }
}

impl<T: ParameterValue> ParameterCore<T> {
    fn deserialize(data: &Map) -> Result<Self, ConfigError> {
        Ok(ParameterCore {
            id: require_property(data, ID_KEY)?,
            name: require_property(data, NAME_KEY)?,
            description: deserialize_dynamic(data, DESCRIPTION_KEY, false)?,
            default: require_property(data, DEFAULT_KEY)?,
            value: require_property(data, VALUE_KEY)?,
            advanced: deserialize_property(data, ADVANCED_KEY, true)?.unwrap_or(false),
            disabled: deserialize_dynamic(data, DISABLED_KEY, true)?,
            hidden: deserialize_dynamic(data, HIDDEN_KEY, true)?,
            overwrite_on_upgrade: require_property(data, OVERWRITE_ON_UPGRADE_KEY)?,
            affected_containers: require_property(data, AFFECTED_CONTAINERS_KEY)?,
        })
    }

    fn serialize(&self, kind: ParameterKind) -> Result<Map, ConfigError> {
        let mut data = Map::new();
        data.insert(ID_KEY.into(), self.id.to_json());
        data.insert(NAME_KEY.into(), self.name.to_json());
        data.insert(
            DESCRIPTION_KEY.into(),
            serialize_dynamic(&self.description)?,
        );
        data.insert(
            TYPE_KEY.into(),
            serde_json::Value::String(kind.as_str().into()),
        );
        data.insert(DEFAULT_KEY.into(), self.default.to_json());
        data.insert(VALUE_KEY.into(), self.value.to_json());
        if self.advanced {
            data.insert(ADVANCED_KEY.into(), self.advanced.to_json());
        }
        if self.disabled != DynamicProperty::default() {
            data.insert(DISABLED_KEY.into(), serialize_dynamic(&self.disabled)?);
        }
        if self.hidden != DynamicProperty::default() {
            data.insert(HIDDEN_KEY.into(), serialize_dynamic(&self.hidden)?);
        }
        data.insert(
            OVERWRITE_ON_UPGRADE_KEY.into(),
            self.overwrite_on_upgrade.to_json(),
        );
        data.insert(
            AFFECTED_CONTAINERS_KEY.into(),
            self.affected_containers.to_json(),
        );
        Ok(data)
    }
}

/// A boolean parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct BoolParameter {
    pub core: ParameterCore<bool>,
}

impl BoolParameter {
    pub fn new(id: impl Into<Identifier>, name: impl Into<String>) -> Self {
        BoolParameter {
            core: ParameterCore::new(id, name),
        }
    }
}

/// A numeric parameter with optional inclusive bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberParameter<T> {
    pub core: ParameterCore<T>,

    /// Minimum accepted value, inclusive. `None` is unbounded.
    pub min_value: Option<T>,

    /// Maximum accepted value, inclusive. `None` is unbounded.
    pub max_value: Option<T>,
}

pub type IntParameter = NumberParameter<i64>;
pub type UintParameter = NumberParameter<u64>;
pub type FloatParameter = NumberParameter<f64>;

impl<T: Default> NumberParameter<T> {
    pub fn new(id: impl Into<Identifier>, name: impl Into<String>) -> Self {
        NumberParameter {
            core: ParameterCore::new(id, name),
            min_value: None,
            max_value: None,
        }
    }
}

impl<T: ParameterValue + PartialOrd + fmt::Display> NumberParameter<T> {
    fn check(&self, candidate: &T) -> Result<(), ConfigError> {
        let below = self.min_value.as_ref().is_some_and(|min| candidate < min);
        let above = self.max_value.as_ref().is_some_and(|max| candidate > max);
        if below || above {
            return Err(ConfigError::ValueOutOfRange {
                id: self.core.id.to_string(),
                value: candidate.to_string(),
                min: self
                    .min_value
                    .as_ref()
                    .map_or_else(|| "-inf".into(), T::to_string),
                max: self
                    .max_value
                    .as_ref()
                    .map_or_else(|| "+inf".into(), T::to_string),
            });
        }
        Ok(())
    }

    fn deserialize(data: &Map) -> Result<Self, ConfigError> {
        Ok(NumberParameter {
            core: ParameterCore::deserialize(data)?,
            min_value: deserialize_property(data, MIN_VALUE_KEY, true)?,
            max_value: deserialize_property(data, MAX_VALUE_KEY, true)?,
        })
    }

    fn serialize(&self, kind: ParameterKind) -> Result<Map, ConfigError> {
        let mut data = self.core.serialize(kind)?;
        if let Some(min) = &self.min_value {
            data.insert(MIN_VALUE_KEY.into(), min.to_json());
        }
        if let Some(max) = &self.max_value {
            data.insert(MAX_VALUE_KEY.into(), max.to_json());
        }
        Ok(data)
    }
}

/// A string parameter with optional length and pattern constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct StringParameter {
    pub core: ParameterCore<String>,

    /// Maximum length in characters.
    pub max_length: Option<usize>,

    /// Pattern the whole value must match.
    pub regex: Option<String>,
}

impl StringParameter {
    pub fn new(id: impl Into<Identifier>, name: impl Into<String>) -> Self {
        StringParameter {
            core: ParameterCore::new(id, name),
            max_length: None,
            regex: None,
        }
    }

    fn check(&self, candidate: &str) -> Result<(), ConfigError> {
        if let Some(max) = self.max_length {
            let len = candidate.chars().count();
            if len > max {
                return Err(ConfigError::StringTooLong {
                    id: self.core.id.to_string(),
                    len,
                    max,
                });
            }
        }
        if let Some(pattern) = &self.regex {
            // Anchor so the whole value must match, not a substring.
            let re = Regex::new(&format!("\\A(?:{pattern})\\z")).map_err(|e| {
                ConfigError::MalformedSchema {
                    reason: format!("invalid regex for '{}': {e}", self.core.id),
                }
            })?;
            if !re.is_match(candidate) {
                return Err(ConfigError::RegexMismatch {
                    id: self.core.id.to_string(),
                    value: candidate.to_string(),
                    pattern: pattern.clone(),
                });
            }
        }
        Ok(())
    }

    fn deserialize(data: &Map) -> Result<Self, ConfigError> {
        Ok(StringParameter {
            core: ParameterCore::deserialize(data)?,
            max_length: deserialize_property(data, MAX_LENGTH_KEY, true)?,
            regex: deserialize_property(data, REGEX_KEY, true)?,
        })
    }

    fn serialize(&self) -> Result<Map, ConfigError> {
        let mut data = self.core.serialize(ParameterKind::String)?;
        if let Some(max) = self.max_length {
            data.insert(MAX_LENGTH_KEY.into(), max.to_json());
        }
        if let Some(pattern) = &self.regex {
            data.insert(REGEX_KEY.into(), pattern.to_json());
        }
        Ok(data)
    }
}

/// A single option of a choice parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterOption {
    /// The option's name.
    pub name: String,

    /// Description, optionally reacting to sibling values.
    pub description: DynamicProperty<String>,

    /// The value selecting this option.
    pub value: String,

    /// Gray the option out in the UI.
    pub disabled: DynamicProperty<bool>,

    /// Hide the option from the UI.
    pub hidden: DynamicProperty<bool>,
}

impl ParameterOption {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        ParameterOption {
            name: name.into(),
            description: DynamicProperty::default(),
            value: value.into(),
            disabled: DynamicProperty::default(),
            hidden: DynamicProperty::default(),
        }
    }

    fn deserialize(data: &Map) -> Result<Self, ConfigError> {
        Ok(ParameterOption {
            name: require_property(data, NAME_KEY)?,
            description: deserialize_dynamic(data, DESCRIPTION_KEY, false)?,
            value: require_property(data, VALUE_KEY)?,
            disabled: deserialize_dynamic(data, DISABLED_KEY, true)?,
            hidden: deserialize_dynamic(data, HIDDEN_KEY, true)?,
        })
    }

    fn serialize(&self) -> Result<Map, ConfigError> {
        let mut data = Map::new();
        data.insert(NAME_KEY.into(), self.name.to_json());
        data.insert(
            DESCRIPTION_KEY.into(),
            serialize_dynamic(&self.description)?,
        );
        data.insert(VALUE_KEY.into(), self.value.to_json());
        if self.disabled != DynamicProperty::default() {
            data.insert(DISABLED_KEY.into(), serialize_dynamic(&self.disabled)?);
        }
        if self.hidden != DynamicProperty::default() {
            data.insert(HIDDEN_KEY.into(), serialize_dynamic(&self.hidden)?);
        }
        Ok(data)
    }
}

/// A parameter choosing between a fixed, ordered set of options.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceParameter {
    pub core: ParameterCore<String>,

    /// The choices available, in display order.
    pub options: Vec<ParameterOption>,
}

impl ChoiceParameter {
    pub fn new(id: impl Into<Identifier>, name: impl Into<String>) -> Self {
        ChoiceParameter {
            core: ParameterCore::new(id, name),
            options: Vec::new(),
        }
    }

    fn check(&self, candidate: &str) -> Result<(), ConfigError> {
        if self.options.iter().any(|o| o.value == candidate) {
            return Ok(());
        }
        Err(ConfigError::InvalidChoice {
            id: self.core.id.to_string(),
            value: candidate.to_string(),
            options: self.options.iter().map(|o| o.value.clone()).collect(),
        })
    }

    fn deserialize(data: &Map) -> Result<Self, ConfigError> {
        let core = ParameterCore::deserialize(data)?;
        let mut options = Vec::new();
        for option_data in object_array(data, OPTIONS_KEY)? {
            options.push(ParameterOption::deserialize(&option_data)?);
        }
        Ok(ChoiceParameter { core, options })
    }

    fn serialize(&self) -> Result<Map, ConfigError> {
        let mut data = self.core.serialize(ParameterKind::Choice)?;
        let options = self
            .options
            .iter()
            .map(|o| o.serialize().map(serde_json::Value::Object))
            .collect::<Result<Vec<_>, _>>()?;
        data.insert(OPTIONS_KEY.into(), serde_json::Value::Array(options));
        Ok(data)
    }
}

/// One configurable leaf of any kind.
///
/// The closed-enum shape is what lets generic tooling — snapshot
/// extraction, the get/set API, UI emission — walk a heterogeneous
/// parameter list without downcasting.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    Bool(BoolParameter),
    Int(IntParameter),
    Uint(UintParameter),
    Float(FloatParameter),
    String(StringParameter),
    Choice(ChoiceParameter),
}

/// Run `$body` with `$core` bound to the variant's shared core.
macro_rules! with_core {
    ($self:expr, $core:ident => $body:expr) => {
        match $self {
            Parameter::Bool(p) => {
                let $core = &p.core;
                $body
            }
            Parameter::Int(p) => {
                let $core = &p.core;
                $body
            }
            Parameter::Uint(p) => {
                let $core = &p.core;
                $body
            }
            Parameter::Float(p) => {
                let $core = &p.core;
                $body
            }
            Parameter::String(p) => {
                let $core = &p.core;
                $body
            }
            Parameter::Choice(p) => {
                let $core = &p.core;
                $body
            }
        }
    };
}

impl Parameter {
    pub fn id(&self) -> &Identifier {
        with_core!(self, core => &core.id)
    }

    pub fn name(&self) -> &str {
        with_core!(self, core => &core.name)
    }

    pub fn description(&self) -> &DynamicProperty<String> {
        with_core!(self, core => &core.description)
    }

    pub fn kind(&self) -> ParameterKind {
        match self {
            Parameter::Bool(_) => ParameterKind::Bool,
            Parameter::Int(_) => ParameterKind::Int,
            Parameter::Uint(_) => ParameterKind::Uint,
            Parameter::Float(_) => ParameterKind::Float,
            Parameter::String(_) => ParameterKind::String,
            Parameter::Choice(_) => ParameterKind::Choice,
        }
    }

    pub fn advanced(&self) -> bool {
        with_core!(self, core => core.advanced)
    }

    pub fn disabled(&self) -> &DynamicProperty<bool> {
        with_core!(self, core => &core.disabled)
    }

    pub fn hidden(&self) -> &DynamicProperty<bool> {
        with_core!(self, core => &core.hidden)
    }

    pub fn overwrite_on_upgrade(&self) -> bool {
        with_core!(self, core => core.overwrite_on_upgrade)
    }

    pub fn affected_containers(&self) -> &BTreeSet<String> {
        with_core!(self, core => &core.affected_containers)
    }

    /// The default, erased for generic tooling.
    pub fn default_value(&self) -> Value {
        match self {
            Parameter::Bool(p) => p.core.default.into_value(),
            Parameter::Int(p) => p.core.default.into_value(),
            Parameter::Uint(p) => p.core.default.into_value(),
            Parameter::Float(p) => p.core.default.into_value(),
            Parameter::String(p) => p.core.default.clone().into_value(),
            Parameter::Choice(p) => p.core.default.clone().into_value(),
        }
    }

    /// The current value, erased for generic tooling.
    pub fn current_value(&self) -> Value {
        match self {
            Parameter::Bool(p) => p.core.value.into_value(),
            Parameter::Int(p) => p.core.value.into_value(),
            Parameter::Uint(p) => p.core.value.into_value(),
            Parameter::Float(p) => p.core.value.into_value(),
            Parameter::String(p) => p.core.value.clone().into_value(),
            Parameter::Choice(p) => p.core.value.clone().into_value(),
        }
    }

    /// Accept a new value: convert from the erased representation, re-run
    /// the kind's constraint checks, and commit only if both succeed.
    pub fn set_value(&mut self, value: &Value) -> Result<(), ConfigError> {
        let id = self.id().to_string();
        let mismatch = move |want| ConfigError::TypeMismatch {
            key: id.clone(),
            got: value.kind_name().into(),
            want,
        };
        match self {
            Parameter::Bool(p) => {
                p.core.value = bool::from_value(value).ok_or_else(|| mismatch("boolean"))?;
            }
            Parameter::Int(p) => {
                let candidate = i64::from_value(value).ok_or_else(|| mismatch("integer"))?;
                p.check(&candidate)?;
                p.core.value = candidate;
            }
            Parameter::Uint(p) => {
                let candidate =
                    u64::from_value(value).ok_or_else(|| mismatch("unsigned integer"))?;
                p.check(&candidate)?;
                p.core.value = candidate;
            }
            Parameter::Float(p) => {
                let candidate = f64::from_value(value).ok_or_else(|| mismatch("float"))?;
                p.check(&candidate)?;
                p.core.value = candidate;
            }
            Parameter::String(p) => {
                let candidate = String::from_value(value).ok_or_else(|| mismatch("string"))?;
                p.check(&candidate)?;
                p.core.value = candidate;
            }
            Parameter::Choice(p) => {
                let candidate = String::from_value(value).ok_or_else(|| mismatch("string"))?;
                p.check(&candidate)?;
                p.core.value = candidate;
            }
        }
        Ok(())
    }

    /// Re-run the kind's constraint checks against the current value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Parameter::Bool(_) => Ok(()),
            Parameter::Int(p) => p.check(&p.core.value),
            Parameter::Uint(p) => p.check(&p.core.value),
            Parameter::Float(p) => p.check(&p.core.value),
            Parameter::String(p) => p.check(&p.core.value),
            Parameter::Choice(p) => p.check(&p.core.value),
        }
    }

    pub fn serialize(&self) -> Result<Map, ConfigError> {
        match self {
            Parameter::Bool(p) => p.core.serialize(ParameterKind::Bool),
            Parameter::Int(p) => p.serialize(ParameterKind::Int),
            Parameter::Uint(p) => p.serialize(ParameterKind::Uint),
            Parameter::Float(p) => p.serialize(ParameterKind::Float),
            Parameter::String(p) => p.serialize(),
            Parameter::Choice(p) => p.serialize(),
        }
    }

    /// Reconstruct a parameter from its map representation.
    ///
    /// Reads the `type` tag first and dispatches to the matching decoder;
    /// an unrecognized tag is fatal for the whole structure.
    pub fn deserialize(data: &Map) -> Result<Parameter, ConfigError> {
        let tag: String = require_property(data, TYPE_KEY)?;
        match tag.parse()? {
            ParameterKind::Bool => Ok(Parameter::Bool(BoolParameter {
                core: ParameterCore::deserialize(data)?,
            })),
            ParameterKind::Int => Ok(Parameter::Int(IntParameter::deserialize(data)?)),
            ParameterKind::Uint => Ok(Parameter::Uint(UintParameter::deserialize(data)?)),
            ParameterKind::Float => Ok(Parameter::Float(FloatParameter::deserialize(data)?)),
            ParameterKind::String => Ok(Parameter::String(StringParameter::deserialize(data)?)),
            ParameterKind::Choice => Ok(Parameter::Choice(ChoiceParameter::deserialize(data)?)),
        }
    }
}

impl From<BoolParameter> for Parameter {
    fn from(p: BoolParameter) -> Self {
        Parameter::Bool(p)
    }
}

impl From<IntParameter> for Parameter {
    fn from(p: IntParameter) -> Self {
        Parameter::Int(p)
    }
}

impl From<UintParameter> for Parameter {
    fn from(p: UintParameter) -> Self {
        Parameter::Uint(p)
    }
}

impl From<FloatParameter> for Parameter {
    fn from(p: FloatParameter) -> Self {
        Parameter::Float(p)
    }
}

impl From<StringParameter> for Parameter {
    fn from(p: StringParameter) -> Self {
        Parameter::String(p)
    }
}

impl From<ChoiceParameter> for Parameter {
    fn from(p: ChoiceParameter) -> Self {
        Parameter::Choice(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::{Condition, Outcome, Rule};

    fn float_param() -> FloatParameter {
        let mut p = FloatParameter::new("exampleFloat", "Example Float");
        p.core.description.default = "A float with bounds.".into();
        p.core.set_default(50.0);
        p.min_value = Some(0.0);
        p.max_value = Some(100.0);
        p
    }

    fn string_param() -> StringParameter {
        let mut p = StringParameter::new("exampleString", "Example String");
        p.core.description.default = "A constrained string.".into();
        p.max_length = Some(10);
        p.regex = Some("^[a-zA-Z]*$".into());
        p
    }

    fn choice_param() -> ChoiceParameter {
        let mut p = ChoiceParameter::new("exampleChoice", "Example Choice");
        p.core.description.default = "Pick one.".into();
        p.options = vec![
            ParameterOption::new("One", "one"),
            ParameterOption::new("Two", "two"),
            ParameterOption::new("Three", "three"),
        ];
        p.core.set_default("one".to_string());
        p
    }

    #[test]
    fn set_default_resets_value() {
        let p = float_param();
        assert_eq!(p.core.default, 50.0);
        assert_eq!(p.core.value, 50.0);
    }

    #[test]
    fn numeric_bounds_are_inclusive() {
        let mut p = Parameter::Float(float_param());
        p.set_value(&Value::Float(0.0)).unwrap();
        assert_eq!(p.current_value(), Value::Float(0.0));
        p.set_value(&Value::Float(100.0)).unwrap();
        assert_eq!(p.current_value(), Value::Float(100.0));
    }

    #[test]
    fn numeric_out_of_range_rejected_and_not_committed() {
        let mut p = Parameter::Float(float_param());
        let err = p.set_value(&Value::Float(100.5)).unwrap_err();
        match err {
            ConfigError::ValueOutOfRange { id, value, min, max } => {
                assert_eq!(id, "exampleFloat");
                assert_eq!(value, "100.5");
                assert_eq!(min, "0");
                assert_eq!(max, "100");
            }
            other => panic!("Expected ValueOutOfRange, got {other:?}"),
        }
        assert_eq!(p.current_value(), Value::Float(50.0));
    }

    #[test]
    fn unbounded_side_accepts_anything() {
        let mut p = IntParameter::new("exampleInt", "Example Integer");
        p.max_value = Some(10);
        let mut p = Parameter::Int(p);
        p.set_value(&Value::Int(i64::MIN)).unwrap();
        assert!(p.set_value(&Value::Int(11)).is_err());
    }

    #[test]
    fn uint_rejects_negative() {
        let mut p = Parameter::Uint(UintParameter::new("port", "API Port"));
        let err = p.set_value(&Value::Int(-1)).unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { .. }));
    }

    #[test]
    fn int_accepts_uint_in_range() {
        let mut p = Parameter::Int(IntParameter::new("exampleInt", "Example Integer"));
        p.set_value(&Value::Uint(7)).unwrap();
        assert_eq!(p.current_value(), Value::Int(7));
    }

    #[test]
    fn float_accepts_integer_families() {
        let mut p = Parameter::Float(float_param());
        p.set_value(&Value::Int(75)).unwrap();
        assert_eq!(p.current_value(), Value::Float(75.0));
    }

    #[test]
    fn string_within_constraints_accepted() {
        let mut p = Parameter::String(string_param());
        p.set_value(&Value::String("Example".into())).unwrap();
        assert_eq!(p.current_value(), Value::String("Example".into()));
    }

    #[test]
    fn string_violating_regex_cites_field() {
        let mut p = Parameter::String(string_param());
        let err = p.set_value(&Value::String("Example123".into())).unwrap_err();
        match err {
            ConfigError::RegexMismatch { id, value, .. } => {
                assert_eq!(id, "exampleString");
                assert_eq!(value, "Example123");
            }
            other => panic!("Expected RegexMismatch, got {other:?}"),
        }
    }

    #[test]
    fn string_too_long_cites_length() {
        let mut p = Parameter::String(string_param());
        let err = p
            .set_value(&Value::String("ThisIsWayTooLong".into()))
            .unwrap_err();
        match err {
            ConfigError::StringTooLong { id, len, max } => {
                assert_eq!(id, "exampleString");
                assert_eq!(len, 16);
                assert_eq!(max, 10);
            }
            other => panic!("Expected StringTooLong, got {other:?}"),
        }
    }

    #[test]
    fn regex_matches_whole_value_not_substring() {
        let mut p = StringParameter::new("code", "Code");
        p.regex = Some("[a-z]+".into());
        let mut p = Parameter::String(p);
        assert!(p.set_value(&Value::String("abc1".into())).is_err());
        p.set_value(&Value::String("abc".into())).unwrap();
    }

    #[test]
    fn max_length_counts_characters_not_bytes() {
        let mut p = StringParameter::new("name", "Name");
        p.max_length = Some(3);
        let mut p = Parameter::String(p);
        p.set_value(&Value::String("äöü".into())).unwrap();
    }

    #[test]
    fn choice_accepts_each_option_value() {
        let mut p = Parameter::Choice(choice_param());
        for value in ["one", "two", "three"] {
            p.set_value(&Value::String(value.into())).unwrap();
            assert_eq!(p.current_value(), Value::String(value.into()));
        }
    }

    #[test]
    fn choice_rejects_unknown_value_citing_options() {
        let mut p = Parameter::Choice(choice_param());
        let err = p.set_value(&Value::String("four".into())).unwrap_err();
        match err {
            ConfigError::InvalidChoice { id, value, options } => {
                assert_eq!(id, "exampleChoice");
                assert_eq!(value, "four");
                assert_eq!(options, ["one", "two", "three"]);
            }
            other => panic!("Expected InvalidChoice, got {other:?}"),
        }
    }

    #[test]
    fn option_hidden_until_sibling_boolean_enables_it() {
        use crate::value::Value;
        use std::collections::HashMap;

        let mut p = choice_param();
        p.options[1].hidden = DynamicProperty::with_rule(
            true,
            Rule {
                condition: Condition::equals("exampleBool", true),
                then: Outcome::Literal(false),
                otherwise: Outcome::Literal(true),
            },
        );
        let option = &p.options[1];

        let sibling_true: HashMap<_, _> =
            [(crate::ident::Identifier::from("exampleBool"), Value::Bool(true))].into();
        assert!(!option.hidden.resolve(&sibling_true));

        let sibling_false: HashMap<_, _> =
            [(crate::ident::Identifier::from("exampleBool"), Value::Bool(false))].into();
        assert!(option.hidden.resolve(&sibling_false));

        let absent: HashMap<crate::ident::Identifier, Value> = HashMap::new();
        assert!(option.hidden.resolve(&absent));
    }

    #[test]
    fn set_value_of_wrong_kind_is_type_mismatch() {
        let mut p = Parameter::Bool(BoolParameter::new("exampleBool", "Example Boolean"));
        let err = p.set_value(&Value::String("yes".into())).unwrap_err();
        match err {
            ConfigError::TypeMismatch { key, got, want } => {
                assert_eq!(key, "exampleBool");
                assert_eq!(got, "string");
                assert_eq!(want, "boolean");
            }
            other => panic!("Expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn validate_checks_current_value() {
        let mut p = float_param();
        p.core.value = 200.0;
        let p = Parameter::Float(p);
        assert!(matches!(
            p.validate(),
            Err(ConfigError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn kind_tags() {
        assert_eq!(ParameterKind::Uint.as_str(), "uint");
        assert_eq!("choice".parse::<ParameterKind>().unwrap(), ParameterKind::Choice);
        assert!(matches!(
            "blob".parse::<ParameterKind>(),
            Err(ConfigError::UnknownParameterType { tag }) if tag == "blob"
        ));
    }

    fn round_trip(p: Parameter) {
        let data = p.serialize().unwrap();
        let back = Parameter::deserialize(&data).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn bool_round_trips() {
        let mut p = BoolParameter::new("exampleBool", "Example Boolean");
        p.core.description.default = "A boolean.".into();
        p.core.affected_containers.insert("example".into());
        round_trip(Parameter::Bool(p));
    }

    #[test]
    fn float_with_bounds_round_trips() {
        round_trip(Parameter::Float(float_param()));
    }

    #[test]
    fn string_with_constraints_round_trips() {
        round_trip(Parameter::String(string_param()));
    }

    #[test]
    fn choice_with_dynamic_option_round_trips() {
        let mut p = choice_param();
        p.options[1].disabled = DynamicProperty::with_rule(
            true,
            Rule {
                condition: Condition::equals("exampleBool", true),
                then: Outcome::Literal(false),
                otherwise: Outcome::UseDefault,
            },
        );
        round_trip(Parameter::Choice(p));
    }

    #[test]
    fn advanced_and_overwrite_flags_round_trip() {
        let mut p = IntParameter::new("exampleInt", "Example Integer");
        p.core.description.default = "An integer.".into();
        p.core.advanced = true;
        p.core.overwrite_on_upgrade = true;
        round_trip(Parameter::Int(p));
    }

    #[test]
    fn hidden_section_flag_round_trips_on_parameter() {
        let mut p = BoolParameter::new("subConfigBool", "Sub Example Boolean");
        p.core.hidden = DynamicProperty::new(true);
        round_trip(Parameter::Bool(p));
    }

    #[test]
    fn deserialize_unknown_type_tag() {
        let mut data = Map::new();
        data.insert("type".into(), serde_json::Value::String("matrix".into()));
        let err = Parameter::deserialize(&data).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownParameterType { tag } if tag == "matrix"
        ));
    }

    #[test]
    fn deserialize_missing_field_fails_whole_parameter() {
        let p = Parameter::Bool(BoolParameter::new("exampleBool", "Example Boolean"));
        let mut data = p.serialize().unwrap();
        data.remove("name");
        let err = Parameter::deserialize(&data).unwrap_err();
        assert!(matches!(err, ConfigError::MissingProperty { key } if key == "name"));
    }

    #[test]
    fn deserialize_mistyped_default_fails() {
        let p = Parameter::Uint(UintParameter::new("port", "API Port"));
        let mut data = p.serialize().unwrap();
        data.insert("default".into(), serde_json::Value::String("8080".into()));
        assert!(matches!(
            Parameter::deserialize(&data),
            Err(ConfigError::TypeMismatch { key, .. }) if key == "default"
        ));
    }
}
