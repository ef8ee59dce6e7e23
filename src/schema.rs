//! The module's static configuration schema.
//!
//! Built once at startup; settings loads and the get/set API mutate values
//! inside it afterwards. Constants that shape the schema (thresholds,
//! defaults) are construction-time configuration passed in through
//! [`SchemaDefaults`] rather than hidden globals, so hosts and tests can
//! build variants without patching source.

use std::collections::BTreeSet;

use crate::dynamic::{Condition, DynamicProperty, Outcome, Rule};
use crate::metadata::ConfigurationMetadata;
use crate::parameter::{
    BoolParameter, ChoiceParameter, FloatParameter, IntParameter, ParameterOption,
    StringParameter, UintParameter,
};
use crate::section::Section;

/// Identifier constants for every parameter and section in the schema.
///
/// These are the stable keys settings files and dynamic-property rules are
/// written against; renaming one breaks migration.
pub mod ids {
    pub const EXAMPLE_BOOL: &str = "exampleBool";
    pub const EXAMPLE_INT: &str = "exampleInt";
    pub const EXAMPLE_UINT: &str = "exampleUint";
    pub const EXAMPLE_FLOAT: &str = "exampleFloat";
    pub const EXAMPLE_STRING: &str = "exampleString";
    pub const EXAMPLE_CHOICE: &str = "exampleChoice";
    pub const SUB_CONFIG: &str = "subConfig";
    pub const SUB_EXAMPLE_BOOL: &str = "subConfigBool";
    pub const SUB_EXAMPLE_CHOICE: &str = "subConfigChoice";
    pub const SERVER_CONFIG: &str = "server";
    pub const PORT: &str = "port";
    pub const PORT_MODE: &str = "portMode";
}

/// Documented default for the unsigned integer parameter; also what
/// migration assigns when lifting settings that predate the parameter.
pub const DEFAULT_UINT_VALUE: u64 = 42;

/// Documented default for the server API port.
pub const DEFAULT_API_PORT: u64 = 8080;

/// Threshold the choice option's description rule compares the float
/// parameter against.
pub const FLOAT_THRESHOLD: f64 = 75.0;

/// Construction-time configuration for [`build_schema`].
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDefaults {
    /// Threshold the float parameter is compared against in the choice
    /// option's description rule.
    pub float_threshold: f64,

    /// Default for the unsigned integer parameter introduced in the
    /// current schema generation.
    pub default_uint: u64,

    /// Default API port for the server section.
    pub default_port: u64,

    /// Name of the service container restarted when a parameter changes.
    pub service_container: String,
}

impl Default for SchemaDefaults {
    fn default() -> Self {
        SchemaDefaults {
            float_threshold: FLOAT_THRESHOLD,
            default_uint: DEFAULT_UINT_VALUE,
            default_port: DEFAULT_API_PORT,
            service_container: "example".into(),
        }
    }
}

/// Build the static default schema for the current module version.
pub fn build_schema(defaults: &SchemaDefaults) -> ConfigurationMetadata {
    let service = || BTreeSet::from([defaults.service_container.clone()]);

    let mut example_bool = BoolParameter::new(ids::EXAMPLE_BOOL, "Example Boolean");
    example_bool.core.description.default = "This is an example of a boolean parameter. It \
        doesn't directly affect the service, but it does control the behavior of some other \
        config parameters."
        .into();
    example_bool.core.affected_containers = service();

    let mut example_int = IntParameter::new(ids::EXAMPLE_INT, "Example Integer");
    example_int.core.description.default = "This is an example of an integer parameter.".into();
    example_int.core.affected_containers = service();

    let mut example_uint = UintParameter::new(ids::EXAMPLE_UINT, "Example Unsigned Integer");
    example_uint.core.description.default =
        "This is an example of an unsigned integer parameter.".into();
    example_uint.core.set_default(defaults.default_uint);
    example_uint.core.affected_containers = service();

    let mut example_float = FloatParameter::new(ids::EXAMPLE_FLOAT, "Example Float");
    example_float.core.description.default =
        "This is an example of a float parameter with a minimum and maximum set.".into();
    example_float.core.set_default(50.0);
    example_float.min_value = Some(0.0);
    example_float.max_value = Some(100.0);
    example_float.core.affected_containers = service();

    let mut example_string = StringParameter::new(ids::EXAMPLE_STRING, "Example String");
    example_string.core.description.default =
        "This is an example of a string parameter. It has a max length and regex pattern set."
            .into();
    example_string.max_length = Some(10);
    example_string.regex = Some("^[a-zA-Z]*$".into());
    example_string.core.affected_containers = service();

    let mut example_choice = ChoiceParameter::new(ids::EXAMPLE_CHOICE, "Example Choice");
    example_choice.core.description.default =
        "This is an example of a choice parameter between multiple options.".into();
    example_choice.options = choice_options(defaults.float_threshold);
    example_choice.core.set_default("one".into());

    let mut tree = ConfigurationMetadata::new();
    tree.parameters = vec![
        example_bool.into(),
        example_int.into(),
        example_uint.into(),
        example_float.into(),
        example_string.into(),
        example_choice.into(),
    ];
    tree.sections = vec![sub_config(), server_config(defaults)];
    tree
}

fn choice_options(threshold: f64) -> Vec<ParameterOption> {
    let mut one = ParameterOption::new("One", "one");
    one.description.default = "This is the first option.".into();

    let mut two = ParameterOption::new("Two", "two");
    two.description = DynamicProperty::with_rule(
        format!(
            "This is the second option. It is hidden when Example Float is less than {threshold}."
        ),
        Rule {
            condition: Condition::less_than(ids::EXAMPLE_FLOAT, threshold),
            then: Outcome::Literal(format!(
                "This option is hidden because the float is less than {threshold}."
            )),
            otherwise: Outcome::Literal(format!(
                "This option is visible because the float is greater than or equal to {threshold}."
            )),
        },
    );
    two.disabled = DynamicProperty::with_rule(
        true,
        Rule {
            condition: Condition::equals(ids::EXAMPLE_BOOL, true),
            then: Outcome::Literal(false),
            otherwise: Outcome::UseDefault,
        },
    );

    let mut three = ParameterOption::new("Three", "three");
    three.description.default = "This is the third option.".into();

    vec![one, two, three]
}

fn sub_config() -> Section {
    let mut section = Section::new(ids::SUB_CONFIG, "Sub Config");
    section.description.default = "This is a sub-section of the main configuration.".into();
    section.hidden = DynamicProperty::with_rule(
        true,
        Rule {
            condition: Condition::equals(ids::EXAMPLE_BOOL, true),
            then: Outcome::Literal(false),
            otherwise: Outcome::Literal(true),
        },
    );

    let mut sub_bool = BoolParameter::new(ids::SUB_EXAMPLE_BOOL, "Sub Example Boolean");
    sub_bool.core.description.default =
        "This is an example of a boolean parameter in a sub-section.".into();

    let mut one = ParameterOption::new("One", "one");
    one.description.default = "This is the first option.".into();
    let mut two = ParameterOption::new("Two", "two");
    two.description.default = "This is the second option.".into();

    let mut sub_choice = ChoiceParameter::new(ids::SUB_EXAMPLE_CHOICE, "Sub Example Choice");
    sub_choice.core.description.default =
        "This is an example of a choice parameter between multiple options in a sub-section."
            .into();
    sub_choice.options = vec![one, two];
    sub_choice.core.set_default("two".into());

    section.parameters = vec![sub_bool.into(), sub_choice.into()];
    section
}

fn server_config(defaults: &SchemaDefaults) -> Section {
    let mut section = Section::new(ids::SERVER_CONFIG, "Service Config");
    section.description.default = "This is the configuration for the module's service. This \
        isn't used by the service directly, but it is used by the host itself to configure the \
        service during its starting process."
        .into();

    let mut port = UintParameter::new(ids::PORT, "API Port");
    port.core.description.default = "This is the API port the server should run on.".into();
    port.core.set_default(defaults.default_port);
    port.min_value = Some(0);
    port.max_value = Some(65535);
    port.core.affected_containers = [defaults.service_container.clone()].into();

    let mut closed = ParameterOption::new("Closed", "closed");
    closed.description.default =
        "The API is only accessible to internal Docker container traffic.".into();
    let mut localhost = ParameterOption::new("Localhost Only", "localhost");
    localhost.description.default = "The API is accessible from internal Docker containers and \
        your own local machine, but no other external machines."
        .into();
    let mut external = ParameterOption::new("All External Traffic", "external");
    external.description.default =
        "The port is accessible to everything, including external machines.\n\n[orange]Use \
         with caution!"
            .into();

    let mut port_mode = ChoiceParameter::new(ids::PORT_MODE, "Expose API Port");
    port_mode.core.description.default =
        "Determine how the server's HTTP API restricts its access from various sources.".into();
    port_mode.options = vec![closed, localhost, external];
    port_mode.core.set_default("closed".into());
    port_mode.core.affected_containers = [defaults.service_container.clone()].into();

    section.parameters = vec![port.into(), port_mode.into()];
    section
}
