//! Self-describing configuration schemas with dynamic parameters and
//! versioned settings migration.
//!
//! Metaconf models a module's configuration as *data*: a tree of typed
//! parameters and nested sections that carries its own names, descriptions,
//! defaults, constraints, and visibility rules. Because the schema is a
//! runtime value rather than a compile-time struct, generic tooling — a UI,
//! an HTTP parameter API, a CLI — can walk, render, and edit a
//! configuration it has never seen, and the whole tree serializes to a
//! schema-agnostic key-value map and back.
//!
//! ```ignore
//! use metaconf::{SchemaDefaults, Settings, Value, build_schema};
//!
//! let mut tree = build_schema(&SchemaDefaults::default());
//!
//! let raw = std::fs::read("settings.json")?;
//! tree.apply_settings(&Settings::from_json_bytes(&raw)?)?;
//!
//! tree.set_value("server.port", &Value::Uint(9000))?;
//! let bytes = tree.current_settings().to_json_bytes()?;
//! ```
//!
//! # Design: schema as data
//!
//! Every configurable leaf is a [`Parameter`] — a closed enum over six
//! kinds (bool, int, uint, float, string, choice) sharing a common core of
//! identity and metadata, with kind-specific constraints declared beside
//! the value they constrain: numeric bounds, string length and pattern,
//! choice membership. One declaration is the single source of truth for
//! what values are legal *and* how the parameter presents itself.
//!
//! Constraints are enforced when a value is accepted — on settings load and
//! on every [`set_value`](ConfigurationMetadata::set_value) — never
//! silently. A rejected value leaves the previous one in place; partially
//! applied structures do not exist.
//!
//! # Dynamic properties
//!
//! Descriptions, enablement, and visibility can react to sibling values. A
//! [`DynamicProperty`] pairs a default with an optional rule: a small
//! closed expression tree comparing one referenced parameter's current
//! value against a literal, with then/else outcomes. Rules are evaluated
//! against a [`ResolutionContext`] — the configuration tree itself, a map,
//! or any closure — and degrade to the default when a reference does not
//! resolve. Evaluation never fails; this is deliberately not a scripting
//! language.
//!
//! # The map representation
//!
//! [`ConfigurationMetadata::serialize`] turns the typed tree into an
//! untyped map keyed by [`Identifier`]; `deserialize` rebuilds it, picking
//! each concrete decoder from the `type` tag. Round-trips are lossless,
//! including declaration order, which drives display order.
//!
//! Parameter *values* travel separately as a [`Settings`] snapshot: a
//! nested map of identifier to value, encodable as JSON (the wire form) or
//! TOML (the file form), with `load(save(s)) == s` in both. Snapshots may
//! be sparse; parameters a snapshot does not mention keep their current
//! values.
//!
//! # Settings migration
//!
//! Snapshots persist across schema versions. [`migrate_settings`] compares
//! the snapshot's declared version against the current generation's
//! boundary: older snapshots parse as the legacy shape and are lifted
//! field-by-field — nothing dropped, new parameters at their documented
//! defaults — while current snapshots parse directly. An unparsable
//! snapshot fails whole with `CorruptSettings`; a partial migration is
//! never produced.
//!
//! # Concurrency
//!
//! The engine is synchronous and does no I/O of its own (the
//! [`SettingsManager`] collaborator reads and writes files). A loaded tree
//! is plain mutable state with no internal locking: a host embedding it in
//! a concurrent runtime must give each tree one exclusive owner or wrap
//! access in a lock.
//!
//! # Errors
//!
//! Everything fallible returns [`ConfigError`], with the offending key or
//! identifier attached — unknown identifiers name the full dotted path,
//! range violations cite both bounds, choice violations list the valid
//! set. The library never panics; deciding whether an error is fatal
//! belongs to the caller.

pub mod dynamic;
pub mod error;
pub mod ident;
pub mod metadata;
pub mod migrate;
pub mod parameter;
pub mod persist;
pub mod schema;
pub mod section;
pub mod serialize;
pub mod settings;
pub mod value;

#[cfg(test)]
mod fixtures;

pub use dynamic::{Comparison, Condition, DynamicProperty, Outcome, ResolutionContext, Rule};
pub use error::ConfigError;
pub use ident::Identifier;
pub use metadata::ConfigurationMetadata;
pub use migrate::{
    CURRENT_VERSION, LegacySettings, ModuleSettings, ModuleVersion, migrate_settings,
};
pub use parameter::{Parameter, ParameterKind};
pub use persist::SettingsManager;
pub use schema::{SchemaDefaults, build_schema};
pub use section::Section;
pub use settings::Settings;
pub use value::Value;
