//! Dynamic properties: values that can react to sibling parameter state.
//!
//! A `DynamicProperty<T>` is a default value plus an optional rule. The rule
//! is a small closed expression tree — compare one referenced parameter's
//! current value against a literal, optionally combined with and/or — with
//! then/else outcomes that either produce a literal or fall back to the
//! default. This is deliberately not a scripting language: lookups, scalar
//! comparisons, and branching are the only operations, which is enough to
//! drive visibility and enablement off sibling values.
//!
//! Evaluation never fails. A rule that references an identifier the context
//! cannot resolve, or that compares incomparable values, degrades to the
//! property's default.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::ident::Identifier;
use crate::value::Value;

/// The lookup a rule is evaluated against: a pure function from identifier
/// to the current value of any parameter in the same configuration tree.
///
/// Implementations must reflect live, uncommitted values — a rule reacting
/// to a sibling the user just changed has to see the new value before
/// anything is persisted. No side effects; no state beyond the read.
pub trait ResolutionContext {
    fn lookup(&self, id: &Identifier) -> Option<Value>;
}

impl<F> ResolutionContext for F
where
    F: Fn(&Identifier) -> Option<Value>,
{
    fn lookup(&self, id: &Identifier) -> Option<Value> {
        self(id)
    }
}

impl ResolutionContext for std::collections::HashMap<Identifier, Value> {
    fn lookup(&self, id: &Identifier) -> Option<Value> {
        self.get(id).cloned()
    }
}

/// Comparison operators available to rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// A predicate over sibling parameter values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Condition {
    /// Compare the referenced parameter's current value against a literal.
    Compare {
        parameter: Identifier,
        op: Comparison,
        literal: Value,
    },
    /// True when every sub-condition is true.
    All { conditions: Vec<Condition> },
    /// True when at least one sub-condition is true.
    Any { conditions: Vec<Condition> },
}

impl Condition {
    pub fn compare(parameter: impl Into<Identifier>, op: Comparison, literal: impl Into<Value>) -> Self {
        Condition::Compare {
            parameter: parameter.into(),
            op,
            literal: literal.into(),
        }
    }

    pub fn equals(parameter: impl Into<Identifier>, literal: impl Into<Value>) -> Self {
        Condition::compare(parameter, Comparison::Eq, literal)
    }

    pub fn less_than(parameter: impl Into<Identifier>, literal: impl Into<Value>) -> Self {
        Condition::compare(parameter, Comparison::Lt, literal)
    }

    /// Evaluate against a context. `None` means the condition could not be
    /// decided — a referenced identifier did not resolve, or the values are
    /// not comparable — and the caller falls back to the default.
    pub fn evaluate<C: ResolutionContext + ?Sized>(&self, ctx: &C) -> Option<bool> {
        match self {
            Condition::Compare {
                parameter,
                op,
                literal,
            } => {
                let current = ctx.lookup(parameter)?;
                match op {
                    Comparison::Eq => current.loose_eq(literal),
                    Comparison::Ne => current.loose_eq(literal).map(|eq| !eq),
                    Comparison::Lt => current.ordering(literal).map(Ordering::is_lt),
                    Comparison::Le => current.ordering(literal).map(Ordering::is_le),
                    Comparison::Gt => current.ordering(literal).map(Ordering::is_gt),
                    Comparison::Ge => current.ordering(literal).map(Ordering::is_ge),
                }
            }
            Condition::All { conditions } => {
                let mut result = true;
                for condition in conditions {
                    result &= condition.evaluate(ctx)?;
                }
                Some(result)
            }
            Condition::Any { conditions } => {
                let mut result = false;
                for condition in conditions {
                    result |= condition.evaluate(ctx)?;
                }
                Some(result)
            }
        }
    }
}

/// A branch outcome: a literal value, or fall back to the property default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "value", rename_all = "camelCase")]
pub enum Outcome<T> {
    Literal(T),
    UseDefault,
}

/// A conditional override: when `if` holds, `then` applies, otherwise `else`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule<T> {
    #[serde(rename = "if")]
    pub condition: Condition,
    pub then: Outcome<T>,
    #[serde(rename = "else")]
    pub otherwise: Outcome<T>,
}

/// A value of type `T` with an optional rule computed from sibling values.
///
/// Without a rule the effective value is always `default`. Each instance is
/// owned by exactly one parameter or section; rules are data, so properties
/// clone freely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicProperty<T> {
    pub default: T,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rule: Option<Rule<T>>,
}

impl<T: Clone> DynamicProperty<T> {
    pub fn new(default: T) -> Self {
        DynamicProperty {
            default,
            rule: None,
        }
    }

    pub fn with_rule(default: T, rule: Rule<T>) -> Self {
        DynamicProperty {
            default,
            rule: Some(rule),
        }
    }

    /// Compute the effective value against `ctx`.
    ///
    /// Returns `default` when there is no rule, when the rule references an
    /// identifier that does not resolve, or when the comparison is not
    /// defined for the values involved. Never errors.
    pub fn resolve<C: ResolutionContext + ?Sized>(&self, ctx: &C) -> T {
        let Some(rule) = &self.rule else {
            return self.default.clone();
        };
        let branch = match rule.condition.evaluate(ctx) {
            Some(true) => &rule.then,
            Some(false) => &rule.otherwise,
            None => return self.default.clone(),
        };
        match branch {
            Outcome::Literal(v) => v.clone(),
            Outcome::UseDefault => self.default.clone(),
        }
    }
}
