//! Filter specification: recognized fields, rule shapes, compilation.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use thiserror::Error;

/// Record fields a filter rule may address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    PolicyId,
    Name,
    SrcIntf,
    DstIntf,
    SrcAddr,
    DstAddr,
    Service,
    Action,
    Status,
}

impl Field {
    /// Configuration name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::PolicyId => "policyid",
            Field::Name => "name",
            Field::SrcIntf => "srcintf",
            Field::DstIntf => "dstintf",
            Field::SrcAddr => "srcaddr",
            Field::DstAddr => "dstaddr",
            Field::Service => "service",
            Field::Action => "action",
            Field::Status => "status",
        }
    }

    fn parse(name: &str) -> Option<Field> {
        match name {
            "policyid" | "id" => Some(Field::PolicyId),
            "name" => Some(Field::Name),
            "srcintf" => Some(Field::SrcIntf),
            "dstintf" => Some(Field::DstIntf),
            "srcaddr" => Some(Field::SrcAddr),
            "dstaddr" => Some(Field::DstAddr),
            "service" => Some(Field::Service),
            "action" => Some(Field::Action),
            "status" => Some(Field::Status),
            _ => None,
        }
    }
}

/// One rule body as written in configuration.
///
/// Exactly one of the three variants must be set; empty values are a
/// configuration error, not a match-everything rule.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Exact match on the value (any element for list fields)
    #[serde(default)]
    pub equals: Option<String>,

    /// Membership in the set (any element for list fields)
    #[serde(default, rename = "in")]
    pub in_: Option<Vec<String>>,

    /// Rejection set: no element of the field may appear in it
    #[serde(default)]
    pub not_in: Option<Vec<String>>,
}

/// Compiled predicate for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterRule {
    Equals(String),
    In(BTreeSet<String>),
    NotIn(BTreeSet<String>),
}

/// Filter configuration errors, raised at compile time.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("unknown filter field: {0}")]
    UnknownField(String),

    #[error("filter rule for '{0}' must set exactly one of equals/in/not_in")]
    AmbiguousRule(String),

    #[error("filter rule for '{0}' has an empty value")]
    EmptyRule(String),
}

/// A compiled set of per-field predicates, AND-combined.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    pub(super) rules: Vec<(Field, FilterRule)>,
}

impl FilterSpec {
    /// Compile rule configuration into a spec.
    ///
    /// Fails on unknown field names, rule bodies that set zero or more
    /// than one variant, and empty values.
    pub fn compile(config: &BTreeMap<String, RuleConfig>) -> Result<Self, FilterError> {
        let mut rules = Vec::with_capacity(config.len());

        for (name, rule) in config {
            let field =
                Field::parse(name).ok_or_else(|| FilterError::UnknownField(name.clone()))?;

            let set_count = usize::from(rule.equals.is_some())
                + usize::from(rule.in_.is_some())
                + usize::from(rule.not_in.is_some());
            if set_count != 1 {
                return Err(FilterError::AmbiguousRule(name.clone()));
            }

            let compiled = if let Some(value) = &rule.equals {
                if value.is_empty() {
                    return Err(FilterError::EmptyRule(name.clone()));
                }
                FilterRule::Equals(value.clone())
            } else if let Some(values) = &rule.in_ {
                FilterRule::In(Self::compile_set(name, values)?)
            } else if let Some(values) = &rule.not_in {
                FilterRule::NotIn(Self::compile_set(name, values)?)
            } else {
                unreachable!("set_count == 1 guarantees one variant");
            };

            rules.push((field, compiled));
        }

        Ok(Self { rules })
    }

    fn compile_set(name: &str, values: &[String]) -> Result<BTreeSet<String>, FilterError> {
        if values.is_empty() || values.iter().any(String::is_empty) {
            return Err(FilterError::EmptyRule(name.to_string()));
        }
        Ok(values.iter().cloned().collect())
    }

    /// Number of configured rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when no rules are configured (everything passes).
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
