//! Predicate-based policy filtering.
//!
//! A [`FilterSpec`] is compiled once from configuration - unknown fields
//! and malformed rule bodies fail at compile time, before any record is
//! evaluated - and then applied to the fetched record set. Rules combine
//! with logical AND; a field without a rule is unconstrained.

mod engine;
mod spec;

pub use spec::{Field, FilterError, FilterRule, FilterSpec, RuleConfig};
