//! Rule evaluation over policy records.

use std::borrow::Cow;

use super::spec::{Field, FilterRule, FilterSpec};
use crate::record::PolicyRecord;

/// A record field is either a single value or a list of identifiers.
enum FieldValue<'a> {
    Scalar(Cow<'a, str>),
    Many(&'a [String]),
}

fn field_value<'a>(field: Field, record: &'a PolicyRecord) -> FieldValue<'a> {
    match field {
        Field::PolicyId => FieldValue::Scalar(Cow::Owned(record.id.to_string())),
        Field::Name => FieldValue::Scalar(Cow::Borrowed(&record.name)),
        Field::SrcIntf => FieldValue::Many(&record.src_intfs),
        Field::DstIntf => FieldValue::Many(&record.dst_intfs),
        Field::SrcAddr => FieldValue::Many(&record.src_addrs),
        Field::DstAddr => FieldValue::Many(&record.dst_addrs),
        Field::Service => FieldValue::Many(&record.services),
        Field::Action => FieldValue::Scalar(Cow::Borrowed(record.action.as_str())),
        Field::Status => FieldValue::Scalar(Cow::Borrowed(record.status.as_str())),
    }
}

/// Evaluate one rule against one record field.
///
/// List semantics: `Equals` and `In` pass when any element matches;
/// `NotIn` rejects when any element is in the forbidden set, so a record
/// survives only if every element stays clear of it.
fn eval(field: Field, rule: &FilterRule, record: &PolicyRecord) -> bool {
    match field_value(field, record) {
        FieldValue::Scalar(value) => match rule {
            FilterRule::Equals(expected) => value.as_ref() == expected,
            FilterRule::In(set) => set.contains(value.as_ref()),
            FilterRule::NotIn(set) => !set.contains(value.as_ref()),
        },
        FieldValue::Many(items) => match rule {
            FilterRule::Equals(expected) => items.iter().any(|item| item == expected),
            FilterRule::In(set) => items.iter().any(|item| set.contains(item)),
            FilterRule::NotIn(set) => items.iter().all(|item| !set.contains(item)),
        },
    }
}

impl FilterSpec {
    /// Whether a record passes every configured rule.
    pub fn matches(&self, record: &PolicyRecord) -> bool {
        self.rules
            .iter()
            .all(|(field, rule)| eval(*field, rule, record))
    }

    /// Apply the spec to a record set, preserving input order.
    pub fn apply(&self, records: Vec<PolicyRecord>) -> Vec<PolicyRecord> {
        if self.is_empty() {
            return records;
        }
        records
            .into_iter()
            .filter(|record| self.matches(record))
            .collect()
    }
}
