//! Policy record model.
//!
//! [`PolicyRecord`] is the canonical in-memory shape of one firewall rule
//! as the device API ships it. Records are immutable once fetched; the
//! resolution stage wraps them in [`ResolvedRecord`] views instead of
//! rewriting identifiers in place.

use serde::{Deserialize, Deserializer};

/// Action applied by a policy rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Accept,
    Deny,
}

impl Action {
    /// Wire-format name, as used in filter comparisons and output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Accept => "accept",
            Action::Deny => "deny",
        }
    }
}

/// Administrative status of a policy rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Enable,
    Disable,
}

impl Status {
    /// Wire-format name, as used in filter comparisons and output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Enable => "enable",
            Status::Disable => "disable",
        }
    }
}

/// One firewall policy rule.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyRecord {
    /// Numeric rule identifier
    #[serde(rename = "policyid")]
    pub id: u64,

    /// Rule name
    #[serde(default)]
    pub name: String,

    /// Source interface names
    #[serde(rename = "srcintf", default, deserialize_with = "name_list")]
    pub src_intfs: Vec<String>,

    /// Destination interface names
    #[serde(rename = "dstintf", default, deserialize_with = "name_list")]
    pub dst_intfs: Vec<String>,

    /// Source address object identifiers
    #[serde(rename = "srcaddr", default, deserialize_with = "name_list")]
    pub src_addrs: Vec<String>,

    /// Destination address object identifiers
    #[serde(rename = "dstaddr", default, deserialize_with = "name_list")]
    pub dst_addrs: Vec<String>,

    /// Service identifiers (services or service groups)
    #[serde(rename = "service", default, deserialize_with = "name_list")]
    pub services: Vec<String>,

    /// Rule action
    pub action: Action,

    /// Rule status
    pub status: Status,

    /// Schedule name, when the rule is time-bound
    #[serde(default)]
    pub schedule: Option<String>,

    /// Traffic logging mode
    #[serde(rename = "logtraffic", default)]
    pub log_traffic: Option<String>,
}

/// Reference lists arrive either as `[{"name": "..."}]` objects or as
/// plain strings depending on the endpoint; normalize both to names.
fn name_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Entry {
        Named { name: String },
        Plain(String),
    }

    let entries = Vec::<Entry>::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            Entry::Named { name } => name,
            Entry::Plain(value) => value,
        })
        .collect())
}

/// How an identifier was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Resolved through a live query
    Resolved,
    /// Resolved through the inventory fallback
    Fallback,
    /// Not resolved; display falls back to the original identifier
    Unresolved,
}

/// A resolved view of one identifier.
///
/// `display` is never empty: an unresolved identifier displays as itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    /// Identifier as it appears in the source record
    pub original: String,
    /// Display form chosen by the resolver
    pub display: String,
    /// Resolution outcome
    pub outcome: Resolution,
}

impl ResolvedField {
    /// Field resolved through a live query.
    pub fn resolved(original: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            display: display.into(),
            outcome: Resolution::Resolved,
        }
    }

    /// Field resolved through the inventory fallback.
    pub fn fallback(original: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            display: display.into(),
            outcome: Resolution::Fallback,
        }
    }

    /// Unresolved field; displays as the original identifier.
    pub fn unresolved(original: impl Into<String>) -> Self {
        let original = original.into();
        Self {
            display: original.clone(),
            original,
            outcome: Resolution::Unresolved,
        }
    }
}

/// A policy record augmented with resolved address and service fields.
///
/// Replaces the plain record for downstream consumers; the original
/// identifiers stay reachable through each [`ResolvedField`].
#[derive(Debug, Clone)]
pub struct ResolvedRecord {
    /// The record as fetched
    pub record: PolicyRecord,
    /// Resolved source addresses, one per identifier
    pub src_addrs: Vec<ResolvedField>,
    /// Resolved destination addresses, one per identifier
    pub dst_addrs: Vec<ResolvedField>,
    /// Resolved services, one per identifier
    pub services: Vec<ResolvedField>,
}

impl ResolvedRecord {
    /// View with every field passed through unresolved. Used when a
    /// resolver is disabled or a run is aborted mid-flight.
    pub fn passthrough(record: PolicyRecord) -> Self {
        let unresolved = |idents: &[String]| {
            idents
                .iter()
                .map(|ident| ResolvedField::unresolved(ident.clone()))
                .collect()
        };
        Self {
            src_addrs: unresolved(&record.src_addrs),
            dst_addrs: unresolved(&record.dst_addrs),
            services: unresolved(&record.services),
            record,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_from_api_shape() {
        let json = r#"{
            "policyid": 7,
            "name": "allow-web",
            "srcintf": [{"name": "port1"}],
            "dstintf": [{"name": "port2"}],
            "srcaddr": [{"name": "lan-net"}],
            "dstaddr": [{"name": "all"}],
            "service": [{"name": "HTTPS"}, {"name": "SSH"}],
            "action": "accept",
            "status": "enable",
            "schedule": "always"
        }"#;

        let record: PolicyRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.src_intfs, vec!["port1"]);
        assert_eq!(record.services, vec!["HTTPS", "SSH"]);
        assert_eq!(record.action, Action::Accept);
        assert_eq!(record.status, Status::Enable);
        assert_eq!(record.schedule.as_deref(), Some("always"));
    }

    #[test]
    fn name_list_accepts_plain_strings() {
        let json = r#"{
            "policyid": 1,
            "srcintf": ["port1", "port3"],
            "action": "deny",
            "status": "disable"
        }"#;

        let record: PolicyRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.src_intfs, vec!["port1", "port3"]);
        assert!(record.src_addrs.is_empty());
    }

    #[test]
    fn unresolved_field_displays_as_original() {
        let field = ResolvedField::unresolved("10.0.0.5");
        assert_eq!(field.display, "10.0.0.5");
        assert_eq!(field.outcome, Resolution::Unresolved);
    }
}
