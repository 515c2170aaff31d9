//! Address objects from the device inventory.

use std::net::IpAddr;

use ipnet::IpNet;

/// A named address object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressObject {
    /// Object name (case-sensitive identifier)
    pub name: String,
    /// Literal value
    pub kind: AddressKind,
}

/// Literal value of an address object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressKind {
    /// Single host address
    Host(IpAddr),
    /// CIDR subnet
    Subnet(IpNet),
    /// Inclusive address range
    Range(IpAddr, IpAddr),
    /// Fully qualified domain name
    Fqdn(String),
}

impl AddressObject {
    /// Whether this object covers the given address.
    pub fn contains(&self, ip: IpAddr) -> bool {
        match &self.kind {
            AddressKind::Host(host) => *host == ip,
            AddressKind::Subnet(net) => net.contains(&ip),
            AddressKind::Range(start, end) => in_range(ip, *start, *end),
            AddressKind::Fqdn(_) => false,
        }
    }

    /// Reference string shown when this object resolves a name:
    /// the host address, CIDR, range, or FQDN literal.
    pub fn literal(&self) -> String {
        match &self.kind {
            AddressKind::Host(host) => host.to_string(),
            AddressKind::Subnet(net) => net.to_string(),
            AddressKind::Range(start, end) => format!("{start}-{end}"),
            AddressKind::Fqdn(name) => name.clone(),
        }
    }

    /// Ordering key so the most specific covering object wins a reverse
    /// search: hosts and ranges over subnets, longer prefixes first.
    pub(super) fn specificity(&self) -> u8 {
        match &self.kind {
            AddressKind::Host(_) => u8::MAX,
            AddressKind::Range(_, _) => u8::MAX - 1,
            AddressKind::Subnet(net) => net.prefix_len(),
            AddressKind::Fqdn(_) => 0,
        }
    }
}

fn in_range(ip: IpAddr, start: IpAddr, end: IpAddr) -> bool {
    match (ip, start, end) {
        (IpAddr::V4(ip), IpAddr::V4(start), IpAddr::V4(end)) => start <= ip && ip <= end,
        (IpAddr::V6(ip), IpAddr::V6(start), IpAddr::V6(end)) => start <= ip && ip <= end,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subnet(name: &str, cidr: &str) -> AddressObject {
        AddressObject {
            name: name.to_string(),
            kind: AddressKind::Subnet(cidr.parse().unwrap()),
        }
    }

    #[test]
    fn subnet_containment() {
        let object = subnet("lan", "10.20.0.0/16");
        assert!(object.contains("10.20.99.7".parse().unwrap()));
        assert!(!object.contains("10.21.0.1".parse().unwrap()));
    }

    #[test]
    fn range_containment_is_inclusive() {
        let object = AddressObject {
            name: "pool".to_string(),
            kind: AddressKind::Range("10.0.0.10".parse().unwrap(), "10.0.0.20".parse().unwrap()),
        };
        assert!(object.contains("10.0.0.10".parse().unwrap()));
        assert!(object.contains("10.0.0.20".parse().unwrap()));
        assert!(!object.contains("10.0.0.21".parse().unwrap()));
    }

    #[test]
    fn fqdn_never_contains_addresses() {
        let object = AddressObject {
            name: "site".to_string(),
            kind: AddressKind::Fqdn("www.example.com".to_string()),
        };
        assert!(!object.contains("93.184.216.34".parse().unwrap()));
        assert_eq!(object.literal(), "www.example.com");
    }
}
