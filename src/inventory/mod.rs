//! Inventory tables exported from the device.
//!
//! Three mappings, all keyed by case-sensitive identifier and built once
//! per run: address objects, custom services, and service groups. The
//! group table may carry cycles or dangling member references - the
//! resolution stage tolerates both; this module only stores what the
//! export produced.

mod address;
mod loader;
mod service;

pub use address::{AddressKind, AddressObject};
pub use loader::load_index;
pub use service::{PortEntry, PortSpec, Proto};

use std::collections::HashMap;
use std::net::IpAddr;

/// Read-only lookup structures over the three inventory tables.
#[derive(Debug, Default)]
pub struct InventoryIndex {
    addresses: Vec<AddressObject>,
    address_by_name: HashMap<String, usize>,
    services: HashMap<String, Vec<PortEntry>>,
    groups: HashMap<String, Vec<String>>,
}

impl InventoryIndex {
    /// Empty index; resolvers fall straight through to "unresolved".
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an address object. The first object under a given name
    /// wins; duplicates in the export are ignored.
    pub fn insert_address(&mut self, object: AddressObject) {
        let index = self.addresses.len();
        if let std::collections::hash_map::Entry::Vacant(entry) =
            self.address_by_name.entry(object.name.clone())
        {
            entry.insert(index);
            self.addresses.push(object);
        }
    }

    /// Register a custom service and its port entries.
    pub fn insert_service(&mut self, name: impl Into<String>, entries: Vec<PortEntry>) {
        self.services.insert(name.into(), entries);
    }

    /// Register a service group and its member identifiers.
    pub fn insert_group(&mut self, name: impl Into<String>, members: Vec<String>) {
        self.groups.insert(name.into(), members);
    }

    /// Name of the most specific address object covering `ip`.
    pub fn find_name_for_ip(&self, ip: IpAddr) -> Option<&str> {
        self.addresses
            .iter()
            .filter(|object| object.contains(ip))
            .max_by_key(|object| object.specificity())
            .map(|object| object.name.as_str())
    }

    /// Literal reference (address, CIDR, range or FQDN) for an exactly
    /// named object.
    pub fn find_ref_for_name(&self, name: &str) -> Option<String> {
        self.address_by_name
            .get(name)
            .map(|&index| self.addresses[index].literal())
    }

    /// Port entries of a custom service.
    pub fn service(&self, name: &str) -> Option<&[PortEntry]> {
        self.services.get(name).map(Vec::as_slice)
    }

    /// Member identifiers of a service group.
    pub fn group(&self, name: &str) -> Option<&[String]> {
        self.groups.get(name).map(Vec::as_slice)
    }

    /// Table sizes: (addresses, services, groups). For startup logging.
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.addresses.len(), self.services.len(), self.groups.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> InventoryIndex {
        let mut index = InventoryIndex::new();
        index.insert_address(AddressObject {
            name: "corp-net".to_string(),
            kind: AddressKind::Subnet("10.0.0.0/8".parse().unwrap()),
        });
        index.insert_address(AddressObject {
            name: "branch-net".to_string(),
            kind: AddressKind::Subnet("10.20.0.0/16".parse().unwrap()),
        });
        index.insert_address(AddressObject {
            name: "db-server".to_string(),
            kind: AddressKind::Host("10.20.5.9".parse().unwrap()),
        });
        index
    }

    #[test]
    fn most_specific_address_wins() {
        let index = index();
        let ip: IpAddr = "10.20.5.9".parse().unwrap();
        assert_eq!(index.find_name_for_ip(ip), Some("db-server"));

        let ip: IpAddr = "10.20.1.1".parse().unwrap();
        assert_eq!(index.find_name_for_ip(ip), Some("branch-net"));

        let ip: IpAddr = "10.99.0.1".parse().unwrap();
        assert_eq!(index.find_name_for_ip(ip), Some("corp-net"));

        let ip: IpAddr = "192.168.0.1".parse().unwrap();
        assert_eq!(index.find_name_for_ip(ip), None);
    }

    #[test]
    fn name_lookup_is_case_sensitive() {
        let index = index();
        assert_eq!(index.find_ref_for_name("db-server").as_deref(), Some("10.20.5.9"));
        assert_eq!(index.find_ref_for_name("DB-Server"), None);
        assert_eq!(
            index.find_ref_for_name("branch-net").as_deref(),
            Some("10.20.0.0/16")
        );
    }

    #[test]
    fn duplicate_address_names_keep_first() {
        let mut index = index();
        index.insert_address(AddressObject {
            name: "db-server".to_string(),
            kind: AddressKind::Host("172.16.0.1".parse().unwrap()),
        });
        assert_eq!(index.find_ref_for_name("db-server").as_deref(), Some("10.20.5.9"));
    }
}
