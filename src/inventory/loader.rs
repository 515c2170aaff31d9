//! CSV loading for the three inventory tables.
//!
//! Missing files are an error (the config named them); malformed rows
//! are a data-quality issue in the export and are skipped with a
//! warning, never fatal.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use super::{AddressKind, AddressObject, InventoryIndex, PortEntry, PortSpec, Proto};
use crate::config::InventoryConfig;

#[derive(Debug, Deserialize)]
struct AddressRow {
    name: String,
    kind: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct ServiceRow {
    name: String,
    #[serde(default)]
    tcp_ports: String,
    #[serde(default)]
    udp_ports: String,
    #[serde(default)]
    udplite_ports: String,
    #[serde(default)]
    sctp_ports: String,
}

#[derive(Debug, Deserialize)]
struct GroupRow {
    group_name: String,
    #[serde(default)]
    members: String,
}

/// Build the inventory index from the configured table files.
/// Unconfigured tables are simply absent from the index.
pub fn load_index(config: &InventoryConfig) -> Result<InventoryIndex> {
    let mut index = InventoryIndex::new();

    if let Some(path) = &config.addresses {
        load_addresses(path, &mut index)?;
    }
    if let Some(path) = &config.services {
        load_services(path, &mut index)?;
    }
    if let Some(path) = &config.service_groups {
        load_groups(path, &mut index)?;
    }

    Ok(index)
}

fn load_addresses(path: &Path, index: &mut InventoryIndex) -> Result<()> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open address table: {}", path.display()))?;

    let mut loaded = 0usize;
    for row in reader.deserialize() {
        let row: AddressRow = match row {
            Ok(row) => row,
            Err(err) => {
                warn!(error = %err, "skipping malformed address row");
                continue;
            }
        };
        match parse_address(&row) {
            Some(object) => {
                index.insert_address(object);
                loaded += 1;
            }
            None => warn!(
                name = %row.name,
                kind = %row.kind,
                value = %row.value,
                "skipping unparseable address object"
            ),
        }
    }

    info!(count = loaded, path = %path.display(), "address table loaded");
    Ok(())
}

fn parse_address(row: &AddressRow) -> Option<AddressObject> {
    if row.name.is_empty() {
        return None;
    }
    let value = row.value.trim();
    let kind = match row.kind.as_str() {
        "host" => AddressKind::Host(value.parse().ok()?),
        "subnet" => AddressKind::Subnet(value.parse().ok()?),
        "range" => {
            let (start, end) = value.split_once('-')?;
            AddressKind::Range(start.trim().parse().ok()?, end.trim().parse().ok()?)
        }
        "fqdn" => {
            if value.is_empty() {
                return None;
            }
            AddressKind::Fqdn(value.to_string())
        }
        _ => return None,
    };
    Some(AddressObject {
        name: row.name.clone(),
        kind,
    })
}

fn load_services(path: &Path, index: &mut InventoryIndex) -> Result<()> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open service table: {}", path.display()))?;

    let mut loaded = 0usize;
    for row in reader.deserialize() {
        let row: ServiceRow = match row {
            Ok(row) => row,
            Err(err) => {
                warn!(error = %err, "skipping malformed service row");
                continue;
            }
        };
        if row.name.is_empty() {
            continue;
        }
        let entries = port_entries(&row);
        index.insert_service(row.name, entries);
        loaded += 1;
    }

    info!(count = loaded, path = %path.display(), "service table loaded");
    Ok(())
}

fn port_entries(row: &ServiceRow) -> Vec<PortEntry> {
    let columns = [
        (&row.tcp_ports, Proto::Tcp),
        (&row.udp_ports, Proto::Udp),
        (&row.udplite_ports, Proto::UdpLite),
        (&row.sctp_ports, Proto::Sctp),
    ];

    let mut entries = Vec::new();
    for (raw, proto) in columns {
        for token in raw.split_whitespace() {
            match PortSpec::parse(token) {
                Some(ports) => entries.push(PortEntry { proto, ports }),
                None => warn!(service = %row.name, token, "skipping unparseable port token"),
            }
        }
    }
    entries
}

fn load_groups(path: &Path, index: &mut InventoryIndex) -> Result<()> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open service group table: {}", path.display()))?;

    let mut loaded = 0usize;
    for row in reader.deserialize() {
        let row: GroupRow = match row {
            Ok(row) => row,
            Err(err) => {
                warn!(error = %err, "skipping malformed service group row");
                continue;
            }
        };
        if row.group_name.is_empty() {
            continue;
        }
        let members: Vec<String> = row
            .members
            .split_whitespace()
            .map(str::to_string)
            .collect();
        index.insert_group(row.group_name, members);
        loaded += 1;
    }

    info!(count = loaded, path = %path.display(), "service group table loaded");
    Ok(())
}
