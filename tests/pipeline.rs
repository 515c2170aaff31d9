//! End-to-end pipeline tests: inventory tables loaded from disk, a
//! canned DNS lookup, filters compiled from YAML, and the full
//! filter-then-resolve flow over a realistic record set.

use std::collections::{BTreeMap, HashMap};
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use fwpol::config::{Column, DisplayMode, InventoryConfig, OutputConfig};
use fwpol::export;
use fwpol::filter::{FilterSpec, RuleConfig};
use fwpol::inventory::load_index;
use fwpol::pipeline::{Pipeline, PipelineConfig};
use fwpol::record::{PolicyRecord, Resolution};
use fwpol::resolve::NameLookup;

struct StaticDns {
    reverse: HashMap<IpAddr, String>,
}

#[async_trait]
impl NameLookup for StaticDns {
    async fn reverse(&self, ip: IpAddr) -> Option<String> {
        self.reverse.get(&ip).cloned()
    }

    async fn forward(&self, _name: &str) -> Option<IpAddr> {
        None
    }
}

fn write_inventory(dir: &Path) -> InventoryConfig {
    std::fs::write(
        dir.join("addresses.csv"),
        "name,kind,value\n\
         branch-net,subnet,10.20.0.0/16\n\
         web-srv,host,203.0.113.7\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("services.csv"),
        "name,tcp_ports,udp_ports,udplite_ports,sctp_ports\n\
         WEB,80 81 82 90,,,\n\
         DNS,53,53,,\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("groups.csv"),
        "group_name,members\n\
         G-ALL,WEB DNS\n\
         G-LOOP,G-LOOP\n",
    )
    .unwrap();

    InventoryConfig {
        addresses: Some(dir.join("addresses.csv")),
        services: Some(dir.join("services.csv")),
        service_groups: Some(dir.join("groups.csv")),
    }
}

fn records() -> Vec<PolicyRecord> {
    let build = |json: serde_json::Value| serde_json::from_value::<PolicyRecord>(json).unwrap();
    vec![
        build(serde_json::json!({
            "policyid": 1,
            "name": "allow-web",
            "srcintf": [{"name": "port1"}],
            "dstintf": [{"name": "wan1"}],
            "srcaddr": [{"name": "10.20.5.9"}],
            "dstaddr": [{"name": "web-srv"}],
            "service": [{"name": "WEB"}],
            "action": "accept",
            "status": "enable"
        })),
        build(serde_json::json!({
            "policyid": 2,
            "name": "old-rule",
            "srcintf": [{"name": "port1"}],
            "dstintf": [{"name": "wan1"}],
            "srcaddr": [{"name": "all"}],
            "dstaddr": [{"name": "all"}],
            "service": [{"name": "ALL"}],
            "action": "accept",
            "status": "disable"
        })),
        build(serde_json::json!({
            "policyid": 3,
            "name": "groups-and-misses",
            "srcintf": [{"name": "port2"}],
            "dstintf": [{"name": "wan1"}],
            "srcaddr": [{"name": "10.20.77.1"}],
            "dstaddr": [{"name": "no-such-object"}],
            "service": [{"name": "G-ALL"}, {"name": "G-LOOP"}, {"name": "MYSTERY"}],
            "action": "deny",
            "status": "enable"
        })),
    ]
}

fn filter(yaml: &str) -> FilterSpec {
    let config: BTreeMap<String, RuleConfig> = serde_yaml::from_str(yaml).unwrap();
    FilterSpec::compile(&config).unwrap()
}

fn pipeline(dir: &Path, spec: FilterSpec) -> Pipeline {
    let inventory = Arc::new(load_index(&write_inventory(dir)).unwrap());
    let dns = StaticDns {
        reverse: HashMap::from([(
            "10.20.5.9".parse().unwrap(),
            "db1.example.net".to_string(),
        )]),
    };
    Pipeline::new(spec, Arc::new(dns), inventory, PipelineConfig::default())
}

#[tokio::test]
async fn filters_then_resolves_with_fallbacks() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path(), filter("status: { not_in: [disable] }"));

    let resolved = pipeline.run(records()).await;

    // record 2 is disabled; order of the survivors is preserved
    let ids: Vec<u64> = resolved.iter().map(|r| r.record.id).collect();
    assert_eq!(ids, vec![1, 3]);

    let first = &resolved[0];
    // PTR hit
    assert_eq!(first.src_addrs[0].display, "db1.example.net[10.20.5.9]");
    assert_eq!(first.src_addrs[0].outcome, Resolution::Resolved);
    // no PTR, no DNS for the name, but the inventory knows the literal
    assert_eq!(first.dst_addrs[0].display, "web-srv[203.0.113.7]");
    assert_eq!(first.dst_addrs[0].outcome, Resolution::Fallback);
    // contiguous ports compress, the isolated one stands alone
    assert_eq!(first.services[0].display, "WEB(80-82/tcp 90/tcp)");

    let second = &resolved[1];
    // no PTR record, but the IP falls inside a subnet object
    assert_eq!(second.src_addrs[0].display, "branch-net[10.20.77.1]");
    assert_eq!(second.src_addrs[0].outcome, Resolution::Fallback);
    // nothing anywhere knows this name
    assert_eq!(second.dst_addrs[0].display, "no-such-object");
    assert_eq!(second.dst_addrs[0].outcome, Resolution::Unresolved);
    // group expansion, cycle tolerance, and a miss, side by side
    assert_eq!(
        second.services[0].display,
        "G-ALL(53/tcp 80-82/tcp 90/tcp 53/udp)"
    );
    assert_eq!(second.services[1].display, "G-LOOP()");
    assert_eq!(second.services[2].display, "MYSTERY");
    assert_eq!(second.services[2].outcome, Resolution::Unresolved);
}

#[tokio::test]
async fn address_display_mode_renders_literals() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path(), FilterSpec::default());

    let resolved = pipeline.run(records()).await;

    let output = OutputConfig {
        columns: vec![Column::Id, Column::SrcAddr, Column::DstAddr, Column::Service],
        ..OutputConfig::default()
    };
    let rendered = export::render_value(&resolved[0], Column::DstAddr, DisplayMode::Address);
    assert_eq!(rendered, "203.0.113.7");
    let rendered = export::render_value(&resolved[0], Column::SrcAddr, DisplayMode::Address);
    assert_eq!(rendered, "10.20.5.9");

    // CSV carries the full display forms
    let dir = tempfile::tempdir().unwrap();
    let output = OutputConfig {
        dir: dir.path().to_path_buf(),
        filename: Some("policies.csv".to_string()),
        ..output
    };
    let path = export::export_csv(&resolved, &output, DisplayMode::Full).unwrap();
    let contents = std::fs::read_to_string(path).unwrap();
    assert!(contents.starts_with("policyid,srcaddr,dstaddr,service\n"));
    assert!(contents.contains("db1.example.net[10.20.5.9]"));
    assert!(contents.contains("WEB(80-82/tcp 90/tcp)"));
}
