//! Output stage: CSV export and console table.
//!
//! Rendering is the formatting boundary where the configured display
//! mode applies: `full` keeps the resolver's `name[address]` /
//! `name(ports)` forms, `address` reduces each field to the resolved
//! literal, falling back to the original identifier.

mod table;
mod writer;

pub use table::print_table;
pub use writer::export_csv;

use crate::config::{Column, DisplayMode};
use crate::record::{ResolvedField, ResolvedRecord};

/// Render one column of one record.
pub fn render_value(record: &ResolvedRecord, column: Column, mode: DisplayMode) -> String {
    match column {
        Column::Id => record.record.id.to_string(),
        Column::Name => record.record.name.clone(),
        Column::SrcIntf => record.record.src_intfs.join(", "),
        Column::DstIntf => record.record.dst_intfs.join(", "),
        Column::SrcAddr => join_fields(&record.src_addrs, mode),
        Column::DstAddr => join_fields(&record.dst_addrs, mode),
        Column::Service => join_fields(&record.services, mode),
        Column::Action => record.record.action.as_str().to_string(),
        Column::Status => record.record.status.as_str().to_string(),
        Column::Schedule => record.record.schedule.clone().unwrap_or_default(),
        Column::LogTraffic => record.record.log_traffic.clone().unwrap_or_default(),
    }
}

fn join_fields(fields: &[ResolvedField], mode: DisplayMode) -> String {
    let rendered: Vec<String> = fields
        .iter()
        .map(|field| match mode {
            DisplayMode::Full => field.display.clone(),
            DisplayMode::Address => address_only(field),
        })
        .collect();
    rendered.join(", ")
}

/// Strip a display form down to its resolved literal: the bracket
/// content of `name[address]` or the paren content of `name(ports)`.
/// Anything else falls back to the original identifier.
fn address_only(field: &ResolvedField) -> String {
    for (open, close) in [('[', ']'), ('(', ')')] {
        if let (Some(start), Some(end)) =
            (field.display.find(open), field.display.rfind(close))
        {
            if end > start + 1 {
                return field.display[start + 1..end].to_string();
            }
        }
    }
    field.original.clone()
}
