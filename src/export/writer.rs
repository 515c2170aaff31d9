//! CSV export.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;

use super::render_value;
use crate::config::{DisplayMode, OutputConfig};
use crate::record::ResolvedRecord;

/// Write the record set as CSV and return the file path.
pub fn export_csv(
    records: &[ResolvedRecord],
    config: &OutputConfig,
    mode: DisplayMode,
) -> Result<PathBuf> {
    fs::create_dir_all(&config.dir).with_context(|| {
        format!("failed to create output dir: {}", config.dir.display())
    })?;

    let filename = config.filename.clone().unwrap_or_else(|| {
        format!(
            "firewall_policies_{}.csv",
            Local::now().format("%Y%m%d_%H%M%S")
        )
    });
    let path = config.dir.join(filename);

    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("failed to create csv file: {}", path.display()))?;

    writer.write_record(config.columns.iter().map(|column| column.header()))?;
    for record in records {
        writer.write_record(
            config
                .columns
                .iter()
                .map(|column| render_value(record, *column, mode)),
        )?;
    }
    writer.flush()?;

    Ok(path)
}
