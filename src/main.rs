use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use fwpol::client::DeviceClient;
use fwpol::config::Config;
use fwpol::export;
use fwpol::filter::FilterSpec;
use fwpol::inventory;
use fwpol::pipeline::{Pipeline, PipelineConfig};
use fwpol::resolve::DnsNameLookup;
use fwpol::telemetry::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "fwpol")]
#[command(author, version, about = "Firewall policy export with filtering and symbolic resolution")]
struct Args {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Validate config and exit
    #[arg(long)]
    validate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration first (to get log settings)
    let config = Config::load(&args.config)?;

    init_tracing(&config.telemetry)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %args.config.display(),
        "starting fwpol"
    );

    // Validate only mode
    if args.validate {
        info!("configuration is valid");
        return Ok(());
    }

    let inventory = Arc::new(inventory::load_index(&config.inventory)?);
    let (addresses, services, groups) = inventory.counts();
    info!(addresses, services, groups, "inventory loaded");

    let client = DeviceClient::new(&config.api)?;
    let records = client.fetch_policies().await?;
    if records.is_empty() {
        info!("no policies returned");
        return Ok(());
    }
    info!(count = records.len(), "policies fetched");

    let filter = FilterSpec::compile(&config.filters)?;
    let lookup = Arc::new(DnsNameLookup::new(config.resolve.dns_timeout));
    let pipeline = Pipeline::new(
        filter,
        lookup,
        inventory,
        PipelineConfig::from(&config.resolve),
    );

    let resolved = pipeline.run(records).await;
    if resolved.is_empty() {
        info!("no policies matched filters");
        return Ok(());
    }

    if config.output.csv {
        let path = export::export_csv(&resolved, &config.output, config.resolve.display)?;
        info!(path = %path.display(), "csv exported");
    }
    if config.output.console {
        export::print_table(&resolved, &config.output, config.resolve.display);
    }

    Ok(())
}
