//! Pipeline orchestration over the record set.
//!
//! ```text
//! records ──> Filter Engine ──> per-record resolution ──> ResolvedRecord
//!                               (semaphore-bounded,
//!                                order preserved)
//! ```
//!
//! Filtering is cheap and runs inline. Resolution may block on DNS, so
//! surviving records fan out across tasks bounded by the configured
//! concurrency limit; results are collected in spawn order, so output
//! order always matches post-filter input order. An abort signal (or
//! the run-level timeout) stops new queries and flushes what remains
//! as unresolved.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Semaphore};
use tracing::{info, warn};

use crate::filter::FilterSpec;
use crate::inventory::InventoryIndex;
use crate::record::{PolicyRecord, ResolvedField, ResolvedRecord};
use crate::resolve::{NameLookup, NameResolver, ServiceResolver};

/// Settings for the resolution stage.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Send src/dst address identifiers through the name resolver
    pub resolve_addresses: bool,
    /// Send service identifiers through the service resolver
    pub resolve_services: bool,
    /// Maximum records resolving concurrently
    pub concurrency: usize,
    /// Deadline for the whole resolution stage
    pub run_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            resolve_addresses: true,
            resolve_services: true,
            concurrency: 16,
            run_timeout: None,
        }
    }
}

impl From<&crate::config::ResolveConfig> for PipelineConfig {
    fn from(config: &crate::config::ResolveConfig) -> Self {
        Self {
            resolve_addresses: config.addresses,
            resolve_services: config.services,
            concurrency: config.concurrency,
            run_timeout: config.run_timeout,
        }
    }
}

/// Sequences filter and resolution stages over a record set.
pub struct Pipeline {
    filter: FilterSpec,
    names: Arc<NameResolver>,
    services: Arc<ServiceResolver>,
    config: PipelineConfig,
    cancel: Arc<watch::Sender<bool>>,
}

impl Pipeline {
    pub fn new(
        filter: FilterSpec,
        lookup: Arc<dyn NameLookup>,
        inventory: Arc<InventoryIndex>,
        config: PipelineConfig,
    ) -> Self {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let names = Arc::new(NameResolver::new(lookup, inventory.clone(), cancel_rx));
        let services = Arc::new(ServiceResolver::new(inventory));

        Self {
            filter,
            names,
            services,
            config,
            cancel: Arc::new(cancel_tx),
        }
    }

    /// Stop issuing new resolution queries. Records still in flight
    /// flush with their remaining fields unresolved.
    pub fn abort(&self) {
        let _ = self.cancel.send(true);
    }

    /// Run the pipeline. Output order matches input order after
    /// filtering, regardless of resolution concurrency.
    pub async fn run(&self, records: Vec<PolicyRecord>) -> Vec<ResolvedRecord> {
        let fetched = records.len();
        let records = self.filter.apply(records);
        info!(fetched, kept = records.len(), "filters applied");

        let deadline = self.config.run_timeout.map(|timeout| {
            let cancel = self.cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                warn!(?timeout, "run timeout reached, aborting resolution");
                let _ = cancel.send(true);
            })
        });

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut tasks = Vec::with_capacity(records.len());
        for record in records {
            let semaphore = semaphore.clone();
            let names = self.names.clone();
            let services = self.services.clone();
            let resolve_addresses = self.config.resolve_addresses;
            let resolve_services = self.config.resolve_services;
            // kept so a failed task still yields its record downstream
            let fallback = record.clone();

            let task = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                resolve_record(record, &names, &services, resolve_addresses, resolve_services)
                    .await
            });
            tasks.push((fallback, task));
        }

        // Awaiting in spawn order keeps output aligned with input.
        let mut out = Vec::with_capacity(tasks.len());
        for (fallback, task) in tasks {
            match task.await {
                Ok(resolved) => out.push(resolved),
                Err(err) => {
                    warn!(id = fallback.id, error = %err, "resolution task failed, flushing record unresolved");
                    out.push(ResolvedRecord::passthrough(fallback));
                }
            }
        }

        if let Some(handle) = deadline {
            handle.abort();
        }

        out
    }
}

async fn resolve_record(
    record: PolicyRecord,
    names: &NameResolver,
    services: &ServiceResolver,
    resolve_addresses: bool,
    resolve_services: bool,
) -> ResolvedRecord {
    let src_addrs = resolve_address_list(&record.src_addrs, names, resolve_addresses).await;
    let dst_addrs = resolve_address_list(&record.dst_addrs, names, resolve_addresses).await;

    let service_fields = record
        .services
        .iter()
        .map(|ident| {
            if resolve_services {
                services.resolve(ident)
            } else {
                ResolvedField::unresolved(ident.clone())
            }
        })
        .collect();

    ResolvedRecord {
        src_addrs,
        dst_addrs,
        services: service_fields,
        record,
    }
}

async fn resolve_address_list(
    idents: &[String],
    names: &NameResolver,
    enabled: bool,
) -> Vec<ResolvedField> {
    let mut out = Vec::with_capacity(idents.len());
    for ident in idents {
        if enabled {
            out.push(names.resolve(ident).await);
        } else {
            out.push(ResolvedField::unresolved(ident.clone()));
        }
    }
    out
}
