//! Address identifier resolution: DNS first, inventory fallback.

use std::net::IpAddr;
use std::sync::Arc;

use moka::future::Cache;
use tokio::sync::watch;

use super::NameLookup;
use crate::inventory::InventoryIndex;
use crate::record::ResolvedField;

const CACHE_CAPACITY: u64 = 100_000;

/// Resolves address-like identifiers into `name[address]` display form.
///
/// Resolution order for an IP literal: reverse DNS, then the inventory
/// address table, then unresolved. For anything else: forward DNS, then
/// the inventory literal for that exact name, then unresolved. Every
/// outcome is memoized for the lifetime of this resolver; concurrent
/// first access computes an identifier at most once.
pub struct NameResolver {
    lookup: Arc<dyn NameLookup>,
    inventory: Arc<InventoryIndex>,
    cancelled: watch::Receiver<bool>,
    cache: Cache<String, ResolvedField>,
}

impl NameResolver {
    pub fn new(
        lookup: Arc<dyn NameLookup>,
        inventory: Arc<InventoryIndex>,
        cancelled: watch::Receiver<bool>,
    ) -> Self {
        Self {
            lookup,
            inventory,
            cancelled,
            cache: Cache::new(CACHE_CAPACITY),
        }
    }

    /// Resolve one identifier. Never fails; the worst outcome is the
    /// identifier displayed as itself.
    pub async fn resolve(&self, ident: &str) -> ResolvedField {
        self.cache
            .get_with(ident.to_string(), self.resolve_uncached(ident))
            .await
    }

    async fn resolve_uncached(&self, ident: &str) -> ResolvedField {
        // Aborted runs stop issuing queries; fields flush as unresolved.
        if *self.cancelled.borrow() {
            return ResolvedField::unresolved(ident);
        }

        if let Ok(ip) = ident.parse::<IpAddr>() {
            if let Some(host) = self.unless_cancelled(self.lookup.reverse(ip)).await {
                return ResolvedField::resolved(ident, format!("{host}[{ident}]"));
            }
            // A query aborted mid-flight flushes unresolved, not as a
            // fallback hit.
            if *self.cancelled.borrow() {
                return ResolvedField::unresolved(ident);
            }
            if let Some(name) = self.inventory.find_name_for_ip(ip) {
                return ResolvedField::fallback(ident, format!("{name}[{ident}]"));
            }
            return ResolvedField::unresolved(ident);
        }

        if let Some(ip) = self.unless_cancelled(self.lookup.forward(ident)).await {
            return ResolvedField::resolved(ident, format!("{ident}[{ip}]"));
        }
        if *self.cancelled.borrow() {
            return ResolvedField::unresolved(ident);
        }
        if let Some(reference) = self.inventory.find_ref_for_name(ident) {
            return ResolvedField::fallback(ident, format!("{ident}[{reference}]"));
        }
        ResolvedField::unresolved(ident)
    }

    /// Race a lookup against the abort signal, so an in-flight query
    /// cannot outlive a cancelled run. A dropped sender means no abort
    /// will ever come; the lookup then runs to completion.
    async fn unless_cancelled<T>(
        &self,
        lookup: impl std::future::Future<Output = Option<T>>,
    ) -> Option<T> {
        let mut cancelled = self.cancelled.clone();
        tokio::select! {
            result = lookup => result,
            _ = async {
                if cancelled.changed().await.is_err() {
                    std::future::pending::<()>().await;
                }
            } => None,
        }
    }
}
