//! Service identifier resolution: group expansion and range compression.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use moka::sync::Cache;
use tracing::warn;

use crate::inventory::{InventoryIndex, Proto};
use crate::record::ResolvedField;

const CACHE_CAPACITY: u64 = 100_000;

/// Resolves service and service-group identifiers into
/// `name(port/proto ...)` display form.
///
/// Groups expand recursively; an identifier reappearing in its own
/// ancestry contributes nothing, so cyclic group data terminates with a
/// warning instead of looping. Expansion is pure in-memory work - no
/// network, no failure mode beyond "unresolved".
pub struct ServiceResolver {
    inventory: Arc<InventoryIndex>,
    cache: Cache<String, ResolvedField>,
}

impl ServiceResolver {
    pub fn new(inventory: Arc<InventoryIndex>) -> Self {
        Self {
            inventory,
            cache: Cache::new(CACHE_CAPACITY),
        }
    }

    /// Resolve one identifier. Unknown identifiers display as themselves.
    pub fn resolve(&self, ident: &str) -> ResolvedField {
        self.cache
            .get_with(ident.to_string(), || self.resolve_uncached(ident))
    }

    fn resolve_uncached(&self, ident: &str) -> ResolvedField {
        let mut ancestry = HashSet::new();
        let mut pairs = BTreeSet::new();

        if !self.expand(ident, &mut ancestry, &mut pairs) {
            return ResolvedField::unresolved(ident);
        }

        let tokens = compress(&pairs);
        ResolvedField::resolved(ident, format!("{ident}({})", tokens.join(" ")))
    }

    /// Collect the (proto, port) pairs an identifier contributes.
    /// Returns false when it names neither a service nor a group.
    fn expand(
        &self,
        ident: &str,
        ancestry: &mut HashSet<String>,
        out: &mut BTreeSet<(Proto, u16)>,
    ) -> bool {
        if let Some(entries) = self.inventory.service(ident) {
            for entry in entries {
                for port in entry.ports.iter() {
                    out.insert((entry.proto, port));
                }
            }
            return true;
        }

        if let Some(members) = self.inventory.group(ident) {
            if !ancestry.insert(ident.to_string()) {
                warn!(group = ident, "cyclic service group reference, skipping");
                return true;
            }
            for member in members {
                if !self.expand(member, ancestry, out) {
                    warn!(group = ident, member = %member, "dangling service group member");
                }
            }
            ancestry.remove(ident);
            return true;
        }

        false
    }
}

/// Collapse a sorted (proto, port) set into minimal `port/proto` and
/// `start-end/proto` tokens: maximal contiguous runs merge, isolated
/// ports stand alone. Ports ascend within each protocol; protocols
/// follow [`Proto`] order.
fn compress(pairs: &BTreeSet<(Proto, u16)>) -> Vec<String> {
    let mut out = Vec::new();
    let mut iter = pairs.iter().peekable();

    while let Some(&(proto, start)) = iter.next() {
        let mut end = start;
        while let Some(&&(next_proto, next_port)) = iter.peek() {
            if next_proto == proto && end < u16::MAX && next_port == end + 1 {
                end = next_port;
                iter.next();
            } else {
                break;
            }
        }
        if start == end {
            out.push(format!("{start}/{}", proto.as_str()));
        } else {
            out.push(format!("{start}-{end}/{}", proto.as_str()));
        }
    }

    out
}
