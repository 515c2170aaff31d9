//! Live DNS queries behind a trait, so tests and offline runs can
//! substitute a canned lookup.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use tracing::{debug, warn};

/// Live network queries used by the name resolver.
///
/// Failures and timeouts are not surfaced; a `None` answer advances the
/// caller to its next resolution step.
#[async_trait]
pub trait NameLookup: Send + Sync {
    /// Reverse lookup: address to primary host name.
    async fn reverse(&self, ip: IpAddr) -> Option<String>;

    /// Forward lookup: host name to first address.
    async fn forward(&self, name: &str) -> Option<IpAddr>;
}

/// System-configured DNS resolver with per-query timeout.
pub struct DnsNameLookup {
    resolver: TokioAsyncResolver,
}

impl DnsNameLookup {
    /// Build from the host's resolver configuration. When that cannot
    /// be read, fall back to the library default so a misconfigured
    /// /etc/resolv.conf degrades rather than aborts.
    pub fn new(timeout: Duration) -> Self {
        let (config, mut opts) = match hickory_resolver::system_conf::read_system_conf() {
            Ok((config, opts)) => (config, opts),
            Err(err) => {
                warn!(error = %err, "failed to read system resolver config, using defaults");
                (ResolverConfig::default(), ResolverOpts::default())
            }
        };
        opts.timeout = timeout;
        opts.attempts = 1;

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

#[async_trait]
impl NameLookup for DnsNameLookup {
    async fn reverse(&self, ip: IpAddr) -> Option<String> {
        match self.resolver.reverse_lookup(ip).await {
            Ok(lookup) => lookup
                .iter()
                .next()
                .map(|ptr| ptr.to_string().trim_end_matches('.').to_string()),
            Err(err) => {
                debug!(%ip, error = %err, "reverse lookup failed");
                None
            }
        }
    }

    async fn forward(&self, name: &str) -> Option<IpAddr> {
        match self.resolver.lookup_ip(name).await {
            Ok(lookup) => lookup.iter().next(),
            Err(err) => {
                debug!(name, error = %err, "forward lookup failed");
                None
            }
        }
    }
}
