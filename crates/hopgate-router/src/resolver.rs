//! Hostname resolution used by direct connects

use crate::error::ResolveError;
use async_trait::async_trait;
use std::net::IpAddr;
use tracing::trace;

/// Name resolver consumed by [`DirectConnector`](crate::DirectConnector) and
/// by SOCKS hops that resolve the final target locally.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Resolve a hostname to a single address
    async fn resolve(&self, host: &str) -> Result<IpAddr, ResolveError>;
}

/// Resolver backed by the operating system (via `tokio::net::lookup_host`).
///
/// IPv4 results are preferred since SOCKS4 upstreams cannot carry IPv6.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

#[async_trait]
impl Resolver for SystemResolver {
    async fn resolve(&self, host: &str) -> Result<IpAddr, ResolveError> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(ip);
        }

        trace!("Resolving {}", host);
        let addrs: Vec<IpAddr> = tokio::net::lookup_host((host, 0))
            .await
            .map_err(|source| ResolveError::Lookup {
                host: host.to_string(),
                source,
            })?
            .map(|addr| addr.ip())
            .collect();

        addrs
            .iter()
            .find(|ip| ip.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
            .ok_or_else(|| ResolveError::NoAddress(host.to_string()))
    }
}
