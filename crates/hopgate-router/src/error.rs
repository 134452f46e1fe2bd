//! Error types for rule management and upstream connects

use thiserror::Error;

/// Errors surfaced to the operator when a routing command cannot be applied.
///
/// Every variant aborts only the requested mutation; the rule store is left
/// untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoutingError {
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("invalid priority: {0}")]
    InvalidPriority(String),

    #[error("invalid command arguments: {0}")]
    Usage(String),
}

impl RoutingError {
    pub fn invalid_target(msg: impl Into<String>) -> Self {
        Self::InvalidTarget(msg.into())
    }

    pub fn invalid_priority(msg: impl Into<String>) -> Self {
        Self::InvalidPriority(msg.into())
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }
}

/// Hostname resolution failures
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to resolve {host}: {source}")]
    Lookup {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no addresses found for {0}")]
    NoAddress(String),
}

/// Failures of an actual connect attempt through a handler
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("connection to {host}:{port} rejected by routing rule")]
    Rejected { host: String, port: u16 },

    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection to {0} timed out")]
    Timeout(String),

    #[error("SOCKS error: {0}")]
    Socks(#[from] tokio_socks::Error),

    #[error("SOCKS4 cannot reach IPv6 target {0}")]
    Socks4Ipv6(std::net::SocketAddr),
}
