//! Direct TCP connects to the original target

use crate::context::RouterContext;
use crate::error::ConnectError;
use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpStream;
use tracing::trace;

/// Connection handler that opens a plain TCP connection to the target.
///
/// Holds no socket until [`connect`](Self::connect) is called.
#[derive(Debug, Clone)]
pub struct DirectConnector {
    ctx: RouterContext,
}

impl DirectConnector {
    pub fn new(ctx: RouterContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &RouterContext {
        &self.ctx
    }

    /// Resolve `host` (IP literals skip the resolver) and connect within the
    /// context's connect timeout.
    pub async fn connect(&self, host: &str, port: u16) -> Result<TcpStream, ConnectError> {
        let ip = match host.parse::<IpAddr>() {
            Ok(ip) => ip,
            Err(_) => self.ctx.resolver().resolve(host).await?,
        };
        let addr = SocketAddr::new(ip, port);

        trace!("Connecting directly to {} ({})", host, addr);
        tokio::time::timeout(self.ctx.connect_timeout(), TcpStream::connect(addr))
            .await
            .map_err(|_| ConnectError::Timeout(addr.to_string()))?
            .map_err(ConnectError::from)
    }
}
