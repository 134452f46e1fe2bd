//! Connection handlers stored in routing entries

use crate::direct::DirectConnector;
use crate::error::ConnectError;
use crate::socks::SocksHop;
use tokio::net::TcpStream;
use tracing::debug;

/// Which kind of upstream path a handler takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Reject,
    Direct,
    SocksHop,
}

/// The upstream path a routing entry sends matching connections through
#[derive(Debug)]
pub enum ConnectionHandler {
    /// Every connect fails
    Reject,
    /// Plain TCP to the original target
    Direct(DirectConnector),
    /// Relay through an upstream SOCKS server
    SocksHop(SocksHop),
}

impl ConnectionHandler {
    pub fn kind(&self) -> HandlerKind {
        match self {
            ConnectionHandler::Reject => HandlerKind::Reject,
            ConnectionHandler::Direct(_) => HandlerKind::Direct,
            ConnectionHandler::SocksHop(_) => HandlerKind::SocksHop,
        }
    }

    pub fn as_socks_hop(&self) -> Option<&SocksHop> {
        match self {
            ConnectionHandler::SocksHop(hop) => Some(hop),
            _ => None,
        }
    }

    /// Open a connection to `host:port` along this handler's path
    pub async fn connect(&self, host: &str, port: u16) -> Result<TcpStream, ConnectError> {
        match self {
            ConnectionHandler::Reject => {
                debug!("Rejecting connection to {}:{}", host, port);
                Err(ConnectError::Rejected {
                    host: host.to_string(),
                    port,
                })
            }
            ConnectionHandler::Direct(direct) => direct.connect(host, port).await,
            ConnectionHandler::SocksHop(hop) => hop.connect(host, port).await,
        }
    }
}

impl std::fmt::Display for ConnectionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionHandler::Reject => write!(f, "reject"),
            ConnectionHandler::Direct(_) => write!(f, "direct"),
            ConnectionHandler::SocksHop(hop) => write!(f, "{}", hop),
        }
    }
}
