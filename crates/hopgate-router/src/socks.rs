//! SOCKS upstream hop
//!
//! A [`SocksHop`] relays through one upstream SOCKS server. Its transport is a
//! [`DirectConnector`] to the upstream itself; the handshake is delegated to
//! `tokio-socks`.

use crate::direct::DirectConnector;
use crate::error::ConnectError;
use std::net::{IpAddr, SocketAddr};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_socks::tcp::socks4::Socks4Stream;
use tokio_socks::tcp::socks5::Socks5Stream;
use tokio_socks::TargetAddr;
use tracing::trace;

/// Longest username or password SOCKS5 can carry
const MAX_CREDENTIAL_LEN: usize = 255;

/// SOCKS protocol revision spoken to the upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocksVersion {
    V4,
    V4a,
    V5,
}

impl SocksVersion {
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::V4 => "socks4",
            Self::V4a => "socks4a",
            Self::V5 => "socks5",
        }
    }

    /// Whether the upstream can be handed a hostname to resolve
    pub fn supports_remote_resolution(&self) -> bool {
        !matches!(self, Self::V4)
    }
}

impl std::str::FromStr for SocksVersion {
    type Err = HopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "4" => Ok(Self::V4),
            "4a" => Ok(Self::V4a),
            "5" => Ok(Self::V5),
            other => Err(HopError::invalid(format!(
                "unknown protocol version '{}' (expected 4, 4a or 5)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for SocksVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V4 => write!(f, "4"),
            Self::V4a => write!(f, "4a"),
            Self::V5 => write!(f, "5"),
        }
    }
}

/// Rejections from the hop's setters
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HopError {
    /// The value itself is malformed or conflicts with other settings
    #[error("{0}")]
    InvalidArgument(String),

    /// The configured protocol revision lacks the requested feature
    #[error("unsupported by {version}: {feature}")]
    UnsupportedCapability {
        version: SocksVersion,
        feature: &'static str,
    },
}

impl HopError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

#[derive(Clone, PartialEq, Eq)]
struct Credentials {
    user: String,
    pass: String,
}

/// Connection handler relaying through an upstream SOCKS server
pub struct SocksHop {
    transport: DirectConnector,
    host: String,
    port: u16,
    protocol_version: Option<SocksVersion>,
    auth: Option<Credentials>,
    resolve_local: bool,
}

impl SocksHop {
    /// New hop towards `host:port`, resolving targets locally until told otherwise
    pub fn new(transport: DirectConnector, host: impl Into<String>, port: u16) -> Self {
        Self {
            transport,
            host: host.into(),
            port,
            protocol_version: None,
            auth: None,
            resolve_local: true,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Explicitly configured version, if any
    pub fn protocol_version(&self) -> Option<SocksVersion> {
        self.protocol_version
    }

    /// Version used on the wire; unspecified means SOCKS5
    pub fn effective_version(&self) -> SocksVersion {
        self.protocol_version.unwrap_or(SocksVersion::V5)
    }

    pub fn user(&self) -> Option<&str> {
        self.auth.as_ref().map(|auth| auth.user.as_str())
    }

    pub fn resolves_locally(&self) -> bool {
        self.resolve_local
    }

    pub fn set_protocol_version(&mut self, version: SocksVersion) -> Result<(), HopError> {
        if version != SocksVersion::V5 && self.auth.is_some() {
            return Err(HopError::invalid(
                "authentication is in use, only SOCKS5 is possible",
            ));
        }
        if version == SocksVersion::V4 && !self.resolve_local {
            return Err(HopError::UnsupportedCapability {
                version,
                feature: "remote resolution",
            });
        }

        self.protocol_version = Some(version);
        Ok(())
    }

    /// Username/password authentication, which pins the hop to SOCKS5
    pub fn set_auth(&mut self, user: &str, pass: &str) -> Result<(), HopError> {
        let valid_len = 1..=MAX_CREDENTIAL_LEN;
        if !valid_len.contains(&user.len()) || !valid_len.contains(&pass.len()) {
            return Err(HopError::invalid(format!(
                "username and password must be 1 to {} bytes each",
                MAX_CREDENTIAL_LEN
            )));
        }
        match self.protocol_version {
            Some(version @ (SocksVersion::V4 | SocksVersion::V4a)) => {
                return Err(HopError::UnsupportedCapability {
                    version,
                    feature: "authentication",
                });
            }
            Some(SocksVersion::V5) => {}
            None => self.protocol_version = Some(SocksVersion::V5),
        }

        self.auth = Some(Credentials {
            user: user.to_string(),
            pass: pass.to_string(),
        });
        Ok(())
    }

    /// Choose where target hostnames are resolved.
    ///
    /// Asking a SOCKS4 hop to resolve remotely fails with
    /// [`HopError::UnsupportedCapability`] and leaves the hop unchanged.
    pub fn set_resolve_local(&mut self, resolve_local: bool) -> Result<(), HopError> {
        let version = self.effective_version();
        if !resolve_local && !version.supports_remote_resolution() {
            return Err(HopError::UnsupportedCapability {
                version,
                feature: "remote resolution",
            });
        }

        self.resolve_local = resolve_local;
        Ok(())
    }

    /// Connect to `host:port` through the upstream.
    ///
    /// Resolution, the upstream connect and the SOCKS handshake share one
    /// connect timeout.
    pub async fn connect(&self, host: &str, port: u16) -> Result<TcpStream, ConnectError> {
        let timeout = self.transport.context().connect_timeout();
        tokio::time::timeout(timeout, self.handshake(host, port))
            .await
            .map_err(|_| {
                ConnectError::Timeout(format!("{}:{} via {}:{}", host, port, self.host, self.port))
            })?
    }

    async fn handshake(&self, host: &str, port: u16) -> Result<TcpStream, ConnectError> {
        let target = self.target_addr(host, port).await?;
        trace!(
            "Connecting to {}:{} via {}://{}:{}",
            host,
            port,
            self.effective_version().scheme(),
            self.host,
            self.port
        );

        if let TargetAddr::Ip(addr @ SocketAddr::V6(_)) = &target {
            if self.effective_version() != SocksVersion::V5 {
                return Err(ConnectError::Socks4Ipv6(*addr));
            }
        }

        // Connect to the upstream itself, then handshake on that socket
        let upstream = self.transport.connect(&self.host, self.port).await?;

        let stream = match self.effective_version() {
            SocksVersion::V5 => match &self.auth {
                Some(auth) => Socks5Stream::connect_with_password_and_socket(
                    upstream, target, &auth.user, &auth.pass,
                )
                .await?
                .into_inner(),
                None => Socks5Stream::connect_with_socket(upstream, target)
                    .await?
                    .into_inner(),
            },
            SocksVersion::V4 | SocksVersion::V4a => {
                Socks4Stream::connect_with_socket(upstream, target)
                    .await?
                    .into_inner()
            }
        };

        Ok(stream)
    }

    async fn target_addr(&self, host: &str, port: u16) -> Result<TargetAddr<'static>, ConnectError> {
        // IP literals never go through the resolver
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(TargetAddr::Ip(SocketAddr::new(ip, port)));
        }
        if self.resolve_local {
            let ip = self.transport.context().resolver().resolve(host).await?;
            return Ok(TargetAddr::Ip(SocketAddr::new(ip, port)));
        }
        Ok(TargetAddr::Domain(host.to_string().into(), port))
    }
}

impl std::fmt::Display for SocksHop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://", self.effective_version().scheme())?;
        if let Some(user) = self.user() {
            write!(f, "{}@", user)?;
        }
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)?;
        } else {
            write!(f, "{}:{}", self.host, self.port)?;
        }
        if self.resolve_local {
            write!(f, " (resolve locally)")
        } else {
            write!(f, " (resolve remotely)")
        }
    }
}

impl std::fmt::Debug for SocksHop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocksHop")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("protocol_version", &self.protocol_version)
            .field("user", &self.user())
            .field("resolve_local", &self.resolve_local)
            .finish()
    }
}
