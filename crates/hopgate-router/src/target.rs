//! Rule target parsing (`host[:port]`)

/// Pattern matching any host or any port
pub const MATCH_ALL: &str = "*";

/// Host and port pattern of a routing rule.
///
/// Either half is the wildcard [`MATCH_ALL`] or a literal value. Patterns are
/// stored verbatim; the dispatcher that matches live connections interprets
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetPattern {
    pub host: String,
    pub port: String,
}

impl TargetPattern {
    /// Pattern matching every host and every port
    pub fn any() -> Self {
        Self {
            host: MATCH_ALL.to_string(),
            port: MATCH_ALL.to_string(),
        }
    }

    /// Split a rule target on its first colon.
    ///
    /// A missing port becomes [`MATCH_ALL`]. Bracketed IPv6 literals are not
    /// understood: `[::1]:80` splits into host `[` and port `:1]:80`.
    pub fn parse(target: &str) -> Self {
        match target.split_once(':') {
            Some((host, port)) => Self {
                host: host.to_string(),
                port: port.to_string(),
            },
            None => Self {
                host: target.to_string(),
                port: MATCH_ALL.to_string(),
            },
        }
    }
}

impl std::fmt::Display for TargetPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
