//! Resolution-mode negotiation for SOCKS hops

use crate::socks::{HopError, SocksHop};
use tracing::debug;

/// Outcome of asking a hop to resolve target hostnames at the upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Negotiated {
    pub resolved_remotely: bool,
}

/// Ask `hop` to resolve target hostnames at the upstream.
///
/// A protocol revision without that capability is not an error: the hop stays
/// in local-resolution mode and `resolved_remotely` is `false`. Any other
/// rejection is returned to the caller.
pub fn try_resolve_remotely(hop: &mut SocksHop) -> Result<Negotiated, HopError> {
    match hop.set_resolve_local(false) {
        Ok(()) => Ok(Negotiated {
            resolved_remotely: true,
        }),
        Err(HopError::UnsupportedCapability { version, feature }) => {
            debug!(
                "SOCKS{} hop {}:{} lacks {}, resolving locally",
                version,
                hop.host(),
                hop.port(),
                feature
            );
            Ok(Negotiated {
                resolved_remotely: false,
            })
        }
        Err(e) => Err(e),
    }
}
