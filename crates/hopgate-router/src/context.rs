//! Shared context handed to handler constructors

use crate::resolver::{Resolver, SystemResolver};
use std::sync::Arc;
use std::time::Duration;

/// Default timeout for establishing a transport connection
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Resources shared by every handler built for the rule table.
///
/// Passed explicitly to the [`UpstreamChainBuilder`](crate::UpstreamChainBuilder);
/// handlers keep a clone for later connect attempts.
#[derive(Clone)]
pub struct RouterContext {
    resolver: Arc<dyn Resolver>,
    connect_timeout: Duration,
}

impl RouterContext {
    pub fn new(resolver: Arc<dyn Resolver>) -> Self {
        Self {
            resolver,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn resolver(&self) -> &Arc<dyn Resolver> {
        &self.resolver
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}

impl Default for RouterContext {
    fn default() -> Self {
        Self::new(Arc::new(SystemResolver))
    }
}

impl std::fmt::Debug for RouterContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterContext")
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}
