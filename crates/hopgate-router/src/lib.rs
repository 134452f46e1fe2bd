//! Routing layer for the hopgate forwarding proxy
//!
//! Keeps the table of routing rules and turns upstream descriptors into
//! connection handlers: reject, direct, or relay through a SOCKS hop.
//! Operator commands (`list`, `default`, `reject`, `add`, `remove`) mutate the
//! table at runtime; the connection dispatcher reads consistent snapshots of it.

pub mod builder;
pub mod command;
pub mod context;
pub mod direct;
pub mod endpoint;
pub mod error;
pub mod handler;
pub mod negotiator;
pub mod priority;
pub mod resolver;
pub mod socks;
pub mod store;
pub mod target;

pub use builder::{UpstreamChainBuilder, DIRECT_DESCRIPTOR, REJECT_DESCRIPTOR};
pub use command::{CommandOutcome, RoutingCommandHandler, ViaCommand};
pub use context::RouterContext;
pub use direct::DirectConnector;
pub use endpoint::{EndpointError, UpstreamEndpoint, DEFAULT_SOCKS_PORT};
pub use error::{ConnectError, ResolveError, RoutingError};
pub use handler::{ConnectionHandler, HandlerKind};
pub use negotiator::{try_resolve_remotely, Negotiated};
pub use priority::{coerce_priority, DEFAULT_PRIORITY, REJECT_PRIORITY, STANDARD_PRIORITY};
pub use resolver::{Resolver, SystemResolver};
pub use socks::{HopError, SocksHop, SocksVersion};
pub use store::{EntryId, RouteTable, RoutingEntry, RoutingRuleStore};
pub use target::{TargetPattern, MATCH_ALL};
