//! Routing rule store
//!
//! The rule table is an immutable [`RouteTable`] snapshot held in an
//! `ArcSwap`. Readers (the connection dispatcher, `list`) load the current
//! snapshot without locking. Writers are serialized by a mutex, build the next
//! table from the current one and publish it with a single atomic store, so a
//! reader sees either the whole old table or the whole new one.
//!
//! Entries are kept in insertion order. At most one entry carries
//! [`DEFAULT_PRIORITY`] as long as defaults are only installed through
//! [`RoutingRuleStore::set_default`].

use crate::handler::ConnectionHandler;
use crate::priority::DEFAULT_PRIORITY;
use crate::target::TargetPattern;
use arc_swap::ArcSwap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Identifier of a routing entry, unique for the lifetime of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl EntryId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for EntryId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// One routing rule
#[derive(Debug)]
pub struct RoutingEntry {
    pub id: EntryId,
    pub target: TargetPattern,
    pub priority: f64,
    pub handler: ConnectionHandler,
}

impl RoutingEntry {
    pub fn is_default(&self) -> bool {
        self.priority == DEFAULT_PRIORITY
    }
}

/// Immutable view of the rule table
#[derive(Debug, Default)]
pub struct RouteTable {
    entries: Vec<Arc<RoutingEntry>>,
    version: u64,
}

impl RouteTable {
    /// Entries in insertion order
    pub fn entries(&self) -> &[Arc<RoutingEntry>] {
        &self.entries
    }

    pub fn get(&self, id: EntryId) -> Option<&Arc<RoutingEntry>> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// The catch-all default entry, if one is installed
    pub fn default_entry(&self) -> Option<&Arc<RoutingEntry>> {
        self.entries.iter().find(|entry| entry.is_default())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Incremented by every published mutation
    pub fn version(&self) -> u64 {
        self.version
    }

    fn next(&self, entries: Vec<Arc<RoutingEntry>>) -> Self {
        Self {
            entries,
            version: self.version + 1,
        }
    }
}

/// Mutable table of routing rules
pub struct RoutingRuleStore {
    table: ArcSwap<RouteTable>,
    /// Next id to hand out; holding the lock serializes writers
    next_id: Mutex<u64>,
}

impl RoutingRuleStore {
    pub fn new() -> Self {
        Self {
            table: ArcSwap::from_pointee(RouteTable::default()),
            next_id: Mutex::new(1),
        }
    }

    /// Current table (lock-free read)
    pub fn snapshot(&self) -> Arc<RouteTable> {
        self.table.load_full()
    }

    /// Add a rule. Patterns are not validated here.
    pub fn add(
        &self,
        handler: ConnectionHandler,
        target: TargetPattern,
        priority: f64,
    ) -> EntryId {
        let mut next_id = self.next_id.lock().unwrap_or_else(PoisonError::into_inner);
        let id = EntryId(*next_id);
        *next_id += 1;

        debug!(
            "Adding route {}: {} prio {} -> {}",
            id, target, priority, handler
        );

        let current = self.table.load();
        let mut entries = current.entries.clone();
        entries.push(Arc::new(RoutingEntry {
            id,
            target,
            priority,
            handler,
        }));
        self.table.store(Arc::new(current.next(entries)));

        id
    }

    /// Remove a rule. Returns `false` if no entry has this id.
    pub fn remove(&self, id: EntryId) -> bool {
        let _guard = self.next_id.lock().unwrap_or_else(PoisonError::into_inner);

        let current = self.table.load();
        if current.get(id).is_none() {
            debug!("Route {} not found, nothing removed", id);
            return false;
        }

        let entries = current
            .entries
            .iter()
            .filter(|entry| entry.id != id)
            .cloned()
            .collect();
        self.table.store(Arc::new(current.next(entries)));

        debug!("Removed route {}", id);
        true
    }

    /// Replace every default-priority entry with one catch-all entry for
    /// `handler`, in a single published step.
    pub fn set_default(&self, handler: ConnectionHandler) -> EntryId {
        let mut next_id = self.next_id.lock().unwrap_or_else(PoisonError::into_inner);
        let id = EntryId(*next_id);
        *next_id += 1;

        // Drop every default-priority entry and append the new one in the same table
        let current = self.table.load();
        let (evicted, mut entries): (Vec<_>, Vec<_>) = current
            .entries
            .iter()
            .cloned()
            .partition(|entry| entry.is_default());

        debug!(
            "Setting default route {} -> {} (replacing {} entries)",
            id,
            handler,
            evicted.len()
        );

        entries.push(Arc::new(RoutingEntry {
            id,
            target: TargetPattern::any(),
            priority: DEFAULT_PRIORITY,
            handler,
        }));
        self.table.store(Arc::new(current.next(entries)));

        id
    }

    /// Entries in insertion order
    pub fn list(&self) -> Vec<Arc<RoutingEntry>> {
        self.table.load().entries.clone()
    }

    pub fn get(&self, id: EntryId) -> Option<Arc<RoutingEntry>> {
        self.table.load().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.table.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.load().is_empty()
    }
}

impl Default for RoutingRuleStore {
    fn default() -> Self {
        Self::new()
    }
}
