use by_address::ByAddress;
use tracing::{debug, warn};
use trivet_core::{Connection, DataSource, Result};

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    thread::{self, ThreadId},
};

/// Cache of one open connection per (thread, data source) pair.
///
/// A thread asking twice for the same data source gets the same connection
/// back until it is closed; two threads always get independent connections.
/// The cache is an explicit service: construct one per application (or test)
/// and share it by cloning.
#[derive(Debug, Clone, Default)]
pub struct ConnectionCache {
    threads: Arc<Mutex<HashMap<ThreadId, GroupedConnection>>>,
}

/// Connections held by one thread, keyed by data source identity.
#[derive(Debug)]
struct GroupedConnection {
    sources: HashMap<ByAddress<Arc<dyn DataSource>>, CachedConnection>,
}

/// Shared handle to one cached connection.
#[derive(Debug, Clone)]
pub struct CachedConnection {
    connection: Arc<Mutex<Box<dyn Connection>>>,
}

impl ConnectionCache {
    pub fn new() -> ConnectionCache {
        ConnectionCache::default()
    }

    /// Connection for (current thread, `source`), opening one when the cache
    /// has none or the cached one reports closed.
    pub fn get(&self, source: &Arc<dyn DataSource>) -> Result<CachedConnection> {
        let thread_id = thread::current().id();

        {
            let mut threads = self.lock_threads();

            if let Some(group) = threads.get_mut(&thread_id) {
                if let Some(cached) = group.sources.get(&ByAddress(source.clone())) {
                    if cached.lock().is_closed() {
                        debug!(url = %source.url(), "cached connection is closed; replacing");
                        group.sources.remove(&ByAddress(source.clone()));
                    } else {
                        return Ok(cached.clone());
                    }
                }
            }
        }

        // Only the owning thread writes its own entry, so the lock can drop
        // while the driver opens the connection.
        let cached = CachedConnection::new(source.connect()?);
        debug!(url = %source.url(), "opened connection");

        self.lock_threads()
            .entry(thread_id)
            .or_insert_with(GroupedConnection::new)
            .sources
            .insert(ByAddress(source.clone()), cached.clone());

        Ok(cached)
    }

    /// Releases the cached connection for (current thread, `source`).
    ///
    /// While auto-commit is off a transaction is still open, so the release
    /// is deferred: the entry stays cached until auto-commit is restored and
    /// close runs again. Dropping the removed entry closes the connection.
    pub fn close(&self, source: &Arc<dyn DataSource>) {
        let thread_id = thread::current().id();
        let mut threads = self.lock_threads();

        let Some(group) = threads.get_mut(&thread_id) else {
            return;
        };
        let Some(cached) = group.sources.get(&ByAddress(source.clone())) else {
            return;
        };

        if !cached.lock().auto_commit() {
            // An open transaction pins the connection
            return;
        }

        group.sources.remove(&ByAddress(source.clone()));
        debug!(url = %source.url(), "closed connection");

        if group.sources.is_empty() {
            threads.remove(&thread_id);
        }
    }

    /// Number of connections currently cached, across all threads.
    pub fn cached_connections(&self) -> usize {
        self.lock_threads()
            .values()
            .map(|group| group.sources.len())
            .sum()
    }

    /// Drops every cached connection, regardless of owning thread.
    ///
    /// A connection still inside a transaction is dropped too, which rolls
    /// its work back; each such case is logged.
    pub fn shutdown(&self) {
        let mut threads = self.lock_threads();

        for group in threads.values() {
            for (source, cached) in &group.sources {
                if !cached.lock().auto_commit() {
                    warn!(
                        url = %source.url(),
                        "shutting down a connection with an open transaction"
                    );
                }
            }
        }

        threads.clear();
    }

    fn lock_threads(&self) -> MutexGuard<'_, HashMap<ThreadId, GroupedConnection>> {
        self.threads.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl GroupedConnection {
    fn new() -> GroupedConnection {
        GroupedConnection {
            // One data source per thread is the overwhelmingly common case
            sources: HashMap::with_capacity(1),
        }
    }
}

impl CachedConnection {
    fn new(connection: Box<dyn Connection>) -> CachedConnection {
        CachedConnection {
            connection: Arc::new(Mutex::new(connection)),
        }
    }

    /// Locks the connection for use. A poisoned lock still holds a usable
    /// connection, so poisoning is ignored.
    pub fn lock(&self) -> MutexGuard<'_, Box<dyn Connection>> {
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether two handles refer to the same underlying connection.
    pub fn same_connection(&self, other: &CachedConnection) -> bool {
        Arc::ptr_eq(&self.connection, &other.connection)
    }
}
