mod connect;

use crate::{
    cache::{CachedConnection, ConnectionCache},
    handler::{EntityListHandler, NumberHandler, RsHandler},
    runner::DialectRunner,
    session::Session,
};

use tracing::warn;
use trivet_core::{
    Connection, DataSource, Entity, Error, IsolationLevel, PageResult, Result, Value,
};
use trivet_sql::{Dialect, LikeType, Query};

use std::sync::Arc;

/// Handle to one database.
///
/// A `Db` is cheap to clone; clones share the data source and the connection
/// cache. Each operation borrows the calling thread's cached connection (or
/// opens one), runs, and releases it through the cache. The release is a real
/// close outside a transaction and a no-op inside one, so everything between
/// [`tx`](Db::tx)'s begin and commit shares a single connection.
///
/// ```no_run
/// use trivet::{Db, Entity};
///
/// # fn main() -> trivet::Result<()> {
/// let db = Db::connect("sqlite:app.db")?;
///
/// db.insert(&Entity::create("user").set("name", "alice"))?;
/// let user = db.get(&Entity::create("user").set("name", "alice"))?;
/// assert!(user.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Db {
    source: Arc<dyn DataSource>,
    cache: ConnectionCache,
    runner: DialectRunner,
}

impl Db {
    /// Opens a database by connection URL. The URL scheme picks the driver.
    pub fn connect(url: &str) -> Result<Db> {
        let (source, dialect) = connect::data_source(url)?;
        Ok(Db::new(source, dialect))
    }

    /// Builds a handle over an explicit data source, with a fresh connection
    /// cache.
    pub fn new(source: Arc<dyn DataSource>, dialect: Dialect) -> Db {
        Db::with_cache(source, dialect, ConnectionCache::new())
    }

    /// Builds a handle sharing an existing connection cache.
    pub fn with_cache(source: Arc<dyn DataSource>, dialect: Dialect, cache: ConnectionCache) -> Db {
        Db {
            source,
            cache,
            runner: DialectRunner::new(dialect),
        }
    }

    pub fn data_source(&self) -> &Arc<dyn DataSource> {
        &self.source
    }

    pub fn dialect(&self) -> Dialect {
        self.runner.dialect()
    }

    pub fn cache(&self) -> &ConnectionCache {
        &self.cache
    }

    pub(crate) fn runner(&self) -> &DialectRunner {
        &self.runner
    }

    /// Inserts one record.
    pub fn insert(&self, record: &Entity) -> Result<u64> {
        self.run(|connection, runner| runner.insert(connection, record))
    }

    /// Inserts many records with one prepared statement.
    pub fn insert_batch(&self, records: &[Entity]) -> Result<Vec<u64>> {
        self.run(|connection, runner| runner.insert_batch(connection, records))
    }

    /// Inserts one record and returns the generated row id.
    pub fn insert_for_generated_key(&self, record: &Entity) -> Result<i64> {
        self.run(|connection, runner| runner.insert_for_generated_key(connection, record))
    }

    /// Updates the row matching the record's key fields, or inserts.
    pub fn insert_or_update(&self, record: &Entity, keys: &[&str]) -> Result<u64> {
        self.run(|connection, runner| runner.insert_or_update(connection, record, keys))
    }

    /// Single-statement insert-or-update where the dialect has one.
    pub fn upsert(&self, record: &Entity, keys: &[&str]) -> Result<u64> {
        self.run(|connection, runner| runner.upsert(connection, record, keys))
    }

    /// Deletes the rows matching the condition entity.
    pub fn del(&self, where_: &Entity) -> Result<u64> {
        self.run(|connection, runner| runner.del(connection, where_))
    }

    /// Updates the rows matching `where_` with the record's fields.
    pub fn update(&self, record: &Entity, where_: &Entity) -> Result<u64> {
        self.run(|connection, runner| runner.update(connection, record, where_))
    }

    /// First row matching the condition entity, if any.
    pub fn get(&self, where_: &Entity) -> Result<Option<Entity>> {
        self.run(|connection, runner| runner.get(connection, where_))
    }

    /// Rows matching the query.
    pub fn find(&self, query: &Query) -> Result<Vec<Entity>> {
        self.find_with(query, EntityListHandler)
    }

    /// Rows matching the query, shaped by `handler`.
    pub fn find_with<T>(&self, query: &Query, handler: impl RsHandler<T>) -> Result<T> {
        self.run(|connection, runner| runner.find(connection, query, handler))
    }

    /// All rows matching the condition entity.
    pub fn find_all(&self, where_: &Entity) -> Result<Vec<Entity>> {
        self.run(|connection, runner| runner.find_all(connection, where_))
    }

    /// All rows where `field` equals `value`.
    pub fn find_by(&self, table: &str, field: &str, value: impl Into<Value>) -> Result<Vec<Entity>> {
        self.run(|connection, runner| runner.find_by(connection, table, field, value))
    }

    /// All rows where `field` matches `value` under the LIKE placement.
    pub fn find_like(
        &self,
        table: &str,
        field: &str,
        value: &str,
        like_type: LikeType,
    ) -> Result<Vec<Entity>> {
        self.run(|connection, runner| runner.find_like(connection, table, field, value, like_type))
    }

    /// All rows where `field` is one of `values`.
    pub fn find_in(&self, table: &str, field: &str, values: Vec<Value>) -> Result<Vec<Entity>> {
        self.run(|connection, runner| runner.find_in(connection, table, field, values))
    }

    /// Number of rows matching the condition entity.
    pub fn count(&self, where_: &Entity) -> Result<u64> {
        self.run(|connection, runner| runner.count(connection, where_))
    }

    /// Number of rows matching the query.
    pub fn count_query(&self, query: &Query) -> Result<u64> {
        self.run(|connection, runner| runner.count_query(connection, query))
    }

    /// One page of results with totals. Counts first, then fetches the page.
    pub fn page(&self, query: &Query) -> Result<PageResult<Entity>> {
        self.run(|connection, runner| runner.page(connection, query))
    }

    /// Runs a raw SELECT, returning every row as an [`Entity`].
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Entity>> {
        self.query_with(sql, params, EntityListHandler)
    }

    /// Runs a raw SELECT, shaped by `handler`.
    pub fn query_with<T>(&self, sql: &str, params: &[Value], handler: impl RsHandler<T>) -> Result<T> {
        self.run(|connection, runner| runner.query(connection, sql, params, handler))
    }

    /// Runs a raw SELECT expected to produce a single number.
    pub fn query_number(&self, sql: &str, params: &[Value]) -> Result<i64> {
        self.query_with(sql, params, NumberHandler)
    }

    /// Counts the rows a raw SELECT would return.
    pub fn count_by_sql(&self, sql: &str, params: &[Value]) -> Result<u64> {
        self.run(|connection, runner| runner.count_by_sql(connection, sql, params))
    }

    /// Runs a raw non-SELECT statement.
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        self.run(|connection, runner| runner.execute(connection, sql, params))
    }

    /// Runs a raw statement once per parameter row.
    pub fn execute_batch(&self, sql: &str, batches: &[Vec<Value>]) -> Result<Vec<u64>> {
        self.run(|connection, runner| runner.execute_batch(connection, sql, batches))
    }

    /// Runs `func` inside a transaction.
    ///
    /// The transaction spans every operation `func` performs through the
    /// passed handle, because they all share the calling thread's cached
    /// connection. On `Ok` the transaction commits; on `Err` it rolls back
    /// and the error propagates. Either way the connection's auto-commit
    /// flag is restored before the connection is released.
    ///
    /// A nested `tx` on the same thread joins the outer transaction rather
    /// than starting its own; its commit applies to the shared transaction.
    pub fn tx<T>(&self, func: impl FnOnce(&Db) -> Result<T>) -> Result<T> {
        self.transaction(None, func)
    }

    /// Like [`tx`](Db::tx), but first raises the isolation level when the
    /// requested one is stricter than the connection's current level. The
    /// level is never lowered.
    pub fn tx_with_isolation<T>(
        &self,
        isolation: IsolationLevel,
        func: impl FnOnce(&Db) -> Result<T>,
    ) -> Result<T> {
        self.transaction(Some(isolation), func)
    }

    fn transaction<T>(
        &self,
        isolation: Option<IsolationLevel>,
        func: impl FnOnce(&Db) -> Result<T>,
    ) -> Result<T> {
        let cached = self.cache.get(&self.source)?;
        let result = self.transaction_on(&cached, isolation, func);
        // Auto-commit is back to its pre-transaction value, so this close
        // releases the connection unless an outer transaction still holds it.
        self.cache.close(&self.source);
        result
    }

    fn transaction_on<T>(
        &self,
        cached: &CachedConnection,
        isolation: Option<IsolationLevel>,
        func: impl FnOnce(&Db) -> Result<T>,
    ) -> Result<T> {
        let prior = {
            let mut connection = cached.lock();

            if !connection.capability().transactions {
                return Err(Error::unsupported_feature("transactions are not supported"));
            }

            if let Some(level) = isolation {
                // Raise the level when the request is stricter, never lower it
                if level > connection.isolation()? {
                    connection.set_isolation(level)?;
                }
            }

            let prior = connection.auto_commit();
            if prior {
                connection.set_auto_commit(false)?;
            }
            prior
        };

        // The guard is released while `func` runs so nested operations can
        // lock the same connection.
        let outcome = func(self);

        let mut connection = cached.lock();
        let outcome = match outcome {
            Ok(value) => match connection.commit() {
                Ok(()) => Ok(value),
                Err(err) => {
                    quiet_rollback(connection.as_mut());
                    Err(err)
                }
            },
            Err(err) => {
                quiet_rollback(connection.as_mut());
                Err(err)
            }
        };

        let restore = connection.set_auto_commit(prior);

        match (outcome, restore) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(err)) => Err(err),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(restore_err)) => {
                warn!(error = %restore_err, "failed to restore auto-commit");
                Err(err)
            }
        }
    }

    /// Handle to the calling thread's cached connection, opening one when
    /// needed. The connection stays cached until
    /// [`close_connection`](Db::close_connection).
    pub fn connection(&self) -> Result<CachedConnection> {
        self.cache.get(&self.source)
    }

    /// Releases the calling thread's cached connection. Deferred while a
    /// transaction is open.
    pub fn close_connection(&self) {
        self.cache.close(&self.source);
    }

    /// Opens a [`Session`] for manual transaction control on a pinned
    /// connection.
    pub fn session(&self) -> Result<Session> {
        Session::new(self.clone())
    }

    fn run<T>(&self, f: impl FnOnce(&mut dyn Connection, &DialectRunner) -> Result<T>) -> Result<T> {
        let cached = self.cache.get(&self.source)?;
        let result = {
            let mut connection = cached.lock();
            f(connection.as_mut(), &self.runner)
        };
        self.cache.close(&self.source);
        result
    }
}

/// Rolls back, logging instead of failing, so the error that triggered the
/// rollback stays the one the caller sees.
pub(crate) fn quiet_rollback(connection: &mut dyn Connection) {
    if let Err(err) = connection.rollback() {
        warn!(error = %err, "rollback failed");
    }
}
