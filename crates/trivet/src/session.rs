use crate::{
    cache::CachedConnection,
    db::{quiet_rollback, Db},
    handler::{EntityListHandler, NumberHandler, RsHandler},
    runner::DialectRunner,
};

use tracing::warn;
use trivet_core::{
    driver::SavepointTracker, Connection, Entity, Error, IsolationLevel, PageResult, Result, Value,
};
use trivet_sql::{LikeType, Query};

/// Manual transaction control over one pinned connection.
///
/// Where [`Db::tx`] wraps a whole transaction around a closure, a `Session`
/// exposes begin, commit, rollback, and savepoints as discrete calls. The
/// session pins the calling thread's cached connection for its whole life
/// and releases it when dropped; the cache defers that release while a
/// transaction is still open.
///
/// The connection cache keys by thread id, so the release on drop must run
/// on the thread that created the session. A `Session` is therefore not
/// `Send`:
///
/// ```compile_fail
/// fn requires_send<T: Send>(_: T) {}
///
/// fn f(session: trivet::Session) {
///     requires_send(session);
/// }
/// ```
///
/// ```no_run
/// use trivet::{Db, Entity};
///
/// # fn main() -> trivet::Result<()> {
/// let db = Db::connect("sqlite:app.db")?;
/// let mut session = db.session()?;
///
/// session.begin()?;
/// session.insert(&Entity::create("user").set("name", "alice"))?;
/// let checkpoint = session.savepoint()?;
/// session.insert(&Entity::create("user").set("name", "bob"))?;
/// session.rollback_to(&checkpoint)?;
/// session.commit()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Session {
    db: Db,
    connection: CachedConnection,
    savepoints: SavepointTracker,
    // Keeps the session on its creating thread; see the type docs
    _pinned: std::marker::PhantomData<*const ()>,
}

/// A named savepoint created by [`Session::savepoint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Savepoint {
    name: String,
}

impl Savepoint {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Session {
    pub(crate) fn new(db: Db) -> Result<Session> {
        let connection = db.connection()?;
        Ok(Session {
            db,
            connection,
            savepoints: SavepointTracker::new(),
            _pinned: std::marker::PhantomData,
        })
    }

    /// Begins a transaction by turning auto-commit off.
    pub fn begin(&mut self) -> Result<()> {
        let mut connection = self.connection.lock();

        if !connection.capability().transactions {
            return Err(Error::unsupported_feature("transactions are not supported"));
        }

        connection.set_auto_commit(false)
    }

    /// Commits the open transaction and restores auto-commit.
    ///
    /// Auto-commit is restored even when the commit fails; in that case the
    /// commit's error is the one returned and a restore failure is logged.
    pub fn commit(&mut self) -> Result<()> {
        let mut connection = self.connection.lock();

        let outcome = connection.commit();
        let restore = connection.set_auto_commit(true);

        match (outcome, restore) {
            (Ok(()), restore) => restore,
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(restore_err)) => {
                warn!(error = %restore_err, "failed to restore auto-commit after commit error");
                Err(err)
            }
        }
    }

    /// Rolls back the open transaction and restores auto-commit, with the
    /// same error precedence as [`commit`](Session::commit).
    pub fn rollback(&mut self) -> Result<()> {
        let mut connection = self.connection.lock();

        let outcome = connection.rollback();
        let restore = connection.set_auto_commit(true);

        match (outcome, restore) {
            (Ok(()), restore) => restore,
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(restore_err)) => {
                warn!(error = %restore_err, "failed to restore auto-commit after rollback error");
                Err(err)
            }
        }
    }

    /// Rolls back and restores auto-commit, logging failures instead of
    /// returning them.
    pub fn quiet_rollback(&mut self) {
        let mut connection = self.connection.lock();

        quiet_rollback(connection.as_mut());
        if let Err(err) = connection.set_auto_commit(true) {
            warn!(error = %err, "failed to restore auto-commit");
        }
    }

    /// Creates a savepoint in the open transaction.
    ///
    /// Names are generated per session: `sp_0`, `sp_1`, ... nesting deeper,
    /// with a name freed for reuse once its savepoint is released or rolled
    /// back to.
    pub fn savepoint(&mut self) -> Result<Savepoint> {
        let mut connection = self.connection.lock();

        if !connection.capability().savepoints {
            return Err(Error::unsupported_feature("savepoints are not supported"));
        }

        let name = self.savepoints.push();
        if let Err(err) = connection.savepoint(&name) {
            self.savepoints.pop();
            return Err(err);
        }

        Ok(Savepoint { name })
    }

    /// Rolls back to `savepoint`, discarding the work after it but keeping
    /// the transaction open.
    pub fn rollback_to(&mut self, savepoint: &Savepoint) -> Result<()> {
        let result = {
            let mut connection = self.connection.lock();
            connection.rollback_to_savepoint(&savepoint.name)
        };

        if result.is_ok() {
            self.savepoints.pop();
        }
        result
    }

    /// Releases `savepoint`, folding its work into the surrounding
    /// transaction.
    pub fn release(&mut self, savepoint: &Savepoint) -> Result<()> {
        let result = {
            let mut connection = self.connection.lock();
            connection.release_savepoint(&savepoint.name)
        };

        if result.is_ok() {
            self.savepoints.pop();
        }
        result
    }

    /// Changes the transaction isolation level.
    ///
    /// Levels the database does not support are refused here, before the
    /// driver sees them.
    pub fn set_isolation(&mut self, isolation: IsolationLevel) -> Result<()> {
        let mut connection = self.connection.lock();

        if !connection.capability().supports_isolation(isolation) {
            return Err(Error::unsupported_feature(format!(
                "transaction isolation [{}] not supported",
                isolation.sql_name()
            )));
        }

        connection.set_isolation(isolation)
    }

    /// Releases the session's connection. Equivalent to dropping the
    /// session.
    pub fn close(self) {}

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

    /// One page of results with totals.
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

    fn run<T>(&self, f: impl FnOnce(&mut dyn Connection, &DialectRunner) -> Result<T>) -> Result<T> {
        let mut connection = self.connection.lock();
        f(connection.as_mut(), self.db.runner())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.db.close_connection();
    }
}
