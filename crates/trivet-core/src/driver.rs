mod capability;
pub use capability::Capability;

mod transaction;
pub use transaction::{IsolationLevel, SavepointTracker};

use crate::{Result, Rows, Value};

use std::{borrow::Cow, fmt::Debug};

/// A factory for database connections.
///
/// A `DataSource` is also the identity key of the connection cache: two
/// threads asking the same `DataSource` for a connection get independent
/// connections, while one thread asking twice gets the same one back.
pub trait DataSource: Debug + Send + Sync + 'static {
    /// Connection URL this source was built from.
    fn url(&self) -> Cow<'_, str>;

    /// Describes the database's capability, which informs transaction and
    /// statement handling.
    fn capability(&self) -> &'static Capability;

    /// Opens a new connection.
    fn connect(&self) -> Result<Box<dyn Connection>>;
}

/// A single database connection.
///
/// Implementations track their own auto-commit flag. While auto-commit is off
/// an explicit transaction is always open: `set_auto_commit(false)` begins
/// one, and `commit`/`rollback` end the current transaction and immediately
/// begin the next.
pub trait Connection: Debug + Send + 'static {
    /// Describes the database's capability.
    fn capability(&self) -> &'static Capability;

    /// Executes a statement, returning the number of affected rows.
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64>;

    /// Executes one statement repeatedly with different parameters.
    ///
    /// Drivers that can prepare once and rebind should override this.
    fn execute_batch(&mut self, sql: &str, batches: &[Vec<Value>]) -> Result<Vec<u64>> {
        let mut affected = Vec::with_capacity(batches.len());
        for params in batches {
            affected.push(self.execute(sql, params)?);
        }
        Ok(affected)
    }

    /// Executes a query, returning all rows.
    fn query(&mut self, sql: &str, params: &[Value]) -> Result<Rows>;

    /// Row id generated by the last insert on this connection.
    ///
    /// Errors with an unsupported feature error when
    /// [`Capability::last_insert_id`] is false.
    fn last_insert_id(&mut self) -> Result<i64>;

    /// Current auto-commit flag. This is connection-local state, not a
    /// database round trip.
    fn auto_commit(&self) -> bool;

    /// Turns auto-commit off (beginning a transaction) or on (committing any
    /// open transaction).
    fn set_auto_commit(&mut self, auto_commit: bool) -> Result<()>;

    /// Commits the open transaction and begins the next. Errors when
    /// auto-commit is on.
    fn commit(&mut self) -> Result<()>;

    /// Rolls back the open transaction and begins the next. Errors when
    /// auto-commit is on.
    fn rollback(&mut self) -> Result<()>;

    /// Creates a named savepoint in the open transaction.
    fn savepoint(&mut self, name: &str) -> Result<()>;

    /// Releases a named savepoint.
    fn release_savepoint(&mut self, name: &str) -> Result<()>;

    /// Rolls back to a named savepoint, keeping the transaction open.
    fn rollback_to_savepoint(&mut self, name: &str) -> Result<()>;

    /// Current transaction isolation level, as the database reports it.
    fn isolation(&mut self) -> Result<IsolationLevel>;

    /// Changes the transaction isolation level.
    fn set_isolation(&mut self, level: IsolationLevel) -> Result<()>;

    /// Whether the connection is no longer usable. The connection cache
    /// replaces closed connections instead of handing them out.
    fn is_closed(&self) -> bool;
}
