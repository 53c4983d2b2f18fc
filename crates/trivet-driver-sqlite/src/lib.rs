mod value;

use rusqlite::Connection as RusqliteConnection;
use trivet_core::{
    driver::{Capability, DataSource, IsolationLevel},
    err, Error, Result, Rows, Value,
};
use url::Url;

use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

#[derive(Debug)]
pub enum Sqlite {
    /// SQLite database stored in a file at the included path
    File(PathBuf),

    /// In-memory SQLite database
    InMemory,
}

impl Sqlite {
    /// Create a new SQLite data source from a connection URL.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str).map_err(Error::driver)?;

        if url.scheme() != "sqlite" {
            return Err(Error::invalid_connection_url(format!(
                "connection URL does not have a `sqlite` scheme; url={url_str}"
            )));
        }

        if url.path() == ":memory:" {
            Ok(Self::InMemory)
        } else {
            Ok(Self::File(PathBuf::from(url.path())))
        }
    }

    /// Create an in-memory SQLite database.
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    /// Use the SQLite database file at `path`, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }
}

impl DataSource for Sqlite {
    fn url(&self) -> Cow<'_, str> {
        match self {
            Sqlite::File(path) => Cow::Owned(format!("sqlite:{}", path.display())),
            Sqlite::InMemory => Cow::Borrowed("sqlite::memory:"),
        }
    }

    fn capability(&self) -> &'static Capability {
        &Capability::SQLITE
    }

    fn connect(&self) -> Result<Box<dyn trivet_core::Connection>> {
        let connection = match self {
            Sqlite::File(path) => Connection::open(path)?,
            Sqlite::InMemory => Connection::open_in_memory()?,
        };

        Ok(Box::new(connection))
    }
}

#[derive(Debug)]
pub struct Connection {
    connection: RusqliteConnection,
    auto_commit: bool,
}

impl Connection {
    fn open(path: &Path) -> Result<Self> {
        let connection = RusqliteConnection::open(path).map_err(map_err)?;
        Ok(Self::new(connection))
    }

    fn open_in_memory() -> Result<Self> {
        let connection = RusqliteConnection::open_in_memory().map_err(map_err)?;
        Ok(Self::new(connection))
    }

    fn new(connection: RusqliteConnection) -> Self {
        Connection {
            connection,
            auto_commit: true,
        }
    }

    fn execute_literal(&mut self, sql: &str) -> Result<()> {
        self.connection.execute(sql, []).map_err(map_err)?;
        Ok(())
    }
}

impl trivet_core::Connection for Connection {
    fn capability(&self) -> &'static Capability {
        &Capability::SQLITE
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        let mut stmt = self.connection.prepare_cached(sql).map_err(map_err)?;

        let count = stmt
            .execute(rusqlite::params_from_iter(params.iter().map(value::Param)))
            .map_err(map_err)?;

        Ok(count as u64)
    }

    fn execute_batch(&mut self, sql: &str, batches: &[Vec<Value>]) -> Result<Vec<u64>> {
        // Prepare once, rebind per batch
        let mut stmt = self.connection.prepare_cached(sql).map_err(map_err)?;

        let mut affected = Vec::with_capacity(batches.len());

        for params in batches {
            let count = stmt
                .execute(rusqlite::params_from_iter(params.iter().map(value::Param)))
                .map_err(map_err)?;

            affected.push(count as u64);
        }

        Ok(affected)
    }

    fn query(&mut self, sql: &str, params: &[Value]) -> Result<Rows> {
        let mut stmt = self.connection.prepare_cached(sql).map_err(map_err)?;

        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = stmt.column_count();

        let mut rows = stmt
            .query(rusqlite::params_from_iter(params.iter().map(value::Param)))
            .map_err(map_err)?;

        let mut ret = vec![];

        loop {
            match rows.next() {
                Ok(Some(row)) => {
                    let mut items = Vec::with_capacity(width);

                    for index in 0..width {
                        items.push(value::from_sql(row, index)?);
                    }

                    ret.push(items);
                }
                Ok(None) => break,
                Err(err) => return Err(map_err(err)),
            }
        }

        Ok(Rows::new(columns, ret))
    }

    fn last_insert_id(&mut self) -> Result<i64> {
        Ok(self.connection.last_insert_rowid())
    }

    fn auto_commit(&self) -> bool {
        self.auto_commit
    }

    fn set_auto_commit(&mut self, auto_commit: bool) -> Result<()> {
        if self.auto_commit == auto_commit {
            return Ok(());
        }

        if auto_commit {
            self.execute_literal("COMMIT")?;
        } else {
            self.execute_literal("BEGIN")?;
        }

        self.auto_commit = auto_commit;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        if self.auto_commit {
            return Err(err!("cannot commit with auto-commit on"));
        }

        self.execute_literal("COMMIT")?;
        // Auto-commit stays off, so the next transaction opens now
        self.execute_literal("BEGIN")?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        if self.auto_commit {
            return Err(err!("cannot roll back with auto-commit on"));
        }

        self.execute_literal("ROLLBACK")?;
        self.execute_literal("BEGIN")?;
        Ok(())
    }

    fn savepoint(&mut self, name: &str) -> Result<()> {
        self.execute_literal(&format!("SAVEPOINT {}", quoted(name)))
    }

    fn release_savepoint(&mut self, name: &str) -> Result<()> {
        self.execute_literal(&format!("RELEASE SAVEPOINT {}", quoted(name)))
    }

    fn rollback_to_savepoint(&mut self, name: &str) -> Result<()> {
        self.execute_literal(&format!("ROLLBACK TO SAVEPOINT {}", quoted(name)))
    }

    fn isolation(&mut self) -> Result<IsolationLevel> {
        Ok(IsolationLevel::Serializable)
    }

    fn set_isolation(&mut self, level: IsolationLevel) -> Result<()> {
        if level == IsolationLevel::Serializable {
            return Ok(());
        }

        Err(Error::unsupported_feature(format!(
            "transaction isolation [{}] not supported",
            level.sql_name()
        )))
    }

    fn is_closed(&self) -> bool {
        // rusqlite closes the handle on drop, so a held connection stays usable
        false
    }
}

fn quoted(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn map_err(err: rusqlite::Error) -> Error {
    use rusqlite::ErrorCode;

    if let rusqlite::Error::SqliteFailure(cause, _) = &err {
        match cause.code {
            ErrorCode::ConstraintViolation => {
                return Error::constraint_violation(err.to_string());
            }
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => {
                return Error::timeout(err.to_string());
            }
            _ => {}
        }
    }

    Error::driver(err)
}
