//! In-memory driver double used by the unit tests.
//!
//! `RecordingConnection` logs every statement it is handed and plays back
//! scripted query results, which lets the tests assert on the exact SQL
//! traffic a code path produces without a real database.

use trivet_core::{
    err, Capability, Connection, DataSource, Error, IsolationLevel, Result, Rows, Value,
};

use std::{
    borrow::Cow,
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

pub(crate) type StatementLog = Arc<Mutex<Vec<(String, Vec<Value>)>>>;

pub(crate) const NO_TRANSACTIONS: Capability = Capability {
    transactions: false,
    savepoints: false,
    isolation_levels: &[],
    last_insert_id: true,
};

#[derive(Debug)]
pub(crate) struct FakeDataSource {
    pub(crate) opened: AtomicUsize,
    pub(crate) closed: Arc<AtomicBool>,
    log: StatementLog,
    results: Arc<Mutex<VecDeque<Rows>>>,
    fail_commits: Arc<AtomicBool>,
    capability: &'static Capability,
    isolation: IsolationLevel,
    last_id: i64,
}

impl FakeDataSource {
    pub(crate) fn new() -> FakeDataSource {
        FakeDataSource {
            opened: AtomicUsize::new(0),
            closed: Arc::new(AtomicBool::new(false)),
            log: Arc::new(Mutex::new(vec![])),
            results: Arc::new(Mutex::new(VecDeque::new())),
            fail_commits: Arc::new(AtomicBool::new(false)),
            capability: &Capability::SQLITE,
            isolation: IsolationLevel::Serializable,
            last_id: 1,
        }
    }

    /// Makes the next `commit()` return an error.
    pub(crate) fn fail_next_commit(&self) {
        self.fail_commits.store(true, Ordering::SeqCst);
    }

    pub(crate) fn with_capability(mut self, capability: &'static Capability) -> FakeDataSource {
        self.capability = capability;
        self
    }

    pub(crate) fn with_isolation(mut self, isolation: IsolationLevel) -> FakeDataSource {
        self.isolation = isolation;
        self
    }

    pub(crate) fn with_last_insert_id(mut self, last_id: i64) -> FakeDataSource {
        self.last_id = last_id;
        self
    }

    /// Queues a result for the next unanswered query.
    pub(crate) fn push_result(&self, rows: Rows) {
        self.results.lock().unwrap().push_back(rows);
    }

    /// Everything executed so far, with bound parameters.
    pub(crate) fn log(&self) -> Vec<(String, Vec<Value>)> {
        self.log.lock().unwrap().clone()
    }

    /// SQL texts executed so far.
    pub(crate) fn statements(&self) -> Vec<String> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .map(|(sql, _)| sql.clone())
            .collect()
    }
}

impl DataSource for FakeDataSource {
    fn url(&self) -> Cow<'_, str> {
        Cow::Borrowed("fake://db")
    }

    fn capability(&self) -> &'static Capability {
        self.capability
    }

    fn connect(&self) -> Result<Box<dyn Connection>> {
        self.opened.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(RecordingConnection {
            log: self.log.clone(),
            results: self.results.clone(),
            closed: self.closed.clone(),
            fail_commits: self.fail_commits.clone(),
            capability: self.capability,
            isolation: self.isolation,
            auto_commit: true,
            last_id: self.last_id,
        }))
    }
}

#[derive(Debug)]
pub(crate) struct RecordingConnection {
    log: StatementLog,
    results: Arc<Mutex<VecDeque<Rows>>>,
    closed: Arc<AtomicBool>,
    fail_commits: Arc<AtomicBool>,
    capability: &'static Capability,
    isolation: IsolationLevel,
    auto_commit: bool,
    last_id: i64,
}

impl RecordingConnection {
    fn record(&self, sql: &str, params: &[Value]) {
        self.log
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
    }
}

impl Connection for RecordingConnection {
    fn capability(&self) -> &'static Capability {
        self.capability
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        self.record(sql, params);
        Ok(1)
    }

    fn execute_batch(&mut self, sql: &str, batches: &[Vec<Value>]) -> Result<Vec<u64>> {
        for params in batches {
            self.record(sql, params);
        }
        Ok(vec![1; batches.len()])
    }

    fn query(&mut self, sql: &str, params: &[Value]) -> Result<Rows> {
        self.record(sql, params);

        let scripted = self.results.lock().unwrap().pop_front();
        Ok(scripted.unwrap_or_else(Rows::empty))
    }

    fn last_insert_id(&mut self) -> Result<i64> {
        Ok(self.last_id)
    }

    fn auto_commit(&self) -> bool {
        self.auto_commit
    }

    fn set_auto_commit(&mut self, auto_commit: bool) -> Result<()> {
        if auto_commit == self.auto_commit {
            return Ok(());
        }

        // Mirrors the real drivers: leaving auto-commit opens a transaction,
        // returning to it commits the one in progress.
        if auto_commit {
            self.record("COMMIT", &[]);
        } else {
            self.record("BEGIN", &[]);
        }

        self.auto_commit = auto_commit;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        if self.auto_commit {
            return Err(err!("cannot commit with auto-commit on"));
        }
        if self.fail_commits.swap(false, Ordering::SeqCst) {
            return Err(err!("commit refused"));
        }

        self.record("COMMIT", &[]);
        self.record("BEGIN", &[]);
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        if self.auto_commit {
            return Err(err!("cannot roll back with auto-commit on"));
        }

        self.record("ROLLBACK", &[]);
        self.record("BEGIN", &[]);
        Ok(())
    }

    fn savepoint(&mut self, name: &str) -> Result<()> {
        self.record(&format!("SAVEPOINT {name}"), &[]);
        Ok(())
    }

    fn release_savepoint(&mut self, name: &str) -> Result<()> {
        self.record(&format!("RELEASE SAVEPOINT {name}"), &[]);
        Ok(())
    }

    fn rollback_to_savepoint(&mut self, name: &str) -> Result<()> {
        self.record(&format!("ROLLBACK TO SAVEPOINT {name}"), &[]);
        Ok(())
    }

    fn isolation(&mut self) -> Result<IsolationLevel> {
        Ok(self.isolation)
    }

    fn set_isolation(&mut self, isolation: IsolationLevel) -> Result<()> {
        if !self.capability.supports_isolation(isolation) {
            return Err(Error::unsupported_feature(format!(
                "transaction isolation [{}] not supported",
                isolation.sql_name()
            )));
        }

        self.record(
            &format!("SET TRANSACTION ISOLATION LEVEL {}", isolation.sql_name()),
            &[],
        );
        self.isolation = isolation;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
