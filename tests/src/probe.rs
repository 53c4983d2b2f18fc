use trivet::{Capability, Connection, DataSource, IsolationLevel, Rows, Value};

use std::{
    borrow::Cow,
    sync::{Arc, Mutex},
};

/// Record of every statement a [`ProbeDataSource`] saw.
#[derive(Debug, Clone, Default)]
pub struct StatementLog {
    statements: Arc<Mutex<Vec<String>>>,
}

impl StatementLog {
    /// SQL texts in execution order.
    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.lock().unwrap().is_empty()
    }

    fn record(&self, sql: &str) {
        self.statements.lock().unwrap().push(sql.to_string());
    }
}

/// A data source wrapper that records every statement reaching the driver.
///
/// Guard tests use the log to prove a refused operation produced no driver
/// traffic at all; everything else passes through to the wrapped driver
/// untouched.
#[derive(Debug)]
pub struct ProbeDataSource {
    inner: Box<dyn DataSource>,
    log: StatementLog,
}

impl ProbeDataSource {
    /// Wraps `inner`, returning the probe and a handle to its log.
    pub fn wrap(inner: impl DataSource) -> (Arc<dyn DataSource>, StatementLog) {
        let log = StatementLog::default();
        let probe = ProbeDataSource {
            inner: Box::new(inner),
            log: log.clone(),
        };

        (Arc::new(probe), log)
    }
}

impl DataSource for ProbeDataSource {
    fn url(&self) -> Cow<'_, str> {
        self.inner.url()
    }

    fn capability(&self) -> &'static Capability {
        self.inner.capability()
    }

    fn connect(&self) -> trivet::Result<Box<dyn Connection>> {
        Ok(Box::new(ProbeConnection {
            inner: self.inner.connect()?,
            log: self.log.clone(),
        }))
    }
}

#[derive(Debug)]
struct ProbeConnection {
    inner: Box<dyn Connection>,
    log: StatementLog,
}

impl Connection for ProbeConnection {
    fn capability(&self) -> &'static Capability {
        self.inner.capability()
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> trivet::Result<u64> {
        self.log.record(sql);
        self.inner.execute(sql, params)
    }

    fn execute_batch(&mut self, sql: &str, batches: &[Vec<Value>]) -> trivet::Result<Vec<u64>> {
        for _ in batches {
            self.log.record(sql);
        }
        self.inner.execute_batch(sql, batches)
    }

    fn query(&mut self, sql: &str, params: &[Value]) -> trivet::Result<Rows> {
        self.log.record(sql);
        self.inner.query(sql, params)
    }

    fn last_insert_id(&mut self) -> trivet::Result<i64> {
        self.inner.last_insert_id()
    }

    fn auto_commit(&self) -> bool {
        self.inner.auto_commit()
    }

    fn set_auto_commit(&mut self, auto_commit: bool) -> trivet::Result<()> {
        self.inner.set_auto_commit(auto_commit)
    }

    fn commit(&mut self) -> trivet::Result<()> {
        self.inner.commit()
    }

    fn rollback(&mut self) -> trivet::Result<()> {
        self.inner.rollback()
    }

    fn savepoint(&mut self, name: &str) -> trivet::Result<()> {
        self.inner.savepoint(name)
    }

    fn release_savepoint(&mut self, name: &str) -> trivet::Result<()> {
        self.inner.release_savepoint(name)
    }

    fn rollback_to_savepoint(&mut self, name: &str) -> trivet::Result<()> {
        self.inner.rollback_to_savepoint(name)
    }

    fn isolation(&mut self) -> trivet::Result<IsolationLevel> {
        self.inner.isolation()
    }

    fn set_isolation(&mut self, level: IsolationLevel) -> trivet::Result<()> {
        self.inner.set_isolation(level)
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}
