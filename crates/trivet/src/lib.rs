//! A synchronous SQL convenience layer.
//!
//! trivet keeps one open connection per (thread, data source) pair and runs
//! map-shaped [`Entity`] records through dialect-generated SQL. [`Db`] is the
//! closure-style entry point; [`Session`] pins a connection for manual
//! transaction control.
//!
//! ```no_run
//! use trivet::{Db, Entity};
//!
//! fn main() -> trivet::Result<()> {
//!     let db = Db::connect("sqlite::memory:")?;
//!
//!     db.execute("CREATE TABLE user (id INTEGER PRIMARY KEY, name TEXT)", &[])?;
//!     db.insert(&Entity::create("user").set("name", "alice"))?;
//!
//!     let user = db.get(&Entity::create("user").set("name", "alice"))?;
//!     assert!(user.is_some());
//!     Ok(())
//! }
//! ```

mod cache;
pub use cache::{CachedConnection, ConnectionCache};

mod db;
pub use db::Db;

mod handler;
pub use handler::{
    ColumnListHandler, EntityHandler, EntityListHandler, NumberHandler, RsHandler, StringHandler,
};

mod mapping;
pub use mapping::{from_entity, to_entity};

mod runner;
pub use runner::DialectRunner;

mod session;
pub use session::{Savepoint, Session};

#[cfg(test)]
pub(crate) mod testing;

pub use trivet_core::{
    Capability, Connection, DataSource, Direction, Entity, Error, IsolationLevel, Order, Page,
    PageResult, Result, Row, Rows, Value, DEFAULT_PAGE_SIZE,
};
pub use trivet_sql::{Condition, Dialect, LikeType, Op, Query};
