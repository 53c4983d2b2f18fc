use crate::handler::{EntityHandler, EntityListHandler, NumberHandler, RsHandler};

use tracing::debug;
use trivet_core::{err, Connection, Entity, Error, PageResult, Result, Rows, Value};
use trivet_sql::{Condition, Dialect, LikeType, Query};

/// Executes CRUD operations against a borrowed connection.
///
/// The runner owns nothing. Each call borrows a connection, builds the
/// statement through the [`Dialect`], executes it, and returns the result.
/// Opening, transaction control, and closing stay with the caller.
///
/// Empty-entity preconditions fail here, before any SQL is generated, so a
/// refused operation never reaches the driver.
#[derive(Debug, Clone, Copy)]
pub struct DialectRunner {
    dialect: Dialect,
}

impl DialectRunner {
    pub fn new(dialect: Dialect) -> DialectRunner {
        DialectRunner { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Inserts one record. The record must have a table name and at least one
    /// field.
    pub fn insert(&self, connection: &mut dyn Connection, record: &Entity) -> Result<u64> {
        if record.is_empty() {
            return Err(Error::empty_entity("no fields to insert"));
        }

        let mut params = Vec::new();
        let sql = self.dialect.insert(record, &mut params)?;
        self.exec(connection, &sql, &params)
    }

    /// Inserts many records with one prepared statement, returning per-row
    /// affected counts. All records bind the first record's field set.
    pub fn insert_batch(
        &self,
        connection: &mut dyn Connection,
        records: &[Entity],
    ) -> Result<Vec<u64>> {
        if records.is_empty() {
            return Err(Error::empty_entity("no entities to insert"));
        }
        if records.iter().any(Entity::is_empty) {
            return Err(Error::empty_entity("no fields to insert"));
        }

        let (sql, batches) = self.dialect.insert_batch(records)?;
        self.execute_batch(connection, &sql, &batches)
    }

    /// Inserts one record and returns the generated row id.
    ///
    /// Fails on drivers that cannot report generated keys.
    pub fn insert_for_generated_key(
        &self,
        connection: &mut dyn Connection,
        record: &Entity,
    ) -> Result<i64> {
        self.insert(connection, record)?;
        connection.last_insert_id()
    }

    /// Inserts the record, or updates the existing row on a key conflict.
    ///
    /// Uses the dialect's single-statement form when it has one; the ANSI
    /// flavor falls back to [`insert_or_update`](Self::insert_or_update).
    pub fn upsert(
        &self,
        connection: &mut dyn Connection,
        record: &Entity,
        keys: &[&str],
    ) -> Result<u64> {
        if record.is_empty() {
            return Err(Error::empty_entity("no fields to insert"));
        }

        let mut params = Vec::new();
        match self.dialect.upsert(record, keys, &mut params) {
            Ok(sql) => self.exec(connection, &sql, &params),
            Err(err) if err.is_unsupported_feature() => {
                self.insert_or_update(connection, record, keys)
            }
            Err(err) => Err(err),
        }
    }

    /// Two-statement insert-or-update: when the record's key fields match an
    /// existing row, update it, otherwise insert.
    ///
    /// A record that carries none of the key fields cannot match anything and
    /// inserts directly.
    pub fn insert_or_update(
        &self,
        connection: &mut dyn Connection,
        record: &Entity,
        keys: &[&str],
    ) -> Result<u64> {
        let filter = record.filter(keys);

        if !filter.is_empty() && self.count(connection, &filter)? > 0 {
            self.update(connection, record, &filter)
        } else {
            self.insert(connection, record)
        }
    }

    /// Deletes the rows matching the condition entity.
    ///
    /// An empty condition entity is refused rather than deleting the whole
    /// table.
    pub fn del(&self, connection: &mut dyn Connection, where_: &Entity) -> Result<u64> {
        if where_.is_empty() {
            return Err(Error::empty_entity("delete requires at least one condition"));
        }

        let query = Query::from_entity(where_)?;
        let mut params = Vec::new();
        let sql = self.dialect.delete(&query, &mut params)?;
        self.exec(connection, &sql, &params)
    }

    /// Updates the rows matching `where_` with the record's fields.
    ///
    /// Both entities must be non-empty; an empty condition would rewrite the
    /// whole table.
    pub fn update(
        &self,
        connection: &mut dyn Connection,
        record: &Entity,
        where_: &Entity,
    ) -> Result<u64> {
        if record.is_empty() {
            return Err(Error::empty_entity("no fields to update"));
        }
        if where_.is_empty() {
            return Err(Error::empty_entity("update requires at least one condition"));
        }

        // The record's table wins; the condition entity's is the fallback
        let table = table_name(record)
            .or_else(|| table_name(where_))
            .ok_or_else(|| err!("table name must not be blank"))?;

        let mut query = Query::table(table);
        for condition in Condition::from_entity(where_)? {
            query = query.condition(condition);
        }

        let mut params = Vec::new();
        let sql = self.dialect.update(record, &query, &mut params)?;
        self.exec(connection, &sql, &params)
    }

    /// Runs the query and hands the full result to `handler`.
    pub fn find<T>(
        &self,
        connection: &mut dyn Connection,
        query: &Query,
        handler: impl RsHandler<T>,
    ) -> Result<T> {
        let mut params = Vec::new();
        let sql = self.dialect.find(query, &mut params)?;
        let rows = self.fetch(connection, &sql, &params)?;
        handler.handle(rows)
    }

    /// First row matching the condition entity, if any.
    pub fn get(&self, connection: &mut dyn Connection, where_: &Entity) -> Result<Option<Entity>> {
        self.find(connection, &Query::from_entity(where_)?, EntityHandler)
    }

    /// All rows matching the condition entity.
    pub fn find_all(&self, connection: &mut dyn Connection, where_: &Entity) -> Result<Vec<Entity>> {
        self.find(connection, &Query::from_entity(where_)?, EntityListHandler)
    }

    /// All rows where `field` equals `value`.
    pub fn find_by(
        &self,
        connection: &mut dyn Connection,
        table: &str,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<Vec<Entity>> {
        let query = Query::table(table).condition(Condition::eq(field, value));
        self.find(connection, &query, EntityListHandler)
    }

    /// All rows where `field` matches `value` under the LIKE placement.
    pub fn find_like(
        &self,
        connection: &mut dyn Connection,
        table: &str,
        field: &str,
        value: &str,
        like_type: LikeType,
    ) -> Result<Vec<Entity>> {
        let query = Query::table(table).condition(Condition::like(field, like_type.pattern(value)));
        self.find(connection, &query, EntityListHandler)
    }

    /// All rows where `field` is one of `values`.
    pub fn find_in(
        &self,
        connection: &mut dyn Connection,
        table: &str,
        field: &str,
        values: Vec<Value>,
    ) -> Result<Vec<Entity>> {
        let query = Query::table(table).condition(Condition::in_values(field, values)?);
        self.find(connection, &query, EntityListHandler)
    }

    /// Number of rows matching the condition entity. An entity with no fields
    /// counts the whole table.
    pub fn count(&self, connection: &mut dyn Connection, where_: &Entity) -> Result<u64> {
        self.count_query(connection, &Query::from_entity(where_)?)
    }

    /// Number of rows matching the query. Projection, ordering, and paging
    /// are ignored.
    pub fn count_query(&self, connection: &mut dyn Connection, query: &Query) -> Result<u64> {
        let mut params = Vec::new();
        let sql = self.dialect.count(query, &mut params)?;
        let rows = self.fetch(connection, &sql, &params)?;
        Ok(NumberHandler.handle(rows)? as u64)
    }

    /// One page of results, with totals.
    ///
    /// Counts the matching rows first, then fetches the bounded page. A query
    /// without a [`Page`](trivet_core::Page) falls back to an unbounded find.
    pub fn page(&self, connection: &mut dyn Connection, query: &Query) -> Result<PageResult<Entity>> {
        let Some(page) = query.page() else {
            let items = self.find(connection, query, EntityListHandler)?;
            return Ok(PageResult::unpaged(items));
        };

        let total = self.count_query(connection, query)?;

        let mut params = Vec::new();
        let sql = self.dialect.page(query, page, &mut params)?;
        let rows = self.fetch(connection, &sql, &params)?;
        let items = EntityListHandler.handle(rows)?;

        Ok(PageResult::new(page.number(), page.size(), total, items))
    }

    /// Runs a raw SELECT and hands the result to `handler`.
    pub fn query<T>(
        &self,
        connection: &mut dyn Connection,
        sql: &str,
        params: &[Value],
        handler: impl RsHandler<T>,
    ) -> Result<T> {
        let rows = self.fetch(connection, sql, params)?;
        handler.handle(rows)
    }

    /// Counts the rows a raw SELECT would return, by wrapping it in
    /// `SELECT COUNT(*)`.
    pub fn count_by_sql(
        &self,
        connection: &mut dyn Connection,
        sql: &str,
        params: &[Value],
    ) -> Result<u64> {
        let wrapped = self.dialect.count_wrap(sql);
        let rows = self.fetch(connection, &wrapped, params)?;
        Ok(NumberHandler.handle(rows)? as u64)
    }

    /// Runs a raw non-SELECT statement, returning the affected row count.
    pub fn execute(
        &self,
        connection: &mut dyn Connection,
        sql: &str,
        params: &[Value],
    ) -> Result<u64> {
        self.exec(connection, sql, params)
    }

    /// Runs a raw statement once per parameter row.
    pub fn execute_batch(
        &self,
        connection: &mut dyn Connection,
        sql: &str,
        batches: &[Vec<Value>],
    ) -> Result<Vec<u64>> {
        debug!(%sql, rows = batches.len(), "execute batch");
        connection.execute_batch(sql, batches)
    }

    fn exec(&self, connection: &mut dyn Connection, sql: &str, params: &[Value]) -> Result<u64> {
        debug!(%sql, params = params.len(), "execute");
        connection.execute(sql, params)
    }

    fn fetch(&self, connection: &mut dyn Connection, sql: &str, params: &[Value]) -> Result<Rows> {
        debug!(%sql, params = params.len(), "query");
        connection.query(sql, params)
    }
}

fn table_name(entity: &Entity) -> Option<&str> {
    entity.table_name().filter(|name| !name.trim().is_empty())
}
