#[macro_use]
mod fmt;
use fmt::ToSql;

mod delim;
use delim::{Comma, Delimited};

mod flavor;
use flavor::Flavor;

mod ident;
use ident::Ident;

mod params;
pub use params::{Params, Placeholder};
use params::Param;

mod expr;
use expr::{Assign, ExcludedAssign, ValuesAssign};

use crate::query::Query;

use trivet_core::{err, Entity, Error, Order, Page, Result, Value};

/// Serializes statements for one SQL dialect.
///
/// Every statement builder returns the SQL string and pushes its bound values
/// into the supplied [`Params`] sink, in placeholder order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    /// The database flavor handles the differences between SQL dialects and
    /// supported features.
    flavor: Flavor,
}

struct Formatter<'a, T> {
    /// Handle to the dialect
    dialect: &'a Dialect,

    /// Where to write the serialized SQL
    dst: &'a mut String,

    /// Where to store parameters
    params: &'a mut T,
}

impl Dialect {
    /// `INSERT INTO t (..) VALUES (..)` from an entity's fields.
    pub fn insert(&self, entity: &Entity, params: &mut impl Params) -> Result<String> {
        let table = require_table(entity.table_name())?;
        let fields = usable_fields(entity);
        if fields.is_empty() {
            return Err(Error::empty_entity("no fields to insert"));
        }

        let mut ret = String::new();
        let mut f = Formatter {
            dialect: self,
            dst: &mut ret,
            params,
        };

        fmt!(
            &mut f,
            "INSERT INTO ",
            Ident(table),
            " (",
            Comma(fields.iter().map(|&(name, _)| Ident(name))),
            ") VALUES (",
            Comma(fields.iter().map(|&(_, value)| Param(value))),
            ")",
        );

        ret.push(';');
        Ok(ret)
    }

    /// Single-row insert SQL plus one parameter row per entity.
    ///
    /// All rows bind the first entity's field set; a field missing from a
    /// later entity binds NULL.
    pub fn insert_batch(&self, entities: &[Entity]) -> Result<(String, Vec<Vec<Value>>)> {
        let Some(first) = entities.first() else {
            return Err(Error::empty_entity("no entities to insert"));
        };

        let mut params = Vec::new();
        let sql = self.insert(first, &mut params)?;
        let fields: Vec<&str> = usable_fields(first).iter().map(|&(name, _)| name).collect();

        let mut batches = Vec::with_capacity(entities.len());
        batches.push(params);
        for entity in &entities[1..] {
            batches.push(
                fields
                    .iter()
                    .map(|&name| entity.get(name).cloned().unwrap_or(Value::Null))
                    .collect(),
            );
        }

        Ok((sql, batches))
    }

    /// Insert-or-update in a single statement, where the flavor has one.
    ///
    /// Errors with an unsupported feature error on the ANSI flavor so callers
    /// can fall back to a two-statement strategy.
    pub fn upsert(
        &self,
        entity: &Entity,
        keys: &[&str],
        params: &mut impl Params,
    ) -> Result<String> {
        match self.flavor {
            Flavor::Ansi => Err(Error::unsupported_feature(
                "upsert requires a database-specific conflict clause",
            )),
            Flavor::Mysql => self.upsert_mysql(entity, params),
            Flavor::Postgresql | Flavor::Sqlite => self.upsert_on_conflict(entity, keys, params),
        }
    }

    fn upsert_on_conflict(
        &self,
        entity: &Entity,
        keys: &[&str],
        params: &mut impl Params,
    ) -> Result<String> {
        if keys.is_empty() {
            return Err(err!("upsert requires at least one key field"));
        }

        let table = require_table(entity.table_name())?;
        let fields = usable_fields(entity);
        if fields.is_empty() {
            return Err(Error::empty_entity("no fields to insert"));
        }

        let mut ret = String::new();
        let mut f = Formatter {
            dialect: self,
            dst: &mut ret,
            params,
        };

        fmt!(
            &mut f,
            "INSERT INTO ",
            Ident(table),
            " (",
            Comma(fields.iter().map(|&(name, _)| Ident(name))),
            ") VALUES (",
            Comma(fields.iter().map(|&(_, value)| Param(value))),
            ") ON CONFLICT (",
            Comma(keys.iter().map(|&key| Ident(key))),
            ")",
        );

        let updates: Vec<&str> = fields
            .iter()
            .map(|&(name, _)| name)
            .filter(|name| !keys.contains(name))
            .collect();

        if updates.is_empty() {
            fmt!(&mut f, " DO NOTHING");
        } else {
            fmt!(
                &mut f,
                " DO UPDATE SET ",
                Comma(updates.iter().map(|&name| ExcludedAssign(name))),
            );
        }

        ret.push(';');
        Ok(ret)
    }

    // MySQL resolves the conflict against the table's own unique indexes, so
    // the key list is not part of the statement
    fn upsert_mysql(&self, entity: &Entity, params: &mut impl Params) -> Result<String> {
        let table = require_table(entity.table_name())?;
        let fields = usable_fields(entity);
        if fields.is_empty() {
            return Err(Error::empty_entity("no fields to insert"));
        }

        let mut ret = String::new();
        let mut f = Formatter {
            dialect: self,
            dst: &mut ret,
            params,
        };

        fmt!(
            &mut f,
            "INSERT INTO ",
            Ident(table),
            " (",
            Comma(fields.iter().map(|&(name, _)| Ident(name))),
            ") VALUES (",
            Comma(fields.iter().map(|&(_, value)| Param(value))),
            ") ON DUPLICATE KEY UPDATE ",
            Comma(fields.iter().map(|&(name, _)| ValuesAssign(name))),
        );

        ret.push(';');
        Ok(ret)
    }

    /// `DELETE FROM t WHERE ..`. A delete without conditions is refused.
    pub fn delete(&self, query: &Query, params: &mut impl Params) -> Result<String> {
        let table = require_table(Some(query.table_name()))?;
        if query.conditions().is_empty() {
            return Err(Error::empty_entity("delete requires at least one condition"));
        }

        let mut ret = String::new();
        let mut f = Formatter {
            dialect: self,
            dst: &mut ret,
            params,
        };

        fmt!(&mut f, "DELETE FROM ", Ident(table));
        f.write_where(query.conditions());

        ret.push(';');
        Ok(ret)
    }

    /// `UPDATE t SET .. WHERE ..`. Requires both fields and conditions.
    pub fn update(&self, record: &Entity, query: &Query, params: &mut impl Params) -> Result<String> {
        let table = require_table(Some(query.table_name()))?;
        let fields = usable_fields(record);
        if fields.is_empty() {
            return Err(Error::empty_entity("no fields to update"));
        }
        if query.conditions().is_empty() {
            return Err(Error::empty_entity("update requires at least one condition"));
        }

        let mut ret = String::new();
        let mut f = Formatter {
            dialect: self,
            dst: &mut ret,
            params,
        };

        fmt!(
            &mut f,
            "UPDATE ",
            Ident(table),
            " SET ",
            Comma(fields.iter().map(|&(name, value)| Assign(name, value))),
        );
        f.write_where(query.conditions());

        ret.push(';');
        Ok(ret)
    }

    /// `SELECT .. FROM t WHERE .. ORDER BY ..`, unbounded.
    pub fn find(&self, query: &Query, params: &mut impl Params) -> Result<String> {
        let mut ret = String::new();
        let mut f = Formatter {
            dialect: self,
            dst: &mut ret,
            params,
        };

        self.write_select(&mut f, query)?;
        f.write_order_by(query.orders().iter());

        ret.push(';');
        Ok(ret)
    }

    /// `SELECT COUNT(*) FROM t WHERE ..`. Projection and ordering are
    /// irrelevant to the row count and are dropped.
    pub fn count(&self, query: &Query, params: &mut impl Params) -> Result<String> {
        let table = require_table(Some(query.table_name()))?;

        let mut ret = String::new();
        let mut f = Formatter {
            dialect: self,
            dst: &mut ret,
            params,
        };

        fmt!(&mut f, "SELECT COUNT(*) FROM ", Ident(table));
        f.write_where(query.conditions());

        ret.push(';');
        Ok(ret)
    }

    /// One page of `find`: the page's orders append to the query's, then the
    /// flavor's LIMIT form bounds the result.
    pub fn page(&self, query: &Query, page: &Page, params: &mut impl Params) -> Result<String> {
        let mut ret = String::new();
        let mut f = Formatter {
            dialect: self,
            dst: &mut ret,
            params,
        };

        self.write_select(&mut f, query)?;
        f.write_order_by(query.orders().iter().chain(page.orders().iter()));

        match self.flavor {
            Flavor::Mysql => fmt!(&mut f, " LIMIT ", page.offset(), ", ", page.size()),
            _ => fmt!(&mut f, " LIMIT ", page.size(), " OFFSET ", page.offset()),
        }

        ret.push(';');
        Ok(ret)
    }

    /// Wraps a complete SELECT so executing it yields the row count.
    ///
    /// A trailing ORDER BY clause changes nothing about the count and some
    /// databases reject it inside a derived table, so it is stripped first.
    pub fn count_wrap(&self, sql: &str) -> String {
        let inner = sql.trim().trim_end_matches(';').trim_end();
        let inner = strip_trailing_order_by(inner);
        format!("SELECT COUNT(*) FROM ({inner}) AS count_alias_;")
    }

    fn write_select<T: Params>(&self, f: &mut Formatter<'_, T>, query: &Query) -> Result<()> {
        let table = require_table(Some(query.table_name()))?;

        fmt!(f, "SELECT ");
        if query.is_distinct() {
            fmt!(f, "DISTINCT ");
        }
        if query.selected_fields().is_empty() {
            fmt!(f, "*");
        } else {
            fmt!(f, Comma(query.selected_fields().iter().map(Ident)));
        }
        fmt!(f, " FROM ", Ident(table));
        f.write_where(query.conditions());

        Ok(())
    }
}

impl<T: Params> Formatter<'_, T> {
    fn write_where(&mut self, conditions: &[crate::condition::Condition]) {
        if conditions.is_empty() {
            return;
        }
        fmt!(self, " WHERE ", Delimited(conditions.iter(), " AND "));
    }

    fn write_order_by<'o>(&mut self, orders: impl Iterator<Item = &'o Order>) {
        let mut orders = orders.peekable();
        if orders.peek().is_none() {
            return;
        }
        fmt!(self, " ORDER BY ", Comma(orders));
    }
}

fn require_table(name: Option<&str>) -> Result<&str> {
    match name {
        Some(name) if !name.trim().is_empty() => Ok(name),
        _ => Err(err!("table name must not be blank")),
    }
}

// Blank field names never reach the statement
fn usable_fields(entity: &Entity) -> Vec<(&str, &Value)> {
    entity
        .iter()
        .filter(|(name, _)| !name.trim().is_empty())
        .collect()
}

// The strip is skipped when a ')' follows the match, which means the ORDER BY
// belongs to a parenthesized subquery rather than the outer statement
fn strip_trailing_order_by(sql: &str) -> &str {
    let upper = sql.to_ascii_uppercase();
    if let Some(idx) = upper.rfind("ORDER BY") {
        if !upper[idx..].contains(')') {
            return sql[..idx].trim_end();
        }
    }
    sql
}
