use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};
use trivet_core::{Error, Result, Value};

/// Borrowed statement parameter bridging a trivet value into rusqlite.
#[derive(Debug)]
pub(crate) struct Param<'a>(pub(crate) &'a Value);

impl ToSql for Param<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self.0 {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            // SQLite has no boolean storage class
            Value::Bool(true) => ToSqlOutput::Owned(SqlValue::Integer(1)),
            Value::Bool(false) => ToSqlOutput::Owned(SqlValue::Integer(0)),
            Value::I64(value) => ToSqlOutput::Owned(SqlValue::Integer(*value)),
            Value::F64(value) => ToSqlOutput::Owned(SqlValue::Real(*value)),
            Value::String(value) => ToSqlOutput::Borrowed(ValueRef::Text(value.as_bytes())),
            Value::Bytes(value) => ToSqlOutput::Borrowed(ValueRef::Blob(&value[..])),
        })
    }
}

/// Read one result cell, mapped by SQLite storage class.
pub(crate) fn from_sql(row: &rusqlite::Row<'_>, index: usize) -> Result<Value> {
    let value = row.get_ref(index).map_err(crate::map_err)?;

    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(value) => Value::I64(value),
        ValueRef::Real(value) => Value::F64(value),
        ValueRef::Text(value) => {
            let value = std::str::from_utf8(value).map_err(Error::driver)?;
            Value::String(value.to_string())
        }
        ValueRef::Blob(value) => Value::Bytes(value.to_vec()),
    })
}
