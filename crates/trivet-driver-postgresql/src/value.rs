use postgres::types::{accepts, private::BytesMut, to_sql_checked, IsNull, ToSql, Type};
use trivet_core::{Error, Result, Value as CoreValue};

/// Borrowed statement parameter bridging a trivet value into postgres.
#[derive(Debug)]
pub(crate) struct Param<'a>(pub(crate) &'a CoreValue);

impl ToSql for Param<'_> {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> std::result::Result<IsNull, Box<dyn std::error::Error + Sync + Send>>
    where
        Self: Sized,
    {
        match self.0 {
            CoreValue::Null => Ok(IsNull::Yes),
            CoreValue::Bool(value) => value.to_sql(ty, out),
            // The server infers parameter types from column context, so
            // integers narrow or widen to whatever it picked.
            CoreValue::I64(value) => match *ty {
                Type::INT2 => (*value as i16).to_sql(ty, out),
                Type::INT4 => (*value as i32).to_sql(ty, out),
                Type::INT8 => value.to_sql(ty, out),
                _ => Err(mismatch("I64", ty)),
            },
            CoreValue::F64(value) => match *ty {
                Type::FLOAT4 => (*value as f32).to_sql(ty, out),
                Type::FLOAT8 => value.to_sql(ty, out),
                _ => Err(mismatch("F64", ty)),
            },
            CoreValue::String(value) => value.to_sql(ty, out),
            CoreValue::Bytes(value) => value.to_sql(ty, out),
        }
    }

    accepts!(BOOL, INT2, INT4, INT8, FLOAT4, FLOAT8, TEXT, VARCHAR, BPCHAR, BYTEA);
    to_sql_checked!();
}

fn mismatch(found: &str, ty: &Type) -> Box<dyn std::error::Error + Sync + Send> {
    format!("cannot bind {found} parameter as PostgreSQL type `{ty}`").into()
}

/// Read one result cell, mapped by column type.
pub(crate) fn from_sql(row: &postgres::Row, index: usize) -> Result<CoreValue> {
    let ty = row.columns()[index].type_();

    // The inner representation of the PostgreSQL type enum is not accessible,
    // so each type is matched manually.
    if *ty == Type::BOOL {
        cell(row, index, CoreValue::Bool)
    } else if *ty == Type::INT2 {
        cell(row, index, |value: i16| CoreValue::I64(value as i64))
    } else if *ty == Type::INT4 {
        cell(row, index, |value: i32| CoreValue::I64(value as i64))
    } else if *ty == Type::INT8 {
        cell(row, index, CoreValue::I64)
    } else if *ty == Type::FLOAT4 {
        cell(row, index, |value: f32| CoreValue::F64(value as f64))
    } else if *ty == Type::FLOAT8 {
        cell(row, index, CoreValue::F64)
    } else if *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR || *ty == Type::NAME
    {
        cell(row, index, CoreValue::String)
    } else if *ty == Type::BYTEA {
        cell(row, index, CoreValue::Bytes)
    } else {
        Err(Error::unsupported_feature(format!(
            "cannot read PostgreSQL column type `{ty}`"
        )))
    }
}

fn cell<'a, T>(
    row: &'a postgres::Row,
    index: usize,
    map: impl FnOnce(T) -> CoreValue,
) -> Result<CoreValue>
where
    T: postgres::types::FromSql<'a>,
{
    let value: Option<T> = row.try_get(index).map_err(crate::map_err)?;
    Ok(value.map(map).unwrap_or(CoreValue::Null))
}
