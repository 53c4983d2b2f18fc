use trivet_core::{err, Entity, Result, Row, Rows, Value};

/// Converts a query result into a typed value.
///
/// Query methods take any `RsHandler` and hand it the full result set, so
/// callers choose the shape of the outcome at the call site. Closures with a
/// matching signature are handlers too:
///
/// ```
/// use trivet::{Rows, RsHandler};
///
/// let rows = Rows::new(vec!["n".into()], vec![vec![1i64.into()], vec![2i64.into()]]);
/// let total = (|rows: Rows| Ok(rows.len())).handle(rows)?;
/// assert_eq!(total, 2);
/// # Ok::<(), trivet::Error>(())
/// ```
pub trait RsHandler<T> {
    fn handle(self, rows: Rows) -> Result<T>;
}

impl<T, F> RsHandler<T> for F
where
    F: FnOnce(Rows) -> Result<T>,
{
    fn handle(self, rows: Rows) -> Result<T> {
        self(rows)
    }
}

/// Collects every row into an [`Entity`].
#[derive(Debug, Default, Clone, Copy)]
pub struct EntityListHandler;

impl RsHandler<Vec<Entity>> for EntityListHandler {
    fn handle(self, rows: Rows) -> Result<Vec<Entity>> {
        Ok(rows.map(Row::into_entity).collect())
    }
}

/// Keeps only the first row, as an [`Entity`].
#[derive(Debug, Default, Clone, Copy)]
pub struct EntityHandler;

impl RsHandler<Option<Entity>> for EntityHandler {
    fn handle(self, mut rows: Rows) -> Result<Option<Entity>> {
        Ok(rows.next().map(Row::into_entity))
    }
}

/// Reads the first cell of the first row as an integer.
///
/// Aggregate queries always produce a row, so an empty result is an error
/// here rather than a missing value.
#[derive(Debug, Default, Clone, Copy)]
pub struct NumberHandler;

impl RsHandler<i64> for NumberHandler {
    fn handle(self, mut rows: Rows) -> Result<i64> {
        let Some(row) = rows.next() else {
            return Err(err!("query returned no rows"));
        };

        let Some(value) = row.into_values().into_iter().next() else {
            return Err(err!("query returned no columns"));
        };

        value.to_i64()
    }
}

/// Reads the first cell of the first row as a string.
///
/// Yields `None` when the result is empty or the cell is NULL.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringHandler;

impl RsHandler<Option<String>> for StringHandler {
    fn handle(self, mut rows: Rows) -> Result<Option<String>> {
        let Some(row) = rows.next() else {
            return Ok(None);
        };

        match row.into_values().into_iter().next() {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value.to_string().map(Some),
        }
    }
}

/// Collects the first column of every row.
#[derive(Debug, Default, Clone, Copy)]
pub struct ColumnListHandler;

impl RsHandler<Vec<Value>> for ColumnListHandler {
    fn handle(self, rows: Rows) -> Result<Vec<Value>> {
        Ok(rows
            .filter_map(|row| row.into_values().into_iter().next())
            .collect())
    }
}
