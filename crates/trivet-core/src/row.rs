use crate::{Entity, Value};
use std::sync::Arc;

/// A fully materialized query result.
///
/// Drivers read every row before returning, so iterating `Rows` never touches
/// the database. All rows share one set of column names.
#[derive(Debug)]
pub struct Rows {
    columns: Arc<[String]>,
    rows: std::vec::IntoIter<Vec<Value>>,
}

/// A single row of a query result.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Rows {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Rows {
        Rows {
            columns: columns.into(),
            rows: rows.into_iter(),
        }
    }

    /// A result with no columns and no rows.
    pub fn empty() -> Rows {
        Rows::new(vec![], vec![])
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of a column by name, if present.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Number of rows not yet yielded.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Iterator for Rows {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        let values = self.rows.next()?;
        Some(Row {
            columns: self.columns.clone(),
            values,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for Rows {}

impl Row {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of a column by name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.values.get(index)
    }

    /// Value of a column by position.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Converts the row into an [`Entity`] with one field per column, in
    /// column order. No table name is attached.
    pub fn into_entity(self) -> Entity {
        self.columns
            .iter()
            .cloned()
            .zip(self.values)
            .collect()
    }
}
