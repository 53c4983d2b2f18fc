use postgres::{Client, Statement};
use std::collections::HashMap;
use trivet_core::Result;

/// Per-connection cache of prepared statements, keyed by SQL text.
#[derive(Debug, Default)]
pub(crate) struct StatementCache {
    map: HashMap<String, Statement>,
}

impl StatementCache {
    pub(crate) fn prepare(&mut self, client: &mut Client, sql: &str) -> Result<Statement> {
        if let Some(statement) = self.map.get(sql) {
            return Ok(statement.clone());
        }

        let statement = client.prepare(sql).map_err(crate::map_err)?;
        self.map.insert(sql.to_string(), statement.clone());
        Ok(statement)
    }
}
