use crate::condition::Condition;

use trivet_core::{err, Direction, Entity, Order, Page, Result};

/// A description of which rows to read or touch.
///
/// Built either directly with the builder methods or derived from a condition
/// entity with [`Query::from_entity`].
#[derive(Debug, Clone, Default)]
pub struct Query {
    table: String,
    fields: Vec<String>,
    conditions: Vec<Condition>,
    orders: Vec<Order>,
    distinct: bool,
    page: Option<Page>,
}

impl Query {
    pub fn table(name: impl Into<String>) -> Query {
        Query {
            table: name.into(),
            ..Query::default()
        }
    }

    /// Derives a query from a condition entity: the entity's table plus one
    /// parsed condition per field.
    pub fn from_entity(entity: &Entity) -> Result<Query> {
        let table = match entity.table_name() {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(err!("table name must not be blank")),
        };

        Ok(Query {
            table: table.to_string(),
            conditions: Condition::from_entity(entity)?,
            ..Query::default()
        })
    }

    /// Adds a projected field. A query with no fields selects `*`.
    pub fn field(mut self, name: impl Into<String>) -> Query {
        self.fields.push(name.into());
        self
    }

    pub fn condition(mut self, condition: Condition) -> Query {
        self.conditions.push(condition);
        self
    }

    pub fn order(mut self, field: impl Into<String>, direction: Direction) -> Query {
        self.orders.push(Order::new(field, direction));
        self
    }

    pub fn distinct(mut self) -> Query {
        self.distinct = true;
        self
    }

    pub fn paged(mut self, page: Page) -> Query {
        self.page = Some(page);
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn selected_fields(&self) -> &[String] {
        &self.fields
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }
}
