use crate::Value;
use indexmap::IndexMap;

/// An ordered collection of named values, tied to an optional table name.
///
/// An `Entity` plays two roles. As a record it holds the fields of a row to
/// insert or update. As a condition holder it describes which rows an
/// operation applies to, with each field compared against its value.
///
/// Fields keep their insertion order. Setting a field that already exists
/// overwrites the value but keeps the field's original position.
///
/// ```
/// use trivet_core::Entity;
///
/// let user = Entity::create("user")
///     .set("name", "alice")
///     .set("age", 32i64);
///
/// assert_eq!(user.table_name(), Some("user"));
/// assert_eq!(user.len(), 2);
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Entity {
    table_name: Option<String>,
    fields: IndexMap<String, Value>,
}

impl Entity {
    /// Creates an empty entity with no table name.
    pub fn new() -> Entity {
        Entity::default()
    }

    /// Creates an empty entity bound to a table.
    pub fn create(table_name: impl Into<String>) -> Entity {
        Entity {
            table_name: Some(table_name.into()),
            fields: IndexMap::new(),
        }
    }

    /// Sets a field, returning the entity for chaining.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Entity {
        self.insert(field, value);
        self
    }

    /// Sets a field in place.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Removes a field, preserving the order of the remaining fields.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.shift_remove(field)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns `true` when the entity has no fields. The table name does not
    /// count as a field.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    pub fn set_table_name(&mut self, table_name: impl Into<String>) {
        self.table_name = Some(table_name.into());
    }

    /// Returns a new entity holding only the named fields, in this entity's
    /// order. The table name carries over.
    ///
    /// Used to split a record into "the part that identifies the row" when an
    /// operation needs both the full record and its key fields.
    pub fn filter(&self, fields: &[&str]) -> Entity {
        Entity {
            table_name: self.table_name.clone(),
            fields: self
                .fields
                .iter()
                .filter(|(name, _)| fields.contains(&name.as_str()))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        }
    }
}

impl IntoIterator for Entity {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Entity {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl FromIterator<(String, Value)> for Entity {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Entity {
        Entity {
            table_name: None,
            fields: iter.into_iter().collect(),
        }
    }
}
