//! Conversions between [`Entity`] and user-defined record types.
//!
//! Records go through serde: any `Serialize` type whose representation is a
//! flat object maps onto an entity, and any `Deserialize` type can be built
//! back from one. Nested structures have no column to land in, so they are
//! rejected rather than silently flattened.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Number, Value as Json};
use trivet_core::{err, Entity, Error, Result, Value};

/// Converts a serializable record into an [`Entity`] bound to `table`.
///
/// ```
/// use serde::Serialize;
/// use trivet::to_entity;
///
/// #[derive(Serialize)]
/// struct User {
///     name: String,
///     age: i64,
/// }
///
/// let user = User { name: "alice".into(), age: 32 };
/// let entity = to_entity("user", &user)?;
///
/// assert_eq!(entity.table_name(), Some("user"));
/// assert_eq!(entity.get("age"), Some(&32i64.into()));
/// # Ok::<(), trivet::Error>(())
/// ```
pub fn to_entity<T: Serialize>(table: &str, record: &T) -> Result<Entity> {
    let json = serde_json::to_value(record)
        .map_err(|err| err!("cannot serialize record: {err}"))?;

    let Json::Object(fields) = json else {
        return Err(err!("a record must serialize to an object"));
    };

    let mut entity = Entity::create(table);
    // Object iteration follows declaration order (serde_json's preserve_order)
    for (field, json) in fields {
        let value = json_to_value(&field, json)?;
        entity.insert(field, value);
    }

    Ok(entity)
}

/// Builds a typed record from an [`Entity`], matching fields by name.
pub fn from_entity<T: DeserializeOwned>(entity: &Entity) -> Result<T> {
    let mut fields = Map::new();
    for (field, value) in entity.iter() {
        fields.insert(field.to_string(), value_to_json(value));
    }

    serde_json::from_value(Json::Object(fields))
        .map_err(|err| err!("cannot deserialize row: {err}"))
}

fn json_to_value(field: &str, json: Json) -> Result<Value> {
    Ok(match json {
        Json::Null => Value::Null,
        Json::Bool(value) => Value::Bool(value),
        Json::Number(number) => {
            if let Some(value) = number.as_i64() {
                Value::I64(value)
            } else if let Some(value) = number.as_f64() {
                Value::F64(value)
            } else {
                // u64 beyond i64::MAX
                return Err(err!("number {number} for field `{field}` is out of range"));
            }
        }
        Json::String(value) => Value::String(value),
        Json::Array(_) => {
            return Err(Error::type_conversion_from(
                "Array",
                format!("a database value for field `{field}`"),
            ));
        }
        Json::Object(_) => {
            return Err(Error::type_conversion_from(
                "Object",
                format!("a database value for field `{field}`"),
            ));
        }
    })
}

fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(value) => Json::Bool(*value),
        Value::I64(value) => Json::Number((*value).into()),
        // NaN and infinities have no JSON form
        Value::F64(value) => Number::from_f64(*value).map(Json::Number).unwrap_or(Json::Null),
        Value::String(value) => Json::String(value.clone()),
        Value::Bytes(value) => {
            Json::Array(value.iter().map(|b| Json::Number((*b).into())).collect())
        }
    }
}
