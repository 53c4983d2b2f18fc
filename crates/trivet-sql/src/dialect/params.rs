use super::{Flavor, Formatter, ToSql};

use trivet_core::Value;

/// Sink for statement parameters.
///
/// The dialect pushes each bound value here while serializing and renders the
/// returned placeholder in its place.
pub trait Params {
    fn push(&mut self, param: &Value) -> Placeholder;
}

/// A 1-based parameter position.
pub struct Placeholder(pub usize);

/// A value bound into the statement at the current position.
pub(super) struct Param<'a>(pub(super) &'a Value);

impl Params for Vec<Value> {
    fn push(&mut self, value: &Value) -> Placeholder {
        self.push(value.clone());
        Placeholder(self.len())
    }
}

impl ToSql for Placeholder {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        use std::fmt::Write;

        match f.dialect.flavor {
            Flavor::Ansi | Flavor::Mysql => write!(&mut f.dst, "?").unwrap(),
            Flavor::Postgresql => write!(&mut f.dst, "${}", self.0).unwrap(),
            Flavor::Sqlite => write!(&mut f.dst, "?{}", self.0).unwrap(),
        }
    }
}

impl ToSql for Param<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let placeholder = f.params.push(self.0);
        placeholder.to_sql(f);
    }
}
