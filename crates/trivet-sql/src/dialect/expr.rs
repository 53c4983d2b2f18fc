use super::{Comma, Formatter, Ident, Param, Params, ToSql};

use crate::condition::{Condition, Op};
use trivet_core::{Order, Value};

impl ToSql for &Condition {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let field = Ident(self.field());

        match self.op() {
            Op::IsNull => fmt!(f, field, " IS NULL"),
            Op::IsNotNull => fmt!(f, field, " IS NOT NULL"),
            Op::In => {
                fmt!(f, field, " IN (", Comma(self.values().iter().map(Param)), ")");
            }
            Op::Between => {
                if let [low, high] = self.values() {
                    fmt!(f, field, " BETWEEN ", Param(low), " AND ", Param(high));
                }
            }
            op => {
                if let Some(value) = self.values().first() {
                    fmt!(f, field, " ", op.symbol(), " ", Param(value));
                }
            }
        }
    }
}

impl ToSql for &Order {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, Ident(&self.field), " ", self.direction.as_str());
    }
}

/// `col = ?` in an UPDATE SET list
pub(super) struct Assign<'a>(pub(super) &'a str, pub(super) &'a Value);

impl ToSql for Assign<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, Ident(self.0), " = ", Param(self.1));
    }
}

/// `col = excluded.col` in an ON CONFLICT DO UPDATE list
pub(super) struct ExcludedAssign<'a>(pub(super) &'a str);

impl ToSql for ExcludedAssign<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, Ident(self.0), " = excluded.", Ident(self.0));
    }
}

/// `col = VALUES(col)` in an ON DUPLICATE KEY UPDATE list
pub(super) struct ValuesAssign<'a>(pub(super) &'a str);

impl ToSql for ValuesAssign<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, Ident(self.0), " = VALUES(", Ident(self.0), ")");
    }
}
