use trivet_core::{err, Entity, Result, Value};

/// Comparison operator of a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Like,
    In,
    Between,
    IsNull,
    IsNotNull,
}

impl Op {
    pub fn symbol(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::NotEq => "<>",
            Op::Lt => "<",
            Op::LtEq => "<=",
            Op::Gt => ">",
            Op::GtEq => ">=",
            Op::Like => "LIKE",
            Op::In => "IN",
            Op::Between => "BETWEEN",
            Op::IsNull => "IS NULL",
            Op::IsNotNull => "IS NOT NULL",
        }
    }
}

/// Where to place the wildcard in a LIKE pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeType {
    StartsWith,
    EndsWith,
    Contains,
}

impl LikeType {
    /// Builds the LIKE pattern for a raw value.
    pub fn pattern(self, value: &str) -> String {
        match self {
            LikeType::StartsWith => format!("{value}%"),
            LikeType::EndsWith => format!("%{value}"),
            LikeType::Contains => format!("%{value}%"),
        }
    }
}

/// One WHERE term: a field compared against zero or more values.
///
/// Conditions are built directly with the operator constructors, or parsed
/// from the string-expression form a condition entity carries, where the
/// value spells out the operator: `"> 5"`, `"<> closed"`, `"LIKE a%"`,
/// `"BETWEEN 1 AND 10"`, `"IN 1,2,3"`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    field: String,
    op: Op,
    values: Vec<Value>,
}

impl Condition {
    fn new(field: impl Into<String>, op: Op, values: Vec<Value>) -> Condition {
        Condition {
            field: field.into(),
            op,
            values,
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Condition {
        Condition::new(field, Op::Eq, vec![value.into()])
    }

    pub fn not_eq(field: impl Into<String>, value: impl Into<Value>) -> Condition {
        Condition::new(field, Op::NotEq, vec![value.into()])
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Condition {
        Condition::new(field, Op::Lt, vec![value.into()])
    }

    pub fn lt_eq(field: impl Into<String>, value: impl Into<Value>) -> Condition {
        Condition::new(field, Op::LtEq, vec![value.into()])
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Condition {
        Condition::new(field, Op::Gt, vec![value.into()])
    }

    pub fn gt_eq(field: impl Into<String>, value: impl Into<Value>) -> Condition {
        Condition::new(field, Op::GtEq, vec![value.into()])
    }

    /// LIKE against a ready-made pattern. See [`LikeType::pattern`] for
    /// building one from a raw value.
    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Condition {
        Condition::new(field, Op::Like, vec![Value::String(pattern.into())])
    }

    pub fn is_null(field: impl Into<String>) -> Condition {
        Condition::new(field, Op::IsNull, vec![])
    }

    pub fn is_not_null(field: impl Into<String>) -> Condition {
        Condition::new(field, Op::IsNotNull, vec![])
    }

    pub fn in_values(field: impl Into<String>, values: Vec<Value>) -> Result<Condition> {
        if values.is_empty() {
            return Err(err!("in condition requires at least one value"));
        }
        Ok(Condition::new(field, Op::In, values))
    }

    pub fn between(
        field: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Condition {
        Condition::new(field, Op::Between, vec![low.into(), high.into()])
    }

    /// Parses a condition from a field and its entity value.
    ///
    /// A `Null` value means IS NULL, a non-string value compares with `=`,
    /// and a string value is read as an operator expression. A string that
    /// matches no operator form compares whole with `=`.
    pub fn parse(field: impl Into<String>, value: &Value) -> Result<Condition> {
        let field = field.into();

        if value.is_null() {
            return Ok(Condition::is_null(field));
        }
        let Some(expr) = value.as_str() else {
            return Ok(Condition::new(field, Op::Eq, vec![value.clone()]));
        };
        let trimmed = expr.trim();

        // Two-character operators before their one-character prefixes, so
        // "<= 5" is never read as "< (= 5)"
        const OPERATORS: [(&str, Op); 7] = [
            ("<=", Op::LtEq),
            (">=", Op::GtEq),
            ("<>", Op::NotEq),
            ("!=", Op::NotEq),
            ("=", Op::Eq),
            ("<", Op::Lt),
            (">", Op::Gt),
        ];

        for (prefix, op) in OPERATORS {
            let Some(rest) = trimmed.strip_prefix(prefix) else {
                continue;
            };
            let rest = rest.trim();
            if rest.is_empty() {
                // A bare operator is not an expression
                break;
            }
            if rest.eq_ignore_ascii_case("null") {
                return Ok(match op {
                    Op::Eq => Condition::is_null(field),
                    Op::NotEq => Condition::is_not_null(field),
                    _ => Condition::new(field, op, vec![literal(rest)]),
                });
            }
            return Ok(Condition::new(field, op, vec![literal(rest)]));
        }

        if let Some(rest) = strip_keyword(trimmed, "LIKE") {
            return Ok(Condition::like(field, rest));
        }

        if let Some(rest) = strip_keyword(trimmed, "BETWEEN") {
            let Some((low, high)) = split_and(rest) else {
                return Err(err!("between condition requires two bounds: {expr}"));
            };
            return Ok(Condition::between(field, literal(low), literal(high)));
        }

        if let Some(rest) = strip_keyword(trimmed, "IN") {
            let rest = strip_parens(rest);
            let values: Vec<Value> = rest
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(literal)
                .collect();
            return Condition::in_values(field, values);
        }

        Ok(Condition::new(field, Op::Eq, vec![value.clone()]))
    }

    /// Parses every field of a condition entity. Blank field names are
    /// skipped.
    pub fn from_entity(entity: &Entity) -> Result<Vec<Condition>> {
        entity
            .iter()
            .filter(|(field, _)| !field.trim().is_empty())
            .map(|(field, value)| Condition::parse(field, value))
            .collect()
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn op(&self) -> Op {
        self.op
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

// Case-insensitive keyword prefix followed by whitespace and a non-empty rest
fn strip_keyword<'a>(expr: &'a str, keyword: &str) -> Option<&'a str> {
    if expr.len() <= keyword.len() || !expr.is_char_boundary(keyword.len()) {
        return None;
    }
    let (head, rest) = expr.split_at(keyword.len());
    if !head.eq_ignore_ascii_case(keyword) || !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim();
    if rest.is_empty() {
        return None;
    }
    Some(rest)
}

fn split_and(rest: &str) -> Option<(&str, &str)> {
    let upper = rest.to_ascii_uppercase();
    let idx = upper.find(" AND ")?;
    Some((rest[..idx].trim(), rest[idx + " AND ".len()..].trim()))
}

fn strip_parens(rest: &str) -> &str {
    rest.strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .map(str::trim)
        .unwrap_or(rest)
}

// Numeric-looking literals bind typed so integer columns compare correctly
fn literal(raw: &str) -> Value {
    if let Ok(v) = raw.parse::<i64>() {
        return Value::I64(v);
    }
    if let Ok(v) = raw.parse::<f64>() {
        return Value::F64(v);
    }
    Value::String(raw.to_string())
}
