use super::Dialect;

/// The database flavor handles the differences between SQL dialects and
/// supported features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flavor {
    Ansi,
    Postgresql,
    Sqlite,
    Mysql,
}

impl Dialect {
    /// Plain ANSI SQL: bare identifiers, `?` placeholders, no upsert.
    pub fn ansi() -> Dialect {
        Dialect {
            flavor: Flavor::Ansi,
        }
    }

    pub fn sqlite() -> Dialect {
        Dialect {
            flavor: Flavor::Sqlite,
        }
    }

    pub fn postgresql() -> Dialect {
        Dialect {
            flavor: Flavor::Postgresql,
        }
    }

    pub fn mysql() -> Dialect {
        Dialect {
            flavor: Flavor::Mysql,
        }
    }
}
