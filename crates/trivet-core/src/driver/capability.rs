use super::IsolationLevel;

#[derive(Debug)]
pub struct Capability {
    /// When true, the database supports BEGIN/COMMIT/ROLLBACK.
    pub transactions: bool,

    /// When true, the database supports savepoints inside a transaction.
    pub savepoints: bool,

    /// Isolation levels the database can honor, weakest first.
    pub isolation_levels: &'static [IsolationLevel],

    /// When true, the driver can report the row id generated by the last
    /// insert.
    pub last_insert_id: bool,
}

impl Capability {
    /// SQLite capabilities.
    pub const SQLITE: Self = Self {
        transactions: true,
        savepoints: true,
        // SQLite transactions are serializable, full stop
        isolation_levels: &[IsolationLevel::Serializable],
        last_insert_id: true,
    };

    /// PostgreSQL capabilities
    pub const POSTGRESQL: Self = Self {
        isolation_levels: &[
            IsolationLevel::ReadCommitted,
            IsolationLevel::RepeatableRead,
            IsolationLevel::Serializable,
        ],
        // Generated keys come from RETURNING clauses, not a session counter
        last_insert_id: false,
        ..Self::SQLITE
    };

    /// MySQL capabilities
    pub const MYSQL: Self = Self {
        isolation_levels: &[
            IsolationLevel::ReadUncommitted,
            IsolationLevel::ReadCommitted,
            IsolationLevel::RepeatableRead,
            IsolationLevel::Serializable,
        ],
        ..Self::SQLITE
    };

    /// Whether the database honors the given isolation level.
    pub fn supports_isolation(&self, level: IsolationLevel) -> bool {
        self.isolation_levels.contains(&level)
    }
}
