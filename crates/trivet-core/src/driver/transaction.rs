/// Transaction isolation levels, ordered weakest to strictest.
///
/// The `Ord` impl follows that ordering, so "raise the level but never lower
/// it" is a single comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    /// Returns the ANSI SQL name, usable in PostgreSQL and MySQL.
    pub fn sql_name(&self) -> &'static str {
        match self {
            IsolationLevel::ReadUncommitted => "READ UNCOMMITTED",
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }
}

/// Allocates `sp_N` savepoint names for nested transaction scopes.
///
/// Sessions call `push()` when creating a savepoint and `pop()` after the
/// savepoint is released or rolled back to.
#[derive(Debug)]
pub struct SavepointTracker {
    depth: u32,
}

impl Default for SavepointTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SavepointTracker {
    pub fn new() -> Self {
        Self { depth: 0 }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Returns the next savepoint name and increments depth.
    pub fn push(&mut self) -> String {
        let name = format!("sp_{}", self.depth);
        self.depth += 1;
        name
    }

    /// Decrements depth after a release or rollback-to.
    pub fn pop(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
