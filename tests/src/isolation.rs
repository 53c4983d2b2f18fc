use std::sync::atomic::{AtomicU32, Ordering};

// Shared by every test in this process
static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

/// A unique per-test marker for database object names.
///
/// The prefix combines the OS process id with a process-wide counter, so
/// tests running in parallel (in one process or several) never collide on
/// table names even when they share a database server.
#[derive(Debug, Clone)]
pub struct TestIsolation {
    process_id: u32,
    test_counter: u32,
}

impl TestIsolation {
    pub fn new() -> TestIsolation {
        TestIsolation {
            process_id: std::process::id(),
            test_counter: TEST_COUNTER.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Prefix to put in front of every table this test creates.
    pub fn table_prefix(&self) -> String {
        format!("t{}_{}_", self.process_id, self.test_counter)
    }

    /// Whether `table` was created under this prefix.
    pub fn owns_table(&self, table: &str) -> bool {
        table.starts_with(&self.table_prefix())
    }
}

impl Default for TestIsolation {
    fn default() -> TestIsolation {
        TestIsolation::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_are_unique_per_instance() {
        let a = TestIsolation::new();
        let b = TestIsolation::new();

        assert_ne!(a.table_prefix(), b.table_prefix());
    }

    #[test]
    fn ownership_follows_the_prefix() {
        let isolation = TestIsolation::new();
        let table = format!("{}user", isolation.table_prefix());

        assert!(isolation.owns_table(&table));
        assert!(!TestIsolation::new().owns_table(&table));
    }
}
