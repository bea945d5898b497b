//! Static failure-type to handler lookup.

use std::collections::HashMap;

use crate::domain::models::PolicyEntry;

/// Closed lookup from failure type to handler id.
///
/// Built once from configuration at process start; immutable afterwards.
/// A missing mapping is an ordinary data case returned as `None`, never an
/// error. When entries repeat a failure type, the last one wins.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    mappings: HashMap<String, String>,
}

impl PolicyTable {
    /// Build the table from configured entries.
    pub fn from_entries(entries: &[PolicyEntry]) -> Self {
        let mappings = entries
            .iter()
            .map(|entry| (entry.failure_type.clone(), entry.handler_id.clone()))
            .collect();
        Self { mappings }
    }

    /// Handler id mapped to `failure_type`, if any.
    pub fn lookup(&self, failure_type: &str) -> Option<&str> {
        self.mappings.get(failure_type).map(String::as_str)
    }

    /// Number of configured mappings.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Whether no mappings are configured.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_present_and_absent() {
        let table = PolicyTable::from_entries(&[
            PolicyEntry::new("network_error", "clear_cache_handler"),
            PolicyEntry::new("test_timeout", "rerun_tests_handler"),
        ]);

        assert_eq!(table.lookup("network_error"), Some("clear_cache_handler"));
        assert_eq!(table.lookup("test_timeout"), Some("rerun_tests_handler"));
        assert_eq!(table.lookup("unknown_failure"), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_duplicate_failure_type_last_wins() {
        let table = PolicyTable::from_entries(&[
            PolicyEntry::new("network_error", "old_handler"),
            PolicyEntry::new("network_error", "new_handler"),
        ]);

        assert_eq!(table.lookup("network_error"), Some("new_handler"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_empty_table() {
        let table = PolicyTable::from_entries(&[]);
        assert!(table.is_empty());
        assert_eq!(table.lookup("anything"), None);
    }
}
