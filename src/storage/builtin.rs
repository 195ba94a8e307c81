//! The catalog and switching table shipped with the product documentation.

use crate::{
    domain::{Registry, StateTable},
    storage::{
        LoadError,
        catalog::{self, Format},
    },
};

const CATALOG: &str = include_str!("../../data/test-matrix.yaml");

/// The built-in test specification matrix.
///
/// # Errors
///
/// Fails only if the bundled catalog is malformed.
pub fn registry() -> Result<Registry, LoadError> {
    catalog::parse(CATALOG, Format::Yaml)
}

/// The built-in switching table.
///
/// # Errors
///
/// Fails only if the bundled definitions break the topology rules.
pub fn state_table() -> Result<StateTable, LoadError> {
    Ok(StateTable::builtin()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Filter, Priority};

    #[test]
    fn bundled_catalog_loads() {
        let registry = registry().unwrap();
        assert_eq!(registry.len(), 7);
        assert_eq!(registry.count_total(), 44);
        assert_eq!(registry.count_by_priority(Priority::Critical), 20);
        assert_eq!(registry.count_by_priority(Priority::High), 20);
        assert_eq!(registry.count_by_priority(Priority::Medium), 4);
        assert_eq!(registry.count_by_priority(Priority::Low), 0);
    }

    #[test]
    fn bundled_catalog_is_searchable_by_requirement() {
        let registry = registry().unwrap();
        let filtered = registry.filter(&Filter::parse("all", "req_0301").unwrap());
        let ids: Vec<_> = filtered.tests().map(|t| t.id().as_str()).collect();
        assert_eq!(ids, ["PR-001"]);
    }

    #[test]
    fn split_requirement_reference_is_searchable() {
        let registry = registry().unwrap();
        let filtered = registry.filter(&Filter::parse("all", "REQ_0003B").unwrap());
        let ids: Vec<_> = filtered.tests().map(|t| t.id().as_str()).collect();
        assert_eq!(ids, ["FT-001"]);
    }

    #[test]
    fn bundled_state_table_is_valid() {
        assert!(state_table().unwrap().definitions().all(|d| d.validate()));
    }
}
