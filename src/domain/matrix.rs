//! Presentation state of the test matrix.
//!
//! The [`MatrixPanel`] owns the registry together with the state that changes
//! over a session: which categories are expanded, the active [`Filter`] and
//! per-test status. Every transition validates its input before touching
//! state, so a rejected request leaves the panel exactly as it was.

use std::collections::BTreeSet;

use crate::domain::{
    Category, CategoryKey, Filter, Priority, Registry, RequestError, Status,
};

/// Returns `expanded` with `key` added if absent, or removed if present.
#[must_use]
pub fn toggle_expansion(
    expanded: &BTreeSet<CategoryKey>,
    key: &CategoryKey,
) -> BTreeSet<CategoryKey> {
    let mut next = expanded.clone();
    if !next.remove(key) {
        next.insert(key.clone());
    }
    next
}

/// Registry plus the session state rendered on top of it.
#[derive(Debug, Clone)]
pub struct MatrixPanel {
    registry: Registry,
    expanded: BTreeSet<CategoryKey>,
    filter: Filter,
}

/// What the presentation layer needs to draw the matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixView {
    /// Categories and tests passing the active filter.
    pub visible: Registry,
    /// Keys of visible categories that are expanded.
    pub expanded: BTreeSet<CategoryKey>,
    /// Tests in the whole registry.
    pub total: usize,
    /// Critical tests in the whole registry.
    pub critical: usize,
}

impl MatrixView {
    /// Whether the category `key` should be drawn expanded.
    #[must_use]
    pub fn is_expanded(&self, key: &CategoryKey) -> bool {
        self.expanded.contains(key)
    }

    /// The visible categories with their expansion flag, in order.
    pub fn rows(&self) -> impl Iterator<Item = (&CategoryKey, &Category, bool)> {
        self.visible
            .categories()
            .map(|(key, category)| (key, category, self.is_expanded(key)))
    }
}

impl MatrixPanel {
    /// Creates a panel with every category expanded and no filter.
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        let expanded = registry.keys().cloned().collect();
        Self {
            registry,
            expanded,
            filter: Filter::default(),
        }
    }

    /// The full, unfiltered registry.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The active filter.
    #[must_use]
    pub const fn filter(&self) -> &Filter {
        &self.filter
    }

    /// The keys of expanded categories.
    #[must_use]
    pub const fn expanded(&self) -> &BTreeSet<CategoryKey> {
        &self.expanded
    }

    /// Replaces the active filter.
    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    /// Toggles a category and returns whether it is now expanded.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::UnknownCategory`] if the registry has no such
    /// category.
    pub fn toggle_category(&mut self, key: &str) -> Result<bool, RequestError> {
        let key = self
            .registry
            .key(key)
            .ok_or_else(|| RequestError::UnknownCategory(key.to_string()))?;
        let next = toggle_expansion(&self.expanded, key);
        let now_expanded = next.contains(key);
        self.expanded = next;
        Ok(now_expanded)
    }

    /// Collapses a category. Collapsing an already collapsed category is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::UnknownCategory`] if the registry has no such
    /// category.
    pub fn collapse(&mut self, key: &str) -> Result<(), RequestError> {
        let key = self
            .registry
            .key(key)
            .ok_or_else(|| RequestError::UnknownCategory(key.to_string()))?;
        self.expanded.remove(key);
        Ok(())
    }

    /// Records a status update from test execution.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::UnknownTest`] if no test has this id.
    pub fn update_status(&mut self, id: &str, status: Status) -> Result<Status, RequestError> {
        self.registry.set_status(id, status)
    }

    /// Computes the current view.
    #[must_use]
    pub fn view(&self) -> MatrixView {
        let visible = self.registry.filter(&self.filter);
        let expanded = visible
            .keys()
            .filter(|key| self.expanded.contains(*key))
            .cloned()
            .collect();

        MatrixView {
            visible,
            expanded,
            total: self.registry.count_total(),
            critical: self.registry.count_by_priority(Priority::Critical),
        }
    }
}
