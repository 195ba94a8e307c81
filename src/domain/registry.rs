//! The in-memory catalog of test cases, grouped into ordered categories.
//!
//! A [`Registry`] is validated once when it is built: category keys and test
//! ids are unique across the whole catalog. After that only a test's
//! [`Status`] can change. Filtering never mutates the registry; it produces a
//! new one holding the surviving categories and tests in their original
//! order.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use non_empty_string::NonEmptyString;
use tracing::instrument;

use crate::domain::{ConfigError, Filter, Priority, RequestError, Status, TestCase};

/// Key identifying a category (e.g. `protection`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CategoryKey(NonEmptyString);

impl CategoryKey {
    /// Creates a category key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Empty`] if `key` is empty.
    pub fn new(key: String) -> Result<Self, ConfigError> {
        NonEmptyString::new(key)
            .map(Self)
            .map_err(|_| ConfigError::Empty("category key"))
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for CategoryKey {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

/// A named, ordered group of test cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: String,
    tests: Vec<TestCase>,
}

impl Category {
    /// Creates a category. Test order is preserved.
    #[must_use]
    pub const fn new(name: String, tests: Vec<TestCase>) -> Self {
        Self { name, tests }
    }

    /// The display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The tests, in insertion order.
    #[must_use]
    pub fn tests(&self) -> &[TestCase] {
        &self.tests
    }

    /// Number of tests in this category.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    /// Whether the category holds no tests.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Number of tests of the given priority.
    #[must_use]
    pub fn count_by_priority(&self, priority: Priority) -> usize {
        self.tests
            .iter()
            .filter(|test| test.priority() == priority)
            .count()
    }

    fn filtered(&self, filter: &Filter) -> Option<Self> {
        let tests: Vec<TestCase> = self
            .tests
            .iter()
            .filter(|test| filter.matches(test))
            .cloned()
            .collect();

        (!tests.is_empty()).then(|| Self {
            name: self.name.clone(),
            tests,
        })
    }
}

/// Ordered mapping from [`CategoryKey`] to [`Category`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    categories: Vec<(CategoryKey, Category)>,
}

impl Registry {
    /// Builds a registry, keeping the categories in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateCategory`] or
    /// [`ConfigError::DuplicateTestId`] if a key or test id appears twice.
    pub fn new(
        categories: impl IntoIterator<Item = (CategoryKey, Category)>,
    ) -> Result<Self, ConfigError> {
        let categories: Vec<_> = categories.into_iter().collect();

        let mut keys = BTreeSet::new();
        let mut ids = BTreeSet::new();
        for (key, category) in &categories {
            if !keys.insert(key) {
                return Err(ConfigError::DuplicateCategory(key.to_string()));
            }
            for test in category.tests() {
                if !ids.insert(test.id()) {
                    return Err(ConfigError::DuplicateTestId(test.id().to_string()));
                }
            }
        }

        Ok(Self { categories })
    }

    /// The categories, in order.
    pub fn categories(&self) -> impl Iterator<Item = (&CategoryKey, &Category)> {
        self.categories.iter().map(|(key, category)| (key, category))
    }

    /// The category keys, in order.
    pub fn keys(&self) -> impl Iterator<Item = &CategoryKey> {
        self.categories.iter().map(|(key, _)| key)
    }

    /// Looks up a category by key.
    #[must_use]
    pub fn category(&self, key: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, category)| category)
    }

    /// Looks up a category key by its string form.
    #[must_use]
    pub fn key(&self, key: &str) -> Option<&CategoryKey> {
        self.keys().find(|k| k.as_str() == key)
    }

    /// Number of categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether the registry has no categories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Every test, category by category.
    pub fn tests(&self) -> impl Iterator<Item = &TestCase> {
        self.categories
            .iter()
            .flat_map(|(_, category)| category.tests())
    }

    /// Looks up a test case by id.
    #[must_use]
    pub fn test(&self, id: &str) -> Option<&TestCase> {
        self.tests().find(|test| test.id().as_str() == id)
    }

    /// Total number of tests across all categories.
    #[must_use]
    pub fn count_total(&self) -> usize {
        self.categories
            .iter()
            .map(|(_, category)| category.len())
            .sum()
    }

    /// Number of tests of the given priority across all categories.
    #[must_use]
    pub fn count_by_priority(&self, priority: Priority) -> usize {
        self.categories
            .iter()
            .map(|(_, category)| category.count_by_priority(priority))
            .sum()
    }

    /// Test counts for every priority, most important first.
    #[must_use]
    pub fn priority_breakdown(&self) -> Vec<(Priority, usize)> {
        Priority::ALL
            .into_iter()
            .map(|priority| (priority, self.count_by_priority(priority)))
            .collect()
    }

    /// Test counts per status.
    #[must_use]
    pub fn status_breakdown(&self) -> BTreeMap<Status, usize> {
        let mut counts: BTreeMap<Status, usize> =
            Status::ALL.into_iter().map(|status| (status, 0)).collect();
        for test in self.tests() {
            *counts.entry(test.status()).or_insert(0) += 1;
        }
        counts
    }

    /// The categories and tests that pass `filter`, in their original order.
    ///
    /// Categories left without tests are dropped.
    #[must_use]
    #[instrument(level = "trace", skip(self))]
    pub fn filter(&self, filter: &Filter) -> Self {
        let categories = self
            .categories
            .iter()
            .filter_map(|(key, category)| {
                category
                    .filtered(filter)
                    .map(|category| (key.clone(), category))
            })
            .collect();

        Self { categories }
    }

    /// Records a new status for a test case, returning the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::UnknownTest`] if no test has this id.
    pub fn set_status(&mut self, id: &str, status: Status) -> Result<Status, RequestError> {
        let test = self
            .categories
            .iter_mut()
            .flat_map(|(_, category)| category.tests.iter_mut())
            .find(|test| test.id().as_str() == id)
            .ok_or_else(|| RequestError::UnknownTest(id.to_string()))?;

        Ok(std::mem::replace(&mut test.status, status))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use nonempty::NonEmpty;

    use super::*;
    use crate::domain::{PriorityFilter, Requirement, TestId};

    pub(crate) fn test(
        id: &str,
        name: &str,
        requirements: &[&str],
        priority: Priority,
    ) -> TestCase {
        let requirements = requirements
            .iter()
            .map(|r| Requirement::try_from(*r).unwrap())
            .collect();
        TestCase::new(
            TestId::try_from(id).unwrap(),
            name.to_string(),
            NonEmpty::from_vec(requirements).unwrap(),
            priority,
            "2h".to_string(),
            Status::Pending,
            String::new(),
        )
    }

    pub(crate) fn category(key: &str, tests: Vec<TestCase>) -> (CategoryKey, Category) {
        (
            CategoryKey::try_from(key).unwrap(),
            Category::new(format!("{key} tests"), tests),
        )
    }

    pub(crate) fn sample() -> Registry {
        Registry::new([
            category(
                "functional",
                vec![
                    test(
                        "FT-001",
                        "Bidirectional Power Flow",
                        &["REQ_0003A", "REQ_0003B"],
                        Priority::Critical,
                    ),
                    test("FT-002", "DC Voltage Range Operation", &["REQ_0101"], Priority::High),
                    test("FT-004", "Grid-Tied Mode Operation", &["REQ_0002"], Priority::Critical),
                ],
            ),
            category(
                "environmental",
                vec![
                    test("ENV-003", "Humidity", &["REQ_0452"], Priority::Medium),
                    test("ENV-005", "Acoustic Noise", &["REQ_0459"], Priority::Medium),
                ],
            ),
            category(
                "protection",
                vec![
                    test("PR-001", "DC Over-Voltage Protection", &["REQ_0301"], Priority::Critical),
                    test(
                        "PR-002",
                        "DC Under-Voltage Protection",
                        &["REQ_0303"],
                        Priority::Critical,
                    ),
                    test("PR-012", "Fan Failure Warning", &["REQ_0340"], Priority::Low),
                ],
            ),
        ])
        .unwrap()
    }

    fn ids(registry: &Registry) -> Vec<&str> {
        registry.tests().map(|test| test.id().as_str()).collect()
    }

    #[test]
    fn counts_by_priority() {
        let registry = Registry::new([category(
            "functional",
            vec![
                test("A", "a", &["R1"], Priority::Critical),
                test("B", "b", &["R2"], Priority::High),
                test("C", "c", &["R3"], Priority::Critical),
            ],
        )])
        .unwrap();

        assert_eq!(registry.count_total(), 3);
        assert_eq!(registry.count_by_priority(Priority::Critical), 2);
        assert_eq!(registry.count_by_priority(Priority::Low), 0);
    }

    #[test]
    fn total_is_sum_of_categories() {
        let registry = sample();
        let sum: usize = registry
            .categories()
            .map(|(key, category)| {
                let alone = Registry::new([(key.clone(), category.clone())]).unwrap();
                assert_eq!(alone.count_total(), category.len());
                alone.count_total()
            })
            .sum();
        assert_eq!(registry.count_total(), sum);

        let by_priority: usize = registry.priority_breakdown().iter().map(|(_, n)| n).sum();
        assert_eq!(by_priority, registry.count_total());
    }

    #[test]
    fn filter_by_priority_keeps_order_and_drops_empty_categories() {
        let registry = sample();
        let filter = Filter::parse("Critical", "").unwrap();

        let filtered = registry.filter(&filter);

        assert_eq!(ids(&filtered), ["FT-001", "FT-004", "PR-001", "PR-002"]);
        let keys: Vec<_> = filtered.keys().map(CategoryKey::as_str).collect();
        assert_eq!(keys, ["functional", "protection"]);
    }

    #[test]
    fn filter_by_requirement_is_case_insensitive() {
        let registry = sample();

        for search in ["REQ_0301", "req_0301"] {
            let filtered = registry.filter(&Filter::parse("all", search).unwrap());
            assert_eq!(ids(&filtered), ["PR-001"]);
        }
    }

    #[test]
    fn filter_searches_every_requirement() {
        let filtered = sample().filter(&Filter::parse("all", "req_0003b").unwrap());
        assert_eq!(ids(&filtered), ["FT-001"]);
    }

    #[test]
    fn unrestricted_filter_keeps_everything() {
        let registry = sample();
        let filtered = registry.filter(&Filter::default());
        assert_eq!(filtered, registry);
        assert_eq!(filtered.count_total(), registry.count_total());
    }

    #[test]
    fn filter_is_idempotent_and_never_grows() {
        let registry = sample();
        let filters = [
            Filter::new(PriorityFilter::All, ""),
            Filter::new(PriorityFilter::Only(Priority::Critical), ""),
            Filter::new(PriorityFilter::Only(Priority::Medium), "noise"),
            Filter::new(PriorityFilter::All, "voltage"),
            Filter::new(PriorityFilter::Only(Priority::Low), "nothing matches this"),
        ];

        for filter in &filters {
            let once = registry.filter(filter);
            assert!(once.count_total() <= registry.count_total());
            assert_eq!(once.filter(filter), once);
            assert_eq!(registry.filter(filter), once);
        }
    }

    #[test]
    fn filter_drops_categories_without_tests() {
        let registry = Registry::new([
            category("empty", vec![]),
            category("one", vec![test("T-1", "one", &["R"], Priority::High)]),
        ])
        .unwrap();

        let filtered = registry.filter(&Filter::default());

        assert_eq!(filtered.len(), 1);
        assert!(filtered.category("empty").is_none());
    }

    #[test]
    fn empty_registry() {
        let registry = Registry::default();
        assert!(registry.is_empty());
        assert_eq!(registry.count_total(), 0);
        assert!(registry.filter(&Filter::parse("high", "x").unwrap()).is_empty());
        assert!(registry.filter(&Filter::default()).is_empty());
    }

    #[test]
    fn duplicate_test_ids_are_rejected() {
        let error = Registry::new([
            category("a", vec![test("T-1", "one", &["R"], Priority::Low)]),
            category("b", vec![test("T-1", "two", &["R"], Priority::Low)]),
        ])
        .unwrap_err();
        assert_eq!(error, ConfigError::DuplicateTestId("T-1".to_string()));
    }

    #[test]
    fn duplicate_category_keys_are_rejected() {
        let error = Registry::new([category("a", vec![]), category("a", vec![])]).unwrap_err();
        assert_eq!(error, ConfigError::DuplicateCategory("a".to_string()));
    }

    #[test]
    fn set_status_returns_previous() {
        let mut registry = sample();
        assert_eq!(registry.set_status("PR-001", Status::Fail), Ok(Status::Pending));
        assert_eq!(registry.test("PR-001").map(TestCase::status), Some(Status::Fail));
        assert_eq!(registry.status_breakdown()[&Status::Fail], 1);
        assert_eq!(registry.status_breakdown()[&Status::Pass], 0);
    }

    #[test]
    fn set_status_unknown_test() {
        let mut registry = sample();
        let before = registry.clone();
        assert_eq!(
            registry.set_status("XX-999", Status::Pass),
            Err(RequestError::UnknownTest("XX-999".to_string()))
        );
        assert_eq!(registry, before);
    }
}
