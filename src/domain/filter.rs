use crate::domain::{PriorityFilter, RequestError, TestCase};

/// Predicate selecting test cases for display.
///
/// A test matches when its priority passes [`PriorityFilter`] and the search
/// text is empty or a case-insensitive substring of its name, its id, or any
/// of its requirement references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    priority: PriorityFilter,
    search: String,
    needle: String,
}

impl Filter {
    /// Creates a filter.
    #[must_use]
    pub fn new(priority: PriorityFilter, search: impl Into<String>) -> Self {
        let search = search.into();
        let needle = search.to_lowercase();
        Self {
            priority,
            search,
            needle,
        }
    }

    /// Builds a filter from raw request values.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::UnknownPriority`] if `priority` is neither
    /// `all` nor a known priority.
    pub fn parse(priority: &str, search: &str) -> Result<Self, RequestError> {
        Ok(Self::new(priority.parse()?, search))
    }

    /// The priority half of the filter.
    #[must_use]
    pub const fn priority(&self) -> PriorityFilter {
        self.priority
    }

    /// The search text, as given.
    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Whether every test passes this filter.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.priority == PriorityFilter::All && self.search.is_empty()
    }

    /// Whether `test` passes this filter.
    #[must_use]
    pub fn matches(&self, test: &TestCase) -> bool {
        self.priority.matches(test.priority()) && self.matches_search(test)
    }

    fn matches_search(&self, test: &TestCase) -> bool {
        if self.needle.is_empty() {
            return true;
        }

        let contains = |haystack: &str| haystack.to_lowercase().contains(&self.needle);

        contains(test.name())
            || contains(test.id().as_str())
            || test
                .requirements()
                .iter()
                .any(|requirement| contains(requirement.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use nonempty::NonEmpty;
    use test_case::test_case;

    use super::*;
    use crate::domain::{Priority, Requirement, Status, TestId};

    fn over_voltage() -> TestCase {
        TestCase::new(
            TestId::try_from("PR-001").unwrap(),
            "DC Over-Voltage Protection".to_string(),
            NonEmpty::new(Requirement::try_from("REQ_0301").unwrap()),
            Priority::Critical,
            "2h".to_string(),
            Status::Pending,
            "Trip @ 1050V, response < 10ms".to_string(),
        )
    }

    #[test_case("all", "", true; "unrestricted")]
    #[test_case("critical", "", true; "priority match")]
    #[test_case("high", "", false; "priority mismatch")]
    #[test_case("all", "over-voltage", true; "name")]
    #[test_case("all", "pr-001", true; "id lowercase")]
    #[test_case("all", "req_0301", true; "requirement lowercase")]
    #[test_case("all", "REQ_03", true; "requirement prefix")]
    #[test_case("all", "1050V", false; "criteria is not searched")]
    #[test_case("high", "REQ_0301", false; "both must hold")]
    fn matches(priority: &str, search: &str, expected: bool) {
        let filter = Filter::parse(priority, search).unwrap();
        assert_eq!(filter.matches(&over_voltage()), expected);
    }

    #[test]
    fn default_is_unrestricted() {
        assert!(Filter::default().is_unrestricted());
        assert!(!Filter::new(PriorityFilter::All, "x").is_unrestricted());
    }

    #[test]
    fn malformed_priority_is_rejected() {
        assert_eq!(
            Filter::parse("severe", ""),
            Err(RequestError::UnknownPriority("severe".to_string()))
        );
    }
}
