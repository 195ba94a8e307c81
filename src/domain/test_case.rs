use std::{fmt, str::FromStr};

use non_empty_string::NonEmptyString;
use nonempty::NonEmpty;

use crate::domain::{ConfigError, Priority, RequestError};

/// Unique identifier of a test case (e.g. `PR-001`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestId(NonEmptyString);

impl TestId {
    /// Creates a test id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Empty`] if `id` is empty.
    pub fn new(id: String) -> Result<Self, ConfigError> {
        NonEmptyString::new(id)
            .map(Self)
            .map_err(|_| ConfigError::Empty("test case id"))
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TestId {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

/// An opaque reference to a specification clause (e.g. `REQ_0301`).
///
/// Only equality and substring matching are ever applied to it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Requirement(NonEmptyString);

impl Requirement {
    /// Creates a requirement reference.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Empty`] if `id` is empty.
    pub fn new(id: String) -> Result<Self, ConfigError> {
        NonEmptyString::new(id)
            .map(Self)
            .map_err(|_| ConfigError::Empty("requirement reference"))
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Requirement {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

/// Execution outcome of a test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Status {
    /// Not yet executed.
    Pending,
    /// Executed and met its criterion.
    Pass,
    /// Executed and missed its criterion.
    Fail,
}

impl Status {
    /// Every status.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Pass, Self::Fail];

    /// The canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RequestError::UnknownStatus(s.to_string()))
    }
}

/// A single entry of the test specification matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub(crate) id: TestId,
    pub(crate) name: String,
    pub(crate) requirements: NonEmpty<Requirement>,
    pub(crate) priority: Priority,
    pub(crate) duration: String,
    pub(crate) status: Status,
    pub(crate) criteria: String,
}

impl TestCase {
    /// Creates a test case.
    ///
    /// `duration` is an opaque estimate label (e.g. `4h`) and `criteria` the
    /// free-text pass/fail criterion.
    #[must_use]
    pub const fn new(
        id: TestId,
        name: String,
        requirements: NonEmpty<Requirement>,
        priority: Priority,
        duration: String,
        status: Status,
        criteria: String,
    ) -> Self {
        Self {
            id,
            name,
            requirements,
            priority,
            duration,
            status,
            criteria,
        }
    }

    /// The unique id.
    #[must_use]
    pub const fn id(&self) -> &TestId {
        &self.id
    }

    /// The display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The requirements this test verifies.
    #[must_use]
    pub const fn requirements(&self) -> &NonEmpty<Requirement> {
        &self.requirements
    }

    /// The priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// The estimated duration label.
    #[must_use]
    pub fn duration(&self) -> &str {
        &self.duration
    }

    /// The current status.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// The pass/fail criterion.
    #[must_use]
    pub fn criteria(&self) -> &str {
        &self.criteria
    }

    /// Requirement references joined for display.
    #[must_use]
    pub fn requirements_label(&self) -> String {
        self.requirements
            .iter()
            .map(Requirement::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
