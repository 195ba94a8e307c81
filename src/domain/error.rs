use thiserror::Error;

use crate::domain::switch_state::{OutputLevel, StateViolation};

/// Malformed static data, detected while the state table or the test catalog
/// is being constructed.
///
/// These are fatal to initialisation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The state table has no definition for a level.
    #[error("state table has no definition for output level {0}")]
    MissingLevel(OutputLevel),
    /// The state table defines a level more than once.
    #[error("output level {0} is defined more than once")]
    DuplicateLevel(OutputLevel),
    /// A state definition breaks the topology rules.
    #[error("state definition for output level {level} is invalid: {violation}")]
    InvalidState {
        /// The level being defined.
        level: OutputLevel,
        /// The rule that was broken.
        violation: StateViolation,
    },
    /// A test case carries a priority outside the four known levels.
    #[error("test case {id} has unrecognised priority '{value}'")]
    UnknownPriority {
        /// The offending test case.
        id: String,
        /// The raw priority value.
        value: String,
    },
    /// A test case carries an unknown status.
    #[error("test case {id} has unrecognised status '{value}'")]
    UnknownStatus {
        /// The offending test case.
        id: String,
        /// The raw status value.
        value: String,
    },
    /// Two test cases share an id.
    #[error("test case id {0} is used more than once")]
    DuplicateTestId(String),
    /// Two categories share a key.
    #[error("category key {0} is used more than once")]
    DuplicateCategory(String),
    /// A test case lists no requirements.
    #[error("test case {0} is not linked to any requirement")]
    NoRequirements(String),
    /// An identifier, key or requirement reference is empty.
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// A request referencing a value outside the closed enumerations, or an
/// entity that does not exist.
///
/// Rejected requests leave the current state unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Unrecognised priority filter.
    #[error("unrecognised priority '{0}' (expected all, critical, high, medium or low)")]
    UnknownPriority(String),
    /// Unrecognised output level.
    #[error("unrecognised output level '{0}' (expected P, O or N)")]
    UnknownLevel(String),
    /// Unrecognised test status.
    #[error("unrecognised status '{0}' (expected pending, pass or fail)")]
    UnknownStatus(String),
    /// No test case with this id.
    #[error("no test case with id '{0}'")]
    UnknownTest(String),
    /// No category with this key.
    #[error("no category with key '{0}'")]
    UnknownCategory(String),
}
