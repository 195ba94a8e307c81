//! Domain models for the inverter documentation core.
//!
//! This module contains the switch-state model of the three-level conversion
//! stage, the test registry with its filter engine, and the session state that
//! ties them to the presentation layer.

/// Switch-state model of the T-type phase leg.
pub mod switch_state;
pub use switch_state::{
    BusNode, Conduction, DEVICES_PER_PHASE, DevicePosition, OutputLevel, StateDefinition,
    StateTable, StateViolation, SwitchPanel,
};

mod error;
pub use error::{ConfigError, RequestError};

mod priority;
pub use priority::{Priority, PriorityFilter};

mod test_case;
pub use test_case::{Requirement, Status, TestCase, TestId};

mod filter;
pub use filter::Filter;

pub mod registry;
pub use registry::{Category, CategoryKey, Registry};

/// Presentation state of the test matrix.
pub mod matrix;
pub use matrix::{MatrixPanel, MatrixView, toggle_expansion};

/// Inbound request handling.
pub mod session;
pub use session::{Outcome, Request, Session};

mod config;
pub use config::Config;
