//! Engineering documentation core for a three-level T-type inverter.
//!
//! Two independent models back the documentation views: the switch-state
//! model of the conversion stage, and the test specification matrix with its
//! requirement traceability and filtering. Neither performs I/O; catalogs are
//! loaded by the [`storage`] layer.

pub mod domain;
pub use domain::{
    Config, ConfigError, DevicePosition, Filter, MatrixPanel, OutputLevel, Priority,
    PriorityFilter, Registry, Request, RequestError, Session, StateDefinition, StateTable,
    Status, TestCase,
};

/// Catalog loading and the bundled documentation data.
pub mod storage;
pub use storage::LoadError;
