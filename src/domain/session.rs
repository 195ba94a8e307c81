//! Applies inbound requests to the switch panel and the test matrix.

use tracing::{debug, instrument, warn};

use crate::domain::{
    Filter, MatrixPanel, MatrixView, OutputLevel, Registry, RequestError, StateDefinition,
    StateTable, Status, SwitchPanel,
};

/// A request from the presentation layer, carrying raw user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Show the given output level.
    SelectLevel(String),
    /// Replace the active test-matrix filter.
    ChangeFilter {
        /// `all` or a priority name.
        priority: String,
        /// Free-text search.
        search: String,
    },
    /// Expand or collapse a category.
    ToggleCategory(String),
    /// Collapse a category, whatever its current state.
    CollapseCategory(String),
    /// Record a test result.
    UpdateStatus {
        /// The test case id.
        test_id: String,
        /// `pending`, `pass` or `fail`.
        status: String,
    },
}

/// The result of an accepted [`Request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The switch panel now shows this level.
    LevelSelected(OutputLevel),
    /// The filter was replaced.
    FilterChanged,
    /// The category is now expanded (`true`) or collapsed.
    CategoryToggled(bool),
    /// The test's status changed from `previous` to `current`.
    StatusUpdated {
        /// Status before the update.
        previous: Status,
        /// Status after the update.
        current: Status,
    },
}

/// The complete mutable state behind the documentation views.
#[derive(Debug, Clone)]
pub struct Session {
    switch: SwitchPanel,
    matrix: MatrixPanel,
}

impl Session {
    /// Creates a session showing `initial_level` and an unfiltered, fully
    /// expanded matrix.
    #[must_use]
    pub fn new(table: StateTable, registry: Registry, initial_level: OutputLevel) -> Self {
        Self {
            switch: SwitchPanel::new(table, initial_level),
            matrix: MatrixPanel::new(registry),
        }
    }

    /// The switch panel.
    #[must_use]
    pub const fn switch(&self) -> &SwitchPanel {
        &self.switch
    }

    /// The test matrix panel.
    #[must_use]
    pub const fn matrix(&self) -> &MatrixPanel {
        &self.matrix
    }

    /// The definition for the selected level.
    #[must_use]
    pub const fn current_state(&self) -> &StateDefinition {
        self.switch.current()
    }

    /// The current test-matrix view.
    #[must_use]
    pub fn matrix_view(&self) -> MatrixView {
        self.matrix.view()
    }

    /// Applies a request.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if the request names a value outside the
    /// known enumerations or an entity that does not exist. The session is
    /// left unchanged in that case.
    #[instrument(level = "debug", skip(self))]
    pub fn apply(&mut self, request: Request) -> Result<Outcome, RequestError> {
        let outcome = self.try_apply(request);
        match &outcome {
            Ok(outcome) => debug!(?outcome, "request applied"),
            Err(error) => warn!(%error, "request rejected"),
        }
        outcome
    }

    fn try_apply(&mut self, request: Request) -> Result<Outcome, RequestError> {
        match request {
            Request::SelectLevel(level) => {
                let level = self.switch.select_str(&level)?.level();
                Ok(Outcome::LevelSelected(level))
            }
            Request::ChangeFilter { priority, search } => {
                self.matrix.set_filter(Filter::parse(&priority, &search)?);
                Ok(Outcome::FilterChanged)
            }
            Request::ToggleCategory(key) => {
                self.matrix.toggle_category(&key).map(Outcome::CategoryToggled)
            }
            Request::CollapseCategory(key) => {
                self.matrix.collapse(&key)?;
                Ok(Outcome::CategoryToggled(false))
            }
            Request::UpdateStatus { test_id, status } => {
                let current: Status = status.parse()?;
                let previous = self.matrix.update_status(&test_id, current)?;
                Ok(Outcome::StatusUpdated { previous, current })
            }
        }
    }
}
