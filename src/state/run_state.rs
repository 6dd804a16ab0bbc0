/// Audit run state definitions
///
/// This module defines the lifecycle states of an audit run and the
/// transitions allowed between them.
use std::fmt;

/// Represents the current state of an audit run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    // ===== Pending States =====
    /// Run has been created but not yet submitted
    Draft,

    /// Run is waiting to be picked up by the crawler
    Queued,

    // ===== Active State =====
    /// Run is being crawled
    Running,

    // ===== Terminal States =====
    /// Run aborted with an error (message stored on the run)
    Failed,

    /// Run was canceled before it finished
    Canceled,

    /// Run finished crawling
    Completed,
}

impl RunState {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed | Self::Canceled | Self::Completed)
    }

    /// Returns true if the given transition is part of the lifecycle
    ///
    /// ```text
    /// DRAFT -> QUEUED -> RUNNING -> COMPLETED
    ///            |          |----> FAILED
    ///            |          '----> CANCELED
    ///            '---------------> CANCELED
    /// ```
    pub fn can_transition_to(&self, to: RunState) -> bool {
        matches!(
            (self, to),
            (Self::Draft, Self::Queued)
                | (Self::Queued, Self::Running)
                | (Self::Queued, Self::Canceled)
                | (Self::Running, Self::Failed)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Canceled)
        )
    }

    /// Converts the state to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Queued => "QUEUED",
            Self::Running => "RUNNING",
            Self::Failed => "FAILED",
            Self::Canceled => "CANCELED",
            Self::Completed => "COMPLETED",
        }
    }

    /// Parses a state from its database string representation
    ///
    /// Returns None if the string doesn't match any known state.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(Self::Draft),
            "QUEUED" => Some(Self::Queued),
            "RUNNING" => Some(Self::Running),
            "FAILED" => Some(Self::Failed),
            "CANCELED" => Some(Self::Canceled),
            "COMPLETED" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Returns all run states
    pub fn all_states() -> [Self; 6] {
        [
            Self::Draft,
            Self::Queued,
            Self::Running,
            Self::Failed,
            Self::Canceled,
            Self::Completed,
        ]
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.to_db_string())
    }
}
