//! The audit run record and its state transitions

use crate::state::RunState;
use crate::AuditError;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// One audit of a website: seeds, options, lifecycle state and totals
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRun {
    pub id: i64,
    /// Owning tenant, as known to the calling application
    pub tenant_ref: Option<String>,
    /// Parent audit this run belongs to
    pub audit_ref: Option<String>,
    pub state: RunState,
    pub seed_urls: Vec<String>,
    /// Per-run crawl options (see `CrawlOptions::with_overrides`)
    pub config: Map<String, Value>,
    /// Crawl and analysis totals, merged key by key
    pub totals: Map<String, Value>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Data needed to create a run
#[derive(Debug, Clone, Default)]
pub struct NewAuditRun {
    pub tenant_ref: Option<String>,
    pub audit_ref: Option<String>,
    pub seed_urls: Vec<String>,
    pub config: Map<String, Value>,
}

impl AuditRun {
    /// Moves the run to a new state
    ///
    /// Entering RUNNING stamps `started_at`; entering a terminal state stamps
    /// `finished_at`. A transition outside the lifecycle is rejected and the
    /// run is left untouched.
    pub fn transition(&mut self, to: RunState) -> Result<(), AuditError> {
        if !self.state.can_transition_to(to) {
            return Err(AuditError::InvalidTransition {
                from: self.state,
                to,
            });
        }

        let now = Utc::now();
        self.state = to;
        if to == RunState::Running {
            self.started_at = Some(now);
        }
        if to.is_terminal() {
            self.finished_at = Some(now);
        }
        Ok(())
    }

    /// Moves a running run to FAILED and records the message
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), AuditError> {
        self.transition(RunState::Failed)?;
        self.error = Some(message.into());
        Ok(())
    }

    /// Merges keys into the totals map, leaving other keys alone
    pub fn merge_totals(&mut self, totals: Map<String, Value>) {
        for (key, value) in totals {
            self.totals.insert(key, value);
        }
    }
}
