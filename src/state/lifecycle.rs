//! Run lifecycle operations against storage
//!
//! These are the entry points used before and around a crawl: creating a
//! draft, queueing it, and requesting cancellation. The crawl itself drives
//! the RUNNING and terminal transitions (see `crawler::Coordinator`).

use crate::config::validate_seed_url;
use crate::state::{AuditRun, NewAuditRun, RunState};
use crate::storage::{Storage, StorageError};
use crate::{AuditError, ConfigError};

/// Loads a run, mapping a missing row to [`AuditError::RunNotFound`]
pub fn load_run(storage: &dyn Storage, run_id: i64) -> Result<AuditRun, AuditError> {
    storage.get_run(run_id).map_err(|e| match e {
        StorageError::RunNotFound(id) => AuditError::RunNotFound(id),
        other => other.into(),
    })
}

/// Creates a DRAFT run after validating its seeds
pub fn create_run(storage: &mut dyn Storage, new_run: &NewAuditRun) -> Result<AuditRun, AuditError> {
    if new_run.seed_urls.is_empty() {
        return Err(ConfigError::Validation("an audit run needs at least one seed URL".to_string()).into());
    }
    for seed in &new_run.seed_urls {
        validate_seed_url(seed)?;
    }

    let run_id = storage.create_run(new_run)?;
    tracing::info!("Created audit run {} with {} seeds", run_id, new_run.seed_urls.len());
    load_run(storage, run_id)
}

/// Applies a transition to a stored run and persists it
pub fn transition_run(
    storage: &mut dyn Storage,
    run_id: i64,
    to: RunState,
) -> Result<AuditRun, AuditError> {
    let mut run = load_run(storage, run_id)?;
    let from = run.state;
    run.transition(to)?;
    storage.update_run(&run)?;
    tracing::info!("Audit run {}: {} -> {}", run_id, from, to);
    Ok(run)
}

/// Submits a DRAFT run for crawling
pub fn queue_run(storage: &mut dyn Storage, run_id: i64) -> Result<AuditRun, AuditError> {
    transition_run(storage, run_id, RunState::Queued)
}

/// Requests cancellation of a queued or running run
///
/// A crawl in progress notices the new state before its next batch and stops.
pub fn cancel_run(storage: &mut dyn Storage, run_id: i64) -> Result<AuditRun, AuditError> {
    transition_run(storage, run_id, RunState::Canceled)
}
