//! State module for the audit run lifecycle
//!
//! # Components
//!
//! - `RunState`: lifecycle states and the allowed transitions between them
//! - `AuditRun`: the run record, which applies transitions and stamps times
//! - `lifecycle`: create/queue/cancel operations against storage

mod audit_run;
mod lifecycle;
mod run_state;

pub use audit_run::{AuditRun, NewAuditRun};
pub use lifecycle::{cancel_run, create_run, load_run, queue_run, transition_run};
pub use run_state::RunState;
