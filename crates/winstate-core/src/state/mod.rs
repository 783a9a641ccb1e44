//! Run-state records
//!
//! Every operation ends by writing one immutable JSON record describing what
//! it looked at and what happened to each item. Records are the audit trail;
//! the event stream is not.

mod run;
mod store;

pub use run::{ManifestRef, RunAction, RunState, new_run_id};
pub use store::{StateStore, StoredRun};
