//! Verification of a resolved manifest against the live system

mod check;
mod engine;

pub use check::{CheckOutcome, HostProbe, SystemProbe, VerifyCheck};
pub use engine::{VerifyEngine, VerifyKind, VerifyReport, VerifyResult, VerifyStatus, VerifySummary};
