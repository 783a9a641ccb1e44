//! Shared test fixtures for the winstate workspace.
//!
//! Dev-dependency only, never published.
//!
//! - [`profiles`]: [`TestProfiles`], a temporary profile directory with
//!   writers for every profile format and a scratch "system" area

pub mod profiles;

pub use profiles::{TestProfiles, manifest};
