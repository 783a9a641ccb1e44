//! Declarative reconciliation engine for winstate
//!
//! This crate turns profile manifests into a resolved desired state and
//! compares that state with a live Windows host:
//!
//! - **Overlay model**: profiles in bare, folder or zip form, include chains,
//!   exclusion, and local-field mutation of bare profiles
//! - **Verify**: installed apps and explicit checks against the manifest
//! - **Export**: copy live configuration back into a portable folder
//! - **Discovery**: software on the machine that no driver manages
//! - **Run state**: one immutable JSON record per operation
//!
//! # Architecture
//!
//! ```text
//!                      winstate-cli
//!                           |
//!                     winstate-core
//!        +---------+--------+--------+-----------+
//!        |         |        |        |           |
//!    manifest   verify   export  discovery    state
//!        |         |        |        |           |
//!        +---------+--- RunContext --+-----------+
//!                           |
//!                      winstate-fs
//! ```
//!
//! External systems sit behind traits: [`PackageDriver`], [`SystemProbe`],
//! [`CommandProbe`] and [`UninstallSource`].
//!
//! # Example
//!
//! ```ignore
//! use winstate_core::{HostProbe, ManifestResolver, RunContext, StateStore, VerifyEngine, WingetDriver};
//!
//! let manifest = ManifestResolver::new("windows").read_resolved("dev.jsonc".as_ref())?;
//! let mut ctx = RunContext::new("windows", StateStore::new("state"));
//! let report = VerifyEngine::new(&WingetDriver::new(), &HostProbe).run(&mut ctx, &manifest)?;
//! println!("{} passed, {} failed", report.summary.pass, report.summary.fail);
//! ```

pub mod context;
pub mod discovery;
pub mod driver;
pub mod envelope;
pub mod error;
pub mod events;
pub mod export;
pub mod manifest;
pub mod settings;
pub mod state;
pub mod verify;

pub use context::RunContext;
pub use discovery::{
    CommandProbe, DiscoveryEngine, DiscoveryEntry, DiscoveryMethod, DiscoveryReport,
    HostCommandProbe, RegQuerySource, UninstallEntry, UninstallSource, render_template,
};
pub use driver::{PackageDriver, WingetDriver};
pub use envelope::{Envelope, ErrorObject};
pub use error::{Error, Result};
pub use events::{Event, EventEmitter, EventRecord, ItemStatus, MemorySink};
pub use export::{ExportEngine, ExportOptions, ExportReport, ExportStatus, SensitivePathPolicy};
pub use manifest::{
    AppEntry, ManifestResolver, ProfileFormat, ProfileLocation, ProfileStore, RawManifest,
    ResolvedManifest, RestoreEntry, VerifyEntry,
};
pub use settings::{Settings, SettingsResolver};
pub use state::{RunState, StateStore};
pub use verify::{HostProbe, SystemProbe, VerifyEngine, VerifyReport, VerifyStatus};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cyclic_include_error_shows_chain() {
        let err = Error::CyclicInclude {
            chain: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "Cyclic include detected: a -> b -> a");
    }

    #[test]
    fn not_mutable_error_names_format() {
        let err = Error::ProfileNotMutable {
            name: "team".into(),
            format: ProfileFormat::Zip,
        };
        assert!(err.to_string().contains("zip profile"), "{err}");
    }
}
