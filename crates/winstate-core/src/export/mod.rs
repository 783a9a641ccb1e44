//! Export/capture: copy live configuration back into a portable folder

mod engine;
mod policy;

pub use engine::{
    ExportEngine, ExportOptions, ExportReport, ExportResult, ExportStatus, ExportSummary,
    SNAPSHOT_FILE,
};
pub use policy::SensitivePathPolicy;
