//! Package-manager drivers
//!
//! The engines only need to know which driver-native ids are installed.
//! Installing and removing packages is out of scope for this crate.

mod winget;

pub use winget::{WingetDriver, parse_winget_list};

use crate::Result;

/// A package manager the verify and discovery engines can query
pub trait PackageDriver {
    /// Driver name reported in events and results, e.g. `winget`
    fn name(&self) -> &str;

    /// Driver-native ids of every installed package
    fn installed_ids(&self) -> Result<Vec<String>>;
}
