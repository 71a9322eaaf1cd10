//! Resolution engine: turns requirement specifiers into a queue of install
//! work, resolves each entry against a package repository, detects version
//! conflicts between requesters and expands extras.

pub mod installer;
pub mod query;
pub mod registry;
pub mod report;

pub use installer::{Installer, Options};
pub use report::{ConflictReport, InstallSummary, Reporter, VersionConflict};
