//! Interfaces the resolution engine uses to reach the outside world.

use std::path::{Path, PathBuf};

use pipette_util::errors::PipetteError;

use crate::condition::Condition;
use crate::metadata::InstalledPackage;

/// A release picked from a package index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub version: String,
    /// Download location of the wheel.
    pub url: String,
    /// Hex SHA-256 digest published by the index, if any.
    pub sha256: Option<String>,
}

/// Where packages come from.
pub trait PackageRepository {
    /// Pick the best release of `name` satisfying every condition and
    /// installable on this interpreter. Fails with
    /// [`PipetteError::NoSuitableVersion`] when nothing qualifies.
    fn find_package(&self, name: &str, conditions: &[Condition]) -> Result<Candidate, PipetteError>;

    /// Fetch the candidate's archive and return its local path.
    fn download_package(&self, candidate: &Candidate) -> Result<PathBuf, PipetteError>;
}

/// Where packages are installed.
pub trait PackageStore {
    /// Load an installed package. Fails with
    /// [`PipetteError::PackageDirectoryMissing`] when it is not installed.
    fn load(&self, name: &str) -> Result<InstalledPackage, PipetteError>;

    /// Remove an installed package.
    fn uninstall(&self, package: &InstalledPackage) -> Result<(), PipetteError>;

    /// Unpack a downloaded archive into the store.
    fn extract(&self, archive: &Path) -> Result<(), PipetteError>;

    /// Every installed package.
    fn list(&self) -> Result<Vec<InstalledPackage>, PipetteError>;
}
