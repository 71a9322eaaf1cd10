//! Operation: describe one installed package.

use std::fmt;
use std::path::PathBuf;

use pipette_core::condition::normalize_name;
use pipette_core::source::PackageStore;
use pipette_util::errors::PipetteError;

/// The fields `pipette show` prints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
    pub location: PathBuf,
    pub requires_python: Option<String>,
    /// Names of the non-extra requirements.
    pub requires: Vec<String>,
    /// Installed packages that require this one.
    pub required_by: Vec<String>,
    pub provides_extra: Vec<String>,
}

pub fn show(store: &dyn PackageStore, name: &str) -> Result<PackageInfo, PipetteError> {
    let package = store.load(name)?;
    let wanted = normalize_name(package.name());

    let mut requires: Vec<String> = package
        .dependencies()
        .iter()
        .filter_map(|dep| dep.package_name().ok().map(str::to_string))
        .collect();
    requires.sort_by_key(|n| normalize_name(n));
    requires.dedup_by(|a, b| normalize_name(a) == normalize_name(b));

    let mut required_by = Vec::new();
    for other in store.list()? {
        let needs = other
            .dependencies()
            .iter()
            .any(|dep| dep.package_name().is_ok_and(|n| normalize_name(n) == wanted));
        if needs {
            required_by.push(other.name().to_string());
        }
    }
    required_by.sort_by_key(|n| normalize_name(n));

    let location = package
        .meta_directory()
        .parent()
        .map(PathBuf::from)
        .unwrap_or_default();

    Ok(PackageInfo {
        name: package.name().to_string(),
        version: package.version().to_string(),
        location,
        requires_python: package.metadata.requires_python.clone(),
        requires,
        required_by,
        provides_extra: package.metadata.provides_extra.clone(),
    })
}

impl fmt::Display for PackageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Version: {}", self.version)?;
        writeln!(f, "Location: {}", self.location.display())?;
        if let Some(requires_python) = &self.requires_python {
            writeln!(f, "Requires-Python: {requires_python}")?;
        }
        writeln!(f, "Requires: {}", self.requires.join(", "))?;
        writeln!(f, "Required-by: {}", self.required_by.join(", "))?;
        write!(f, "Provides-Extra: {}", self.provides_extra.join(", "))
    }
}
