//! Operation: verify that installed packages have compatible requirements.

use std::collections::HashSet;

use pipette_core::condition::{normalize_name, satisfies_all};
use pipette_core::dependency::Dependency;
use pipette_core::environment::MarkerEnvironment;
use pipette_core::metadata::InstalledPackage;
use pipette_core::source::PackageStore;
use pipette_util::errors::PipetteError;

/// Problems found with one installed package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageHealth {
    pub name: String,
    pub version: String,
    /// Requirements (including those pulled in through requested extras)
    /// that are not installed.
    pub missing: Vec<String>,
    /// Installed requirements whose version fails the requested conditions.
    pub mismatched: Vec<String>,
    /// Set when the package's requirements could not be examined.
    pub error: Option<String>,
}

impl PackageHealth {
    pub fn is_broken(&self) -> bool {
        !self.missing.is_empty() || !self.mismatched.is_empty() || self.error.is_some()
    }
}

/// Whether a requirement line is considered.
///
/// Without an environment, only lines without markers and lines already
/// selected through an extra can be judged.
fn applies(dep: &Dependency, env: Option<&MarkerEnvironment>) -> Result<bool, PipetteError> {
    match env {
        Some(env) => dep.applies_to(env),
        None => Ok(dep.is_extra || dep.markers.is_empty()),
    }
}

/// Requirement names that are not installed, following requested extras.
fn scan_missing(
    store: &dyn PackageStore,
    package: &InstalledPackage,
    env: Option<&MarkerEnvironment>,
) -> Result<Vec<String>, PipetteError> {
    let mut missing = Vec::new();
    let mut expanded = HashSet::new();
    let mut pending = package.dependencies();

    while let Some(dep) = pending.pop() {
        if !applies(&dep, env)? {
            continue;
        }
        let requirement = dep.requirement()?;
        let installed = match store.load(&requirement.name) {
            Ok(installed) => installed,
            Err(PipetteError::PackageDirectoryMissing { .. }) => {
                if !missing.iter().any(|m: &String| normalize_name(m) == normalize_name(&requirement.name)) {
                    missing.push(requirement.name.clone());
                }
                continue;
            }
            Err(e) => return Err(e),
        };
        for extra in &requirement.extras {
            if expanded.insert((normalize_name(installed.name()), normalize_name(extra))) {
                pending.extend(installed.extra_dependencies(extra)?);
            }
        }
    }
    missing.sort_by_key(|n| normalize_name(n));
    Ok(missing)
}

/// Installed requirements whose version does not satisfy the conditions.
fn scan_mismatched(
    store: &dyn PackageStore,
    package: &InstalledPackage,
    env: Option<&MarkerEnvironment>,
) -> Result<Vec<String>, PipetteError> {
    let mut mismatched = Vec::new();
    for dep in package.dependencies() {
        if !applies(&dep, env)? {
            continue;
        }
        let installed = match store.load(dep.package_name()?) {
            Ok(installed) => installed,
            Err(PipetteError::PackageDirectoryMissing { .. }) => continue,
            Err(e) => return Err(e),
        };
        if !satisfies_all(installed.version(), dep.conditions()?)? {
            mismatched.push(format!("{} {}", installed.name(), installed.version()));
        }
    }
    Ok(mismatched)
}

/// Examine every installed package. Only packages with problems are returned.
pub fn check(store: &dyn PackageStore, env: Option<&MarkerEnvironment>) -> Result<Vec<PackageHealth>, PipetteError> {
    let mut packages = store.list()?;
    packages.sort_by_key(|p| normalize_name(p.name()));

    let mut broken = Vec::new();
    for package in &packages {
        let mut health = PackageHealth {
            name: package.name().to_string(),
            version: package.version().to_string(),
            ..PackageHealth::default()
        };
        let scanned = scan_missing(store, package, env)
            .and_then(|missing| Ok((missing, scan_mismatched(store, package, env)?)));
        match scanned {
            Ok((missing, mismatched)) => {
                health.missing = missing;
                health.mismatched = mismatched;
            }
            Err(e) => health.error = Some(e.to_string()),
        }
        if health.is_broken() {
            tracing::debug!("{} {} has broken requirements", health.name, health.version);
            broken.push(health);
        }
    }
    Ok(broken)
}
