//! Operation: remove installed packages.

use std::collections::{HashSet, VecDeque};

use pipette_core::condition::normalize_name;
use pipette_core::source::PackageStore;
use pipette_util::errors::PipetteError;

/// Options for `pipette uninstall`.
#[derive(Debug, Clone, Default)]
pub struct UninstallOptions {
    pub names: Vec<String>,
    /// Also remove the non-extra requirements of each package.
    pub with_dependencies: bool,
}

/// What an uninstall run did.
#[derive(Debug, Default)]
pub struct UninstallOutcome {
    /// `(name, version)` of every removed package, in removal order.
    pub removed: Vec<(String, String)>,
    /// Requested names that were not installed.
    pub missing: Vec<String>,
}

/// Remove the named packages, and with `with_dependencies` everything they
/// require. Each package is visited at most once.
pub fn uninstall(store: &dyn PackageStore, opts: &UninstallOptions) -> Result<UninstallOutcome, PipetteError> {
    let mut outcome = UninstallOutcome::default();
    let mut seen = HashSet::new();
    let mut queue: VecDeque<(String, bool)> = opts.names.iter().map(|n| (n.clone(), true)).collect();

    while let Some((name, requested)) = queue.pop_front() {
        if !seen.insert(normalize_name(&name)) {
            continue;
        }
        let package = match store.load(&name) {
            Ok(package) => package,
            Err(PipetteError::PackageDirectoryMissing { .. }) => {
                if requested {
                    outcome.missing.push(name);
                } else {
                    tracing::debug!("dependency {name} is not installed");
                }
                continue;
            }
            Err(e) => return Err(e),
        };

        if opts.with_dependencies {
            for dep in package.dependencies() {
                match dep.package_name() {
                    Ok(dep_name) => queue.push_back((dep_name.to_string(), false)),
                    Err(e) => tracing::warn!("ignoring requirement `{dep}` of {name}: {e}"),
                }
            }
        }

        store.uninstall(&package)?;
        outcome
            .removed
            .push((package.name().to_string(), package.version().to_string()));
    }
    Ok(outcome)
}
