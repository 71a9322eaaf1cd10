//! Operation: list installed distributions as pinned requirements.

use pipette_core::condition::normalize_name;
use pipette_core::source::PackageStore;
use pipette_util::errors::PipetteError;

/// `name==version` for every installed distribution, sorted by normalized name.
pub fn freeze(store: &dyn PackageStore) -> Result<Vec<String>, PipetteError> {
    let mut packages = store.list()?;
    packages.sort_by_key(|p| normalize_name(p.name()));
    Ok(packages
        .iter()
        .map(|p| format!("{}=={}", p.name(), p.version()))
        .collect())
}
