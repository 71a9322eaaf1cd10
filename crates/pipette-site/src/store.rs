//! A `site-packages` directory as a package store.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use pipette_core::condition::normalize_name;
use pipette_core::metadata::InstalledPackage;
use pipette_core::source::PackageStore;
use pipette_util::errors::PipetteError;
use pipette_util::fs::{confined_join, prune_empty_dirs};

use crate::extract::unpack_wheel;
use crate::record::{parse_record, write_record};

/// Packages installed into one directory, each described by a
/// `<name>-<version>.dist-info` directory.
#[derive(Debug, Clone)]
pub struct SitePackages {
    root: PathBuf,
}

impl SitePackages {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All `.dist-info` directories with the distribution name they carry.
    fn dist_info_dirs(&self) -> Result<Vec<(String, PathBuf)>, PipetteError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(stem) = file_name.to_str().and_then(|n| n.strip_suffix(".dist-info")) else {
                continue;
            };
            if !entry.path().is_dir() {
                continue;
            }
            let name = stem.split_once('-').map_or(stem, |(name, _)| name);
            dirs.push((normalize_name(name), entry.path()));
        }
        dirs.sort();
        Ok(dirs)
    }

    /// Remove the files listed in `RECORD`, then prune emptied directories.
    fn remove_recorded(&self, record: &Path) -> Result<(), PipetteError> {
        let text = fs::read_to_string(record)?;
        let mut parents = BTreeSet::new();
        for rel in parse_record(&text) {
            let Some(path) = confined_join(&self.root, Path::new(&rel)) else {
                tracing::debug!("not removing `{rel}`: outside {}", self.root.display());
                continue;
            };
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
            if let Some(parent) = path.parent() {
                parents.insert(parent.to_path_buf());
            }
        }
        // deepest first so children go before their parents
        for dir in parents.iter().rev() {
            prune_empty_dirs(dir, &self.root);
        }
        Ok(())
    }

    /// Without a `RECORD`, remove what `top_level.txt` names, or the lone
    /// module named after the package.
    fn remove_top_level(&self, package: &InstalledPackage) -> Result<(), PipetteError> {
        let top_level = package.meta_directory().join("top_level.txt");
        let names: Vec<String> = match fs::read_to_string(&top_level) {
            Ok(text) => text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
            Err(_) => vec![package.name().replace('-', "_")],
        };

        for name in names {
            let Some(path) = confined_join(&self.root, Path::new(&name)) else {
                continue;
            };
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
                continue;
            }
            let module = path.with_extension("py");
            if module.is_file() {
                fs::remove_file(&module)?;
            }
        }
        Ok(())
    }
}

impl PackageStore for SitePackages {
    fn load(&self, name: &str) -> Result<InstalledPackage, PipetteError> {
        let wanted = normalize_name(name);
        let found = self
            .dist_info_dirs()?
            .into_iter()
            .find(|(candidate, _)| *candidate == wanted);
        match found {
            Some((_, dir)) => InstalledPackage::read(&dir),
            None => Err(PipetteError::PackageDirectoryMissing {
                name: name.to_string(),
            }),
        }
    }

    fn uninstall(&self, package: &InstalledPackage) -> Result<(), PipetteError> {
        tracing::debug!("uninstalling {} {}", package.name(), package.version());
        let record = package.meta_directory().join("RECORD");
        if record.is_file() {
            self.remove_recorded(&record)?;
        } else {
            self.remove_top_level(package)?;
        }
        let meta = package.meta_directory();
        if meta.exists() {
            fs::remove_dir_all(meta)?;
        }
        Ok(())
    }

    fn extract(&self, archive: &Path) -> Result<(), PipetteError> {
        pipette_util::fs::ensure_dir(&self.root)?;
        let unpacked = unpack_wheel(archive, &self.root)?;
        write_record(&self.root, &unpacked.dist_info, &unpacked.files)?;
        tracing::debug!(
            "extracted {} files into {}",
            unpacked.files.len(),
            self.root.display()
        );
        Ok(())
    }

    fn list(&self) -> Result<Vec<InstalledPackage>, PipetteError> {
        let mut packages = Vec::new();
        for (name, dir) in self.dist_info_dirs()? {
            match InstalledPackage::read(&dir) {
                Ok(package) => packages.push(package),
                Err(e) => tracing::warn!("ignoring {name}: {e}"),
            }
        }
        Ok(packages)
    }
}
