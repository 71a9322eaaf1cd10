//! Wheel unpacking.

use std::fs;
use std::path::{Component, Path, PathBuf};

use pipette_util::errors::PipetteError;

/// Name written to the `INSTALLER` file of every installed distribution.
pub const INSTALLER_NAME: &str = "pipette";

/// What an unpacked wheel left behind.
#[derive(Debug, Clone)]
pub struct Unpacked {
    /// The `.dist-info` directory, absolute.
    pub dist_info: PathBuf,
    /// Every file written, relative to the store root.
    pub files: Vec<PathBuf>,
}

/// Where an archive entry lands relative to the store root.
///
/// `<name>.data/purelib/...` and `<name>.data/platlib/...` are moved to the
/// root; other `.data` schemes are not installed.
fn install_path(entry: &Path) -> Option<PathBuf> {
    let mut components = entry.components();
    let first = match components.next()? {
        Component::Normal(first) => first.to_str()?,
        _ => return None,
    };
    if !first.ends_with(".data") {
        return Some(entry.to_path_buf());
    }
    let scheme = components.next()?.as_os_str();
    if scheme == "purelib" || scheme == "platlib" {
        let rest = components.as_path();
        return (!rest.as_os_str().is_empty()).then(|| rest.to_path_buf());
    }
    tracing::warn!("skipping {}: unsupported wheel data scheme", entry.display());
    None
}

fn dist_info_dir(entry: &Path) -> Option<&str> {
    match entry.components().next()? {
        Component::Normal(first) => first.to_str().filter(|s| s.ends_with(".dist-info")),
        _ => None,
    }
}

/// Extract a wheel into `root`.
pub fn unpack_wheel(archive: &Path, root: &Path) -> Result<Unpacked, PipetteError> {
    let file = fs::File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| PipetteError::Metadata {
        message: format!("Failed to open wheel {}: {e}", archive.display()),
    })?;

    let mut dist_info: Option<String> = None;
    let mut files = Vec::new();

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| PipetteError::Metadata {
            message: format!("Zip entry error: {e}"),
        })?;

        let Some(name) = entry.enclosed_name() else {
            tracing::warn!("skipping unsafe wheel entry `{}`", entry.name());
            continue;
        };
        if dist_info.is_none() {
            dist_info = dist_info_dir(&name).map(str::to_string);
        }
        let Some(relative) = install_path(&name) else {
            continue;
        };
        let out_path = root.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = fs::File::create(&out_path)?;
        std::io::copy(&mut entry, &mut out).map_err(|e| PipetteError::Metadata {
            message: format!("Failed to read zip entry {}: {e}", name.display()),
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&out_path, fs::Permissions::from_mode(mode))?;
            }
        }

        files.push(relative);
    }

    let Some(dist_info) = dist_info else {
        return Err(PipetteError::Metadata {
            message: format!("{} has no .dist-info directory", archive.display()),
        });
    };
    let dist_info = root.join(dist_info);

    fs::write(dist_info.join("INSTALLER"), format!("{INSTALLER_NAME}\n"))?;
    let installer = PathBuf::from(dist_info.file_name().unwrap_or_default()).join("INSTALLER");
    if !files.contains(&installer) {
        files.push(installer);
    }

    Ok(Unpacked { dist_info, files })
}
