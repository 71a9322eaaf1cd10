use std::path::{Component, Path, PathBuf};

/// Ensure a directory exists, creating it and any parents if needed.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Returns the path to the pipette data directory (`~/.pipette/`).
pub fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".pipette")
}

/// Join a relative path onto `root`, refusing anything that would escape it.
///
/// Returns `None` for absolute paths and paths containing `..` components
/// that climb above `root`.
pub fn confined_join(root: &Path, relative: &Path) -> Option<PathBuf> {
    let mut depth = 0usize;
    let mut out = root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                depth += 1;
                out.push(part);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return None;
                }
                depth -= 1;
                out.pop();
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(out)
}

/// Remove `dir` and its ancestors up to (not including) `root` while they are empty.
pub fn prune_empty_dirs(dir: &Path, root: &Path) {
    let mut current = Some(dir);
    while let Some(path) = current {
        if path == root || !path.starts_with(root) {
            break;
        }
        if std::fs::remove_dir(path).is_err() {
            break;
        }
        current = path.parent();
    }
}

/// Read a text file into trimmed, non-empty lines, skipping `#` comments.
pub fn read_lines(path: &Path) -> std::io::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(|line| match line.find('#') {
            Some(idx) => &line[..idx],
            None => line,
        })
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
