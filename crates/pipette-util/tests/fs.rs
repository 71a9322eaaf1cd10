use std::path::Path;

use pipette_util::fs::{confined_join, ensure_dir, prune_empty_dirs, read_lines};
use tempfile::TempDir;

#[test]
fn test_ensure_dir_creates_nested() {
    let tmp = TempDir::new().unwrap();
    let deep = tmp.path().join("x").join("y").join("z");
    assert!(!deep.exists());
    ensure_dir(&deep).unwrap();
    assert!(deep.is_dir());
}

#[test]
fn test_ensure_dir_idempotent() {
    let tmp = TempDir::new().unwrap();
    ensure_dir(tmp.path()).unwrap();
    ensure_dir(tmp.path()).unwrap();
    assert!(tmp.path().is_dir());
}

#[test]
fn test_confined_join_accepts_nested_paths() {
    let root = Path::new("/site");
    assert_eq!(
        confined_join(root, Path::new("pkg/./mod.py")),
        Some(root.join("pkg").join("mod.py"))
    );
    assert_eq!(
        confined_join(root, Path::new("pkg/../other.py")),
        Some(root.join("other.py"))
    );
}

#[test]
fn test_confined_join_rejects_escapes() {
    let root = Path::new("/site");
    assert_eq!(confined_join(root, Path::new("../etc/passwd")), None);
    assert_eq!(confined_join(root, Path::new("/etc/passwd")), None);
    assert_eq!(confined_join(root, Path::new("a/../../b")), None);
}

#[test]
fn test_prune_empty_dirs_stops_at_root() {
    let tmp = TempDir::new().unwrap();
    let deep = tmp.path().join("a").join("b");
    std::fs::create_dir_all(&deep).unwrap();
    std::fs::write(tmp.path().join("a").join("keep.txt"), "x").unwrap();

    prune_empty_dirs(&deep, tmp.path());

    assert!(!deep.exists());
    assert!(tmp.path().join("a").is_dir());
    assert!(tmp.path().is_dir());
}

#[test]
fn test_read_lines_skips_comments_and_blanks() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("requirements.txt");
    std::fs::write(
        &path,
        "# pinned\nrequests>=2.0\n\n  idna  # inline\n   \nflask[async]\n",
    )
    .unwrap();

    let lines = read_lines(&path).unwrap();
    assert_eq!(lines, vec!["requests>=2.0", "idna", "flask[async]"]);
}

#[test]
fn test_read_lines_missing_file() {
    assert!(read_lines(Path::new("/nonexistent/requirements.txt")).is_err());
}
