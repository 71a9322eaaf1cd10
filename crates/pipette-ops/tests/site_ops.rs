use std::fs;
use std::path::Path;

use pipette_core::environment::MarkerEnvironment;
use pipette_ops::ops_check::check;
use pipette_ops::ops_freeze::freeze;
use pipette_ops::ops_show::show;
use pipette_ops::ops_uninstall::{uninstall, UninstallOptions};
use pipette_site::SitePackages;
use pipette_util::errors::PipetteError;
use tempfile::TempDir;

/// Lay out an installed distribution with one module and a `RECORD`.
fn install_fake(root: &Path, name: &str, version: &str, requires: &[&str]) {
    let module = name.replace('-', "_").to_lowercase();
    let dist_info = format!("{}-{version}.dist-info", name.replace('-', "_"));
    fs::create_dir_all(root.join(&dist_info)).unwrap();
    fs::create_dir_all(root.join(&module)).unwrap();
    fs::write(root.join(&module).join("__init__.py"), "").unwrap();

    let mut metadata = format!("Metadata-Version: 2.1\nName: {name}\nVersion: {version}\n");
    for req in requires {
        metadata.push_str(&format!("Requires-Dist: {req}\n"));
    }
    fs::write(root.join(&dist_info).join("METADATA"), metadata).unwrap();
    fs::write(
        root.join(&dist_info).join("RECORD"),
        format!("{module}/__init__.py,,0\n{dist_info}/METADATA,,\n{dist_info}/RECORD,,\n"),
    )
    .unwrap();
}

fn populated() -> TempDir {
    let tmp = TempDir::new().unwrap();
    install_fake(tmp.path(), "requests", "2.31.0", &["idna (<4,>=2.5)", "urllib3 (<3,>=1.21.1)", "PySocks ; extra == 'socks'"]);
    install_fake(tmp.path(), "idna", "3.4", &[]);
    install_fake(tmp.path(), "urllib3", "2.0.7", &[]);
    install_fake(tmp.path(), "Flask-Login", "0.6.3", &["idna"]);
    tmp
}

#[test]
fn test_freeze_is_sorted() {
    let tmp = populated();
    let store = SitePackages::new(tmp.path());
    assert_eq!(
        freeze(&store).unwrap(),
        vec!["Flask-Login==0.6.3", "idna==3.4", "requests==2.31.0", "urllib3==2.0.7"]
    );
}

#[test]
fn test_freeze_empty_store() {
    let tmp = TempDir::new().unwrap();
    let store = SitePackages::new(tmp.path().join("missing"));
    assert!(freeze(&store).unwrap().is_empty());
}

#[test]
fn test_show_lists_requirements_and_dependents() {
    let tmp = populated();
    let store = SitePackages::new(tmp.path());
    let info = show(&store, "IDNA").unwrap();
    assert_eq!(info.name, "idna");
    assert_eq!(info.location, tmp.path());
    assert!(info.requires.is_empty());
    assert_eq!(info.required_by, vec!["Flask-Login", "requests"]);

    let info = show(&store, "requests").unwrap();
    assert_eq!(info.requires, vec!["idna", "urllib3"]);
    let text = info.to_string();
    assert!(text.starts_with("Name: requests\nVersion: 2.31.0\n"));
    assert!(text.contains("Requires: idna, urllib3"));
}

#[test]
fn test_show_missing_package() {
    let tmp = populated();
    let store = SitePackages::new(tmp.path());
    let err = show(&store, "numpy").unwrap_err();
    assert!(matches!(err, PipetteError::PackageDirectoryMissing { .. }));
}

#[test]
fn test_uninstall_single_package() {
    let tmp = populated();
    let store = SitePackages::new(tmp.path());
    let opts = UninstallOptions {
        names: vec!["requests".to_string(), "numpy".to_string()],
        with_dependencies: false,
    };
    let outcome = uninstall(&store, &opts).unwrap();

    assert_eq!(outcome.removed, vec![("requests".to_string(), "2.31.0".to_string())]);
    assert_eq!(outcome.missing, vec!["numpy"]);
    assert!(!tmp.path().join("requests").exists());
    assert!(!tmp.path().join("requests-2.31.0.dist-info").exists());
    assert!(tmp.path().join("idna").exists());
}

#[test]
fn test_uninstall_with_dependencies_visits_each_once() {
    let tmp = populated();
    let store = SitePackages::new(tmp.path());
    let opts = UninstallOptions {
        names: vec!["requests".to_string(), "flask_login".to_string()],
        with_dependencies: true,
    };
    let outcome = uninstall(&store, &opts).unwrap();

    let removed: Vec<&str> = outcome.removed.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(removed, vec!["requests", "Flask-Login", "idna", "urllib3"]);
    // the PySocks extra is not followed and was never installed
    assert!(outcome.missing.is_empty());
    assert!(freeze(&store).unwrap().is_empty());
}

#[test]
fn test_check_healthy_store() {
    let tmp = populated();
    let store = SitePackages::new(tmp.path());
    assert!(check(&store, None).unwrap().is_empty());
}

fn broken_app() -> TempDir {
    let tmp = TempDir::new().unwrap();
    install_fake(
        tmp.path(),
        "app",
        "1.0",
        &["idna>=3.5", "requests[socks]", "tomli ; python_version < '3.11'"],
    );
    install_fake(tmp.path(), "requests", "2.31.0", &["idna", "PySocks ; extra == 'socks'"]);
    install_fake(tmp.path(), "idna", "3.4", &[]);
    tmp
}

#[test]
fn test_check_reports_missing_and_mismatched() {
    let tmp = broken_app();
    let store = SitePackages::new(tmp.path());
    let broken = check(&store, None).unwrap();

    assert_eq!(broken.len(), 1);
    let app = &broken[0];
    assert_eq!(app.name, "app");
    // requested through requests[socks]; the tomli line needs an environment
    assert_eq!(app.missing, vec!["PySocks"]);
    assert_eq!(app.mismatched, vec!["idna 3.4"]);
    assert!(app.error.is_none());
    assert!(app.is_broken());
}

#[test]
fn test_check_applies_markers_with_environment() {
    let tmp = broken_app();
    let store = SitePackages::new(tmp.path());
    let env = MarkerEnvironment {
        python_version: "3.10".to_string(),
        python_full_version: "3.10.12".to_string(),
        sys_platform: "linux".to_string(),
        ..MarkerEnvironment::default()
    };
    let broken = check(&store, Some(&env)).unwrap();
    assert_eq!(broken[0].missing, vec!["PySocks", "tomli"]);
}

#[test]
fn test_check_cyclic_extras_terminate() {
    let tmp = TempDir::new().unwrap();
    install_fake(
        tmp.path(),
        "loop",
        "1.0",
        &["loop[b] ; extra == 'a'", "loop[a] ; extra == 'b'", "gone ; extra == 'b'"],
    );
    install_fake(tmp.path(), "user", "1.0", &["loop[a]"]);
    let store = SitePackages::new(tmp.path());

    let broken = check(&store, None).unwrap();
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0].name, "user");
    assert_eq!(broken[0].missing, vec!["gone"]);
}
