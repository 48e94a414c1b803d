use std::fs;
use std::path::Path;

use plugrun_core::workspace::discover;
use plugrun_core::Error;
use tempfile::TempDir;

fn write_package_json(dir: &Path, content: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("package.json"), content).unwrap();
}

#[test]
fn test_discover_keeps_declaration_order() {
    let temp_dir = TempDir::new().unwrap();
    write_package_json(
        temp_dir.path(),
        r#"{"name": "plugins", "workspaces": ["timeserieschart", "barchart", "tempo"]}"#,
    );

    let workspaces = discover(temp_dir.path()).unwrap();
    let names: Vec<&str> = workspaces.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, vec!["timeserieschart", "barchart", "tempo"]);
    assert_eq!(workspaces[1].path, temp_dir.path().join("barchart"));
}

#[test]
fn test_discover_expands_wildcards() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_package_json(root, r#"{"workspaces": ["plugins/*", "shared"]}"#);
    write_package_json(&root.join("plugins").join("zeta"), "{}");
    write_package_json(&root.join("plugins").join("alpha"), "{}");
    // Not a package: no package.json.
    fs::create_dir_all(root.join("plugins").join("docs")).unwrap();

    let workspaces = discover(root).unwrap();
    let names: Vec<&str> = workspaces.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, vec!["plugins/alpha", "plugins/zeta", "shared"]);
}

#[test]
fn test_discover_accepts_packages_object() {
    let temp_dir = TempDir::new().unwrap();
    write_package_json(temp_dir.path(), r#"{"workspaces": {"packages": ["loki"]}}"#);

    let workspaces = discover(temp_dir.path()).unwrap();
    assert_eq!(workspaces.len(), 1);
    assert_eq!(workspaces[0].name, "loki");
}

#[test]
fn test_discover_errors() {
    let temp_dir = TempDir::new().unwrap();
    assert!(matches!(
        discover(temp_dir.path()),
        Err(Error::Workspace { .. })
    ));

    write_package_json(temp_dir.path(), r#"{"name": "no-workspaces"}"#);
    let err = discover(temp_dir.path()).unwrap_err();
    assert!(err.to_string().contains("no 'workspaces' field"));

    write_package_json(temp_dir.path(), r#"{"workspaces": 42}"#);
    assert!(matches!(
        discover(temp_dir.path()),
        Err(Error::Workspace { .. })
    ));
}

#[test]
fn test_has_schemas() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_package_json(root, r#"{"workspaces": ["with", "without"]}"#);
    fs::create_dir_all(root.join("with").join("schemas")).unwrap();
    fs::create_dir_all(root.join("without")).unwrap();

    let workspaces = discover(root).unwrap();
    assert!(workspaces[0].has_schemas());
    assert!(!workspaces[1].has_schemas());
}
