use std::fs;

use plugrun_core::manifest;
use plugrun_core::Error;
use tempfile::TempDir;

#[test]
fn test_read_manifest() {
    let temp_dir = TempDir::new().unwrap();
    let dist = temp_dir.path().join("dist");
    fs::create_dir_all(&dist).unwrap();
    fs::write(
        dist.join("mf-manifest.json"),
        r#"{
            "id": "BarChart",
            "name": "BarChart",
            "metaData": {"buildInfo": {"buildVersion": "0.9.0", "buildName": "@perses-dev/bar-chart-plugin"}},
            "shared": []
        }"#,
    )
    .unwrap();

    let manifest = manifest::read(temp_dir.path()).unwrap();
    assert_eq!(manifest.id, "BarChart");
    assert_eq!(manifest.metadata.build_info.version, "0.9.0");
    assert_eq!(manifest.metadata.build_info.name, "@perses-dev/bar-chart-plugin");
    assert_eq!(manifest.archive_name("0.9.0"), "BarChart-0.9.0.tar.gz");
}

#[test]
fn test_read_missing_manifest() {
    let temp_dir = TempDir::new().unwrap();
    let err = manifest::read(temp_dir.path()).unwrap_err();
    assert!(matches!(err, Error::Manifest { .. }));
    assert!(err.to_string().contains("mf-manifest.json"));
}

#[test]
fn test_read_invalid_manifest() {
    let temp_dir = TempDir::new().unwrap();
    let dist = temp_dir.path().join("dist");
    fs::create_dir_all(&dist).unwrap();
    fs::write(dist.join("mf-manifest.json"), "not json").unwrap();

    assert!(matches!(
        manifest::read(temp_dir.path()),
        Err(Error::Manifest { .. })
    ));
}
