// tests/config_test.rs
use registry_retention::config::{load_config, Config};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_default_config() {
    let config = Config::default();
    assert_eq!(config.release.tag_pattern, r"^release-(\d{8}).*$");
    assert_eq!(config.system.tag_pattern, "^(main|master)$");
    assert_eq!(config.snapshot.tag_pattern, r"^(\d{8})-snap$");
    assert_eq!(config.repositories.ignore_pattern, "^devops/docker$");
}

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
[release]
not_delete_days = 14
min_keep_count = 5

[system]
tag_pattern = "^(main|develop)$"

[branches]
stale_days = 60
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.release.not_delete_days, 14.0);
    assert_eq!(config.release.min_keep_count, 5);
    // untouched fields keep their defaults
    assert_eq!(config.release.tag_pattern, r"^release-(\d{8}).*$");
    assert_eq!(config.system.tag_pattern, "^(main|develop)$");
    assert_eq!(config.branches.stale_days, 60);
    assert_eq!(config.ci.release_delta_days, 5);

    let engine = config.compile().unwrap();
    assert_eq!(engine.stale_branch_days(), 60);
}

#[test]
fn test_load_fixture() {
    let config = load_config(Some("tests/fixtures/config_with_snapshots.toml"))
        .expect("Failed to load test config");

    assert!(config.snapshot.enabled);
    assert_eq!(config.snapshot.repository_pattern, "^backups/.+$");
    assert_eq!(config.release.not_delete_days, 7.5);
    assert_eq!(config.arch.suffixes, vec!["amd64", "arm64", "s390x"]);
    assert_eq!(config.bucket.keep_count, Some(4));

    let engine = config.compile().unwrap();
    assert!(engine.snapshots_enabled());
    let retention = config.bucket_retention(None, None).unwrap();
    assert_eq!(retention.keep_count(), 4);
}

#[test]
fn test_invalid_toml_is_an_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[release\nmin_keep_count = ").unwrap();
    temp_file.flush().unwrap();

    let err = load_config(Some(temp_file.path().to_str().unwrap())).unwrap_err();
    assert!(err.to_string().starts_with("Config file error"));
}

#[test]
fn test_missing_file_is_an_error() {
    let err = load_config(Some("tests/fixtures/does-not-exist.toml")).unwrap_err();
    assert!(err.to_string().contains("I/O error"));
}

#[test]
fn test_bad_pattern_fails_compile() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file
        .write_all(b"[release]\ntag_pattern = 'release-(\\d{8}'\n")
        .unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    let err = config.compile().unwrap_err();
    assert!(err.to_string().starts_with("Invalid pattern"));
}
