use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use plugrun_core::{BackoffRange, Config, Error, RetryPolicy, Workspace};
use tempfile::TempDir;

#[test]
fn test_missing_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::load(temp_dir.path()).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.lint.program, "percli");
    assert_eq!(config.lint.timeout, Duration::from_secs(180));
    assert_eq!(config.publish.retry, RetryPolicy::default());
    assert_eq!(config.publish.module_prefix, "github.com/perses/plugins");
}

#[test]
fn test_partial_sections_keep_other_defaults() {
    let config = Config::parse(
        r#"
[lint]
timeout_secs = 60

[build]
program = "npm"
args = ["run", "build", "--workspace={workspace}"]

[publish]
max_attempts = 3
backoff_growth = { min_secs = 2, span_secs = 4 }
"#,
        "plugrun.toml",
    )
    .unwrap();

    assert_eq!(config.lint.timeout, Duration::from_secs(60));
    assert_eq!(config.lint.program, "percli");
    assert_eq!(config.build.program, "npm");
    assert_eq!(config.build.timeout, Duration::from_secs(600));
    assert_eq!(config.golangci_lint, Config::default().golangci_lint);
    assert_eq!(config.publish.retry.max_attempts, 3);
    assert_eq!(config.publish.retry.initial_backoff, BackoffRange::from_secs(1, 9));
    assert_eq!(config.publish.retry.backoff_growth, BackoffRange::from_secs(2, 4));
}

#[test]
fn test_load_reads_root_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("plugrun.toml"),
        "[publish]\nmodule_prefix = \"example.com/plugins\"\n",
    )
    .unwrap();

    let config = Config::load(temp_dir.path()).unwrap();
    assert_eq!(config.publish.module_prefix, "example.com/plugins");
}

#[test]
fn test_invalid_config_is_rejected() {
    assert!(matches!(
        Config::parse("[lint]\nunknown = 1\n", "plugrun.toml"),
        Err(Error::Toml { .. })
    ));
    assert!(matches!(
        Config::parse("[publish]\nmax_attempts = 0\n", "plugrun.toml"),
        Err(Error::Config(_))
    ));
    assert!(matches!(
        Config::parse("[build]\nprogram = \"  \"\n", "plugrun.toml"),
        Err(Error::Config(_))
    ));
}

#[test]
fn test_out_of_range_backoff_is_rejected() {
    let content = r#"
[publish]
max_attempts = 3
initial_backoff = { min_secs = 9223372036854775807, span_secs = 0 }
backoff_growth = { min_secs = 9223372036854775807, span_secs = 0 }
"#;
    let err = Config::parse(content, "plugrun.toml").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("initial_backoff"), "{}", err);

    let content = r#"
[publish]
backoff_growth = { min_secs = 86000, span_secs = 1000 }
"#;
    assert!(matches!(
        Config::parse(content, "plugrun.toml"),
        Err(Error::Config(_))
    ));
}

#[test]
fn test_command_for_substitutes_workspace() {
    let config = Config::default();
    let workspace = Workspace::new(&PathBuf::from("/repo"), "barchart");

    let lint = config.lint.command_for(&workspace);
    assert_eq!(lint.program(), "percli");
    assert_eq!(
        lint.get_args(),
        &["plugin", "lint", "--plugin.path=/repo/barchart"]
    );
    assert_eq!(lint.dir(), None);

    let golangci = config.golangci_lint.command_for(&workspace);
    assert_eq!(golangci.get_args(), &["run"]);
    assert_eq!(golangci.dir(), Some(PathBuf::from("/repo/barchart").as_path()));
}
