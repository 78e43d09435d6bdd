use std::env;
use std::fs::write;

use serial_test::serial;
use tempfile::NamedTempFile;

/// Static config plus required env vars produces a fully merged SyncConfig.
#[test]
#[serial]
fn load_config_success_injects_env_secrets() {
    let config_yaml = r#"
source:
  base_url: "https://lms.example.edu/"
sync:
  root: /sync/courses
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    env::set_var("LMS_USERNAME", "student");
    env::set_var("LMS_PASSWORD", "hunter2");
    env::set_var("STORAGE_ACCESS_TOKEN", "top-secret-test-token");

    let config =
        course_sync::load_config::load_config(config_file.path()).expect("Config should load");

    // Trailing slash on the base URL is trimmed so joins cannot produce "//".
    assert_eq!(config.base_url, "https://lms.example.edu");
    assert_eq!(config.sync_root, "/sync/courses");
    assert_eq!(config.credentials.username, "student");
    assert_eq!(config.credentials.password, "hunter2");
    assert_eq!(config.access_token, "top-secret-test-token");

    // Unconfigured caps fall back to the defaults.
    assert_eq!(config.concurrency.sections, 5);
    assert_eq!(config.concurrency.resources, 20);
    assert_eq!(config.concurrency.transfers, 3);
    assert_eq!(config.http_timeout_secs, 30);
}

#[test]
#[serial]
fn load_config_honours_explicit_concurrency_caps() {
    let config_yaml = r#"
source:
  base_url: https://lms.example.edu
sync:
  root: /sync
concurrency:
  sections: 2
  transfers: 1
http_timeout_secs: 5
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    env::set_var("LMS_USERNAME", "student");
    env::set_var("LMS_PASSWORD", "hunter2");
    env::set_var("STORAGE_ACCESS_TOKEN", "token");

    let config =
        course_sync::load_config::load_config(config_file.path()).expect("Config should load");

    assert_eq!(config.concurrency.sections, 2);
    assert_eq!(config.concurrency.resources, 20, "unset cap keeps default");
    assert_eq!(config.concurrency.transfers, 1);
    assert_eq!(config.http_timeout_secs, 5);
}

#[test]
#[serial]
fn load_config_errors_on_missing_env() {
    let config_yaml = r#"
source:
  base_url: https://lms.example.edu
sync:
  root: /sync
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    env::remove_var("LMS_USERNAME");
    env::remove_var("LMS_PASSWORD");
    env::remove_var("STORAGE_ACCESS_TOKEN");

    let err = course_sync::load_config::load_config(config_file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("LMS_USERNAME"),
        "Must error for missing env var, got: {msg}"
    );
}

#[test]
#[serial]
fn load_config_errors_for_invalid_yaml() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), b"not-yaml: [:::").unwrap();

    env::set_var("LMS_USERNAME", "student");
    env::set_var("LMS_PASSWORD", "hunter2");
    env::set_var("STORAGE_ACCESS_TOKEN", "token");

    let err = course_sync::load_config::load_config(config_file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("parse") || msg.contains("YAML"),
        "Parse error expected, got: {msg}"
    );
}

#[test]
#[serial]
fn load_config_rejects_zero_caps() {
    let config_yaml = r#"
source:
  base_url: https://lms.example.edu
sync:
  root: /sync
concurrency:
  resources: 0
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    env::set_var("LMS_USERNAME", "student");
    env::set_var("LMS_PASSWORD", "hunter2");
    env::set_var("STORAGE_ACCESS_TOKEN", "token");

    let err = course_sync::load_config::load_config(config_file.path()).unwrap_err();
    assert!(err.to_string().contains("positive"));
}
