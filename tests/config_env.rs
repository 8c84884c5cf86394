// tests/config_env.rs
//
// Config file discovery and env overrides. Env is process-global, so these
// run serially.

use std::fs;
use std::path::PathBuf;

use serial_test::serial;
use tempfile::tempdir;

use news_globe::config::{AppConfig, ENV_CONFIG_PATH};

const OVERRIDES: &[&str] = &[
    ENV_CONFIG_PATH,
    "CREDENTIALS_FILE",
    "BIGQUERY_PROJECT",
    "CACHE_TTL_SECS",
    "FETCH_TIMEOUT_SECS",
    "FETCH_ATTEMPTS",
    "DEBUG_ROUTES",
];

fn clear_env() {
    for key in OVERRIDES {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn env_path_is_loaded_then_overridden() {
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("globe.toml");
    fs::write(
        &path,
        r#"
        credentials_dir = "/etc/globe"
        cache_ttl_secs = 120
        result_limit = 25
        "#,
    )
    .unwrap();

    std::env::set_var(ENV_CONFIG_PATH, &path);
    std::env::set_var("CREDENTIALS_FILE", "svc.json");
    std::env::set_var("CACHE_TTL_SECS", "30");
    std::env::set_var("FETCH_ATTEMPTS", "not-a-number");
    std::env::set_var("DEBUG_ROUTES", "1");

    let cfg = AppConfig::load_default().unwrap();
    clear_env();

    assert_eq!(cfg.credentials_path(), PathBuf::from("/etc/globe/svc.json"));
    assert_eq!(cfg.cache_ttl_secs, 30);
    assert_eq!(cfg.result_limit, 25);
    assert_eq!(cfg.fetch_attempts, 3);
    assert!(cfg.metrics_enabled);
}

#[test]
#[serial]
fn missing_env_path_is_an_error() {
    clear_env();
    let dir = tempdir().unwrap();
    std::env::set_var(ENV_CONFIG_PATH, dir.path().join("nope.toml"));
    let err = AppConfig::load_default().unwrap_err();
    clear_env();
    assert!(err.to_string().contains(ENV_CONFIG_PATH));
}

#[test]
#[serial]
fn malformed_file_reports_path() {
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "cache_ttl_secs = \"soon\"").unwrap();
    let err = AppConfig::load_from(&path).unwrap_err();
    assert!(format!("{err:#}").contains("parsing news_globe config"));
}
