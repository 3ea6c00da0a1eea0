//! Integration tests for reports-config crate.

use reports_common::test_utils::init_test_logging;
use reports_config::{Settings, SettingsCache, SettingsLoader};
use std::io::Write;

fn write_settings(extension: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(extension)
        .tempfile()
        .expect("temp settings file");
    file.write_all(content.as_bytes()).expect("write settings");
    file
}

#[tokio::test]
async fn test_load_yaml_settings() -> anyhow::Result<()> {
    init_test_logging();
    let file = write_settings(
        ".yml",
        r#"
cache:
  max_capacity: 1000
  ttl_seconds: 3600
  tti_seconds: 1800
  generation: 4
features:
  follow_ups_v2: true
reports:
  progress_months: 6
logging:
  level: debug
"#,
    );

    let settings = SettingsLoader::new(file.path()).load().await?;
    assert_eq!(settings.cache.max_capacity, 1000);
    assert_eq!(settings.cache.generation, 4);
    assert!(settings.features.follow_ups_v2);
    assert_eq!(settings.logging.level, "debug");
    Ok(())
}

#[test]
fn test_load_toml_settings_blocking() -> anyhow::Result<()> {
    let file = write_settings(".toml", "[cache]\nmax_capacity = 10\nttl_seconds = 60\n");

    let settings = SettingsLoader::new(file.path()).load_blocking()?;
    assert_eq!(settings.cache.max_capacity, 10);
    assert_eq!(settings.cache.ttl_seconds, 60);
    assert_eq!(settings.reports, Settings::default().reports);
    Ok(())
}

#[tokio::test]
async fn test_invalid_settings_rejected() {
    let file = write_settings(".yml", "cache:\n  max_capacity: 0\n");

    let err = SettingsLoader::new(file.path()).load().await.unwrap_err();
    assert!(err.is_config_error());
}

#[tokio::test]
async fn test_missing_file_is_config_error() {
    let err = SettingsLoader::new("/nonexistent/reports.yml")
        .load()
        .await
        .unwrap_err();
    assert!(err.is_config_error());
}

#[test]
fn test_settings_cache_updates() {
    let cache = SettingsCache::default();
    assert!(!cache.features().follow_ups_v2);

    let mut settings = Settings::default();
    settings.features.follow_ups_v2 = true;
    cache.update(settings);

    assert!(cache.features().follow_ups_v2);
    assert!(cache.get().features.follow_ups_v2);
}
