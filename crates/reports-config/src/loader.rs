//! Settings loading from YAML or TOML files with environment overrides.

use crate::schema::Settings;
use reports_common::{ReportsError, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Environment variable naming the settings file.
pub const SETTINGS_PATH_VAR: &str = "REPORTS_SETTINGS_PATH";
/// Overrides `features.follow_ups_v2`.
pub const FOLLOW_UPS_V2_VAR: &str = "REPORTS_FOLLOW_UPS_V2";
/// Overrides `cache.generation`.
pub const CACHE_GENERATION_VAR: &str = "REPORTS_CACHE_GENERATION";
/// Overrides `cache.ttl_seconds`.
pub const CACHE_TTL_VAR: &str = "REPORTS_CACHE_TTL_SECONDS";
/// Overrides `reports.bust_cache`.
pub const BUST_CACHE_VAR: &str = "REPORTS_BUST_CACHE";
/// Overrides `logging.level`.
pub const LOG_LEVEL_VAR: &str = "REPORTS_LOG_LEVEL";

/// On-disk settings format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    /// `.yml` / `.yaml`
    Yaml,
    /// `.toml`
    Toml,
}

impl SettingsFormat {
    /// Picks the format from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yml" | "yaml") => Ok(Self::Yaml),
            Some("toml") => Ok(Self::Toml),
            _ => Err(ReportsError::config(format!(
                "unsupported settings file extension: {}",
                path.display()
            ))),
        }
    }

    /// Parses settings text in this format.
    pub fn parse(self, content: &str) -> Result<Settings> {
        match self {
            Self::Yaml => Ok(serde_yaml::from_str(content)?),
            Self::Toml => Ok(toml::from_str(content)?),
        }
    }
}

/// Settings loader bound to one file.
pub struct SettingsLoader {
    path: PathBuf,
}

impl SettingsLoader {
    /// Creates a loader for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a loader from `REPORTS_SETTINGS_PATH`, if set.
    pub fn from_env() -> Option<Self> {
        std::env::var(SETTINGS_PATH_VAR).ok().map(Self::new)
    }

    /// Path this loader reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads, overrides and validates the settings file.
    pub async fn load(&self) -> Result<Settings> {
        let format = SettingsFormat::from_path(&self.path)?;
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            ReportsError::config_with_source(
                format!("Failed to read settings file {}", self.path.display()),
                e,
            )
        })?;
        self.finish(format, &content)
    }

    /// Blocking variant of [`SettingsLoader::load`].
    pub fn load_blocking(&self) -> Result<Settings> {
        let format = SettingsFormat::from_path(&self.path)?;
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            ReportsError::config_with_source(
                format!("Failed to read settings file {}", self.path.display()),
                e,
            )
        })?;
        self.finish(format, &content)
    }

    fn finish(&self, format: SettingsFormat, content: &str) -> Result<Settings> {
        let mut settings = format.parse(content).map_err(|e| {
            ReportsError::config_with_source(
                format!("Failed to parse settings file {}", self.path.display()),
                e,
            )
        })?;
        apply_overrides(&mut settings, |name| std::env::var(name).ok())?;
        crate::SettingsValidator::validate(&settings)?;
        info!(path = %self.path.display(), "Settings loaded");
        Ok(settings)
    }
}

/// Loads settings from `REPORTS_SETTINGS_PATH`, or defaults with environment
/// overrides when the variable is unset.
pub async fn load_settings() -> Result<Settings> {
    match SettingsLoader::from_env() {
        Some(loader) => loader.load().await,
        None => {
            debug!("{SETTINGS_PATH_VAR} not set, using default settings");
            let mut settings = Settings::default();
            apply_overrides(&mut settings, |name| std::env::var(name).ok())?;
            crate::SettingsValidator::validate(&settings)?;
            Ok(settings)
        }
    }
}

/// Applies overrides looked up through `lookup`, usually the process environment.
pub fn apply_overrides<F>(settings: &mut Settings, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(FOLLOW_UPS_V2_VAR) {
        settings.features.follow_ups_v2 = parse_bool(FOLLOW_UPS_V2_VAR, &value)?;
    }

    if let Some(value) = lookup(CACHE_GENERATION_VAR) {
        settings.cache.generation = parse_var(CACHE_GENERATION_VAR, &value)?;
    }

    if let Some(value) = lookup(CACHE_TTL_VAR) {
        settings.cache.ttl_seconds = parse_var(CACHE_TTL_VAR, &value)?;
    }

    if let Some(value) = lookup(BUST_CACHE_VAR) {
        settings.reports.bust_cache = parse_bool(BUST_CACHE_VAR, &value)?;
    }

    if let Some(level) = lookup(LOG_LEVEL_VAR) {
        settings.logging.level = level;
    }

    Ok(())
}

fn parse_var<T>(var: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse().map_err(|e| {
        ReportsError::config_with_source(format!("Failed to parse environment variable '{var}'"), e)
    })
}

fn parse_bool(var: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ReportsError::config(format!(
            "Failed to parse environment variable '{var}': expected a boolean, got '{other}'"
        ))),
    }
}
