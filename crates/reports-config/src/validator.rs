//! Runtime validation of loaded settings.

use crate::schema::Settings;
use reports_common::{ensure, ReportsError, Result};

/// Longest progress window a card may request.
pub const MAX_PROGRESS_MONTHS: u32 = 36;

impl Settings {
    /// Validates the settings, reporting the first offending field.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.cache.max_capacity > 0,
            ReportsError::validation_field("cache capacity must be positive", "cache.max_capacity")
        );

        ensure!(
            self.cache.ttl_seconds > 0,
            ReportsError::validation_field("cache TTL must be positive", "cache.ttl_seconds")
        );

        if let Some(tti) = self.cache.tti_seconds {
            ensure!(
                tti > 0 && tti <= self.cache.ttl_seconds,
                ReportsError::validation_field(
                    format!(
                        "cache TTI must be between 1 and the TTL ({}s), got {tti}s",
                        self.cache.ttl_seconds
                    ),
                    "cache.tti_seconds",
                )
            );
        }

        ensure!(
            (1..=MAX_PROGRESS_MONTHS).contains(&self.reports.progress_months),
            ReportsError::validation_field(
                format!(
                    "progress window must span 1 to {MAX_PROGRESS_MONTHS} months, got {}",
                    self.reports.progress_months
                ),
                "reports.progress_months",
            )
        );

        Ok(())
    }
}

/// Settings validator.
pub struct SettingsValidator;

impl SettingsValidator {
    /// Validates a settings value, wrapping failures as configuration errors.
    pub fn validate(settings: &Settings) -> Result<()> {
        settings
            .validate()
            .map_err(|e| ReportsError::config_with_source("Invalid settings", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(Settings::default().validate().is_ok());
        assert!(SettingsValidator::validate(&Settings::default()).is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut settings = Settings::default();
        settings.cache.max_capacity = 0;
        let err = settings.validate().unwrap_err();
        assert!(matches!(
            err,
            ReportsError::Validation { field: Some(ref f), .. } if f == "cache.max_capacity"
        ));
    }

    #[test]
    fn test_tti_longer_than_ttl_rejected() {
        let mut settings = Settings::default();
        settings.cache.ttl_seconds = 60;
        settings.cache.tti_seconds = Some(120);
        assert!(settings.validate().is_err());

        settings.cache.tti_seconds = Some(30);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_each_check_names_its_field() {
        let field_of = |settings: &Settings| match settings.validate() {
            Err(ReportsError::Validation { field, .. }) => field,
            other => panic!("expected a validation error, got {other:?}"),
        };

        let mut settings = Settings::default();
        settings.cache.ttl_seconds = 0;
        assert_eq!(field_of(&settings).as_deref(), Some("cache.ttl_seconds"));

        let mut settings = Settings::default();
        settings.cache.tti_seconds = Some(0);
        assert_eq!(field_of(&settings).as_deref(), Some("cache.tti_seconds"));

        let mut settings = Settings::default();
        settings.reports.progress_months = 0;
        assert_eq!(
            field_of(&settings).as_deref(),
            Some("reports.progress_months")
        );
    }

    #[test]
    fn test_progress_window_bounds() {
        let mut settings = Settings::default();
        settings.reports.progress_months = 0;
        assert!(settings.validate().is_err());

        settings.reports.progress_months = MAX_PROGRESS_MONTHS + 1;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validator_wraps_as_config_error() {
        let mut settings = Settings::default();
        settings.cache.ttl_seconds = 0;
        let err = SettingsValidator::validate(&settings).unwrap_err();
        assert!(err.is_config_error());
    }
}
