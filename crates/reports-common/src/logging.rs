//! Structured logging setup shared by hosts embedding the report engine

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::debug;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::{ReportsError, Result};

/// Configuration for the logging system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "reports_engine=trace")
    pub level: String,
    /// Emit one JSON object per event
    pub json_format: bool,
    /// Optional file path for log output, stdout when absent
    pub file_path: Option<String>,
    /// Whether span open/close events are logged
    pub include_spans: bool,
    /// Whether to include target module information
    pub include_targets: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            file_path: None,
            include_spans: false,
            include_targets: true,
        }
    }
}

impl LoggingConfig {
    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new("info"))
    }

    fn span_events(&self) -> FmtSpan {
        if self.include_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// Initialize the tracing subscriber with the given configuration
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let registry = tracing_subscriber::registry().with(config.env_filter());
    let span_events = config.span_events();

    let file = match &config.file_path {
        Some(path) => Some(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?,
        ),
        None => None,
    };

    let result = if config.json_format {
        let layer = fmt::layer()
            .json()
            .with_span_events(span_events)
            .with_target(config.include_targets);
        match file {
            Some(file) => registry.with(layer.with_writer(Mutex::new(file))).try_init(),
            None => registry.with(layer).try_init(),
        }
    } else {
        let layer = fmt::layer()
            .with_span_events(span_events)
            .with_target(config.include_targets);
        match file {
            Some(file) => registry
                .with(layer.with_ansi(false).with_writer(Mutex::new(file)))
                .try_init(),
            None => registry.with(layer).try_init(),
        }
    };

    result.map_err(|e| ReportsError::config_with_source("Failed to install log subscriber", e))?;

    debug!(
        level = %config.level,
        json = config.json_format,
        file = config.file_path.as_deref().unwrap_or("stdout"),
        "Logging initialized"
    );
    Ok(())
}

/// Initialize logging with default configuration
pub fn init_default_logging() -> Result<()> {
    init_logging(LoggingConfig::default())
}

/// Initialize logging for development (debug level, spans included)
pub fn init_dev_logging() -> Result<()> {
    init_logging(LoggingConfig {
        level: "debug".to_string(),
        include_spans: true,
        ..LoggingConfig::default()
    })
}
