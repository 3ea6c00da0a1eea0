//! Error types and utilities for the report engine

use thiserror::Error;

/// Result type alias for report operations
pub type Result<T> = std::result::Result<T, ReportsError>;

/// Boxed error source carried by the structured variants
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for report operations
#[derive(Error, Debug)]
pub enum ReportsError {
    /// Configuration errors, raised while building an engine or loading settings
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Caller errors such as an unsupported grouping dimension
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        message: String,
        argument: Option<String>,
    },

    /// Validation errors for malformed primitive input
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Failures raised by counters, stores or the rate schema
    #[error("{collaborator} failed: {message}")]
    Collaborator {
        collaborator: String,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Shared cache failures
    #[error("Cache error: {message}")]
    Cache {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML settings parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML settings parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic error with custom message
    #[error("{message}")]
    Generic {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl ReportsError {
    /// Create a new generic error with a custom message
    pub fn new(msg: impl Into<String>) -> Self {
        Self::Generic {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new generic error with a custom message and source
    pub fn with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Generic {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new caller error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: msg.into(),
            argument: None,
        }
    }

    /// Create a new caller error naming the offending argument
    pub fn invalid_argument_named(msg: impl Into<String>, argument: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: msg.into(),
            argument: Some(argument.into()),
        }
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a new validation error with field name
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new collaborator error
    pub fn collaborator(collaborator: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Collaborator {
            collaborator: collaborator.into(),
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new collaborator error with source
    pub fn collaborator_with_source(
        collaborator: impl Into<String>,
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Collaborator {
            collaborator: collaborator.into(),
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new cache error
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new cache error with source
    pub fn cache_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Cache {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether this error was caused by the caller rather than a collaborator
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. } | Self::Validation { .. })
    }

    /// Whether this error was raised while configuring an engine
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config { .. })
    }
}

impl From<String> for ReportsError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ReportsError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
