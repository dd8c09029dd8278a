use thiserror::Error;

/// Error types for the symptom advisor.
///
/// Loading errors (`Io`, `Csv`, `SchemaError`) are fatal at startup: without a dataset
/// there is nothing to rank against. Everything that comes back from an LLM or an image
/// classifier is a per-request failure and is turned into a scripted reply by the
/// conversation layer.
///
/// # Examples
///
/// ```
/// use symptom_advisor::{AdvisorError, Result};
///
/// fn require_threshold(threshold: f64) -> Result<f64> {
///     if !(0.0..=100.0).contains(&threshold) {
///         return Err(AdvisorError::ConfigError(format!(
///             "match threshold must be within 0-100, got {}",
///             threshold
///         )));
///     }
///     Ok(threshold)
/// }
///
/// match require_threshold(120.0) {
///     Err(AdvisorError::ConfigError(msg)) => println!("bad config: {}", msg),
///     other => println!("unexpected: {:?}", other),
/// }
/// ```
#[derive(Error, Debug)]
pub enum AdvisorError {
    /// Dataset file missing or unreadable
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV content
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Dataset header does not have the shape we need (no label column, no symptoms)
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error interacting with the LLM API
    #[error("API error: {0}")]
    ApiError(String),

    /// LLM output did not parse or failed domain validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error serializing or deserializing data
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Operation timed out
    #[error("Timeout error")]
    Timeout,

    /// Skin image classifier failed or returned an unusable result
    #[error("Classifier error: {0}")]
    ClassifierError(String),

    /// HTTP client error (from reqwest)
    #[cfg(feature = "openai")]
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing error (from serde_json)
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl AdvisorError {
    /// Whether this error came from the shape of an LLM answer rather than from
    /// the transport or the service behind it.
    pub fn is_schema_failure(&self) -> bool {
        matches!(self, Self::ValidationError(_) | Self::JsonError(_))
    }
}

// Wrapped foreign errors never compare equal: io, csv, reqwest and serde_json
// errors don't implement PartialEq.
impl PartialEq for AdvisorError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::SchemaError(a), Self::SchemaError(b)) => a == b,
            (Self::ConfigError(a), Self::ConfigError(b)) => a == b,
            (Self::ApiError(a), Self::ApiError(b)) => a == b,
            (Self::ValidationError(a), Self::ValidationError(b)) => a == b,
            (Self::SerializationError(a), Self::SerializationError(b)) => a == b,
            (Self::ClassifierError(a), Self::ClassifierError(b)) => a == b,
            (Self::Timeout, Self::Timeout) => true,
            _ => false,
        }
    }
}

/// A specialized Result type for symptom advisor operations.
pub type Result<T> = std::result::Result<T, AdvisorError>;
