//! Error types for schedule computation.

/// Result type for schedule operations
pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Error type for schedule operations.
///
/// Astronomical degeneracies (polar day/night), missing neighbour-day data and
/// observers outside the phenological region are not errors; they surface as
/// `None` values in the computed records.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Timezone error: {0}")]
    Timezone(String),

    #[error("Timestamp out of range: {0}")]
    TimestampOutOfRange(i64),

    #[error("Astronomy error: {0}")]
    Astronomy(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ScheduleError {
    fn from(e: serde_json::Error) -> Self {
        ScheduleError::Parse(e.to_string())
    }
}

impl From<toml::de::Error> for ScheduleError {
    fn from(e: toml::de::Error) -> Self {
        ScheduleError::Configuration(e.to_string())
    }
}
