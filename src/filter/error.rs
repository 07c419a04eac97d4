use thiserror::Error;

/// Errors that can occur when resolving a date range filter
#[derive(Debug, Error)]
pub enum DateRangeError {
    #[error("Failed to parse '{value}' with date format '{format}': {source}")]
    InvalidDate {
        value: String,
        format: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Unsupported token '{token}' in date format '{format}'")]
    UnsupportedFormatToken { token: String, format: String },

    #[error("Date format '{format}' writes spaces, which collide with the range separator")]
    SpaceInFormat { format: String },

    #[error("Unknown timezone: '{0}'")]
    UnknownTimezone(String),

    #[error("Local time {datetime} does not exist in timezone {timezone}")]
    NonexistentLocalTime { datetime: String, timezone: String },
}
