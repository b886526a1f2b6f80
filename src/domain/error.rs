use thiserror::Error;

/// Serialmon unified error type.
///
/// Only errors surfaced synchronously to the caller live here. Runtime I/O
/// failures (read/write/close) travel as `Error` events on the session event
/// channel instead, so the display surface can log them in-line.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Serial port unavailable: {message}")]
    PortUnavailable { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Output error: {0}")]
    Output(String),
}

pub type MonitorResult<T> = Result<T, MonitorError>;

impl MonitorError {
    /// Convenience constructor for `InvalidConfig`.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MonitorError::invalid_config("no port selected");
        assert_eq!(err.to_string(), "Invalid configuration: no port selected");

        let err = MonitorError::PortUnavailable {
            message: "device busy".to_string(),
        };
        assert_eq!(err.to_string(), "Serial port unavailable: device busy");
    }
}
