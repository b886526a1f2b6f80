use crate::domain::error::{MonitorError, MonitorResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Baud rates the terminal offers. Matches the rates exposed in the UI.
pub const SUPPORTED_BAUD_RATES: [u32; 4] = [9600, 19200, 38400, 115200];

/// Fixed per-read timeout for the serial handle. Not user-configurable; the
/// reader loop's cancellation latency bound depends on it.
pub const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Parameters for one connection attempt. Immutable once an open starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Serial device path, e.g. `/dev/ttyUSB0`
    pub port: String,
    /// Baud rate, one of [`SUPPORTED_BAUD_RATES`]
    pub baud_rate: u32,
    /// Per-read timeout
    #[serde(default = "default_read_timeout")]
    pub read_timeout: Duration,
}

fn default_read_timeout() -> Duration {
    READ_TIMEOUT
}

impl ConnectionConfig {
    pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port: port.into(),
            baud_rate,
            read_timeout: READ_TIMEOUT,
        }
    }

    /// Check the open() preconditions: non-empty port, supported baud rate.
    pub fn validate(&self) -> MonitorResult<()> {
        if self.port.is_empty() {
            return Err(MonitorError::invalid_config(
                "no serial port selected",
            ));
        }
        if !SUPPORTED_BAUD_RATES.contains(&self.baud_rate) {
            return Err(MonitorError::invalid_config(format!(
                "unsupported baud rate: {} (supported: {:?})",
                self.baud_rate, SUPPORTED_BAUD_RATES
            )));
        }
        Ok(())
    }
}
