// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the recording client

use std::fmt;

/// Result type alias using SensorError
pub type SensorResult<T> = Result<T, SensorError>;

/// Errors surfaced by sensor construction, startup, and recording
#[derive(Debug, Clone)]
pub enum SensorError {
    /// A required capability is missing and fallback is disallowed.
    /// Fatal for the session, raised at construction/initialize time.
    Configuration(String),
    /// The depth camera or webcam could not be opened and no further
    /// fallback is permitted. Raised at start() time.
    DeviceOpen(String),
    /// The output writer could not be created (bad path, missing
    /// encoder element). Raised at start() time.
    SinkOpen(String),
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            SensorError::DeviceOpen(msg) => write!(f, "Failed to open device: {}", msg),
            SensorError::SinkOpen(msg) => write!(f, "Video sink error: {}", msg),
        }
    }
}

impl std::error::Error for SensorError {}

impl From<std::io::Error> for SensorError {
    fn from(err: std::io::Error) -> Self {
        SensorError::Configuration(err.to_string())
    }
}
