//! Unified error type for the station firmware.
//!
//! Each port boundary has its own typed error (see [`crate::app::ports`]).
//! Fallible lifecycle operations funnel them into this single `Error` so
//! the binary edge can report them uniformly.  All variants are `Copy`.

use core::fmt;

use crate::app::ports::{ConfigError, HistoryError, RadioError, SensorError, UploadError};

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The transceiver boundary failed.
    Radio(RadioError),
    /// The indoor sensor could not be read.
    Sensor(SensorError),
    /// History could not be loaded or persisted.
    History(HistoryError),
    /// The cloud upload failed.
    Upload(UploadError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Radio(e) => write!(f, "radio: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::History(e) => write!(f, "history: {e}"),
            Self::Upload(e) => write!(f, "upload: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<RadioError> for Error {
    fn from(e: RadioError) -> Self {
        Self::Radio(e)
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

impl From<HistoryError> for Error {
    fn from(e: HistoryError) -> Self {
        Self::History(e)
    }
}

impl From<UploadError> for Error {
    fn from(e: UploadError) -> Self {
        Self::Upload(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience alias used throughout the firmware.
pub type Result<T> = core::result::Result<T, Error>;
