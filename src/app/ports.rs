//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (radio, indoor sensor, display, uploader, history
//! store) implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.
//!
//! Every collaborator is best-effort: a failing port is logged and the
//! tick carries on.  All port errors are typed.

use chrono::NaiveDateTime;

use crate::config::StationConfig;
use crate::radio::Reading;
use crate::radio::codec::KeepAlive;
use crate::radio::inbox::RawFrame;
use crate::station::StationState;
use crate::stats::{DayRecord, HISTORY_DAYS};

// ───────────────────────────────────────────────────────────────
// Radio port (driven adapter: transceiver ↔ domain)
// ───────────────────────────────────────────────────────────────

/// The only three operations the core needs from the transceiver.
pub trait RadioPort {
    /// Whether a payload is waiting.
    fn frame_available(&mut self) -> bool;

    /// Take the waiting payload.
    fn read_frame(&mut self) -> Result<RawFrame, RadioError>;

    /// Queue the keep-alive acknowledgment for the next inbound packet.
    fn send_keep_alive(&mut self, payload: &KeepAlive) -> Result<(), RadioError>;
}

// ───────────────────────────────────────────────────────────────
// Indoor sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

pub trait IndoorSensorPort {
    /// One raw `(humidity %, temperature °C)` read.  May fail transiently.
    fn read_humidity_temperature(&mut self) -> Result<(f32, f32), SensorError>;

    /// Wait between consecutive reads.  Default: no wait.
    fn settle(&mut self) {}
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → screen)
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget rendering.
pub trait DisplayPort {
    /// Redraw the live dashboard from a state snapshot.
    fn render(&mut self, state: &StationState);

    /// Redraw the 7-day outdoor history chart.
    fn render_history_chart(&mut self, state: &StationState);
}

// ───────────────────────────────────────────────────────────────
// Upload port (driven adapter: domain → cloud logger)
// ───────────────────────────────────────────────────────────────

pub trait UploadPort {
    /// Publish one sample.  No retry; the caller logs and moves on.
    fn publish(&mut self, reading: &Reading) -> Result<(), UploadError>;
}

// ───────────────────────────────────────────────────────────────
// History store port (driven adapter: domain ↔ persistent storage)
// ───────────────────────────────────────────────────────────────

/// Persistence for the six frozen days of outdoor extremes.
///
/// Entries are ordered most recent first.  Implementations must round-trip
/// `f32` values exactly.
pub trait HistoryStore {
    fn load_daily_history(&self) -> Result<[DayRecord; HISTORY_DAYS], HistoryError>;

    fn save_daily_history(&mut self, history: &[DayRecord; HISTORY_DAYS]) -> Result<(), HistoryError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists station configuration.
///
/// Implementations MUST validate before persisting; invalid ranges are
/// rejected with [`ConfigError::ValidationFailed`], not clamped.
pub trait ConfigPort {
    /// Returns [`StationConfig::default()`] if nothing is stored.
    fn load(&self) -> Result<StationConfig, ConfigError>;

    fn save(&self, config: &StationConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: wall clock → domain)
// ───────────────────────────────────────────────────────────────

/// Local wall-clock time.  Day and hour rollover follow this clock.
pub trait ClockPort {
    fn now(&self) -> NaiveDateTime;

    /// Seconds since the Unix epoch, independent of the local offset.
    fn epoch_secs(&self) -> i64;

    /// Whether the clock has been set from a trusted source (SNTP).
    fn is_synced(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioError {
    /// `read_frame` called with nothing waiting.
    NoFrame,
    /// The transceiver did not respond.
    Bus,
    /// The acknowledgment slot is occupied or unavailable.
    AckRejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// No response within the protocol window.
    Timeout,
    /// Response received but failed its checksum.
    Checksum,
    /// Any other read failure.
    ReadFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    /// Nothing persisted yet (first boot).
    NotFound,
    /// Stored blob failed to deserialize.
    Corrupted,
    /// Underlying storage failed.
    IoError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadError {
    /// Uploads are disabled (no API key).
    Disabled,
    /// Network unreachable or request could not be sent.
    Transport,
    /// The endpoint answered with a non-success status.
    Status(u16),
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed integrity / deserialization check.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for RadioError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoFrame => write!(f, "no frame waiting"),
            Self::Bus => write!(f, "transceiver bus error"),
            Self::AckRejected => write!(f, "ack payload rejected"),
        }
    }
}

impl core::fmt::Display for SensorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Timeout => write!(f, "sensor timeout"),
            Self::Checksum => write!(f, "checksum mismatch"),
            Self::ReadFailed => write!(f, "read failed"),
        }
    }
}

impl core::fmt::Display for HistoryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "no stored history"),
            Self::Corrupted => write!(f, "history corrupted"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for UploadError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Disabled => write!(f, "upload disabled"),
            Self::Transport => write!(f, "transport failure"),
            Self::Status(code) => write!(f, "HTTP status {}", code),
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
