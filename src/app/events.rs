//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, count them, etc.

use chrono::{NaiveDate, NaiveDateTime};

use super::ports::{HistoryError, RadioError, UploadError};
use crate::liveness::SignalState;
use crate::radio::FrameKind;
use crate::stats::Trend;
use crate::units::UnitSystem;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started; carries the current calendar day.
    Started(NaiveDate),

    /// The wall clock was set after boot; carries the new local time.
    ClockSynced(NaiveDateTime),

    /// A radio frame was decoded.  `defaulted` counts fields that fell
    /// back to their sentinel.
    FrameDecoded { kind: FrameKind, defaulted: usize },

    /// The link switched between present and lost.
    SignalChanged(SignalState),

    /// The pressure baseline was frozen for a new hour.
    HourRolledOver { trend: Trend },

    /// The history ring rotated; `date` is the new current day.
    DayRolledOver { date: NaiveDate },

    UploadSent,
    UploadFailed(UploadError),

    HistoryPersisted,
    HistoryPersistFailed(HistoryError),

    KeepAliveFailed(RadioError),

    /// The dashboard switched unit systems.
    UnitsChanged(UnitSystem),
}
