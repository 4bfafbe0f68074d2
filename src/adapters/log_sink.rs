//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::liveness::SignalState;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink {
    frames: u64,
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogEventSink {
    pub fn new() -> Self {
        Self { frames: 0 }
    }

    /// Frames decoded since boot.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(day) => {
                info!("START | day={}", day);
            }
            AppEvent::ClockSynced(now) => {
                info!("CLOCK | set to {}", now);
            }
            AppEvent::FrameDecoded { kind, defaulted } => {
                self.frames += 1;
                info!(
                    "FRAME | #{} kind={:?} defaulted={}",
                    self.frames, kind, defaulted
                );
            }
            AppEvent::SignalChanged(SignalState::Present) => {
                info!("LINK  | signal present");
            }
            AppEvent::SignalChanged(SignalState::Lost) => {
                warn!("LINK  | signal lost");
            }
            AppEvent::HourRolledOver { trend } => {
                info!("ROLL  | hour, pressure trend={:?}", trend);
            }
            AppEvent::DayRolledOver { date } => {
                info!("ROLL  | day -> {}", date);
            }
            AppEvent::UploadSent => {
                info!("CLOUD | sample uploaded");
            }
            AppEvent::UploadFailed(e) => {
                warn!("CLOUD | upload failed: {}", e);
            }
            AppEvent::HistoryPersisted => {
                info!("STORE | history saved");
            }
            AppEvent::HistoryPersistFailed(e) => {
                warn!("STORE | history save failed: {}", e);
            }
            AppEvent::KeepAliveFailed(e) => {
                warn!("LINK  | keep-alive failed: {}", e);
            }
            AppEvent::UnitsChanged(units) => {
                info!("VIEW  | units={:?}", units);
            }
        }
    }
}
