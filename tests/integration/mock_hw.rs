//! Mock adapters for integration tests.
//!
//! Every port the station drives is backed by a recorder so tests can
//! assert on the full call history without a radio, screen, or network.

use std::collections::VecDeque;

use chrono::NaiveDateTime;

use weatherstation::app::events::AppEvent;
use weatherstation::app::ports::{
    ClockPort, DisplayPort, EventSink, HistoryError, HistoryStore, IndoorSensorPort, RadioError,
    RadioPort, SensorError, UploadError, UploadPort,
};
use weatherstation::radio::Reading;
use weatherstation::radio::codec::KeepAlive;
use weatherstation::radio::inbox::RawFrame;
use weatherstation::station::StationState;
use weatherstation::stats::{DayRecord, HISTORY_DAYS};
use weatherstation::units::UnitSystem;

// ── MockClock ─────────────────────────────────────────────────

/// Hand-set wall clock.  `now` is local time, `utc_offset_secs` how far
/// local time runs ahead of UTC.
pub struct MockClock {
    pub now: NaiveDateTime,
    pub utc_offset_secs: i64,
    pub synced: bool,
}

impl MockClock {
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            now,
            utc_offset_secs: 0,
            synced: true,
        }
    }
}

impl ClockPort for MockClock {
    fn now(&self) -> NaiveDateTime {
        self.now
    }

    fn epoch_secs(&self) -> i64 {
        self.now.and_utc().timestamp() - self.utc_offset_secs
    }

    fn is_synced(&self) -> bool {
        self.synced
    }
}

// ── MockStation (radio + indoor sensor) ───────────────────────

pub struct MockStation {
    frames: VecDeque<RawFrame>,
    pub indoor: Result<(f32, f32), SensorError>,
    pub keep_alives: Vec<KeepAlive>,
    pub reject_acks: bool,
}

#[allow(dead_code)]
impl MockStation {
    pub fn new() -> Self {
        Self {
            frames: VecDeque::new(),
            indoor: Ok((45.0, 21.0)),
            keep_alives: Vec::new(),
            reject_acks: false,
        }
    }

    pub fn queue(&mut self, payload: &[u8]) {
        let mut frame = RawFrame::new();
        let n = payload.len().min(frame.capacity());
        // Capacity checked above.
        let _ = frame.extend_from_slice(&payload[..n]);
        self.frames.push_back(frame);
    }
}

impl Default for MockStation {
    fn default() -> Self {
        Self::new()
    }
}

impl RadioPort for MockStation {
    fn frame_available(&mut self) -> bool {
        !self.frames.is_empty()
    }

    fn read_frame(&mut self) -> Result<RawFrame, RadioError> {
        self.frames.pop_front().ok_or(RadioError::NoFrame)
    }

    fn send_keep_alive(&mut self, payload: &KeepAlive) -> Result<(), RadioError> {
        if self.reject_acks {
            return Err(RadioError::AckRejected);
        }
        self.keep_alives.push(payload.clone());
        Ok(())
    }
}

impl IndoorSensorPort for MockStation {
    fn read_humidity_temperature(&mut self) -> Result<(f32, f32), SensorError> {
        self.indoor
    }
}

// ── MockDisplay ───────────────────────────────────────────────

#[derive(Default)]
pub struct MockDisplay {
    pub renders: usize,
    pub charts: usize,
    pub last_units: Option<UnitSystem>,
}

impl DisplayPort for MockDisplay {
    fn render(&mut self, state: &StationState) {
        self.renders += 1;
        self.last_units = Some(state.units());
    }

    fn render_history_chart(&mut self, state: &StationState) {
        self.charts += 1;
        self.last_units = Some(state.units());
    }
}

// ── MockUploader ──────────────────────────────────────────────

#[derive(Default)]
pub struct MockUploader {
    pub published: Vec<Reading>,
    pub fail_with: Option<UploadError>,
}

impl UploadPort for MockUploader {
    fn publish(&mut self, reading: &Reading) -> Result<(), UploadError> {
        if let Some(e) = self.fail_with {
            return Err(e);
        }
        self.published.push(*reading);
        Ok(())
    }
}

// ── MockStore ─────────────────────────────────────────────────

#[derive(Default)]
pub struct MockStore {
    pub stored: Option<[DayRecord; HISTORY_DAYS]>,
    pub saves: usize,
    pub fail_saves: bool,
    pub load_error: Option<HistoryError>,
}

impl HistoryStore for MockStore {
    fn load_daily_history(&self) -> Result<[DayRecord; HISTORY_DAYS], HistoryError> {
        if let Some(e) = self.load_error {
            return Err(e);
        }
        self.stored.ok_or(HistoryError::NotFound)
    }

    fn save_daily_history(&mut self, history: &[DayRecord; HISTORY_DAYS]) -> Result<(), HistoryError> {
        self.saves += 1;
        if self.fail_saves {
            return Err(HistoryError::IoError);
        }
        self.stored = Some(*history);
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
