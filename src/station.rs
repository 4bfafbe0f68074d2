//! The owning aggregate for everything the station knows.
//!
//! [`StationState`] is created once at startup, seeded from persisted
//! history, and then mutated only by the state machine handlers.  The
//! display and upload adapters receive it by shared reference.

use chrono::NaiveDateTime;

use crate::config::StationConfig;
use crate::liveness::{LinkMonitor, SignalState};
use crate::radio::{Frame, Reading, StatusReading};
use crate::scheduler::Throttle;
use crate::sensors::IndoorSample;
use crate::stats::{DayRecord, HISTORY_DAYS, RollingStats};
use crate::units::UnitSystem;

/// What an idle housekeeping pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Housekeeping {
    pub hour_rolled: bool,
    pub day_rolled: bool,
    pub signal: Option<SignalState>,
}

#[derive(Debug, Clone)]
pub struct StationState {
    reading: Reading,
    status: StatusReading,
    indoor: IndoorSample,
    stats: RollingStats,
    link: LinkMonitor,
    upload: Throttle,
    units: UnitSystem,
    clock: NaiveDateTime,
}

impl StationState {
    pub fn new(config: &StationConfig, now: NaiveDateTime) -> Self {
        Self {
            reading: Reading::default(),
            status: StatusReading::default(),
            indoor: IndoorSample::default(),
            stats: RollingStats::new(now),
            link: LinkMonitor::new(now, config.liveness_timeout_secs),
            upload: Throttle::new(config.upload_interval_secs),
            units: config.units,
            clock: now,
        }
    }

    // ── Mutation (state machine handlers only) ────────────────

    pub(crate) fn set_clock(&mut self, now: NaiveDateTime) {
        self.clock = now;
    }

    /// Store this cycle's indoor sample and fold it into the day range.
    pub(crate) fn absorb_indoor(&mut self, sample: IndoorSample) {
        self.indoor = sample;
        self.stats.record_indoor_temp(sample.temp_c);
    }

    /// Route a decoded frame into the aggregate and stamp the link.
    ///
    /// Extremes only move on parsed values; a defaulted field still
    /// overwrites the current reading so the display shows the sentinel.
    pub(crate) fn absorb_frame(&mut self, frame: &Frame, now: NaiveDateTime) -> Option<SignalState> {
        match frame {
            Frame::Weather(reading) => {
                self.reading = *reading;
                if let Some(c) = reading.outdoor_temp_c.parsed() {
                    self.stats.record_outdoor_temp(c);
                }
                if let Some(hpa) = reading.pressure_hpa.parsed() {
                    self.stats.record_pressure(hpa);
                }
            }
            Frame::Status(status) => self.status = *status,
        }
        self.link.stamp(now)
    }

    /// Day/hour rollover and liveness timeout, in that order.  Rollover
    /// waits until the wall clock has been set.
    pub(crate) fn housekeeping(&mut self, now: NaiveDateTime, clock_synced: bool) -> Housekeeping {
        let (day_rolled, hour_rolled) = if clock_synced {
            (self.stats.roll_day_if_due(now), self.stats.roll_hour_if_due(now))
        } else {
            (false, false)
        };
        Housekeeping {
            day_rolled,
            hour_rolled,
            signal: self.link.check(now),
        }
    }

    /// The wall clock was just set: move the calendar marks and the
    /// silence clock to `now` without rolling anything over.
    pub(crate) fn reanchor(&mut self, now: NaiveDateTime) {
        self.stats.reanchor(now);
        self.link.reanchor(now);
        self.clock = now;
    }

    /// Claim the upload slot for `now` if the interval has elapsed.
    pub(crate) fn offer_upload(&mut self, now: NaiveDateTime) -> bool {
        self.upload.offer(now)
    }

    /// Load the six frozen days; today's slot is untouched.
    pub(crate) fn seed_history(&mut self, history: &[DayRecord; HISTORY_DAYS]) {
        self.stats.seed_history(history);
    }

    pub(crate) fn set_units(&mut self, units: UnitSystem) {
        self.units = units;
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn reading(&self) -> &Reading {
        &self.reading
    }

    pub fn status(&self) -> &StatusReading {
        &self.status
    }

    pub fn indoor(&self) -> IndoorSample {
        self.indoor
    }

    pub fn stats(&self) -> &RollingStats {
        &self.stats
    }

    pub fn link(&self) -> &LinkMonitor {
        &self.link
    }

    pub fn signal(&self) -> SignalState {
        self.link.signal()
    }

    pub fn last_upload(&self) -> Option<NaiveDateTime> {
        self.upload.last()
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    /// Wall-clock time of the most recent cycle.
    pub fn clock(&self) -> NaiveDateTime {
        self.clock
    }
}
