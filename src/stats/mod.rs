//! Rolling statistics: daily extremes, 7-day outdoor history, pressure
//! trend, and the calendar bookkeeping that drives day/hour rollover.
//!
//! Every update is a single-field overwrite, so an interrupted tick can
//! lose at most that tick's sample and never leaves a half-rotated ring.

pub mod ring;
pub mod trend;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use log::info;

pub use ring::{DayRecord, DayRing, DAYS, HISTORY_DAYS};
pub use trend::{PressureTrend, Trend};

/// Pressure day-max seed (hPa) that any real reading beats.
pub const PRESSURE_MAX_SENTINEL: u16 = 0;
/// Pressure day-min seed (hPa) that any real reading undercuts.
pub const PRESSURE_MIN_SENTINEL: u16 = 9999;

/// Today's pressure extremes in whole hPa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressureRange {
    pub max: u16,
    pub min: u16,
}

impl PressureRange {
    pub const fn sentinel() -> Self {
        Self {
            max: PRESSURE_MAX_SENTINEL,
            min: PRESSURE_MIN_SENTINEL,
        }
    }

    fn absorb(&mut self, hpa: u16) {
        self.max = self.max.max(hpa);
        self.min = self.min.min(hpa);
    }
}

/// Calendar hour key: a date plus hour-of-day.
type HourMark = (NaiveDate, u32);

fn hour_mark(t: NaiveDateTime) -> HourMark {
    (t.date(), t.hour())
}

/// All running extremes and averages the dashboard shows.
#[derive(Debug, Clone)]
pub struct RollingStats {
    outdoor: DayRing,
    indoor: DayRecord,
    pressure: PressureRange,
    trend: PressureTrend,
    day_mark: NaiveDate,
    hour_mark: HourMark,
}

impl RollingStats {
    /// Fresh statistics; `now` becomes the current day and hour.
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            outdoor: DayRing::new(),
            indoor: DayRecord::sentinel(),
            pressure: PressureRange::sentinel(),
            trend: PressureTrend::new(),
            day_mark: now.date(),
            hour_mark: hour_mark(now),
        }
    }

    // ── Sample intake ─────────────────────────────────────────

    pub fn record_outdoor_temp(&mut self, celsius: f32) {
        self.outdoor.record(celsius);
    }

    pub fn record_indoor_temp(&mut self, celsius: f32) {
        self.indoor.absorb(celsius);
    }

    pub fn record_pressure(&mut self, hpa: u16) {
        self.pressure.absorb(hpa);
        self.trend.push(f32::from(hpa));
    }

    // ── Rollover ──────────────────────────────────────────────

    /// Freeze the pressure baseline if the calendar hour changed.
    /// Returns `true` if a rollover happened.
    pub fn roll_hour_if_due(&mut self, now: NaiveDateTime) -> bool {
        let mark = hour_mark(now);
        if mark == self.hour_mark {
            return false;
        }
        self.hour_mark = mark;
        self.trend.roll_hour();
        true
    }

    /// Rotate the history ring and reset daily extremes if the calendar
    /// day changed.  Returns `true` if a rollover happened; at most once
    /// per day however often it is called.
    pub fn roll_day_if_due(&mut self, now: NaiveDateTime) -> bool {
        let today = now.date();
        if today == self.day_mark {
            return false;
        }
        info!(
            "Day rollover {} -> {} (outdoor max={:.1} min={:.1})",
            self.day_mark,
            today,
            self.outdoor.today().max,
            self.outdoor.today().min
        );
        self.day_mark = today;
        self.outdoor.rotate();
        self.indoor = DayRecord::sentinel();
        self.pressure = PressureRange::sentinel();
        true
    }

    /// Adopt `now` as the current day and hour without rotating anything.
    /// The marks set from an unset clock are meaningless once it is set.
    pub fn reanchor(&mut self, now: NaiveDateTime) {
        self.day_mark = now.date();
        self.hour_mark = hour_mark(now);
    }

    // ── History persistence ───────────────────────────────────

    pub fn seed_history(&mut self, history: &[DayRecord; HISTORY_DAYS]) {
        self.outdoor.seed_history(history);
    }

    pub fn history(&self) -> [DayRecord; HISTORY_DAYS] {
        self.outdoor.history()
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn outdoor(&self) -> &DayRing {
        &self.outdoor
    }

    pub fn indoor_range(&self) -> DayRecord {
        self.indoor
    }

    pub fn pressure_range(&self) -> PressureRange {
        self.pressure
    }

    pub fn pressure_trend(&self) -> &PressureTrend {
        &self.trend
    }

    pub fn trend(&self) -> Trend {
        self.trend.trend()
    }
}
