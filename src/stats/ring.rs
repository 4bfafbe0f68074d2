//! Seven-day outdoor temperature extremes.
//!
//! ```text
//!  slot:   0        1          2        …      6
//!        today   yesterday  2 days ago  …  6 days ago
//!        (live)  └──────────── frozen ─────────────┘
//! ```
//!
//! Day rollover shifts every slot one place older, drops slot 6 and opens
//! a fresh slot 0 seeded with sentinels.  Fixed array, rotated in place.

use serde::{Deserialize, Serialize};

use crate::units;

/// Total slots: today plus six frozen days.
pub const DAYS: usize = 7;
/// Frozen days that are persisted across restarts.
pub const HISTORY_DAYS: usize = DAYS - 1;

/// Max seed that any real temperature beats.
pub const MAX_SENTINEL: f32 = -99.0;
/// Min seed that any real temperature undercuts.
pub const MIN_SENTINEL: f32 = 99.0;

/// Max/min pair for one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub max: f32,
    pub min: f32,
}

impl DayRecord {
    /// A record that the next real sample always replaces.
    pub const fn sentinel() -> Self {
        Self {
            max: MAX_SENTINEL,
            min: MIN_SENTINEL,
        }
    }

    /// Chart-friendly placeholder for days with no persisted data.
    pub const fn placeholder() -> Self {
        Self { max: 1.0, min: -1.0 }
    }

    /// Widen the record to include `value`.
    pub fn absorb(&mut self, value: f32) {
        if value > self.max {
            self.max = value;
        }
        if value < self.min {
            self.min = value;
        }
    }

    /// Whether at least one real sample has landed in this record.
    pub fn has_samples(&self) -> bool {
        self.max != MAX_SENTINEL && self.min != MIN_SENTINEL
    }

    /// The same record in °F.
    pub fn to_imperial(self) -> Self {
        Self {
            max: units::to_imperial_temp(self.max),
            min: units::to_imperial_temp(self.min),
        }
    }
}

/// Today's live record plus six frozen days.
#[derive(Debug, Clone, PartialEq)]
pub struct DayRing {
    slots: [DayRecord; DAYS],
}

impl Default for DayRing {
    fn default() -> Self {
        Self::new()
    }
}

impl DayRing {
    pub fn new() -> Self {
        let mut slots = [DayRecord::placeholder(); DAYS];
        slots[0] = DayRecord::sentinel();
        Self { slots }
    }

    /// Today's (still updating) record.
    pub fn today(&self) -> DayRecord {
        self.slots[0]
    }

    /// Record `days_ago` days back (0 = today).
    pub fn get(&self, days_ago: usize) -> Option<DayRecord> {
        self.slots.get(days_ago).copied()
    }

    pub fn slots(&self) -> &[DayRecord; DAYS] {
        &self.slots
    }

    /// Frozen days, most recent first (slot 1..=6).
    pub fn history(&self) -> [DayRecord; HISTORY_DAYS] {
        let mut out = [DayRecord::placeholder(); HISTORY_DAYS];
        out.copy_from_slice(&self.slots[1..]);
        out
    }

    /// Replace the frozen days, most recent first.  Today is untouched.
    pub fn seed_history(&mut self, history: &[DayRecord; HISTORY_DAYS]) {
        self.slots[1..].copy_from_slice(history);
    }

    /// Fold an outdoor temperature into today's record.
    pub fn record(&mut self, celsius: f32) {
        self.slots[0].absorb(celsius);
    }

    /// Freeze today and open a fresh day.
    pub fn rotate(&mut self) {
        self.slots.rotate_right(1);
        self.slots[0] = DayRecord::sentinel();
    }

    /// The whole ring converted to °F; never stored.
    pub fn to_imperial(&self) -> [DayRecord; DAYS] {
        self.slots.map(DayRecord::to_imperial)
    }
}
