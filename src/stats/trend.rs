//! Hour-over-hour pressure trend.
//!
//! "This hour" is the mean of the two most recent samples, not a windowed
//! average.  On hour rollover it is frozen into "last hour"; the trend is
//! this-hour vs last-hour with a ±1 hPa deadband.

use serde::{Deserialize, Serialize};

/// Half-width of the steady band, hPa.
pub const DEADBAND_HPA: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Rising,
    Steady,
    Falling,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PressureTrend {
    previous: f32,
    this_hour: f32,
    last_hour: f32,
}

impl PressureTrend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in a new sample: this-hour = mean(previous, sample).
    pub fn push(&mut self, hpa: f32) {
        self.this_hour = (self.previous + hpa) / 2.0;
        self.previous = hpa;
    }

    /// Freeze the current average as the last-hour baseline.
    pub fn roll_hour(&mut self) {
        self.last_hour = self.this_hour;
    }

    pub fn this_hour(&self) -> f32 {
        self.this_hour
    }

    pub fn last_hour(&self) -> f32 {
        self.last_hour
    }

    pub fn trend(&self) -> Trend {
        if self.this_hour > self.last_hour + DEADBAND_HPA {
            Trend::Rising
        } else if self.this_hour < self.last_hour - DEADBAND_HPA {
            Trend::Falling
        } else {
            Trend::Steady
        }
    }
}
