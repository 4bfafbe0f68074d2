//! Loop pacing and rate limiting.
//!
//! The station core is driven by an explicit loop, not a UI event pump:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  main loop                                               │
//! │                                                          │
//! │   now = clock.now()                                      │
//! │   AppService.tick(clock, ...) ◀── one FSM cycle          │
//! │   sleep(pacer.pace(work_took))  ◀── TickPacer            │
//! │                                                          │
//! │   inside the tick:                                       │
//! │     Throttle.offer(now)   ◀── at most once per interval  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Both types are pure and clock-agnostic: callers pass the time in.

use core::time::Duration;

use chrono::{NaiveDateTime, TimeDelta};
use log::debug;

// ═══════════════════════════════════════════════════════════════
//  Throttle
// ═══════════════════════════════════════════════════════════════

/// Lets an action through at most once per interval.
///
/// The first offer always passes.  Later offers pass only once strictly
/// more than `interval` has elapsed since the last accepted one.
/// Rejected offers are not queued.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: TimeDelta,
    last: Option<NaiveDateTime>,
}

impl Throttle {
    pub fn new(interval_secs: u32) -> Self {
        Self {
            interval: TimeDelta::seconds(i64::from(interval_secs)),
            last: None,
        }
    }

    /// Whether an offer at `now` would be accepted.
    pub fn ready(&self, now: NaiveDateTime) -> bool {
        match self.last {
            None => true,
            Some(last) => now - last > self.interval,
        }
    }

    /// Accept and stamp `now` if ready.
    pub fn offer(&mut self, now: NaiveDateTime) -> bool {
        if !self.ready(now) {
            return false;
        }
        self.last = Some(now);
        true
    }

    /// Time of the last accepted offer.
    pub fn last(&self) -> Option<NaiveDateTime> {
        self.last
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tick pacer
// ═══════════════════════════════════════════════════════════════

/// Fixed-period loop pacing.
///
/// Given how long a tick's work took, returns how long to sleep so the
/// loop period stays constant.  An overrun yields a zero sleep and is
/// counted.
#[derive(Debug, Clone)]
pub struct TickPacer {
    period: Duration,
    overruns: u64,
}

impl TickPacer {
    pub fn new(period_ms: u32) -> Self {
        Self {
            period: Duration::from_millis(u64::from(period_ms)),
            overruns: 0,
        }
    }

    pub fn pace(&mut self, work_took: Duration) -> Duration {
        if work_took >= self.period {
            self.overruns += 1;
            debug!(
                "Tick overran: {:?} >= {:?} ({} total)",
                work_took, self.period, self.overruns
            );
            return Duration::ZERO;
        }
        self.period - work_took
    }

    /// Ticks whose work exceeded the period.
    pub fn overruns(&self) -> u64 {
        self.overruns
    }
}
