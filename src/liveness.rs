//! Radio link liveness.
//!
//! Every decoded frame stamps the link.  Idle cycles compare the silence
//! since the last stamp against a fixed timeout; past it the signal is
//! reported lost until the next frame arrives.

use chrono::{Duration, NaiveDateTime};
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Default silence allowed before the link is considered lost.
pub const DEFAULT_TIMEOUT_SECS: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalState {
    /// Frames are arriving.
    Present,
    /// No frame within the timeout.
    Lost,
}

/// Tracks the last successful receive and the derived signal state.
#[derive(Debug, Clone)]
pub struct LinkMonitor {
    last_receive: NaiveDateTime,
    timeout: Duration,
    signal: SignalState,
}

impl LinkMonitor {
    /// Start with the link unconfirmed; the silence clock starts at `now`.
    pub fn new(now: NaiveDateTime, timeout_secs: u32) -> Self {
        Self {
            last_receive: now,
            timeout: Duration::seconds(i64::from(timeout_secs)),
            signal: SignalState::Lost,
        }
    }

    /// Record a successful receive.  Returns the new state if it changed.
    pub fn stamp(&mut self, now: NaiveDateTime) -> Option<SignalState> {
        self.last_receive = now;
        self.set(SignalState::Present)
    }

    /// Re-evaluate after an idle cycle.  Returns the new state if it changed.
    pub fn check(&mut self, now: NaiveDateTime) -> Option<SignalState> {
        if self.silence(now) > self.timeout {
            self.set(SignalState::Lost)
        } else {
            None
        }
    }

    /// Restart the silence clock at `now` after the wall clock jumped.
    pub fn reanchor(&mut self, now: NaiveDateTime) {
        self.last_receive = now;
    }

    pub fn signal(&self) -> SignalState {
        self.signal
    }

    pub fn last_receive(&self) -> NaiveDateTime {
        self.last_receive
    }

    /// Time since the last successful receive (zero if the clock stepped back).
    pub fn silence(&self, now: NaiveDateTime) -> Duration {
        (now - self.last_receive).max(Duration::zero())
    }

    fn set(&mut self, next: SignalState) -> Option<SignalState> {
        if next == self.signal {
            return None;
        }
        match next {
            SignalState::Present => info!("Link: signal present"),
            SignalState::Lost => warn!(
                "Link: signal lost (no frame for {}s)",
                self.timeout.num_seconds()
            ),
        }
        self.signal = next;
        Some(next)
    }
}
