//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to.  It holds the station aggregate, the cycle's clock readings,
//! the inbound frame (if any), and an [`Outbox`] of side effects the
//! service applies through the ports after the cycle.  Think of it as the
//! "blackboard" in a blackboard architecture.

use chrono::NaiveDateTime;

use crate::app::events::AppEvent;
use crate::config::StationConfig;
use crate::radio::Reading;
use crate::radio::codec::KeepAlive;
use crate::radio::inbox::RawFrame;
use crate::sensors::IndoorSample;
use crate::station::StationState;
use crate::stats::{DayRecord, HISTORY_DAYS};

// ---------------------------------------------------------------------------
// Inbound data (written by the service before the cycle)
// ---------------------------------------------------------------------------

/// A frame pulled from the radio plus the indoor sample read with it.
#[derive(Debug, Clone)]
pub struct Inbound {
    pub payload: RawFrame,
    pub indoor: IndoorSample,
}

// ---------------------------------------------------------------------------
// Outbox (written by handlers; drained by the service)
// ---------------------------------------------------------------------------

/// Side effects requested during one cycle.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    /// Redraw the dashboard.
    pub render: bool,
    /// Redraw the history chart.
    pub refresh_chart: bool,
    /// Sample that won the upload slot.
    pub upload: Option<Reading>,
    /// Frozen days to persist.
    pub persist: Option<[DayRecord; HISTORY_DAYS]>,
    /// Acknowledgment for the radio.
    pub keep_alive: Option<KeepAlive>,
    pub events: Vec<AppEvent>,
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

pub struct FsmContext {
    // -- Timing --
    /// Local wall-clock time of the current cycle.
    pub now: NaiveDateTime,
    /// The same instant as Unix epoch seconds.
    pub epoch_secs: i64,
    /// Whether `now` comes from a set clock.  Rollover waits for it.
    pub clock_synced: bool,

    // -- Domain --
    pub station: StationState,

    // -- I/O --
    pub inbound: Option<Inbound>,
    pub outbox: Outbox,
}

impl FsmContext {
    pub fn new(config: &StationConfig, now: NaiveDateTime) -> Self {
        Self {
            now,
            epoch_secs: now.and_utc().timestamp(),
            clock_synced: true,
            station: StationState::new(config, now),
            inbound: None,
            outbox: Outbox::default(),
        }
    }

    /// Hand the accumulated side effects to the caller, leaving an empty outbox.
    pub fn take_outbox(&mut self) -> Outbox {
        core::mem::take(&mut self.outbox)
    }

    pub fn emit(&mut self, event: AppEvent) {
        self.outbox.events.push(event);
    }
}
