//! Application service, the hexagonal core.
//!
//! [`AppService`] owns the FSM and the station aggregate.  It exposes a
//! clean, hardware-agnostic API.  All I/O flows through port traits
//! injected at call sites, making the entire service testable with mock
//! adapters.
//!
//! ```text
//!     RadioPort ──▶ ┌──────────────────────────┐ ──▶ DisplayPort
//! IndoorSensorPort ▶│        AppService        │ ──▶ UploadPort
//!                   │  FSM · StationState      │ ──▶ HistoryStore
//!                   └──────────────────────────┘ ──▶ EventSink
//! ```
//!
//! Every port call is best-effort: failures are logged and reported as
//! events, and the tick always completes.

use log::{debug, info, warn};

use crate::config::StationConfig;
use crate::error::Result;
use crate::fsm::context::{FsmContext, Inbound, Outbox};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::sensors::indoor;
use crate::station::StationState;
use crate::units::UnitSystem;

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{
    ClockPort, DisplayPort, EventSink, HistoryError, HistoryStore, IndoorSensorPort, RadioPort,
    UploadPort,
};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    fsm: Fsm,
    ctx: FsmContext,
    config: StationConfig,
    tick_count: u64,
}

impl AppService {
    /// Construct the service; the clock's current time becomes the current
    /// day and hour.
    ///
    /// Does **not** start the FSM; call [`seed_history`](Self::seed_history)
    /// and then [`start`](Self::start).
    pub fn new(config: StationConfig, clock: &impl ClockPort) -> Self {
        let mut ctx = FsmContext::new(&config, clock.now());
        ctx.epoch_secs = clock.epoch_secs();
        ctx.clock_synced = clock.is_synced();
        if !ctx.clock_synced {
            warn!("Clock not set; day/hour rollover deferred until it is");
        }
        let fsm = Fsm::new(build_state_table(), StateId::WaitingForFrame);
        Self {
            fsm,
            ctx,
            config,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Load the six frozen days from the store.
    ///
    /// A first boot (nothing stored) is not an error.  Any other failure
    /// keeps the placeholder history and is returned for the caller to log.
    pub fn seed_history(&mut self, store: &impl HistoryStore) -> Result<()> {
        match store.load_daily_history() {
            Ok(history) => {
                self.ctx.station.seed_history(&history);
                info!("History seeded with {} days", history.len());
                Ok(())
            }
            Err(HistoryError::NotFound) => {
                info!("No stored history, starting with placeholders");
                Ok(())
            }
            Err(e) => {
                warn!("History load failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Start the FSM and draw the initial screens.
    pub fn start(&mut self, display: &mut impl DisplayPort, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        display.render_history_chart(&self.ctx.station);
        display.render(&self.ctx.station);
        sink.emit(&AppEvent::Started(self.ctx.now.date()));
        info!(
            "AppService started in {:?} ({:?} units)",
            self.fsm.current_state(),
            self.ctx.station.units()
        );
    }

    /// Persist the frozen days before the process exits.
    pub fn shutdown(
        &mut self,
        store: &mut impl HistoryStore,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        info!("AppService shutting down after {} ticks", self.tick_count);
        self.persist_history(store, sink)?;
        Ok(())
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one station cycle: read clock → poll radio → FSM → apply side
    /// effects.
    ///
    /// The `hw` parameter satisfies **both** [`RadioPort`] and
    /// [`IndoorSensorPort`], which avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn tick(
        &mut self,
        clock: &impl ClockPort,
        hw: &mut (impl RadioPort + IndoorSensorPort),
        display: &mut impl DisplayPort,
        uploader: &mut impl UploadPort,
        store: &mut impl HistoryStore,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;
        let now = clock.now();
        self.ctx.now = now;
        self.ctx.epoch_secs = clock.epoch_secs();

        // 0. First cycle on a set clock: the old marks are meaningless
        if !self.ctx.clock_synced && clock.is_synced() {
            info!("Clock set to {}, re-anchoring day and hour", now);
            self.ctx.station.reanchor(now);
            self.ctx.clock_synced = true;
            sink.emit(&AppEvent::ClockSynced(now));
        }

        // 1. Pull a frame (and the indoor sample that goes with it)
        if hw.frame_available() {
            match hw.read_frame() {
                Ok(payload) => {
                    let sample = indoor::read_filtered(hw, &self.config.indoor);
                    self.ctx.inbound = Some(Inbound {
                        payload,
                        indoor: sample,
                    });
                }
                Err(e) => warn!("Radio read failed: {}", e),
            }
        }

        // 2. One FSM cycle (pure state logic)
        self.fsm.run_cycle(&mut self.ctx);

        // 3. Apply queued effects through the ports
        let outbox = self.ctx.take_outbox();
        self.apply_outbox(outbox, hw, display, uploader, store, sink);
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (touch input, console, shutdown hook).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        display: &mut impl DisplayPort,
        store: &mut impl HistoryStore,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::ToggleUnits => {
                let units = self.ctx.station.units().toggled();
                self.switch_units(units, display, sink);
            }
            AppCommand::SetUnits(units) => {
                if units != self.ctx.station.units() {
                    self.switch_units(units, display, sink);
                }
            }
            AppCommand::FlushHistory => {
                // Failure is already logged and reported as an event.
                let _ = self.persist_history(store, sink);
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn station(&self) -> &StationState {
        &self.ctx.station
    }

    pub fn units(&self) -> UnitSystem {
        self.ctx.station.units()
    }

    /// Total station cycles executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn switch_units(
        &mut self,
        units: UnitSystem,
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) {
        self.ctx.station.set_units(units);
        display.render(&self.ctx.station);
        display.render_history_chart(&self.ctx.station);
        sink.emit(&AppEvent::UnitsChanged(units));
        info!("Display units set to {:?}", units);
    }

    fn persist_history(
        &self,
        store: &mut impl HistoryStore,
        sink: &mut impl EventSink,
    ) -> core::result::Result<(), HistoryError> {
        let history = self.ctx.station.stats().history();
        match store.save_daily_history(&history) {
            Ok(()) => {
                sink.emit(&AppEvent::HistoryPersisted);
                Ok(())
            }
            Err(e) => {
                warn!("History save failed: {}", e);
                sink.emit(&AppEvent::HistoryPersistFailed(e));
                Err(e)
            }
        }
    }

    /// Translate queued FSM effects into port calls.
    fn apply_outbox(
        &self,
        outbox: Outbox,
        radio: &mut impl RadioPort,
        display: &mut impl DisplayPort,
        uploader: &mut impl UploadPort,
        store: &mut impl HistoryStore,
        sink: &mut impl EventSink,
    ) {
        for event in &outbox.events {
            sink.emit(event);
        }

        // ── Persistence ──────────────────────────────────────
        if let Some(history) = outbox.persist {
            match store.save_daily_history(&history) {
                Ok(()) => sink.emit(&AppEvent::HistoryPersisted),
                Err(e) => {
                    warn!("History save failed: {}", e);
                    sink.emit(&AppEvent::HistoryPersistFailed(e));
                }
            }
        }

        // ── Display ──────────────────────────────────────────
        if outbox.refresh_chart {
            display.render_history_chart(&self.ctx.station);
        }
        if outbox.render {
            display.render(&self.ctx.station);
        }

        // ── Upload ───────────────────────────────────────────
        if let Some(reading) = outbox.upload {
            if self.config.upload_enabled() {
                match uploader.publish(&reading) {
                    Ok(()) => sink.emit(&AppEvent::UploadSent),
                    Err(e) => {
                        warn!("Upload failed: {}", e);
                        sink.emit(&AppEvent::UploadFailed(e));
                    }
                }
            } else {
                debug!("Upload skipped: no API key configured");
            }
        }

        // ── Keep-alive ───────────────────────────────────────
        if let Some(ack) = outbox.keep_alive {
            if let Err(e) = radio.send_keep_alive(&ack) {
                debug!("Keep-alive not queued: {}", e);
                sink.emit(&AppEvent::KeepAliveFailed(e));
            }
        }
    }
}
