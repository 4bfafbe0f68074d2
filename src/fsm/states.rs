//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no dynamic
//! dispatch, no heap.
//!
//! ```text
//!                 ┌──[frame waiting]──▶ PROCESS_FRAME ──┐
//!                 │                                     │
//!  WAITING_FOR_FRAME ◀──────────────────────────────────┤
//!                 │                                     │
//!                 └──[no frame]──────▶ IDLE_HOUSEKEEPING┘
//! ```
//!
//! The branch states do their work on entry and return home on the next
//! tick.  No state touches a port: effects are queued in the outbox.

use log::{debug, info, warn};

use super::context::FsmContext;
use super::{StateDescriptor, StateId};
use crate::app::events::AppEvent;
use crate::radio::Frame;
use crate::radio::codec::{self, encode_keep_alive};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: WaitingForFrame
        StateDescriptor {
            id: StateId::WaitingForFrame,
            name: "WaitingForFrame",
            on_enter: None,
            on_exit: None,
            on_update: waiting_update,
        },
        // Index 1: ProcessFrame
        StateDescriptor {
            id: StateId::ProcessFrame,
            name: "ProcessFrame",
            on_enter: Some(process_enter),
            on_exit: None,
            on_update: return_home,
        },
        // Index 2: IdleHousekeeping
        StateDescriptor {
            id: StateId::IdleHousekeeping,
            name: "IdleHousekeeping",
            on_enter: Some(housekeeping_enter),
            on_exit: None,
            on_update: return_home,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  WAITING_FOR_FRAME
// ═══════════════════════════════════════════════════════════════════════════

fn waiting_update(ctx: &mut FsmContext) -> Option<StateId> {
    let now = ctx.now;
    ctx.station.set_clock(now);
    if ctx.inbound.is_some() {
        Some(StateId::ProcessFrame)
    } else {
        Some(StateId::IdleHousekeeping)
    }
}

fn return_home(_ctx: &mut FsmContext) -> Option<StateId> {
    Some(StateId::WaitingForFrame)
}

// ═══════════════════════════════════════════════════════════════════════════
//  PROCESS_FRAME: indoor sample, decode, stats, liveness, upload slot
// ═══════════════════════════════════════════════════════════════════════════

fn process_enter(ctx: &mut FsmContext) {
    let Some(inbound) = ctx.inbound.take() else {
        warn!("PROCESS: entered without a frame");
        return;
    };
    let now = ctx.now;

    ctx.station.absorb_indoor(inbound.indoor);

    let frame = codec::decode(&inbound.payload, now);
    let defaulted = match &frame {
        Frame::Weather(r) => r.defaulted_fields(),
        Frame::Status(s) => usize::from(!s.battery_voltage.is_parsed()),
    };
    if defaulted > 0 {
        debug!(
            "PROCESS: {:?} frame with {} defaulted field(s): {:?}",
            frame.kind(),
            defaulted,
            inbound.payload.as_slice()
        );
    }
    ctx.emit(AppEvent::FrameDecoded {
        kind: frame.kind(),
        defaulted,
    });

    if let Some(signal) = ctx.station.absorb_frame(&frame, now) {
        ctx.emit(AppEvent::SignalChanged(signal));
    }

    if let Frame::Weather(reading) = frame {
        if ctx.station.offer_upload(now) {
            ctx.outbox.upload = Some(reading);
        } else {
            debug!("PROCESS: upload throttled, sample dropped");
        }
    }

    ctx.outbox.render = true;
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE_HOUSEKEEPING: rollover, liveness timeout, keep-alive
// ═══════════════════════════════════════════════════════════════════════════

fn housekeeping_enter(ctx: &mut FsmContext) {
    let now = ctx.now;
    // The hour's trend, read before the baseline is frozen.
    let trend = ctx.station.stats().trend();
    let hk = ctx.station.housekeeping(now, ctx.clock_synced);

    if hk.day_rolled {
        info!("IDLE: new day {}, persisting history", now.date());
        ctx.outbox.persist = Some(ctx.station.stats().history());
        ctx.outbox.refresh_chart = true;
        ctx.outbox.render = true;
        ctx.emit(AppEvent::DayRolledOver { date: now.date() });
    }
    if hk.hour_rolled {
        ctx.emit(AppEvent::HourRolledOver { trend });
    }
    if let Some(signal) = hk.signal {
        ctx.outbox.render = true;
        ctx.emit(AppEvent::SignalChanged(signal));
    }

    ctx.outbox.keep_alive = Some(encode_keep_alive(ctx.epoch_secs));
}
