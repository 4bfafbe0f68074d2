//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern ported to Rust:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  StateTable                                                     │
//! │  ┌──────────────────┬───────────┬──────────┬──────────────────┐ │
//! │  │ StateId          │ on_enter  │ on_exit  │ on_update        │ │
//! │  ├──────────────────┼───────────┼──────────┼──────────────────┤ │
//! │  │ WaitingForFrame  │ -         │ -        │ fn(ctx)->Option<>│ │
//! │  │ ProcessFrame     │ fn(ctx)   │ -        │ fn(ctx)->Option<>│ │
//! │  │ IdleHousekeeping │ fn(ctx)   │ -        │ fn(ctx)->Option<>│ │
//! │  └──────────────────┴───────────┴──────────┴──────────────────┘ │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.
//! If it returns `Some(next_id)`, the engine runs `on_exit` for the
//! current state, then `on_enter` for the next, and updates the
//! current pointer.  All functions receive `&mut FsmContext` which
//! holds the station aggregate, this cycle's inbound data, and the
//! outbox of side effects for the service to apply.
//!
//! One station cycle is a round trip from `WaitingForFrame` back to
//! itself; [`Fsm::run_cycle`] drives exactly one.

pub mod context;
pub mod states;

use context::FsmContext;
use log::{debug, info};

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all possible station states.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    WaitingForFrame = 0,
    ProcessFrame = 1,
    IdleHousekeeping = 2,
}

impl StateId {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 3;

    /// Convert a `u8` index back to `StateId`.  Panics on out-of-range in
    /// debug builds; returns `WaitingForFrame` in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::WaitingForFrame,
            1 => Self::ProcessFrame,
            2 => Self::IdleHousekeeping,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::WaitingForFrame
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut FsmContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut FsmContext) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
/// Stored in a fixed-size array: no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Home state a cycle starts and ends in.
    home: usize,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
            home: initial as usize,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one tick.
    ///
    /// 1. Call `on_update` for the current state.
    /// 2. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → update pointer → `on_enter(next)`.
    pub fn tick(&mut self, ctx: &mut FsmContext) {
        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// Tick until the machine is back in its home state.
    ///
    /// Bounded by the number of states, so a handler that never returns
    /// home cannot stall the caller's loop.
    pub fn run_cycle(&mut self, ctx: &mut FsmContext) {
        for _ in 0..StateId::COUNT {
            self.tick(ctx);
            if self.current == self.home {
                return;
            }
        }
        debug!(
            "FSM cycle ended away from home in {}",
            self.table[self.current].name
        );
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut FsmContext) {
        let next_idx = next_id as usize;

        // Transitions happen every poll tick; keep them out of info.
        debug!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
