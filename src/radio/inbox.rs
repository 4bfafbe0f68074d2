//! Bounded frame mailbox between the radio driver and the station loop.
//!
//! ```text
//! ┌──────────────┐  push_frame   ┌────────────┐  pop_frame   ┌───────────┐
//! │ Radio task   │──────────────▶│ RadioInbox │─────────────▶│ Hardware  │
//! │ (pump_radio) │◀──────────────│  (FIFO)    │◀─────────────│ adapter   │
//! └──────────────┘  take_ack     └────────────┘  set_ack     └───────────┘
//! ```
//!
//! The driver owns the transceiver; the station only sees whole payloads.
//! When the FIFO is full the newest frame is dropped: the link is
//! best-effort and the next frame supersedes it anyway.

use std::sync::Mutex;

use heapless::{Deque, Vec};
use log::warn;

use super::codec::{KeepAlive, MAX_FRAME_LEN};

/// Frames buffered between two station ticks.
pub const INBOX_DEPTH: usize = 4;

/// One raw payload as delivered by the transceiver.
pub type RawFrame = Vec<u8, MAX_FRAME_LEN>;

#[derive(Default)]
struct Slots {
    frames: Deque<RawFrame, INBOX_DEPTH>,
    ack: Option<KeepAlive>,
    dropped: u32,
}

/// Shared mailbox.  Wrap in an `Arc` to hand one side to the driver.
#[derive(Default)]
pub struct RadioInbox {
    slots: Mutex<Slots>,
}

impl RadioInbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Producer side: queue a received payload.
    ///
    /// Payloads longer than [`MAX_FRAME_LEN`] are truncated.  Returns
    /// `false` if the frame was dropped because the FIFO is full.
    pub fn push_frame(&self, payload: &[u8]) -> bool {
        let len = payload.len().min(MAX_FRAME_LEN);
        let mut frame = RawFrame::new();
        // Cannot fail: len <= capacity.
        let _ = frame.extend_from_slice(&payload[..len]);

        let Ok(mut slots) = self.slots.lock() else {
            return false;
        };
        match slots.frames.push_back(frame) {
            Ok(()) => true,
            Err(_) => {
                slots.dropped = slots.dropped.wrapping_add(1);
                warn!("RadioInbox: full, dropped frame (total dropped={})", slots.dropped);
                false
            }
        }
    }

    /// Consumer side: whether a frame is waiting.
    pub fn has_frame(&self) -> bool {
        self.slots.lock().map(|s| !s.frames.is_empty()).unwrap_or(false)
    }

    /// Consumer side: take the oldest frame.
    pub fn pop_frame(&self) -> Option<RawFrame> {
        self.slots.lock().ok()?.frames.pop_front()
    }

    /// Consumer side: publish the next acknowledgment payload.
    pub fn set_ack(&self, payload: KeepAlive) {
        if let Ok(mut slots) = self.slots.lock() {
            slots.ack = Some(payload);
        }
    }

    /// Producer side: take the pending acknowledgment for the ack FIFO.
    pub fn take_ack(&self) -> Option<KeepAlive> {
        self.slots.lock().ok()?.ack.take()
    }

    /// Frames dropped on overflow since boot.
    pub fn dropped(&self) -> u32 {
        self.slots.lock().map(|s| s.dropped).unwrap_or(0)
    }
}
