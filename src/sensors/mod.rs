//! Local sensors read by the display unit itself.
//!
//! The outdoor unit reports over the radio; only the indoor climate
//! sensor is wired to this board.

pub mod dht;
pub mod indoor;

/// Calibrated indoor climate for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IndoorSample {
    pub humidity_pct: f32,
    pub temp_c: f32,
}
