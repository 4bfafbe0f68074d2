//! Hardware adapter: bridges the radio driver and indoor sensor to the
//! domain port traits.
//!
//! The transceiver and single-wire sensor drivers run in their own
//! threads, outside the station loop.  They hand their data over through
//! two shared mailboxes:
//!
//! ```text
//!  radio task ──pump_radio──▶ RadioInbox ──▶ RadioPort
//!             ◀──take_ack───            ◀── send_keep_alive
//!
//!  sensor task ──update─────▶ IndoorCache ──▶ IndoorSensorPort
//! ```
//!
//! The settle delay between indoor reads goes through an
//! `embedded_hal` [`DelayNs`] so host tests can pass a no-op delay.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use log::debug;

use crate::app::ports::{IndoorSensorPort, RadioError, RadioPort, SensorError};
use crate::radio::RadioInbox;
use crate::radio::codec::KeepAlive;
use crate::radio::inbox::RawFrame;
use crate::radio::nrf24::Nrf24;

// ── Indoor sensor mailbox ─────────────────────────────────────

/// Latest raw indoor reading, written by the sensor driver.
#[derive(Debug, Default)]
pub struct IndoorCache {
    humidity_bits: AtomicU32,
    temp_bits: AtomicU32,
    valid: AtomicBool,
}

impl IndoorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a fresh `(humidity %, temperature °C)` pair.
    pub fn store(&self, humidity_pct: f32, temp_c: f32) {
        self.humidity_bits
            .store(humidity_pct.to_bits(), Ordering::Relaxed);
        self.temp_bits.store(temp_c.to_bits(), Ordering::Relaxed);
        self.valid.store(true, Ordering::Release);
    }

    /// Mark the reading stale after a failed driver transaction.
    pub fn invalidate(&self) {
        self.valid.store(false, Ordering::Release);
    }

    /// Sensor-task side: publish a read, or go stale on failure.
    pub fn update(&self, reading: Result<(f32, f32), SensorError>) {
        match reading {
            Ok((humidity_pct, temp_c)) => self.store(humidity_pct, temp_c),
            Err(e) => {
                debug!("Indoor sensor: {}", e);
                self.invalidate();
            }
        }
    }

    pub fn load(&self) -> Option<(f32, f32)> {
        if !self.valid.load(Ordering::Acquire) {
            return None;
        }
        Some((
            f32::from_bits(self.humidity_bits.load(Ordering::Relaxed)),
            f32::from_bits(self.temp_bits.load(Ordering::Relaxed)),
        ))
    }
}

// ── Radio task ────────────────────────────────────────────────

/// One pass of the radio task: load a pending keep-alive into the ack
/// FIFO, then move every received payload into the inbox.  Returns the
/// number of payloads moved.
pub fn pump_radio<SPI: SpiDevice, CE: OutputPin>(
    radio: &mut Nrf24<SPI, CE>,
    inbox: &RadioInbox,
) -> Result<usize, RadioError> {
    if let Some(ack) = inbox.take_ack() {
        radio.load_ack(&ack)?;
    }

    let mut moved = 0;
    while let Some(frame) = radio.receive()? {
        inbox.push_frame(&frame);
        moved += 1;
    }
    Ok(moved)
}

// ── Adapter ───────────────────────────────────────────────────

/// Concrete adapter that combines both mailboxes behind port traits.
pub struct HardwareAdapter<D: DelayNs> {
    inbox: Arc<RadioInbox>,
    indoor: Arc<IndoorCache>,
    delay: D,
    settle_ms: u32,
}

impl<D: DelayNs> HardwareAdapter<D> {
    pub fn new(inbox: Arc<RadioInbox>, indoor: Arc<IndoorCache>, delay: D, settle_ms: u32) -> Self {
        Self {
            inbox,
            indoor,
            delay,
            settle_ms,
        }
    }
}

// ── RadioPort implementation ──────────────────────────────────

impl<D: DelayNs> RadioPort for HardwareAdapter<D> {
    fn frame_available(&mut self) -> bool {
        self.inbox.has_frame()
    }

    fn read_frame(&mut self) -> Result<RawFrame, RadioError> {
        self.inbox.pop_frame().ok_or(RadioError::NoFrame)
    }

    fn send_keep_alive(&mut self, payload: &KeepAlive) -> Result<(), RadioError> {
        self.inbox.set_ack(payload.clone());
        Ok(())
    }
}

// ── IndoorSensorPort implementation ───────────────────────────

impl<D: DelayNs> IndoorSensorPort for HardwareAdapter<D> {
    fn read_humidity_temperature(&mut self) -> Result<(f32, f32), SensorError> {
        self.indoor.load().ok_or(SensorError::ReadFailed)
    }

    fn settle(&mut self) {
        if self.settle_ms > 0 {
            self.delay.delay_ms(self.settle_ms);
        }
    }
}
