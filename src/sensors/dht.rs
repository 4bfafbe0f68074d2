//! DHT22 single-wire humidity/temperature driver.
//!
//! The host pulls the line low for just over a millisecond, releases it,
//! and the sensor answers with an 80 µs low / 80 µs high preamble followed
//! by 40 bits.  Every bit starts with a ~50 µs low; the length of the high
//! phase that follows carries the value (~27 µs = 0, ~70 µs = 1).
//!
//! The pin must be open-drain with a pull-up so the same driver can both
//! drive and sample it.  Pulse widths come from a free-running microsecond
//! counter passed in as a closure.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::SensorError;

/// Start-signal low time.
const START_LOW_US: u32 = 1_100;
/// Longest any single phase of the reply may last.
const PHASE_TIMEOUT_US: u64 = 100;
/// High phases longer than this are 1 bits.
const ONE_THRESHOLD_US: u64 = 48;

pub struct Dht22<P, D, C> {
    pin: P,
    delay: D,
    micros: C,
}

impl<P, D, C> Dht22<P, D, C>
where
    P: InputPin + OutputPin,
    D: DelayNs,
    C: Fn() -> u64,
{
    pub fn new(pin: P, delay: D, micros: C) -> Self {
        Self { pin, delay, micros }
    }

    /// One complete transaction: `(humidity %, temperature °C)`.
    pub fn read(&mut self) -> Result<(f32, f32), SensorError> {
        self.pin.set_low().map_err(|_| SensorError::ReadFailed)?;
        self.delay.delay_us(START_LOW_US);
        self.pin.set_high().map_err(|_| SensorError::ReadFailed)?;

        // Preamble: sensor pulls low, then high, then low for the first bit.
        self.wait_for(false)?;
        self.wait_for(true)?;
        self.wait_for(false)?;

        let mut bytes = [0u8; 5];
        for i in 0..40 {
            self.wait_for(true)?;
            let rose = (self.micros)();
            self.wait_for(false)?;
            if (self.micros)().saturating_sub(rose) > ONE_THRESHOLD_US {
                bytes[i / 8] |= 0x80 >> (i % 8);
            }
        }

        decode(bytes)
    }

    fn wait_for(&mut self, high: bool) -> Result<(), SensorError> {
        let start = (self.micros)();
        loop {
            let level = self.pin.is_high().map_err(|_| SensorError::ReadFailed)?;
            if level == high {
                return Ok(());
            }
            if (self.micros)().saturating_sub(start) > PHASE_TIMEOUT_US {
                return Err(SensorError::Timeout);
            }
        }
    }
}

/// Checksum and scale a raw 5-byte reply.
pub fn decode(bytes: [u8; 5]) -> Result<(f32, f32), SensorError> {
    let sum = bytes[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != bytes[4] {
        return Err(SensorError::Checksum);
    }

    let humidity = f32::from(u16::from_be_bytes([bytes[0], bytes[1]])) / 10.0;
    let magnitude = f32::from(u16::from_be_bytes([bytes[2] & 0x7F, bytes[3]])) / 10.0;
    let temp = if bytes[2] & 0x80 != 0 { -magnitude } else { magnitude };

    if humidity > 100.0 {
        return Err(SensorError::ReadFailed);
    }
    Ok((humidity, temp))
}
