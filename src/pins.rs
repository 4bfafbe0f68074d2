//! GPIO / peripheral pin assignments for the station display board
//! (ESP32-S3).
//!
//! Single source of truth: every adapter references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// 2.4 GHz transceiver (nRF24L01+, SPI2 / FSPI)
// ---------------------------------------------------------------------------

/// Chip-enable: HIGH = RX active.
pub const RADIO_CE_GPIO: i32 = 14;
/// SPI chip-select (active LOW).
pub const RADIO_CSN_GPIO: i32 = 10;
pub const RADIO_SCK_GPIO: i32 = 12;
pub const RADIO_MOSI_GPIO: i32 = 11;
pub const RADIO_MISO_GPIO: i32 = 13;

/// SPI clock; the part tops out at 10 MHz.
pub const RADIO_SPI_HZ: u32 = 8_000_000;

/// Pipe address shared with the outdoor sender ("TMRh|").
pub const RADIO_READ_PIPE: u64 = 0x54_4d52_687c;

// ---------------------------------------------------------------------------
// Indoor climate sensor (DHT22, single-wire, open-drain with pull-up)
// ---------------------------------------------------------------------------

pub const INDOOR_SENSOR_GPIO: i32 = 4;
