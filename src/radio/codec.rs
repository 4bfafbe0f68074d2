//! Fixed-width ASCII payload decoder.
//!
//! Wire format of a weather frame (byte offsets, one ASCII char each):
//! ```text
//!  T 9 9 . 9 H 9 9 P 9 9 9 9 R 9 9 9 . 9 r 9 9 . 9 W 9 9 9 9 9 9 9
//!  │ └──┬──┘   └┬┘   └──┬──┘   └───┬───┘   └──┬──┘   └┬┘ └┬┘ └─┬─┘
//!  │  temp °C  hum%   hPa      rain today  rain/hour  avg gust dir°
//!  0 1       5 6   8 9     13 14       19 20      24 25  27  29  32
//! ```
//!
//! Any tag other than `T` is a status frame carrying the battery voltage
//! in bytes `[1, 6)`.
//!
//! Each field is decoded from its own byte range.  A malformed range
//! yields [`Field::Defaulted`] for that field only; the remaining fields
//! are still attempted.  Nothing in this module panics on any input.

use core::ops::Range;
use core::str::FromStr;

use chrono::NaiveDateTime;

/// Longest payload the radio can deliver.
pub const MAX_FRAME_LEN: usize = 32;

/// Discriminator byte selecting the weather layout.
pub const WEATHER_TAG: u8 = b'T';

const TEMP: Range<usize> = 1..5;
const HUMIDITY: Range<usize> = 6..8;
const PRESSURE: Range<usize> = 9..13;
const RAIN_DAY: Range<usize> = 14..19;
const RAIN_HOUR: Range<usize> = 20..24;
const WIND_SPEED: Range<usize> = 25..27;
const WIND_GUST: Range<usize> = 27..29;
const WIND_DIR: Range<usize> = 29..32;
const BATTERY: Range<usize> = 1..6;

// ---------------------------------------------------------------------------
// Per-field result
// ---------------------------------------------------------------------------

/// Outcome of decoding a single field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<T> {
    /// The byte range held a well-formed value.
    Parsed(T),
    /// The byte range was missing or malformed.
    Defaulted,
}

impl<T: Copy + Default> Field<T> {
    /// The parsed value, or the sentinel (`T::default()`, i.e. zero).
    pub fn value(self) -> T {
        match self {
            Self::Parsed(v) => v,
            Self::Defaulted => T::default(),
        }
    }

    pub fn parsed(self) -> Option<T> {
        match self {
            Self::Parsed(v) => Some(v),
            Self::Defaulted => None,
        }
    }

    pub fn is_parsed(self) -> bool {
        matches!(self, Self::Parsed(_))
    }
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self::Defaulted
    }
}

// ---------------------------------------------------------------------------
// Decoded frames
// ---------------------------------------------------------------------------

/// One decoded weather snapshot from the outdoor unit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Reading {
    pub outdoor_temp_c: Field<f32>,
    pub outdoor_humidity_pct: Field<u8>,
    pub pressure_hpa: Field<u16>,
    pub rain_day_mm: Field<f32>,
    pub rain_hour_mm: Field<f32>,
    pub wind_speed: Field<u8>,
    pub wind_gust: Field<u8>,
    pub wind_dir_deg: Field<u16>,
    /// Local wall-clock time the frame was received.
    pub timestamp: Option<NaiveDateTime>,
}

impl Reading {
    /// Number of fields that fell back to their sentinel.
    pub fn defaulted_fields(&self) -> usize {
        [
            self.outdoor_temp_c.is_parsed(),
            self.outdoor_humidity_pct.is_parsed(),
            self.pressure_hpa.is_parsed(),
            self.rain_day_mm.is_parsed(),
            self.rain_hour_mm.is_parsed(),
            self.wind_speed.is_parsed(),
            self.wind_gust.is_parsed(),
            self.wind_dir_deg.is_parsed(),
        ]
        .iter()
        .filter(|ok| !**ok)
        .count()
    }
}

/// System status reported by the outdoor unit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StatusReading {
    pub battery_voltage: Field<f32>,
}

/// A decoded radio payload.  Weather and status frames are mutually
/// exclusive: one frame carries exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Frame {
    Weather(Reading),
    Status(StatusReading),
}

/// Which layout a frame used, for logging and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Weather,
    Status,
}

impl Frame {
    pub fn kind(&self) -> FrameKind {
        match self {
            Self::Weather(_) => FrameKind::Weather,
            Self::Status(_) => FrameKind::Status,
        }
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a raw payload received at `now`.
pub fn decode(payload: &[u8], now: NaiveDateTime) -> Frame {
    match payload.first() {
        Some(&WEATHER_TAG) => Frame::Weather(decode_weather(payload, now)),
        _ => Frame::Status(decode_status(payload)),
    }
}

/// Decode the weather layout.  The tag byte is not re-checked.
pub fn decode_weather(payload: &[u8], now: NaiveDateTime) -> Reading {
    Reading {
        outdoor_temp_c: field(payload, TEMP),
        outdoor_humidity_pct: field(payload, HUMIDITY),
        pressure_hpa: field(payload, PRESSURE),
        rain_day_mm: field(payload, RAIN_DAY),
        rain_hour_mm: field(payload, RAIN_HOUR),
        wind_speed: field(payload, WIND_SPEED),
        wind_gust: field(payload, WIND_GUST),
        wind_dir_deg: field(payload, WIND_DIR),
        timestamp: Some(now),
    }
}

/// Decode the status layout.
pub fn decode_status(payload: &[u8]) -> StatusReading {
    StatusReading {
        battery_voltage: field(payload, BATTERY),
    }
}

/// Parse one numeric field from `range`.
///
/// The whole range must be present and valid UTF-8; surrounding ASCII
/// whitespace is ignored.
fn field<T: FromStr>(payload: &[u8], range: Range<usize>) -> Field<T> {
    let Some(bytes) = payload.get(range) else {
        return Field::Defaulted;
    };
    let Ok(text) = core::str::from_utf8(bytes) else {
        return Field::Defaulted;
    };
    match text.trim().parse() {
        Ok(v) => Field::Parsed(v),
        Err(_) => Field::Defaulted,
    }
}

// ---------------------------------------------------------------------------
// Keep-alive acknowledgment
// ---------------------------------------------------------------------------

/// Keep-alive payload: decimal seconds since the Unix epoch.
pub type KeepAlive = heapless::String<20>;

/// Encode the keep-alive acknowledgment sent on idle cycles.
pub fn encode_keep_alive(epoch_secs: i64) -> KeepAlive {
    use core::fmt::Write;

    let mut out = KeepAlive::new();
    // 20 bytes hold any i64.
    let _ = write!(out, "{}", epoch_secs);
    out
}
