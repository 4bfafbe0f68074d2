//! Property and fuzz-style tests for robustness of core data structures.
//!
//! Runs on host (x86_64) only; proptest is not available for ESP32 targets.
//! On ESP32, these tests are compiled out.

#![cfg(not(target_os = "espidf"))]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;

use weatherstation::radio::codec::{decode, decode_weather};
use weatherstation::radio::{Field, Frame};
use weatherstation::scheduler::Throttle;
use weatherstation::stats::{DayRecord, DayRing};
use weatherstation::units;

fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

// ── Payload decoder ──────────────────────────────────────────

proptest! {
    /// Arbitrary bytes of any length decode to some frame without panicking.
    #[test]
    fn decoder_never_panics(payload in proptest::collection::vec(any::<u8>(), 0..48)) {
        let frame = decode(&payload, noon());
        match frame {
            Frame::Weather(r) => prop_assert!(r.defaulted_fields() <= 8),
            Frame::Status(_) => prop_assert_ne!(payload.first(), Some(&b'T')),
        }
    }
}

/// Byte ranges of the eight weather fields, in `Reading` order.
const FIELD_RANGES: [(usize, usize); 8] = [
    (1, 5),
    (6, 8),
    (9, 13),
    (14, 19),
    (20, 24),
    (25, 27),
    (27, 29),
    (29, 32),
];

#[derive(Debug, Clone, Copy)]
struct Sample {
    temp_tenths: i32,
    humidity: u8,
    pressure: u16,
    rain_day_tenths: u32,
    rain_hour_tenths: u32,
    speed: u8,
    gust: u8,
    dir: u16,
}

fn sample() -> impl Strategy<Value = Sample> {
    (
        -99i32..=999,
        0u8..=99,
        900u16..=1100,
        0u32..=9999,
        0u32..=999,
        0u8..=99,
        0u8..=99,
        0u16..=359,
    )
        .prop_map(
            |(temp_tenths, humidity, pressure, rain_day_tenths, rain_hour_tenths, speed, gust, dir)| Sample {
                temp_tenths,
                humidity,
                pressure,
                rain_day_tenths,
                rain_hour_tenths,
                speed,
                gust,
                dir,
            },
        )
}

fn encode(s: &Sample) -> Vec<u8> {
    format!(
        "T{:4.1}H{:02}P{:4}R{:5.1}r{:4.1}W{:02}{:02}{:03}",
        s.temp_tenths as f32 / 10.0,
        s.humidity,
        s.pressure,
        s.rain_day_tenths as f32 / 10.0,
        s.rain_hour_tenths as f32 / 10.0,
        s.speed,
        s.gust,
        s.dir
    )
    .into_bytes()
}

fn parsed_mask(payload: &[u8]) -> [bool; 8] {
    let r = decode_weather(payload, noon());
    [
        r.outdoor_temp_c.is_parsed(),
        r.outdoor_humidity_pct.is_parsed(),
        r.pressure_hpa.is_parsed(),
        r.rain_day_mm.is_parsed(),
        r.rain_hour_mm.is_parsed(),
        r.wind_speed.is_parsed(),
        r.wind_gust.is_parsed(),
        r.wind_dir_deg.is_parsed(),
    ]
}

proptest! {
    /// A well-formed frame decodes every field to the value it was built from.
    #[test]
    fn well_formed_frame_decodes_exactly(s in sample()) {
        let payload = encode(&s);
        prop_assert_eq!(payload.len(), 32);
        let r = decode_weather(&payload, noon());
        prop_assert_eq!(r.defaulted_fields(), 0);
        prop_assert_eq!(r.outdoor_temp_c, Field::Parsed(s.temp_tenths as f32 / 10.0));
        prop_assert_eq!(r.outdoor_humidity_pct, Field::Parsed(s.humidity));
        prop_assert_eq!(r.pressure_hpa, Field::Parsed(s.pressure));
        prop_assert_eq!(r.rain_day_mm, Field::Parsed(s.rain_day_tenths as f32 / 10.0));
        prop_assert_eq!(r.rain_hour_mm, Field::Parsed(s.rain_hour_tenths as f32 / 10.0));
        prop_assert_eq!(r.wind_speed, Field::Parsed(s.speed));
        prop_assert_eq!(r.wind_gust, Field::Parsed(s.gust));
        prop_assert_eq!(r.wind_dir_deg, Field::Parsed(s.dir));
    }

    /// Corrupting one field defaults that field only.
    #[test]
    fn corrupt_field_is_isolated(s in sample(), victim in 0usize..8) {
        let mut payload = encode(&s);
        let (start, end) = FIELD_RANGES[victim];
        for b in &mut payload[start..end] {
            *b = b'x';
        }
        let mask = parsed_mask(&payload);
        for (i, ok) in mask.iter().enumerate() {
            prop_assert_eq!(*ok, i != victim, "field {} parse state", i);
        }
    }

    /// Truncation defaults exactly the fields that lost bytes.
    #[test]
    fn truncation_defaults_tail_fields(s in sample(), len in 1usize..32) {
        let payload = encode(&s);
        let mask = parsed_mask(&payload[..len]);
        for (i, (_, end)) in FIELD_RANGES.iter().enumerate() {
            prop_assert_eq!(mask[i], *end <= len, "field {} with len {}", i, len);
        }
    }
}

// ── Unit conversion ──────────────────────────────────────────

proptest! {
    #[test]
    fn unit_round_trips_stay_close(
        c in -60.0f32..60.0,
        hpa in 800.0f32..1100.0,
        mm in 0.0f32..1000.0,
    ) {
        prop_assert!((units::from_imperial_temp(units::to_imperial_temp(c)) - c).abs() < 0.05);
        prop_assert!((units::from_imperial_pressure(units::to_imperial_pressure(hpa)) - hpa).abs() < 0.05);
        prop_assert!((units::from_imperial_rain(units::to_imperial_rain(mm)) - mm).abs() < 0.05);
    }
}

// ── History ring ─────────────────────────────────────────────

#[derive(Debug, Clone)]
enum RingOp {
    Record(f32),
    Rotate,
}

fn ring_op() -> impl Strategy<Value = RingOp> {
    prop_oneof![
        4 => (-40.0f32..50.0).prop_map(RingOp::Record),
        1 => Just(RingOp::Rotate),
    ]
}

proptest! {
    /// Recorded days keep max >= min, and rotation shifts every slot by one.
    #[test]
    fn ring_invariants_hold(ops in proptest::collection::vec(ring_op(), 0..200)) {
        let mut ring = DayRing::new();
        let mut recorded_today = false;

        for op in ops {
            match op {
                RingOp::Record(c) => {
                    ring.record(c);
                    recorded_today = true;
                    let today = ring.today();
                    prop_assert!(today.max >= c && today.min <= c);
                }
                RingOp::Rotate => {
                    let before = *ring.slots();
                    ring.rotate();
                    prop_assert_eq!(ring.today(), DayRecord::sentinel());
                    prop_assert_eq!(&ring.slots()[1..], &before[..6]);
                    recorded_today = false;
                }
            }
            prop_assert_eq!(ring.today().has_samples(), recorded_today);
            for day in ring.slots() {
                if day.has_samples() {
                    prop_assert!(day.max >= day.min);
                }
            }
        }
    }
}

// ── Upload throttle ──────────────────────────────────────────

proptest! {
    /// Accepted offers are always strictly more than the interval apart.
    #[test]
    fn throttle_spacing(
        interval in 1u32..600,
        steps in proptest::collection::vec(0i64..120, 1..100),
    ) {
        let mut throttle = Throttle::new(interval);
        let mut now = noon();
        let mut last: Option<NaiveDateTime> = None;

        for step in steps {
            now += Duration::seconds(step);
            if throttle.offer(now) {
                if let Some(prev) = last {
                    prop_assert!(now - prev > Duration::seconds(i64::from(interval)));
                }
                last = Some(now);
            }
        }
        prop_assert_eq!(throttle.last(), last);
    }
}
