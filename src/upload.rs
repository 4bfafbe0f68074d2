//! Cloud upload record.
//!
//! The logging channel takes eight numeric fields as query parameters:
//!
//! | param  | value              |
//! |--------|--------------------|
//! | field1 | outdoor temp (°C)  |
//! | field2 | outdoor humidity % |
//! | field3 | pressure (hPa)     |
//! | field4 | wind speed         |
//! | field5 | wind gust          |
//! | field6 | wind direction (°) |
//! | field7 | rain today (mm)    |
//! | field8 | rain this hour (mm)|
//!
//! Defaulted fields are sent as their sentinel value.

use core::fmt::Write;

use crate::radio::Reading;

/// Numeric payload of one upload, in channel field order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UploadRecord {
    pub temp_c: f32,
    pub humidity_pct: u8,
    pub pressure_hpa: u16,
    pub wind_speed: u8,
    pub wind_gust: u8,
    pub wind_dir_deg: u16,
    pub rain_day_mm: f32,
    pub rain_hour_mm: f32,
}

impl From<&Reading> for UploadRecord {
    fn from(r: &Reading) -> Self {
        Self {
            temp_c: r.outdoor_temp_c.value(),
            humidity_pct: r.outdoor_humidity_pct.value(),
            pressure_hpa: r.pressure_hpa.value(),
            wind_speed: r.wind_speed.value(),
            wind_gust: r.wind_gust.value(),
            wind_dir_deg: r.wind_dir_deg.value(),
            rain_day_mm: r.rain_day_mm.value(),
            rain_hour_mm: r.rain_hour_mm.value(),
        }
    }
}

impl UploadRecord {
    /// `&field1=..&field8=..`, ready to append after the API key.
    pub fn query(&self) -> String {
        let mut q = String::with_capacity(128);
        // Writing into a String cannot fail.
        let _ = write!(
            q,
            "&field1={}&field2={}&field3={}&field4={}&field5={}&field6={}&field7={}&field8={}",
            self.temp_c,
            self.humidity_pct,
            self.pressure_hpa,
            self.wind_speed,
            self.wind_gust,
            self.wind_dir_deg,
            self.rain_day_mm,
            self.rain_hour_mm,
        );
        q
    }
}

/// Full request URL: `<base_url>?api_key=<key>&field1=..`.
pub fn request_url(base_url: &str, api_key: &str, record: &UploadRecord) -> String {
    format!("{}?api_key={}{}", base_url, api_key, record.query())
}
