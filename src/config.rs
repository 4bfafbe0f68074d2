//! Station configuration parameters
//!
//! All tunable parameters for the weather station display.
//! Values can be overridden via NVS (non-volatile storage) provisioning.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::liveness::DEFAULT_TIMEOUT_SECS;
use crate::pins;
use crate::units::UnitSystem;

/// Indoor sensor filter and linear correction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndoorCalibration {
    /// Reads per cycle; the median is kept.
    pub samples: u8,
    /// Pause between consecutive reads (milliseconds).
    pub settle_ms: u32,
    /// Multiplier applied to the median humidity.
    pub humidity_scale: f32,
    /// Multiplier applied to the median temperature.
    pub temp_scale: f32,
    /// Offset (°C) added after scaling.
    pub temp_offset: f32,
}

impl Default for IndoorCalibration {
    fn default() -> Self {
        Self {
            samples: 3,
            settle_ms: 0,
            humidity_scale: 0.925,
            temp_scale: 1.09,
            temp_offset: -1.50,
        }
    }
}

/// Core station configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationConfig {
    // --- Identity ---
    /// Human-readable station name (dashboard title)
    pub station_name: String,

    // --- Upload ---
    /// Cloud logging endpoint (query parameters are appended)
    pub upload_url: String,
    /// Write API key for the logging channel
    pub upload_api_key: String,
    /// Minimum seconds between uploads
    pub upload_interval_secs: u32,

    // --- Network ---
    pub wifi_ssid: String,
    pub wifi_password: String,

    // --- Pins ---
    /// Radio chip-enable GPIO
    pub radio_ce_gpio: i32,
    /// Indoor sensor data GPIO
    pub indoor_sensor_gpio: i32,

    // --- Timing ---
    /// Station loop tick (milliseconds)
    pub poll_interval_ms: u32,
    /// Silence (seconds) before the radio link is reported lost
    pub liveness_timeout_secs: u32,

    // --- Indoor sensor ---
    pub indoor: IndoorCalibration,

    // --- Display ---
    /// Unit system shown at boot
    pub units: UnitSystem,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            station_name: "Weather Station".into(),

            upload_url: "https://api.thingspeak.com/update".into(),
            upload_api_key: String::new(),
            upload_interval_secs: 60,

            wifi_ssid: String::new(),
            wifi_password: String::new(),

            radio_ce_gpio: pins::RADIO_CE_GPIO,
            indoor_sensor_gpio: pins::INDOOR_SENSOR_GPIO,

            poll_interval_ms: 10,
            liveness_timeout_secs: DEFAULT_TIMEOUT_SECS,

            indoor: IndoorCalibration::default(),

            units: UnitSystem::Metric,
        }
    }
}

impl StationConfig {
    /// Range-check every field.  Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.station_name.is_empty() || self.station_name.len() > 32 {
            return Err(ConfigError::ValidationFailed(
                "station_name must be 1–32 bytes",
            ));
        }
        if !self.upload_url.starts_with("http://") && !self.upload_url.starts_with("https://") {
            return Err(ConfigError::ValidationFailed(
                "upload_url must be an http(s) URL",
            ));
        }
        if self.upload_api_key.len() > 32
            || !self.upload_api_key.bytes().all(|b| b.is_ascii_alphanumeric())
        {
            return Err(ConfigError::ValidationFailed(
                "upload_api_key must be 0–32 alphanumeric characters",
            ));
        }
        if !(15..=3600).contains(&self.upload_interval_secs) {
            return Err(ConfigError::ValidationFailed(
                "upload_interval_secs must be 15–3600",
            ));
        }
        if !(1..=1000).contains(&self.poll_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "poll_interval_ms must be 1–1000",
            ));
        }
        if !(5..=600).contains(&self.liveness_timeout_secs) {
            return Err(ConfigError::ValidationFailed(
                "liveness_timeout_secs must be 5–600",
            ));
        }
        if !(1..=7).contains(&self.indoor.samples) || self.indoor.samples % 2 == 0 {
            return Err(ConfigError::ValidationFailed(
                "indoor.samples must be odd, 1–7",
            ));
        }
        if self.indoor.settle_ms > 5000 {
            return Err(ConfigError::ValidationFailed(
                "indoor.settle_ms must be 0–5000",
            ));
        }
        if !(0.5..=1.5).contains(&self.indoor.humidity_scale)
            || !(0.5..=1.5).contains(&self.indoor.temp_scale)
        {
            return Err(ConfigError::ValidationFailed(
                "indoor scales must be 0.5–1.5",
            ));
        }
        if !(-10.0..=10.0).contains(&self.indoor.temp_offset) {
            return Err(ConfigError::ValidationFailed(
                "indoor.temp_offset must be -10–10 °C",
            ));
        }
        Ok(())
    }

    /// Parse and validate a provisioning document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(text).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Whether uploads can be attempted at all.
    pub fn upload_enabled(&self) -> bool {
        !self.upload_api_key.is_empty()
    }
}
