//! Dashboard view model.
//!
//! Turns a [`StationState`] snapshot into the text and indicator values a
//! screen draws.  Metric values are the source of truth; imperial text is
//! derived here at render time through [`crate::units`].
//!
//! Nothing in this module draws: a display adapter decides layout.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};

use crate::liveness::SignalState;
use crate::station::StationState;
use crate::stats::{DayRecord, DayRing, HISTORY_DAYS, Trend};
use crate::units::{self, UnitSystem};

/// Battery voltage above which the pack is reported full.
pub const BATTERY_HIGH_V: f32 = 12.5;
/// Battery voltage above which the pack is reported half.
pub const BATTERY_MID_V: f32 = 11.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryLevel {
    High,
    Mid,
    Low,
}

impl BatteryLevel {
    pub fn from_voltage(volts: f32) -> Self {
        if volts > BATTERY_HIGH_V {
            Self::High
        } else if volts > BATTERY_MID_V {
            Self::Mid
        } else {
            Self::Low
        }
    }
}

/// Everything the live dashboard shows, pre-formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    /// `dd-mm-YYYY HH:MM`
    pub clock: String,
    pub outdoor: String,
    pub indoor: String,
    pub outdoor_range: String,
    pub indoor_range: String,
    pub pressure: String,
    pub pressure_range: String,
    pub rain_day: String,
    pub rain_hour: String,
    pub battery: String,
    pub battery_level: BatteryLevel,
    pub wind_speed: String,
    pub wind_gust: String,
    /// Bearing the wind arrow points to; `None` when calm.
    pub wind_arrow_deg: Option<u16>,
    pub signal: SignalState,
}

impl DashboardView {
    pub fn build(state: &StationState, units: UnitSystem, now: NaiveDateTime) -> Self {
        let reading = state.reading();
        let stats = state.stats();
        let indoor = state.indoor();
        let today = stats.outdoor().today();
        let indoor_day = stats.indoor_range();
        let pressure_day = stats.pressure_range();

        let humidity_out = reading.outdoor_humidity_pct.value();
        let pressure_hpa = reading.pressure_hpa.value();
        let rain_day = reading.rain_day_mm.value();
        let rain_hour = reading.rain_hour_mm.value();

        let suffix = match stats.trend() {
            Trend::Rising => " (+)",
            Trend::Falling => " (-)",
            Trend::Steady => "",
        };

        let (temp, pressure, pressure_range, rain_day, rain_hour) = match units {
            UnitSystem::Metric => (
                reading.outdoor_temp_c.value(),
                format!("{} hPa{}", pressure_hpa, suffix),
                format!("{}\n{}", pressure_day.max, pressure_day.min),
                format!("{:.1} mm", rain_day),
                format!("{:.1}/H", rain_hour),
            ),
            UnitSystem::Imperial => (
                units::to_imperial_temp(reading.outdoor_temp_c.value()),
                format!(
                    "{:.2} inHg{}",
                    units::to_imperial_pressure(f32::from(pressure_hpa)),
                    suffix
                ),
                format!(
                    "{:.1}\n{:.1}",
                    units::to_imperial_pressure(f32::from(pressure_day.max)),
                    units::to_imperial_pressure(f32::from(pressure_day.min))
                ),
                format!("{:.1} in", units::to_imperial_rain(rain_day)),
                format!("{:.1}/H", units::to_imperial_rain(rain_hour)),
            ),
        };

        let speed = reading.wind_speed.value();
        let gust = reading.wind_gust.value();
        let volts = state.status().battery_voltage.value();

        Self {
            clock: now.format("%d-%m-%Y %H:%M").to_string(),
            outdoor: format!("{:.1}{} ({}%)", temp, degree(units), humidity_out),
            indoor: format!(
                "{:.1}{} ({}%)",
                convert_temp(indoor.temp_c, units),
                degree(units),
                indoor.humidity_pct.round() as i32
            ),
            outdoor_range: range_text(today, units),
            indoor_range: range_text(indoor_day, units),
            pressure,
            pressure_range,
            rain_day,
            rain_hour,
            battery: format!("{:.1}V", volts),
            battery_level: BatteryLevel::from_voltage(volts),
            wind_speed: speed.to_string(),
            wind_gust: format!("({})", gust),
            wind_arrow_deg: wind_arrow(speed, gust, reading.wind_dir_deg.value()),
            signal: state.signal(),
        }
    }
}

/// The arrow points downwind; it is hidden when both speed and gust are zero.
pub fn wind_arrow(speed: u8, gust: u8, dir_deg: u16) -> Option<u16> {
    if speed == 0 && gust == 0 {
        None
    } else {
        Some((dir_deg % 360 + 180) % 360)
    }
}

fn degree(units: UnitSystem) -> &'static str {
    match units {
        UnitSystem::Metric => "°C",
        UnitSystem::Imperial => "°F",
    }
}

fn convert_temp(celsius: f32, units: UnitSystem) -> f32 {
    match units {
        UnitSystem::Metric => celsius,
        UnitSystem::Imperial => units::to_imperial_temp(celsius),
    }
}

fn range_text(day: DayRecord, units: UnitSystem) -> String {
    format!(
        "{:.1}\n{:.1}",
        convert_temp(day.max, units),
        convert_temp(day.min, units)
    )
}

// ═══════════════════════════════════════════════════════════════
//  History chart
// ═══════════════════════════════════════════════════════════════

/// Series for the 6-day outdoor history chart, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryChart {
    pub labels: [&'static str; HISTORY_DAYS],
    pub max: [f32; HISTORY_DAYS],
    pub min: [f32; HISTORY_DAYS],
    pub axis_min: f32,
    pub axis_max: f32,
}

impl HistoryChart {
    pub fn build(ring: &DayRing, units: UnitSystem, today: NaiveDate) -> Self {
        let slots = match units {
            UnitSystem::Metric => *ring.slots(),
            UnitSystem::Imperial => ring.to_imperial(),
        };

        let mut labels = [""; HISTORY_DAYS];
        let mut max = [0.0; HISTORY_DAYS];
        let mut min = [0.0; HISTORY_DAYS];
        // Column i shows the day HISTORY_DAYS - i days ago.
        for i in 0..HISTORY_DAYS {
            let days_ago = HISTORY_DAYS - i;
            let day = today - Duration::days(days_ago as i64);
            labels[i] = weekday_label(day.weekday());
            max[i] = slots[days_ago].max;
            min[i] = slots[days_ago].min;
        }

        let top = max.iter().copied().fold(f32::MIN, f32::max);
        let bottom = min.iter().copied().fold(f32::MAX, f32::min);

        Self {
            labels,
            max,
            min,
            axis_min: bottom - bottom.abs() * 0.1,
            axis_max: top + top.abs() * 0.1,
        }
    }
}

fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mo",
        Weekday::Tue => "Tu",
        Weekday::Wed => "We",
        Weekday::Thu => "Th",
        Weekday::Fri => "Fr",
        Weekday::Sat => "Sa",
        Weekday::Sun => "Su",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StationConfig;
    use crate::radio::codec::decode;

    fn t0() -> NaiveDateTime {
        // A Saturday.
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 5, 0)
            .unwrap()
    }

    fn station_with(frames: &[&[u8]]) -> StationState {
        let mut s = StationState::new(&StationConfig::default(), t0());
        for f in frames {
            s.absorb_frame(&decode(f, t0()), t0());
        }
        s
    }

    #[test]
    fn metric_dashboard_text() {
        let s = station_with(&[b"T23.5H62P1013R002.4r00.3W0510180", b"B12.61"]);
        let v = DashboardView::build(&s, UnitSystem::Metric, t0());
        assert_eq!(v.clock, "01-06-2024 12:05");
        assert_eq!(v.outdoor, "23.5°C (62%)");
        assert_eq!(v.pressure, "1013 hPa");
        assert_eq!(v.pressure_range, "1013\n1013");
        assert_eq!(v.rain_day, "2.4 mm");
        assert_eq!(v.rain_hour, "0.3/H");
        assert_eq!(v.outdoor_range, "23.5\n23.5");
        assert_eq!(v.battery, "12.6V");
        assert_eq!(v.battery_level, BatteryLevel::High);
        assert_eq!(v.wind_speed, "5");
        assert_eq!(v.wind_gust, "(10)");
        assert_eq!(v.wind_arrow_deg, Some(0));
        assert_eq!(v.signal, SignalState::Present);
    }

    #[test]
    fn imperial_dashboard_text() {
        let s = station_with(&[b"T23.5H62P1013R002.4r00.3W0510180"]);
        let v = DashboardView::build(&s, UnitSystem::Imperial, t0());
        assert_eq!(v.outdoor, "74.3°F (62%)");
        assert_eq!(v.pressure, "30.39 inHg");
        assert_eq!(v.pressure_range, "30.4\n30.4");
        assert_eq!(v.rain_day, "0.1 in");
    }

    #[test]
    fn battery_thresholds_are_exclusive() {
        assert_eq!(BatteryLevel::from_voltage(12.6), BatteryLevel::High);
        assert_eq!(BatteryLevel::from_voltage(12.5), BatteryLevel::Mid);
        assert_eq!(BatteryLevel::from_voltage(11.6), BatteryLevel::Mid);
        assert_eq!(BatteryLevel::from_voltage(11.5), BatteryLevel::Low);
        assert_eq!(BatteryLevel::from_voltage(0.0), BatteryLevel::Low);
    }

    #[test]
    fn calm_hides_arrow() {
        assert_eq!(wind_arrow(0, 0, 270), None);
        assert_eq!(wind_arrow(0, 3, 270), Some(90));
        assert_eq!(wind_arrow(4, 0, 90), Some(270));
    }

    #[test]
    fn chart_is_oldest_first_with_weekday_labels() {
        let mut ring = DayRing::new();
        let history = [
            DayRecord { max: 20.0, min: 10.0 }, // yesterday
            DayRecord { max: 21.0, min: 11.0 },
            DayRecord { max: 22.0, min: 12.0 },
            DayRecord { max: 23.0, min: 13.0 },
            DayRecord { max: 24.0, min: 14.0 },
            DayRecord { max: 25.0, min: -5.0 }, // six days ago
        ];
        ring.seed_history(&history);

        let chart = HistoryChart::build(&ring, UnitSystem::Metric, t0().date());
        assert_eq!(chart.labels, ["Su", "Mo", "Tu", "We", "Th", "Fr"]);
        assert_eq!(chart.max, [25.0, 24.0, 23.0, 22.0, 21.0, 20.0]);
        assert_eq!(chart.min[0], -5.0);
        assert!((chart.axis_max - 27.5).abs() < 1e-4);
        assert!((chart.axis_min + 5.5).abs() < 1e-4);
    }
}
