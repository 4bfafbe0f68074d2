//! Metric ↔ imperial conversions.
//!
//! Metric is the source of truth everywhere in the station; imperial values
//! are derived on demand for display.  Every function is total: NaN in, NaN
//! out.

use serde::{Deserialize, Serialize};

/// hPa → inHg factor used by the dashboard.
const INHG_PER_HPA: f32 = 0.03;
/// Millimetres per inch.
const MM_PER_INCH: f32 = 25.4;

/// Which unit system the dashboard renders in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// The other system.
    pub fn toggled(self) -> Self {
        match self {
            Self::Metric => Self::Imperial,
            Self::Imperial => Self::Metric,
        }
    }
}

/// °C → °F.
pub fn to_imperial_temp(celsius: f32) -> f32 {
    celsius * 9.0 / 5.0 + 32.0
}

/// hPa → inHg.
pub fn to_imperial_pressure(hpa: f32) -> f32 {
    hpa * INHG_PER_HPA
}

/// mm → in.
pub fn to_imperial_rain(mm: f32) -> f32 {
    mm / MM_PER_INCH
}

/// °F → °C.
pub fn from_imperial_temp(fahrenheit: f32) -> f32 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// inHg → hPa.
pub fn from_imperial_pressure(inhg: f32) -> f32 {
    inhg / INHG_PER_HPA
}

/// in → mm.
pub fn from_imperial_rain(inches: f32) -> f32 {
    inches * MM_PER_INCH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freezing_and_boiling_points() {
        assert!((to_imperial_temp(0.0) - 32.0).abs() < 1e-4);
        assert!((to_imperial_temp(100.0) - 212.0).abs() < 1e-4);
        assert!((to_imperial_temp(-40.0) + 40.0).abs() < 1e-4);
    }

    #[test]
    fn pressure_uses_dashboard_factor() {
        assert!((to_imperial_pressure(1000.0) - 30.0).abs() < 1e-3);
    }

    #[test]
    fn one_inch_of_rain() {
        assert!((to_imperial_rain(25.4) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn nan_propagates() {
        assert!(to_imperial_temp(f32::NAN).is_nan());
        assert!(to_imperial_pressure(f32::NAN).is_nan());
        assert!(to_imperial_rain(f32::NAN).is_nan());
    }

    #[test]
    fn toggle_flips_between_systems() {
        assert_eq!(UnitSystem::Metric.toggled(), UnitSystem::Imperial);
        assert_eq!(UnitSystem::Imperial.toggled(), UnitSystem::Metric);
        assert_eq!(UnitSystem::default(), UnitSystem::Metric);
    }
}
