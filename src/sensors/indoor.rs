//! Indoor humidity/temperature sampling (DHT22-class sensor).
//!
//! These sensors fail transiently and occasionally return a wild value,
//! so each cycle takes several reads, substitutes zero for a failed read,
//! sorts each channel independently and keeps the middle element.  The
//! median is then corrected with a fixed linear calibration.

use log::debug;

use super::IndoorSample;
use crate::app::ports::IndoorSensorPort;
use crate::config::IndoorCalibration;

/// Upper bound on reads per cycle.
pub const MAX_SAMPLES: usize = 7;

/// Take `cal.samples` reads and return the calibrated median.
pub fn read_filtered(sensor: &mut impl IndoorSensorPort, cal: &IndoorCalibration) -> IndoorSample {
    let n = usize::from(cal.samples).clamp(1, MAX_SAMPLES);
    let mut humidity = [0.0_f32; MAX_SAMPLES];
    let mut temp = [0.0_f32; MAX_SAMPLES];

    for i in 0..n {
        if i > 0 {
            sensor.settle();
        }
        match sensor.read_humidity_temperature() {
            Ok((h, t)) => {
                humidity[i] = h;
                temp[i] = t;
            }
            Err(e) => debug!("Indoor sensor read {} failed: {}", i, e),
        }
    }

    calibrate(median(&mut humidity[..n]), median(&mut temp[..n]), cal)
}

/// Apply the linear correction to a raw (median) pair.
pub fn calibrate(humidity: f32, temp: f32, cal: &IndoorCalibration) -> IndoorSample {
    IndoorSample {
        humidity_pct: humidity * cal.humidity_scale,
        temp_c: temp * cal.temp_scale + cal.temp_offset,
    }
}

/// Middle element after sorting (upper-middle for even counts).
fn median(values: &mut [f32]) -> f32 {
    values.sort_by(f32::total_cmp);
    values.get(values.len() / 2).copied().unwrap_or(0.0)
}
