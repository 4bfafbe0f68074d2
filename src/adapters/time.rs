//! Wall-clock adapter.
//!
//! Provides local calendar time for rollover, UTC epoch seconds for the
//! keep-alive payload, plus monotonic uptime for diagnostics.
//!
//! - **`target_os = "espidf"`**: the newlib clock, set by SNTP; uptime
//!   from `esp_timer_get_time()`.
//! - **`not(target_os = "espidf")`**: the host clock and
//!   `std::time::Instant`.
//!
//! [`start_sntp`] brings the wall clock up once the network is available.

use chrono::{Datelike, Local, NaiveDateTime, Utc};

use crate::app::ports::ClockPort;

/// Anything before this year means the clock was never set.
const FIRST_VALID_YEAR: i32 = 2020;

pub struct SystemClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Seconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_secs(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000_000
    }

    /// Seconds since boot (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_secs(&self) -> u64 {
        self.start.elapsed().as_secs()
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn epoch_secs(&self) -> i64 {
        Utc::now().timestamp()
    }

    fn is_synced(&self) -> bool {
        is_plausible(self.now())
    }
}

/// Start SNTP and block until the first sync, or `max_wait` elapses.
///
/// The returned handle must stay alive to keep the clock disciplined.
/// Timing out is not fatal: the station runs on an unsynced clock and the
/// service logs it.
#[cfg(target_os = "espidf")]
pub fn start_sntp(
    clock: &SystemClock,
    max_wait: std::time::Duration,
) -> Result<esp_idf_svc::sntp::EspSntp<'static>, esp_idf_svc::sys::EspError> {
    use esp_idf_svc::sntp::{EspSntp, SyncStatus};
    use log::{info, warn};

    let sntp = EspSntp::new_default()?;
    let poll = std::time::Duration::from_millis(200);
    let mut waited = std::time::Duration::ZERO;
    while !(clock.is_synced() && sntp.get_sync_status() == SyncStatus::Completed) {
        if waited >= max_wait {
            warn!("SNTP: no sync after {:?}, continuing", max_wait);
            return Ok(sntp);
        }
        std::thread::sleep(poll);
        waited += poll;
    }
    info!("SNTP: clock synced, now {}", clock.now());
    Ok(sntp)
}

/// Whether `t` could come from a set clock.
pub fn is_plausible(t: NaiveDateTime) -> bool {
    t.year() >= FIRST_VALID_YEAR
}
