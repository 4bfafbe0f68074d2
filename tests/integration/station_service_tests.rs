//! Integration tests for the AppService → FSM → ports pipeline.
//!
//! These run on the host (x86_64) and drive whole station cycles through
//! mock adapters: frames in, renders/uploads/keep-alives/persistence out.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use super::mock_hw::{
    MockClock, MockDisplay, MockStation, MockStore, MockUploader, RecordingSink,
};

use weatherstation::app::commands::AppCommand;
use weatherstation::app::events::AppEvent;
use weatherstation::app::ports::{HistoryError, RadioError, SensorError, UploadError};
use weatherstation::app::service::AppService;
use weatherstation::config::StationConfig;
use weatherstation::error::Error;
use weatherstation::fsm::StateId;
use weatherstation::liveness::SignalState;
use weatherstation::stats::{DayRecord, Trend};
use weatherstation::units::UnitSystem;

const WEATHER: &[u8] = b"T23.5H62P1013R002.4r00.3W0510180";

struct Rig {
    app: AppService,
    clock: MockClock,
    hw: MockStation,
    display: MockDisplay,
    uploader: MockUploader,
    store: MockStore,
    sink: RecordingSink,
}

impl Rig {
    fn new(config: StationConfig, now: NaiveDateTime) -> Self {
        Self::with_clock(config, MockClock::at(now))
    }

    fn with_clock(config: StationConfig, clock: MockClock) -> Self {
        let mut rig = Self {
            app: AppService::new(config, &clock),
            clock,
            hw: MockStation::new(),
            display: MockDisplay::default(),
            uploader: MockUploader::default(),
            store: MockStore::default(),
            sink: RecordingSink::default(),
        };
        rig.app.start(&mut rig.display, &mut rig.sink);
        rig
    }

    fn tick(&mut self, now: NaiveDateTime) {
        self.clock.now = now;
        self.app.tick(
            &self.clock,
            &mut self.hw,
            &mut self.display,
            &mut self.uploader,
            &mut self.store,
            &mut self.sink,
        );
    }

    fn frame(&mut self, payload: &[u8], now: NaiveDateTime) {
        self.hw.queue(payload);
        self.tick(now);
    }

    fn command(&mut self, cmd: AppCommand) {
        self.app
            .handle_command(cmd, &mut self.display, &mut self.store, &mut self.sink);
    }
}

fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

/// A weather frame with the given outdoor temperature and pressure.
fn weather(temp_c: f32, pressure_hpa: u16) -> Vec<u8> {
    format!("T{:4.1}H62P{:4}R002.4r00.3W0510180", temp_c, pressure_hpa).into_bytes()
}

fn uploading() -> StationConfig {
    StationConfig {
        upload_api_key: "6TVY1HJ7Q89CRK66".into(),
        ..Default::default()
    }
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_draws_both_screens() {
    let rig = Rig::new(StationConfig::default(), noon());
    assert_eq!(rig.app.state(), StateId::WaitingForFrame);
    assert_eq!(rig.display.renders, 1);
    assert_eq!(rig.display.charts, 1);
    assert_eq!(rig.sink.events, vec![AppEvent::Started(noon().date())]);
}

// ── Liveness ──────────────────────────────────────────────────

#[test]
fn signal_lost_only_after_timeout() {
    let t0 = noon();
    let mut rig = Rig::new(StationConfig::default(), t0);
    rig.frame(WEATHER, t0);
    assert_eq!(rig.app.station().signal(), SignalState::Present);

    rig.tick(t0 + Duration::seconds(24));
    assert_eq!(rig.app.station().signal(), SignalState::Present);

    let renders = rig.display.renders;
    rig.tick(t0 + Duration::seconds(26));
    assert_eq!(rig.app.station().signal(), SignalState::Lost);
    assert_eq!(rig.display.renders, renders + 1);
    assert_eq!(
        rig.sink
            .count(|e| *e == AppEvent::SignalChanged(SignalState::Lost)),
        1
    );
}

#[test]
fn next_frame_restores_signal() {
    let t0 = noon();
    let mut rig = Rig::new(StationConfig::default(), t0);
    rig.frame(WEATHER, t0);
    rig.tick(t0 + Duration::seconds(30));
    rig.frame(WEATHER, t0 + Duration::seconds(31));
    assert_eq!(rig.app.station().signal(), SignalState::Present);
    assert_eq!(
        rig.sink
            .count(|e| *e == AppEvent::SignalChanged(SignalState::Present)),
        2
    );
}

// ── Upload ────────────────────────────────────────────────────

#[test]
fn first_upload_immediate_then_throttled() {
    let t0 = noon();
    let mut rig = Rig::new(uploading(), t0);

    rig.frame(WEATHER, t0);
    rig.frame(WEATHER, t0 + Duration::seconds(30));
    rig.frame(WEATHER, t0 + Duration::seconds(60));
    assert_eq!(rig.uploader.published.len(), 1);

    rig.frame(WEATHER, t0 + Duration::seconds(61));
    assert_eq!(rig.uploader.published.len(), 2);
    assert_eq!(rig.sink.count(|e| *e == AppEvent::UploadSent), 2);
    assert_eq!(
        rig.app.station().last_upload(),
        Some(t0 + Duration::seconds(61))
    );
}

#[test]
fn no_api_key_means_no_upload() {
    let mut rig = Rig::new(StationConfig::default(), noon());
    rig.frame(WEATHER, noon());
    assert!(rig.uploader.published.is_empty());
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::UploadSent | AppEvent::UploadFailed(_))),
        0
    );
}

#[test]
fn upload_failure_is_reported_not_fatal() {
    let t0 = noon();
    let mut rig = Rig::new(uploading(), t0);
    rig.uploader.fail_with = Some(UploadError::Status(500));

    rig.frame(WEATHER, t0);
    assert!(rig
        .sink
        .events
        .contains(&AppEvent::UploadFailed(UploadError::Status(500))));

    // The slot was consumed; a failed sample is not retried early.
    rig.uploader.fail_with = None;
    rig.frame(WEATHER, t0 + Duration::seconds(10));
    assert!(rig.uploader.published.is_empty());
    assert_eq!(rig.app.station().reading().pressure_hpa.value(), 1013);
}

#[test]
fn status_frame_updates_battery_without_upload() {
    let mut rig = Rig::new(uploading(), noon());
    rig.frame(b"B12.61", noon());

    let volts = rig.app.station().status().battery_voltage.value();
    assert!((volts - 12.61).abs() < 1e-4);
    assert!(rig.uploader.published.is_empty());
    assert_eq!(rig.app.station().signal(), SignalState::Present);
}

// ── Indoor sensor ─────────────────────────────────────────────

#[test]
fn failed_indoor_reads_fall_back_to_calibrated_zero() {
    let config = StationConfig::default();
    let cal = config.indoor.clone();
    let mut rig = Rig::new(config, noon());
    rig.hw.indoor = Err(SensorError::Timeout);

    rig.frame(WEATHER, noon());
    let indoor = rig.app.station().indoor();
    assert_eq!(indoor.humidity_pct, 0.0);
    assert!((indoor.temp_c - cal.temp_offset).abs() < 1e-4);
    let range = rig.app.station().stats().indoor_range();
    assert_eq!(range.max, range.min);
    assert!((range.max - cal.temp_offset).abs() < 1e-4);

    // The outdoor side of the frame is unaffected.
    assert_eq!(rig.app.station().reading().outdoor_temp_c.value(), 23.5);

    rig.hw.indoor = Ok((45.0, 21.0));
    rig.frame(WEATHER, noon() + Duration::seconds(10));
    let expected = 21.0 * cal.temp_scale + cal.temp_offset;
    assert!((rig.app.station().stats().indoor_range().max - expected).abs() < 1e-4);
}

// ── Pressure trend ────────────────────────────────────────────

#[test]
fn hourly_trend_reported_through_rollover() {
    let t0 = NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap();
    let mut rig = Rig::new(StationConfig::default(), t0);
    rig.frame(&weather(20.0, 1015), t0);
    rig.frame(&weather(20.0, 1015), t0 + Duration::minutes(10));

    rig.tick(t0 + Duration::hours(1));
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::HourRolledOver { .. })),
        1
    );

    for (i, p) in [1010, 1008, 1006].into_iter().enumerate() {
        rig.frame(&weather(20.0, p), t0 + Duration::hours(1) + Duration::minutes(i as i64 + 1));
    }
    let stats = rig.app.station().stats();
    assert_eq!(stats.pressure_trend().last_hour(), 1015.0);
    assert_eq!(stats.pressure_trend().this_hour(), 1007.0);
    assert_eq!(stats.trend(), Trend::Falling);

    rig.tick(t0 + Duration::hours(2));
    let trends: Vec<Trend> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::HourRolledOver { trend } => Some(*trend),
            _ => None,
        })
        .collect();
    assert_eq!(trends, vec![Trend::Rising, Trend::Falling]);
}

// ── Keep-alive ────────────────────────────────────────────────

#[test]
fn keep_alive_only_on_idle_cycles() {
    let t0 = noon();
    let mut rig = Rig::new(StationConfig::default(), t0);

    rig.frame(WEATHER, t0);
    assert!(rig.hw.keep_alives.is_empty());

    rig.tick(t0);
    rig.tick(t0 + Duration::seconds(1));
    let acks: Vec<&str> = rig.hw.keep_alives.iter().map(|k| k.as_str()).collect();
    assert_eq!(acks, vec!["1717243200", "1717243201"]);
}

#[test]
fn keep_alive_is_utc_epoch_whatever_the_local_offset() {
    let mut clock = MockClock::at(noon());
    clock.utc_offset_secs = 2 * 3600;
    let mut rig = Rig::with_clock(StationConfig::default(), clock);
    rig.tick(noon());
    let acks: Vec<&str> = rig.hw.keep_alives.iter().map(|k| k.as_str()).collect();
    assert_eq!(acks, vec!["1717236000"]);
}

#[test]
fn rejected_keep_alive_is_reported() {
    let mut rig = Rig::new(StationConfig::default(), noon());
    rig.hw.reject_acks = true;
    rig.tick(noon());
    assert!(rig
        .sink
        .events
        .contains(&AppEvent::KeepAliveFailed(RadioError::AckRejected)));
    assert_eq!(rig.app.state(), StateId::WaitingForFrame);
}

// ── Rollover + persistence ────────────────────────────────────

fn before_midnight() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(23, 59, 50)
        .unwrap()
}

#[test]
fn day_rollover_persists_and_redraws_chart() {
    let t0 = before_midnight();
    let mut rig = Rig::new(StationConfig::default(), t0);
    rig.frame(WEATHER, t0);
    rig.frame(b"T19.0H62P1013R002.4r00.3W0510180", t0 + Duration::seconds(5));

    let charts = rig.display.charts;
    rig.tick(t0 + Duration::seconds(15));

    assert_eq!(rig.store.saves, 1);
    let stored = rig.store.stored.expect("history persisted");
    assert_eq!(stored[0], DayRecord { max: 23.5, min: 19.0 });
    assert_eq!(rig.display.charts, charts + 1);

    let today = rig.app.station().stats().outdoor().today();
    assert!(!today.has_samples());
    assert!(rig.sink.events.contains(&AppEvent::DayRolledOver {
        date: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
    }));
}

#[test]
fn rollover_happens_once_per_day() {
    let t0 = before_midnight();
    let mut rig = Rig::new(StationConfig::default(), t0);
    for s in [15, 16, 17, 3600] {
        rig.tick(t0 + Duration::seconds(s));
    }
    assert_eq!(rig.store.saves, 1);
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::DayRolledOver { .. })),
        1
    );
}

#[test]
fn frame_after_midnight_counts_for_old_day_until_idle_cycle() {
    let t0 = before_midnight();
    let midnight = NaiveDate::from_ymd_opt(2024, 6, 2)
        .unwrap()
        .and_hms_opt(0, 0, 5)
        .unwrap();
    let mut rig = Rig::new(StationConfig::default(), t0);
    rig.frame(WEATHER, t0);
    rig.frame(&weather(17.5, 1013), midnight);

    assert_eq!(rig.store.saves, 0);
    assert_eq!(
        rig.app.station().stats().outdoor().today(),
        DayRecord { max: 23.5, min: 17.5 }
    );

    rig.tick(midnight + Duration::seconds(1));
    assert_eq!(rig.store.saves, 1);
    let stored = rig.store.stored.expect("history persisted");
    assert_eq!(stored[0], DayRecord { max: 23.5, min: 17.5 });
    assert!(!rig.app.station().stats().outdoor().today().has_samples());
}

fn unset_clock() -> MockClock {
    let boot = NaiveDate::from_ymd_opt(1970, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 9)
        .unwrap();
    MockClock {
        now: boot,
        utc_offset_secs: 0,
        synced: false,
    }
}

#[test]
fn late_clock_sync_does_not_roll_the_day() {
    let clock = unset_clock();
    let boot = clock.now;
    let mut rig = Rig::with_clock(StationConfig::default(), clock);
    rig.frame(WEATHER, boot);
    rig.tick(boot + Duration::seconds(1));

    rig.clock.synced = true;
    rig.tick(noon());
    assert!(rig.sink.events.contains(&AppEvent::ClockSynced(noon())));
    assert_eq!(rig.store.saves, 0);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::DayRolledOver { .. })),
        0
    );
    assert_eq!(rig.app.station().stats().outdoor().today().max, 23.5);
    assert_eq!(rig.app.station().signal(), SignalState::Present);

    // The next real midnight rolls as usual.
    rig.tick(noon() + Duration::hours(12));
    assert_eq!(rig.store.saves, 1);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::ClockSynced(_))),
        1
    );
}

#[test]
fn unset_clock_never_rolls_over() {
    let clock = unset_clock();
    let boot = clock.now;
    let mut rig = Rig::with_clock(StationConfig::default(), clock);
    for h in [1, 2, 30] {
        rig.tick(boot + Duration::hours(h));
    }
    assert_eq!(rig.store.saves, 0);
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::DayRolledOver { .. } | AppEvent::HourRolledOver { .. })),
        0
    );
    assert_eq!(rig.hw.keep_alives.len(), 3);
}

#[test]
fn persistence_failure_does_not_stop_the_station() {
    let t0 = before_midnight();
    let mut rig = Rig::new(StationConfig::default(), t0);
    rig.store.fail_saves = true;

    rig.tick(t0 + Duration::seconds(15));
    assert!(rig
        .sink
        .events
        .contains(&AppEvent::HistoryPersistFailed(HistoryError::IoError)));
    assert_eq!(rig.hw.keep_alives.len(), 1);

    rig.frame(WEATHER, t0 + Duration::seconds(20));
    assert_eq!(rig.app.station().stats().outdoor().today().max, 23.5);
}

#[test]
fn seeded_history_round_trips_through_store() {
    let t0 = before_midnight();
    let mut first = Rig::new(StationConfig::default(), t0);
    first.frame(WEATHER, t0);
    first.tick(t0 + Duration::seconds(15));
    let stored = first.store.stored.expect("history persisted");

    let later = MockClock::at(t0 + Duration::seconds(60));
    let mut second = AppService::new(StationConfig::default(), &later);
    second.seed_history(&first.store).unwrap();
    assert_eq!(second.station().stats().history(), stored);
}

#[test]
fn first_boot_has_no_history() {
    let mut app = AppService::new(StationConfig::default(), &MockClock::at(noon()));
    assert!(app.seed_history(&MockStore::default()).is_ok());
}

#[test]
fn corrupted_history_is_surfaced() {
    let store = MockStore {
        load_error: Some(HistoryError::Corrupted),
        ..Default::default()
    };
    let mut app = AppService::new(StationConfig::default(), &MockClock::at(noon()));
    assert_eq!(
        app.seed_history(&store),
        Err(Error::History(HistoryError::Corrupted))
    );
}

#[test]
fn shutdown_flushes_history() {
    let mut rig = Rig::new(StationConfig::default(), noon());
    rig.app.shutdown(&mut rig.store, &mut rig.sink).unwrap();
    assert_eq!(rig.store.saves, 1);
    assert!(rig.sink.events.contains(&AppEvent::HistoryPersisted));
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn toggle_units_redraws_everything() {
    let mut rig = Rig::new(StationConfig::default(), noon());
    let (renders, charts) = (rig.display.renders, rig.display.charts);

    rig.command(AppCommand::ToggleUnits);
    assert_eq!(rig.app.units(), UnitSystem::Imperial);
    assert_eq!(rig.display.last_units, Some(UnitSystem::Imperial));
    assert_eq!(rig.display.renders, renders + 1);
    assert_eq!(rig.display.charts, charts + 1);
    assert!(rig
        .sink
        .events
        .contains(&AppEvent::UnitsChanged(UnitSystem::Imperial)));

    // Setting the active system again is a no-op.
    rig.command(AppCommand::SetUnits(UnitSystem::Imperial));
    assert_eq!(rig.display.renders, renders + 1);
}

#[test]
fn units_do_not_touch_stored_values() {
    let mut rig = Rig::new(StationConfig::default(), noon());
    rig.frame(WEATHER, noon());
    rig.command(AppCommand::ToggleUnits);
    assert_eq!(rig.app.station().reading().outdoor_temp_c.value(), 23.5);
    assert_eq!(rig.app.station().stats().outdoor().today().max, 23.5);
}

#[test]
fn flush_history_command_persists() {
    let mut rig = Rig::new(StationConfig::default(), noon());
    rig.command(AppCommand::FlushHistory);
    assert_eq!(rig.store.saves, 1);

    rig.store.fail_saves = true;
    rig.command(AppCommand::FlushHistory);
    assert!(rig
        .sink
        .events
        .contains(&AppEvent::HistoryPersistFailed(HistoryError::IoError)));
}
