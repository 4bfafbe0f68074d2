//! Weather-station display firmware: main entry point.
//!
//! Hexagonal architecture around a fixed-period station loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   NvsAdapter    SystemClock    │
//! │  (Radio+Indoor)    (EventSink)    (Config+Hist) (ClockPort)    │
//! │  WifiAdapter       HttpUploader   LogDisplay                   │
//! │  (Connectivity)    (UploadPort)   (DisplayPort)                │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  FSM · StationState · RollingStats                     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  TickPacer (fixed-period loop) · SNTP (wall clock)             │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The transceiver and indoor-sensor drivers run in their own threads
//! (`radio`, `indoor`) and feed [`RadioInbox`] / [`IndoorCache`]; the
//! station loop only consumes them.
#![deny(unused_must_use)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::gpio::{AnyIOPin, AnyOutputPin, PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::spi::config::Config as SpiConfig;
use esp_idf_hal::spi::{SpiDeviceDriver, SpiDriverConfig};
use esp_idf_hal::units::Hertz;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use log::{info, warn};

use weatherstation::adapters::cloud::HttpUploader;
use weatherstation::adapters::hardware::{HardwareAdapter, IndoorCache, pump_radio};
use weatherstation::adapters::log_display::LogDisplay;
use weatherstation::adapters::log_sink::LogEventSink;
use weatherstation::adapters::nvs::NvsAdapter;
use weatherstation::adapters::time::{SystemClock, start_sntp};
use weatherstation::adapters::wifi::{ConnectivityPort, WifiAdapter};
use weatherstation::app::ports::ConfigPort;
use weatherstation::app::service::AppService;
use weatherstation::config::StationConfig;
use weatherstation::pins;
use weatherstation::radio::RadioInbox;
use weatherstation::radio::nrf24::Nrf24;
use weatherstation::scheduler::TickPacer;
use weatherstation::sensors::dht::Dht22;

/// How long boot waits for the first SNTP sync.
const SNTP_WAIT: Duration = Duration::from_secs(30);
/// Radio task poll period.
const RADIO_POLL_MS: u32 = 5;
/// Back-off after a transceiver bus error.
const RADIO_RETRY_MS: u32 = 1_000;
/// DHT22 minimum interval between transactions.
const INDOOR_PERIOD_MS: u32 = 2_500;
const TASK_STACK: usize = 4096;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  WeatherStation v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let mut nvs = NvsAdapter::new().map_err(|e| anyhow!("NVS init failed: {}", e))?;
    let config = load_config(&nvs);
    info!(
        "Config: '{}' upload={} every {}s, liveness {}s",
        config.station_name,
        config.upload_enabled(),
        config.upload_interval_secs,
        config.liveness_timeout_secs
    );

    // ── 3. Network + wall clock ───────────────────────────────
    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let driver = BlockingWifi::wrap(EspWifi::new(peripherals.modem, sys_loop.clone(), None)?, sys_loop)?;
    let mut wifi = WifiAdapter::new(driver);

    let clock = SystemClock::new();
    let _sntp = if config.wifi_ssid.is_empty() {
        warn!("WiFi: no SSID configured, running offline");
        None
    } else {
        wifi.set_credentials(&config.wifi_ssid, &config.wifi_password)
            .map_err(|e| anyhow!("WiFi credentials rejected: {}", e))?;
        if let Err(e) = wifi.connect() {
            warn!("WiFi: initial connect failed ({}), will retry", e);
        }
        Some(start_sntp(&clock, SNTP_WAIT)?)
    };

    // ── 4. Driver tasks ───────────────────────────────────────
    let inbox = Arc::new(RadioInbox::new());
    let indoor = Arc::new(IndoorCache::new());

    // SAFETY: each GPIO below is claimed exactly once, here, and none of
    // them is taken from `peripherals.pins` anywhere else.
    let (sck, mosi, miso, csn, ce, dht_pin) = unsafe {
        (
            AnyOutputPin::new(pins::RADIO_SCK_GPIO),
            AnyOutputPin::new(pins::RADIO_MOSI_GPIO),
            AnyIOPin::new(pins::RADIO_MISO_GPIO),
            AnyOutputPin::new(pins::RADIO_CSN_GPIO),
            AnyOutputPin::new(config.radio_ce_gpio),
            AnyIOPin::new(config.indoor_sensor_gpio),
        )
    };

    let spi = SpiDeviceDriver::new_single(
        peripherals.spi2,
        sck,
        mosi,
        Some(miso),
        Some(csn),
        &SpiDriverConfig::default(),
        &SpiConfig::new()
            .baudrate(Hertz(pins::RADIO_SPI_HZ))
            .data_mode(embedded_hal::spi::MODE_0),
    )?;
    let mut radio = Nrf24::new(spi, PinDriver::output(ce)?);
    radio
        .start_listening(pins::RADIO_READ_PIPE)
        .map_err(|e| anyhow!("Radio init failed: {}", e))?;
    info!(
        "Radio: listening on pipe {:#x}, CE GPIO{}",
        pins::RADIO_READ_PIPE,
        config.radio_ce_gpio
    );
    spawn_radio_task(radio, inbox.clone())?;

    let mut dht_pin = PinDriver::input_output_od(dht_pin)?;
    dht_pin.set_pull(Pull::Up)?;
    dht_pin.set_high()?;
    let dht = Dht22::new(dht_pin, Ets, || {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    });
    info!("Indoor sensor: DHT22 on GPIO{}", config.indoor_sensor_gpio);
    spawn_indoor_task(dht, indoor.clone())?;

    // ── 5. Construct adapters + app service ───────────────────
    let mut hw = HardwareAdapter::new(inbox.clone(), indoor, FreeRtos, config.indoor.settle_ms);
    let mut display = LogDisplay::new();
    let mut uploader = HttpUploader::new(&config);
    let mut sink = LogEventSink::new();

    let mut pacer = TickPacer::new(config.poll_interval_ms);
    let mut app = AppService::new(config, &clock);
    if let Err(e) = app.seed_history(&nvs) {
        warn!("History not restored: {}", e);
    }
    app.start(&mut display, &mut sink);

    info!("System ready. Entering station loop.");

    // ── 6. Station loop ───────────────────────────────────────
    loop {
        let started = Instant::now();

        app.tick(&clock, &mut hw, &mut display, &mut uploader, &mut nvs, &mut sink);
        wifi.poll(clock.uptime_secs());

        let rest = pacer.pace(started.elapsed());
        if !rest.is_zero() {
            FreeRtos::delay_ms(rest.as_millis() as u32);
        }

        if app.tick_count() % 60_000 == 0 {
            info!(
                "Loop: {} ticks, {} frames, {} dropped, {} overruns",
                app.tick_count(),
                sink.frames(),
                inbox.dropped(),
                pacer.overruns()
            );
        }
    }
}

/// Drain the transceiver into the inbox and hand it pending keep-alives.
fn spawn_radio_task<SPI, CE>(mut radio: Nrf24<SPI, CE>, inbox: Arc<RadioInbox>) -> Result<()>
where
    SPI: SpiDevice + Send + 'static,
    CE: OutputPin + Send + 'static,
{
    std::thread::Builder::new()
        .name("radio".into())
        .stack_size(TASK_STACK)
        .spawn(move || {
            loop {
                match pump_radio(&mut radio, &inbox) {
                    Ok(_) => FreeRtos::delay_ms(RADIO_POLL_MS),
                    Err(e) => {
                        warn!("Radio task: {}", e);
                        FreeRtos::delay_ms(RADIO_RETRY_MS);
                    }
                }
            }
        })?;
    Ok(())
}

/// Refresh the indoor cache at the sensor's maximum rate.
fn spawn_indoor_task<P, C>(mut dht: Dht22<P, Ets, C>, cache: Arc<IndoorCache>) -> Result<()>
where
    P: embedded_hal::digital::InputPin + OutputPin + Send + 'static,
    C: Fn() -> u64 + Send + 'static,
{
    std::thread::Builder::new()
        .name("indoor".into())
        .stack_size(TASK_STACK)
        .spawn(move || {
            loop {
                cache.update(dht.read());
                FreeRtos::delay_ms(INDOOR_PERIOD_MS);
            }
        })?;
    Ok(())
}

/// Stored config, overridden by a provisioning document baked in at build
/// time (`STATION_CONFIG_JSON`).  Any failure falls back to defaults.
fn load_config(nvs: &NvsAdapter) -> StationConfig {
    if let Some(doc) = option_env!("STATION_CONFIG_JSON") {
        match StationConfig::from_json(doc) {
            Ok(cfg) => {
                info!("Config: applying build-time provisioning document");
                if let Err(e) = nvs.save(&cfg) {
                    warn!("Config: could not persist provisioning document ({})", e);
                }
                return cfg;
            }
            Err(e) => warn!("Config: build-time document rejected ({})", e),
        }
    }
    match nvs.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            StationConfig::default()
        }
    }
}
