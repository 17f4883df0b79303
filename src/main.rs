//! Irrigator Firmware — Main Entry Point
//!
//! Hexagonal architecture driven by a single periodic control cycle.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   TelemetrySink  NvsAdapter   NetworkClock    │
//! │  (Sensor+Actuator) (EventSink)    (Config)     (Clock)         │
//! │  WifiAdapter       Watchdog                                    │
//! │  (Connectivity)                                                │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │           IrrigationService (pure logic)               │    │
//! │  │  SensorHealth · IrrigationNeed · DecisionEngine        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  CycleScheduler (edge-executor, one task)                      │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::gpio::{AnyIOPin, AnyOutputPin, PinDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use irrigator::adapters::hardware::HardwareAdapter;
use irrigator::adapters::log_sink::TelemetrySink;
use irrigator::adapters::nvs::NvsAdapter;
use irrigator::adapters::time::NetworkClock;
use irrigator::adapters::wifi::{ConnectivityPort, WifiAdapter};
use irrigator::app::ports::{ClockPort, ConfigPort};
use irrigator::app::service::IrrigationService;
use irrigator::config::SystemConfig;
use irrigator::drivers::indicator::IndicatorBank;
use irrigator::drivers::relay::PumpRelay;
use irrigator::drivers::watchdog::Watchdog;
use irrigator::pins;
use irrigator::scheduler::{CycleScheduler, ShutdownSignal};
use irrigator::sensors::air::AirSensor;
use irrigator::sensors::SensorHub;

/// Never requested on hardware; the device runs until power-off.
static SHUTDOWN: ShutdownSignal = ShutdownSignal::new();

/// Optional JSON override baked in at build time, e.g.
/// `IRRIGATOR_CONFIG_JSON='{"wifi_ssid":"Garden"}' cargo build`.
const CONFIG_OVERRIDE: Option<&str> = option_env!("IRRIGATOR_CONFIG_JSON");

type OutPin = PinDriver<'static, AnyOutputPin, esp_idf_svc::hal::gpio::Output>;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Irrigator v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Analog front end + rain input ──────────────────────
    if let Err(e) = irrigator::drivers::hw_init::init_peripherals() {
        // Without the ADC there is nothing to decide on; the task
        // watchdog is not armed yet, so halt visibly.
        error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    // ── 3. Configuration ──────────────────────────────────────
    let nvs = NvsAdapter::new().ok();
    let config = load_config(nvs.as_ref());
    info!(
        "Config: interval {} ms, dry < {}%, cold < {:.1} °C, light < {}%, tank < {}%",
        config.sample_interval_ms,
        config.policy.dry_threshold_pct,
        config.policy.cold_threshold_c,
        config.policy.max_light_pct,
        config.policy.tank_minimum_pct,
    );

    // ── 4. Pins ───────────────────────────────────────────────
    // The relay is driven OFF as soon as its driver exists, before the
    // slow WiFi bring-up below.
    let peripherals = Peripherals::take()?;

    let relay = PumpRelay::new(output_pin(pins::RELAY_GPIO)?, config.relay_active_low)?;
    let leds: [OutPin; 4] = [
        output_pin(pins::LED_CRITICAL_GPIO)?,
        output_pin(pins::LED_HIGH_GPIO)?,
        output_pin(pins::LED_MODERATE_GPIO)?,
        output_pin(pins::LED_LOW_GPIO)?,
    ];
    // SAFETY: DHT_GPIO is claimed exactly once and no `Peripherals::pins`
    // field for it is used.
    let dht_pin = PinDriver::input_output_od(unsafe { AnyIOPin::new(pins::DHT_GPIO) })?;

    let sensor_hub = SensorHub::new(AirSensor::new(dht_pin), &config);
    let mut hw = HardwareAdapter::new(sensor_hub, relay, IndicatorBank::new(leds));

    // ── 5. Network + time (best effort) ───────────────────────
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;
    let mut wifi = match WifiAdapter::new(peripherals.modem, sysloop, nvs_partition, &config) {
        Ok(w) => Some(w),
        Err(e) => {
            warn!("WiFi unavailable ({}), wall clock will stay unset", e);
            None
        }
    };
    let mut clock = NetworkClock::start(&config);

    // ── 6. Service ────────────────────────────────────────────
    let watchdog = Watchdog::new(config.watchdog_timeout_ms);
    let mut sink = TelemetrySink::for_format(config.telemetry_format);
    let mut service = IrrigationService::new(&config);
    service.start(&mut hw, &mut sink);

    // ── 7. Control loop ───────────────────────────────────────
    let scheduler = CycleScheduler::from_millis(config.sample_interval_ms);
    scheduler.run_blocking(
        |_| {
            service.run_cycle(&mut hw, &clock, &mut sink);
            if let Some(wifi) = wifi.as_mut() {
                wifi.poll(clock.uptime_ms());
            }
            clock.poll();
            watchdog.feed();
        },
        &SHUTDOWN,
    );

    service.stop(&mut hw);
    Ok(())
}

/// Output driver for a GPIO from the pin map.
fn output_pin(gpio: i32) -> Result<OutPin> {
    // SAFETY: every pin-map GPIO is claimed exactly once, from `main`, and
    // the matching `Peripherals::pins` fields are never used.
    let pin = unsafe { AnyOutputPin::new(gpio) };
    Ok(PinDriver::output(pin)?)
}

/// Stored config, with the build-time override merged in and persisted
/// when present and valid.
fn load_config(nvs: Option<&NvsAdapter>) -> SystemConfig {
    let stored = nvs.map_or_else(SystemConfig::default, NvsAdapter::load_or_default);

    let Some(json) = CONFIG_OVERRIDE else {
        return stored;
    };
    match SystemConfig::from_json(json) {
        Ok(cfg) => {
            if cfg != stored {
                info!("Config: applying build-time override");
                if let Some(Err(e)) = nvs.map(|n| n.save(&cfg)) {
                    warn!("Config: override not persisted: {}", e);
                }
            }
            cfg
        }
        Err(e) => {
            warn!("Config: build-time override rejected ({}), keeping stored config", e);
            stored
        }
    }
}
