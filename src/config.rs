//! System configuration parameters
//!
//! All tunable parameters for the Irrigator system. Values can be
//! overridden from a JSON document at flash time and are stored in NVS.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::control::policy::IrrigationPolicy;

/// Shortest cycle the DHT22 supports; it answers at most once per 2 s.
pub const MIN_SAMPLE_INTERVAL_MS: u32 = 2000;

/// How the per-cycle telemetry record is encoded on the serial console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryFormat {
    /// One `Category, Field, Value` fact per log line.
    Flat,
    /// One JSON object per line.
    JsonLines,
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Decision policy ---
    /// Irrigation thresholds consumed by the decision engine.
    pub policy: IrrigationPolicy,

    // --- Acquisition ---
    /// Highest ADC code (12-bit ADC → 4095).
    pub adc_full_scale: u16,
    /// Thermistor Beta material constant (K).
    pub thermistor_beta: f32,
    /// Thermistor reference temperature (K) at which it reads its nominal
    /// resistance.
    pub thermistor_t0_k: f32,

    // --- Actuators ---
    /// Relay input is active LOW (most opto-isolated relay boards).
    pub relay_active_low: bool,

    // --- Timing ---
    /// Interval between control cycles (milliseconds). At least
    /// [`MIN_SAMPLE_INTERVAL_MS`]: the DHT22 is read once per cycle.
    pub sample_interval_ms: u32,
    /// Task watchdog timeout (milliseconds).
    pub watchdog_timeout_ms: u32,

    // --- Telemetry ---
    pub telemetry_format: TelemetryFormat,

    // --- Network / time sync ---
    pub wifi_ssid: heapless::String<32>,
    pub wifi_password: heapless::String<64>,
    /// Association attempts before giving up on WiFi for this boot.
    pub wifi_max_attempts: u8,
    pub ntp_server: heapless::String<64>,
    /// Offset from UTC applied to the telemetry wall clock (seconds).
    pub utc_offset_secs: i32,
    /// Control cycles to wait for the first SNTP sync before declaring
    /// wall-clock time unavailable.
    pub time_sync_max_polls: u16,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            policy: IrrigationPolicy::default(),

            adc_full_scale: 4095,
            thermistor_beta: 3950.0,
            thermistor_t0_k: 298.15,

            relay_active_low: false,

            sample_interval_ms: 2000,
            watchdog_timeout_ms: 10_000,

            telemetry_format: TelemetryFormat::Flat,

            wifi_ssid: heapless::String::try_from("Wokwi-GUEST").unwrap_or_default(),
            wifi_password: heapless::String::new(),
            wifi_max_attempts: 5,
            ntp_server: heapless::String::try_from("pool.ntp.org").unwrap_or_default(),
            utc_offset_secs: -21_600, // UTC-6
            time_sync_max_polls: 30,
        }
    }
}

impl SystemConfig {
    /// Parse a (possibly partial) JSON document. Missing fields keep their
    /// defaults; the merged result is validated before it is returned.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Range-check every field. Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy.validate()?;

        if !(255..=65_535).contains(&self.adc_full_scale) {
            return Err(ConfigError::ValidationFailed(
                "adc_full_scale must be 255–65535",
            ));
        }
        if !(1000.0..=6000.0).contains(&self.thermistor_beta) {
            return Err(ConfigError::ValidationFailed(
                "thermistor_beta must be 1000–6000",
            ));
        }
        if !(200.0..=400.0).contains(&self.thermistor_t0_k) {
            return Err(ConfigError::ValidationFailed(
                "thermistor_t0_k must be 200–400",
            ));
        }
        if !(MIN_SAMPLE_INTERVAL_MS..=3_600_000).contains(&self.sample_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "sample_interval_ms must be 2000–3600000",
            ));
        }
        if self.watchdog_timeout_ms <= self.sample_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "watchdog_timeout_ms must exceed sample_interval_ms",
            ));
        }
        if self.wifi_max_attempts == 0 {
            return Err(ConfigError::ValidationFailed(
                "wifi_max_attempts must be at least 1",
            ));
        }
        if !(-43_200..=50_400).contains(&self.utc_offset_secs) {
            return Err(ConfigError::ValidationFailed(
                "utc_offset_secs must be within UTC-12..UTC+14",
            ));
        }
        Ok(())
    }
}
