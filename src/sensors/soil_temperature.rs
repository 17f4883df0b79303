//! NTC thermistor soil temperature estimator (B = 3950, 25 °C reference).
//!
//! Wired in a voltage divider and read via ADC1. The single-point Beta
//! model converts the raw code straight to temperature:
//!
//! ```text
//! T(K) = 1 / ( ln( 1 / (full_scale / raw − 1) ) / B + 1 / T0 )
//! ```
//!
//! A code pinned at either rail (0 or full scale) means an open or shorted
//! sensor; it is never fed into the log transform.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1_CH7 via the oneshot API (initialised by hw_init).
//! On host/test: reads the simulated channel set with `hw_init::sim_set_adc`.

use crate::config::SystemConfig;
use crate::drivers::hw_init;
use crate::error::SensorError;

/// Plain-number stand-in for an unreadable sensor, for consumers that
/// cannot carry an `Option`.
pub const UNREADABLE_SENTINEL_C: f32 = -999.0;

const KELVIN_OFFSET: f32 = 273.15;

/// Beta-parameter thermistor model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermistorModel {
    pub full_scale: u16,
    pub beta: f32,
    pub t0_k: f32,
}

impl Default for ThermistorModel {
    fn default() -> Self {
        Self {
            full_scale: 4095,
            beta: 3950.0,
            t0_k: 298.15,
        }
    }
}

impl ThermistorModel {
    pub fn from_config(cfg: &SystemConfig) -> Self {
        Self {
            full_scale: cfg.adc_full_scale,
            beta: cfg.thermistor_beta,
            t0_k: cfg.thermistor_t0_k,
        }
    }

    /// Temperature in °C, or `None` when `raw` sits on a rail (or beyond
    /// full scale) or the model diverges.
    pub fn estimate(&self, raw: u16) -> Option<f32> {
        if raw == 0 || raw >= self.full_scale {
            return None;
        }
        let ratio = f32::from(self.full_scale) / f32::from(raw) - 1.0;
        let inv_t = (1.0 / ratio).ln() / self.beta + 1.0 / self.t0_k;
        if !inv_t.is_finite() || inv_t <= 0.0 {
            return None;
        }
        let celsius = 1.0 / inv_t - KELVIN_OFFSET;
        celsius.is_finite().then_some(celsius)
    }

    /// Same as [`estimate`](Self::estimate) but folds failure into
    /// [`UNREADABLE_SENTINEL_C`].
    pub fn estimate_or_sentinel(&self, raw: u16) -> f32 {
        self.estimate(raw).unwrap_or(UNREADABLE_SENTINEL_C)
    }
}

pub struct SoilTemperatureSensor {
    model: ThermistorModel,
    adc_channel: u32,
}

impl SoilTemperatureSensor {
    pub fn new(adc_channel: u32, model: ThermistorModel) -> Self {
        Self { model, adc_channel }
    }

    pub fn read(&self) -> Result<f32, SensorError> {
        let raw = hw_init::adc1_read(self.adc_channel).ok_or(SensorError::AdcReadFailed)?;
        self.model.estimate(raw).ok_or(SensorError::OutOfRange)
    }
}
