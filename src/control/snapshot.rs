//! Per-cycle sensor snapshot.
//!
//! Every field that can fail to read is an `Option`; `None` means the
//! acquisition layer could not produce a trustworthy value this cycle.

use serde::Serialize;

/// Physically plausible air temperature range of the DHT22 (°C).
pub const AIR_TEMPERATURE_RANGE_C: core::ops::RangeInclusive<f32> = -40.0..=80.0;

/// Relative humidity range (%).
pub const AIR_HUMIDITY_RANGE_PCT: core::ops::RangeInclusive<f32> = 0.0..=100.0;

/// A point-in-time snapshot of every sensor in the system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SensorSnapshot {
    /// Ambient air temperature (°C).
    pub air_temperature_c: Option<f32>,
    /// Ambient relative humidity (%).
    pub air_humidity_pct: Option<f32>,
    /// Rain sensor digital output.
    pub rain_detected: bool,
    /// Ambient light, 0 = dark, 100 = full sun.
    pub light_pct: Option<u8>,
    /// Volumetric soil moisture, 0 = dry, 100 = saturated.
    pub soil_moisture_pct: Option<u8>,
    /// Water tank fill level.
    pub tank_level_pct: Option<u8>,
    /// Soil temperature from the thermistor (°C).
    pub soil_temperature_c: Option<f32>,
}

impl SensorSnapshot {
    /// Air temperature if it is finite and physically plausible.
    pub fn plausible_air_temperature(&self) -> Option<f32> {
        self.air_temperature_c
            .filter(|t| t.is_finite() && AIR_TEMPERATURE_RANGE_C.contains(t))
    }

    /// Air humidity if it is finite and within 0–100 %.
    pub fn plausible_air_humidity(&self) -> Option<f32> {
        self.air_humidity_pct
            .filter(|h| h.is_finite() && AIR_HUMIDITY_RANGE_PCT.contains(h))
    }
}

/// Percentage if present and within 0–100.
pub(crate) fn plausible_percent(value: Option<u8>) -> Option<u8> {
    value.filter(|v| *v <= 100)
}
