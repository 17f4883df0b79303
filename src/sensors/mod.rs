//! Sensor subsystem — individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns every sensor driver and produces a [`SensorSnapshot`] each
//! cycle. A failed read becomes a `None` field; it never aborts the cycle.

pub mod air;
pub mod analog;
pub mod rain;
pub mod soil_temperature;

use log::debug;

use crate::config::SystemConfig;
use crate::control::snapshot::SensorSnapshot;
use crate::error::SensorError;
use crate::pins;
use air::AirSensor;
use analog::{PercentChannel, Polarity};
use rain::RainSensor;
use soil_temperature::{SoilTemperatureSensor, ThermistorModel};

/// Aggregates all sensor drivers and produces a unified snapshot.
pub struct SensorHub {
    pub air: AirSensor,
    pub rain: RainSensor,
    pub light: PercentChannel,
    pub soil_moisture: PercentChannel,
    pub tank_level: PercentChannel,
    pub soil_temperature: SoilTemperatureSensor,
}

impl SensorHub {
    /// Construct a new hub.  The air sensor is passed in pre-built because
    /// on target it owns a GPIO driver taken from the peripherals in main.
    pub fn new(air: AirSensor, cfg: &SystemConfig) -> Self {
        let fs = cfg.adc_full_scale;
        Self {
            air,
            rain: RainSensor::new(pins::RAIN_GPIO),
            light: PercentChannel::new(pins::LIGHT_ADC_CH, fs, Polarity::Inverted),
            soil_moisture: PercentChannel::new(pins::SOIL_MOISTURE_ADC_CH, fs, Polarity::Direct),
            tank_level: PercentChannel::new(pins::TANK_LEVEL_ADC_CH, fs, Polarity::Direct),
            soil_temperature: SoilTemperatureSensor::new(
                pins::SOIL_NTC_ADC_CH,
                ThermistorModel::from_config(cfg),
            ),
        }
    }

    /// Read every sensor and return a unified snapshot.
    pub fn read_all(&mut self) -> SensorSnapshot {
        let air = self.air.read();
        let (air_temperature_c, air_humidity_pct) = match air {
            Ok(r) => (Some(r.temperature_c), Some(r.humidity_pct)),
            Err(e) => {
                debug!("air sensor: {}", e);
                (None, None)
            }
        };

        SensorSnapshot {
            air_temperature_c,
            air_humidity_pct,
            rain_detected: self.rain.read(),
            light_pct: ok_or_log("light", self.light.read()),
            soil_moisture_pct: ok_or_log("soil moisture", self.soil_moisture.read()),
            tank_level_pct: ok_or_log("tank level", self.tank_level.read()),
            soil_temperature_c: ok_or_log("soil temperature", self.soil_temperature.read()),
        }
    }
}

fn ok_or_log<T>(name: &str, result: Result<T, SensorError>) -> Option<T> {
    result.inspect_err(|e| debug!("{} sensor: {}", name, e)).ok()
}
