//! Sensor health supervisor.
//!
//! Runs every cycle on the fresh snapshot and keeps a bitmask of fields
//! that could not be read (see [`SensorFault`]). Only transitions are
//! logged: a fault is reported once when it appears and once when it
//! clears, not every cycle in between.
//!
//! The supervisor does not influence the decision. The engine applies its
//! own fail-safe rule to missing required fields; this is the reporting
//! side of the same condition.

use log::{error, info};

use crate::control::snapshot::{SensorSnapshot, plausible_percent};
use crate::error::SensorFault;

/// Fields the decision engine cannot run without.
pub const REQUIRED_FAULTS: u8 = SensorFault::AirTemperature.mask()
    | SensorFault::Light.mask()
    | SensorFault::SoilMoisture.mask()
    | SensorFault::TankLevel.mask();

#[derive(Debug, Default)]
pub struct SensorHealth {
    faults: u8,
}

impl SensorHealth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-evaluate every field against `snap`. Returns the updated mask.
    pub fn evaluate(&mut self, snap: &SensorSnapshot) -> u8 {
        self.eval_fault(
            SensorFault::AirTemperature,
            snap.plausible_air_temperature().is_none(),
        );
        self.eval_fault(
            SensorFault::AirHumidity,
            snap.plausible_air_humidity().is_none(),
        );
        self.eval_fault(SensorFault::Light, plausible_percent(snap.light_pct).is_none());
        self.eval_fault(
            SensorFault::SoilMoisture,
            plausible_percent(snap.soil_moisture_pct).is_none(),
        );
        self.eval_fault(
            SensorFault::TankLevel,
            plausible_percent(snap.tank_level_pct).is_none(),
        );
        self.eval_fault(
            SensorFault::SoilTemperature,
            snap.soil_temperature_c.is_none(),
        );
        self.faults
    }

    /// Current fault bitmask.
    pub fn faults(&self) -> u8 {
        self.faults
    }

    pub fn has_faults(&self) -> bool {
        self.faults != 0
    }

    pub fn has_fault(&self, fault: SensorFault) -> bool {
        self.faults & fault.mask() != 0
    }

    /// True if any field the decision engine needs is faulted.
    pub fn blocks_decision(&self) -> bool {
        self.faults & REQUIRED_FAULTS != 0
    }

    fn eval_fault(&mut self, fault: SensorFault, condition: bool) {
        if condition {
            if self.faults & fault.mask() == 0 {
                error!("SENSOR FAULT SET: {fault}");
            }
            self.faults |= fault.mask();
        } else {
            if self.faults & fault.mask() != 0 {
                info!("SENSOR FAULT CLEARED: {fault}");
            }
            self.faults &= !fault.mask();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy() -> SensorSnapshot {
        SensorSnapshot {
            air_temperature_c: Some(20.0),
            air_humidity_pct: Some(50.0),
            rain_detected: false,
            light_pct: Some(30),
            soil_moisture_pct: Some(40),
            tank_level_pct: Some(80),
            soil_temperature_c: Some(18.0),
        }
    }

    #[test]
    fn healthy_snapshot_has_no_faults() {
        let mut h = SensorHealth::new();
        assert_eq!(h.evaluate(&healthy()), 0);
        assert!(!h.has_faults());
    }

    #[test]
    fn missing_fields_set_their_bits() {
        let mut h = SensorHealth::new();
        let snap = SensorSnapshot {
            tank_level_pct: None,
            soil_temperature_c: None,
            ..healthy()
        };
        let mask = h.evaluate(&snap);
        assert_eq!(
            mask,
            SensorFault::TankLevel.mask() | SensorFault::SoilTemperature.mask()
        );
        assert!(h.blocks_decision());
    }

    #[test]
    fn informational_fault_does_not_block() {
        let mut h = SensorHealth::new();
        h.evaluate(&SensorSnapshot {
            air_humidity_pct: None,
            soil_temperature_c: None,
            ..healthy()
        });
        assert!(h.has_faults());
        assert!(!h.blocks_decision());
    }

    #[test]
    fn fault_clears_when_reading_returns() {
        let mut h = SensorHealth::new();
        h.evaluate(&SensorSnapshot {
            light_pct: None,
            ..healthy()
        });
        assert!(h.has_fault(SensorFault::Light));
        h.evaluate(&healthy());
        assert!(!h.has_fault(SensorFault::Light));
    }

    #[test]
    fn implausible_value_counts_as_fault() {
        let mut h = SensorHealth::new();
        h.evaluate(&SensorSnapshot {
            air_temperature_c: Some(f32::NAN),
            soil_moisture_pct: Some(140),
            ..healthy()
        });
        assert!(h.has_fault(SensorFault::AirTemperature));
        assert!(h.has_fault(SensorFault::SoilMoisture));
    }
}
