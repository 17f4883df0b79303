//! Irrigation decision engine.
//!
//! An ordered-priority rule list: rules are evaluated top to bottom and the
//! first one that matches decides both whether to irrigate and why. No rule
//! below a match is consulted.
//!
//! | # | Condition                                   | Irrigate | Reason             |
//! |---|---------------------------------------------|----------|--------------------|
//! | 0 | a required reading is missing / implausible | no       | `SensorFault`      |
//! | 1 | rain detected                               | no       | `RainDetected`     |
//! | 2 | tank < `tank_minimum_pct`                   | no       | `TankEmpty`        |
//! | 3 | air < `cold_threshold_c`                    | no       | `ColdProtection`   |
//! | 4 | air > `heat_threshold_c` ∧ soil < `aux_humidity_pct` | yes | `ThermalAssist` |
//! | 5a| soil < `dry_threshold_pct` ∧ light < `max_light_pct` | yes | `DrySoilLightOk` |
//! | 5b| soil < `dry_threshold_pct`                  | no       | `WaitingHighLight` |
//! | 6 | otherwise                                   | no       | `MoistureAdequate` |

use core::fmt;

use serde::{Deserialize, Serialize};

use super::snapshot::{SensorSnapshot, plausible_percent};
use crate::app::ports::ConfigError;

// ───────────────────────────────────────────────────────────────
// Policy thresholds
// ───────────────────────────────────────────────────────────────

/// Every threshold the decision engine consults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IrrigationPolicy {
    /// Soil moisture below which the soil counts as dry (%).
    pub dry_threshold_pct: u8,
    /// Soil moisture below which thermal-assist irrigation may run (%).
    pub aux_humidity_pct: u8,
    /// Air temperature below which irrigation is suppressed (°C).
    pub cold_threshold_c: f32,
    /// Air temperature above which thermal-assist irrigation may run (°C).
    pub heat_threshold_c: f32,
    /// Ambient light at or above which dry-soil irrigation waits (%).
    pub max_light_pct: u8,
    /// Tank level below which the pump must not run (%).
    pub tank_minimum_pct: u8,
}

impl Default for IrrigationPolicy {
    fn default() -> Self {
        Self {
            dry_threshold_pct: 30,
            aux_humidity_pct: 50,
            cold_threshold_c: 10.0,
            heat_threshold_c: 35.0,
            max_light_pct: 40,
            tank_minimum_pct: 10,
        }
    }
}

impl IrrigationPolicy {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let percents = [
            (self.dry_threshold_pct, "dry_threshold_pct must be 0–100"),
            (self.aux_humidity_pct, "aux_humidity_pct must be 0–100"),
            (self.max_light_pct, "max_light_pct must be 0–100"),
            (self.tank_minimum_pct, "tank_minimum_pct must be 0–100"),
        ];
        for (value, msg) in percents {
            if value > 100 {
                return Err(ConfigError::ValidationFailed(msg));
            }
        }
        if !self.cold_threshold_c.is_finite() || !self.heat_threshold_c.is_finite() {
            return Err(ConfigError::ValidationFailed(
                "temperature thresholds must be finite",
            ));
        }
        if self.cold_threshold_c >= self.heat_threshold_c {
            return Err(ConfigError::ValidationFailed(
                "cold_threshold_c must be below heat_threshold_c",
            ));
        }
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Decision
// ───────────────────────────────────────────────────────────────

/// Why the engine decided what it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    SensorFault,
    RainDetected,
    TankEmpty,
    ColdProtection,
    ThermalAssist,
    DrySoilLightOk,
    WaitingHighLight,
    MoistureAdequate,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SensorFault => write!(f, "sensor fault"),
            Self::RainDetected => write!(f, "rain detected"),
            Self::TankEmpty => write!(f, "tank empty"),
            Self::ColdProtection => write!(f, "cold protection"),
            Self::ThermalAssist => write!(f, "thermal assist"),
            Self::DrySoilLightOk => write!(f, "dry soil, light ok"),
            Self::WaitingHighLight => write!(f, "dry soil, waiting for lower light"),
            Self::MoistureAdequate => write!(f, "moisture adequate"),
        }
    }
}

/// One cycle's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub irrigate: bool,
    pub reason: Reason,
}

impl Decision {
    const fn irrigate(reason: Reason) -> Self {
        Self { irrigate: true, reason }
    }

    const fn hold(reason: Reason) -> Self {
        Self { irrigate: false, reason }
    }
}

// ───────────────────────────────────────────────────────────────
// Rules
// ───────────────────────────────────────────────────────────────

/// The required inputs, already checked for presence and plausibility.
#[derive(Debug, Clone, Copy)]
struct Readings {
    rain_detected: bool,
    air_temperature_c: f32,
    soil_moisture_pct: u8,
    tank_level_pct: u8,
    light_pct: u8,
}

impl Readings {
    fn from_snapshot(snap: &SensorSnapshot) -> Option<Self> {
        Some(Self {
            rain_detected: snap.rain_detected,
            air_temperature_c: snap.plausible_air_temperature()?,
            soil_moisture_pct: plausible_percent(snap.soil_moisture_pct)?,
            tank_level_pct: plausible_percent(snap.tank_level_pct)?,
            light_pct: plausible_percent(snap.light_pct)?,
        })
    }
}

type Rule = fn(&IrrigationPolicy, &Readings) -> Option<Decision>;

const RULES: [Rule; 6] = [
    rain_override,
    tank_protection,
    cold_protection,
    thermal_assist,
    dry_soil,
    moisture_adequate,
];

fn rain_override(_: &IrrigationPolicy, r: &Readings) -> Option<Decision> {
    r.rain_detected.then_some(Decision::hold(Reason::RainDetected))
}

fn tank_protection(p: &IrrigationPolicy, r: &Readings) -> Option<Decision> {
    (r.tank_level_pct < p.tank_minimum_pct).then_some(Decision::hold(Reason::TankEmpty))
}

fn cold_protection(p: &IrrigationPolicy, r: &Readings) -> Option<Decision> {
    (r.air_temperature_c < p.cold_threshold_c).then_some(Decision::hold(Reason::ColdProtection))
}

fn thermal_assist(p: &IrrigationPolicy, r: &Readings) -> Option<Decision> {
    (r.air_temperature_c > p.heat_threshold_c && r.soil_moisture_pct < p.aux_humidity_pct)
        .then_some(Decision::irrigate(Reason::ThermalAssist))
}

fn dry_soil(p: &IrrigationPolicy, r: &Readings) -> Option<Decision> {
    if r.soil_moisture_pct >= p.dry_threshold_pct {
        return None;
    }
    if r.light_pct < p.max_light_pct {
        Some(Decision::irrigate(Reason::DrySoilLightOk))
    } else {
        Some(Decision::hold(Reason::WaitingHighLight))
    }
}

fn moisture_adequate(_: &IrrigationPolicy, _: &Readings) -> Option<Decision> {
    Some(Decision::hold(Reason::MoistureAdequate))
}

// ───────────────────────────────────────────────────────────────
// Engine
// ───────────────────────────────────────────────────────────────

/// Stateless evaluator bound to one policy.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    policy: IrrigationPolicy,
}

impl DecisionEngine {
    pub fn new(policy: IrrigationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &IrrigationPolicy {
        &self.policy
    }

    /// Map one snapshot to exactly one decision. Pure and total.
    pub fn evaluate(&self, snap: &SensorSnapshot) -> Decision {
        let Some(readings) = Readings::from_snapshot(snap) else {
            return Decision::hold(Reason::SensorFault);
        };
        RULES
            .iter()
            .find_map(|rule| rule(&self.policy, &readings))
            .unwrap_or(Decision::hold(Reason::MoistureAdequate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nominal() -> SensorSnapshot {
        SensorSnapshot {
            air_temperature_c: Some(20.0),
            air_humidity_pct: Some(55.0),
            rain_detected: false,
            light_pct: Some(20),
            soil_moisture_pct: Some(60),
            tank_level_pct: Some(50),
            soil_temperature_c: Some(18.0),
        }
    }

    fn decide(snap: SensorSnapshot) -> Decision {
        DecisionEngine::new(IrrigationPolicy::default()).evaluate(&snap)
    }

    #[test]
    fn rain_beats_empty_tank_and_dry_soil() {
        let d = decide(SensorSnapshot {
            rain_detected: true,
            tank_level_pct: Some(0),
            soil_moisture_pct: Some(0),
            ..nominal()
        });
        assert_eq!(d, Decision::hold(Reason::RainDetected));
    }

    #[test]
    fn low_tank_blocks_irrigation_regardless_of_moisture() {
        for moisture in [0, 20, 45, 90] {
            let d = decide(SensorSnapshot {
                tank_level_pct: Some(5),
                soil_moisture_pct: Some(moisture),
                ..nominal()
            });
            assert_eq!(d, Decision::hold(Reason::TankEmpty));
        }
    }

    #[test]
    fn cold_air_blocks_irrigation() {
        let d = decide(SensorSnapshot {
            air_temperature_c: Some(4.0),
            soil_moisture_pct: Some(5),
            ..nominal()
        });
        assert_eq!(d, Decision::hold(Reason::ColdProtection));
    }

    #[test]
    fn heat_with_moderate_moisture_triggers_thermal_assist() {
        let d = decide(SensorSnapshot {
            air_temperature_c: Some(40.0),
            soil_moisture_pct: Some(40),
            ..nominal()
        });
        assert_eq!(d, Decision::irrigate(Reason::ThermalAssist));
    }

    #[test]
    fn heat_with_moist_soil_is_adequate() {
        let d = decide(SensorSnapshot {
            air_temperature_c: Some(40.0),
            soil_moisture_pct: Some(55),
            ..nominal()
        });
        assert_eq!(d, Decision::hold(Reason::MoistureAdequate));
    }

    #[test]
    fn dry_soil_in_low_light_irrigates() {
        let d = decide(SensorSnapshot {
            soil_moisture_pct: Some(20),
            light_pct: Some(20),
            ..nominal()
        });
        assert_eq!(d, Decision::irrigate(Reason::DrySoilLightOk));
    }

    #[test]
    fn dry_soil_in_strong_light_waits() {
        let d = decide(SensorSnapshot {
            soil_moisture_pct: Some(20),
            light_pct: Some(60),
            ..nominal()
        });
        assert_eq!(d, Decision::hold(Reason::WaitingHighLight));
    }

    #[test]
    fn light_at_threshold_waits() {
        let d = decide(SensorSnapshot {
            soil_moisture_pct: Some(20),
            light_pct: Some(40),
            ..nominal()
        });
        assert_eq!(d.reason, Reason::WaitingHighLight);
    }

    #[test]
    fn moist_soil_is_adequate() {
        assert_eq!(decide(nominal()), Decision::hold(Reason::MoistureAdequate));
    }

    #[test]
    fn threshold_edges_are_exclusive() {
        // Exactly at each threshold the strict comparison does not fire.
        let d = decide(SensorSnapshot {
            tank_level_pct: Some(10),
            air_temperature_c: Some(10.0),
            soil_moisture_pct: Some(30),
            ..nominal()
        });
        assert_eq!(d, Decision::hold(Reason::MoistureAdequate));

        let d = decide(SensorSnapshot {
            air_temperature_c: Some(35.0),
            soil_moisture_pct: Some(40),
            ..nominal()
        });
        assert_eq!(d, Decision::hold(Reason::MoistureAdequate));
    }

    #[test]
    fn missing_air_temperature_is_a_sensor_fault() {
        let d = decide(SensorSnapshot {
            air_temperature_c: None,
            ..nominal()
        });
        assert_eq!(d, Decision::hold(Reason::SensorFault));
    }

    #[test]
    fn nan_air_temperature_is_a_sensor_fault_even_when_raining() {
        let d = decide(SensorSnapshot {
            air_temperature_c: Some(f32::NAN),
            rain_detected: true,
            ..nominal()
        });
        assert_eq!(d, Decision::hold(Reason::SensorFault));
    }

    #[test]
    fn missing_percent_channels_are_sensor_faults() {
        let cases = [
            SensorSnapshot { soil_moisture_pct: None, ..nominal() },
            SensorSnapshot { tank_level_pct: None, ..nominal() },
            SensorSnapshot { light_pct: None, ..nominal() },
            SensorSnapshot { tank_level_pct: Some(101), ..nominal() },
        ];
        for snap in cases {
            assert_eq!(decide(snap).reason, Reason::SensorFault);
        }
    }

    #[test]
    fn humidity_and_soil_temperature_are_not_required() {
        let d = decide(SensorSnapshot {
            air_humidity_pct: None,
            soil_temperature_c: None,
            ..nominal()
        });
        assert_eq!(d.reason, Reason::MoistureAdequate);
    }

    #[test]
    fn custom_policy_thresholds_are_honoured() {
        let policy = IrrigationPolicy {
            dry_threshold_pct: 70,
            max_light_pct: 90,
            ..IrrigationPolicy::default()
        };
        let d = DecisionEngine::new(policy).evaluate(&SensorSnapshot {
            soil_moisture_pct: Some(60),
            light_pct: Some(80),
            ..nominal()
        });
        assert_eq!(d, Decision::irrigate(Reason::DrySoilLightOk));
    }

    #[test]
    fn policy_validation() {
        assert!(IrrigationPolicy::default().validate().is_ok());
        let inverted = IrrigationPolicy {
            cold_threshold_c: 40.0,
            ..IrrigationPolicy::default()
        };
        assert!(inverted.validate().is_err());
        let over = IrrigationPolicy {
            max_light_pct: 101,
            ..IrrigationPolicy::default()
        };
        assert!(over.validate().is_err());
    }
}
