//! Per-cycle telemetry record.
//!
//! One [`TelemetryRecord`] is produced every cycle and always carries every
//! field, whether or not the underlying sensor could be read. Sinks choose
//! the encoding: [`TelemetryRecord::facts`] yields the flat
//! `Category, Field, Value` form, and the record itself serializes to JSON.

use core::fmt::{self, Write as _};

use serde::{Serialize, Serializer};

use crate::control::need::{AlertLevel, IrrigationNeed};
use crate::control::policy::Reason;
use crate::control::snapshot::SensorSnapshot;

const SECS_PER_DAY: i64 = 86_400;

// ───────────────────────────────────────────────────────────────
// Wall clock
// ───────────────────────────────────────────────────────────────

/// Local time of day, `HH:MM:SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallClock {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl WallClock {
    /// Time of day for a Unix timestamp shifted by `utc_offset_secs`.
    pub fn from_epoch_secs(epoch_secs: i64, utc_offset_secs: i32) -> Self {
        let of_day = (epoch_secs + i64::from(utc_offset_secs)).rem_euclid(SECS_PER_DAY);
        Self {
            hours: (of_day / 3600) as u8,
            minutes: (of_day / 60 % 60) as u8,
            seconds: (of_day % 60) as u8,
        }
    }
}

impl fmt::Display for WallClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

impl Serialize for WallClock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s: heapless::String<8> = heapless::String::new();
        write!(s, "{}", self).map_err(|_| serde::ser::Error::custom("wall clock overflow"))?;
        serializer.serialize_str(&s)
    }
}

// ───────────────────────────────────────────────────────────────
// Record
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetryRecord {
    pub cycle: u64,
    /// `None` until network time is established.
    pub time: Option<WallClock>,
    pub air_temperature_c: Option<f32>,
    pub air_humidity_pct: Option<f32>,
    pub rain_detected: bool,
    pub light_pct: Option<u8>,
    pub soil_temperature_c: Option<f32>,
    pub soil_moisture_pct: Option<u8>,
    pub tank_level_pct: Option<u8>,
    /// `None` when soil moisture could not be read.
    pub need_pct: Option<IrrigationNeed>,
    pub alert: AlertLevel,
    pub irrigate: bool,
    pub reason: Reason,
    /// [`SensorFault`](crate::error::SensorFault) bitmask.
    pub sensor_faults: u8,
}

impl TelemetryRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cycle: u64,
        time: Option<WallClock>,
        snap: &SensorSnapshot,
        need: Option<IrrigationNeed>,
        alert: AlertLevel,
        irrigate: bool,
        reason: Reason,
        sensor_faults: u8,
    ) -> Self {
        Self {
            cycle,
            time,
            air_temperature_c: snap.air_temperature_c,
            air_humidity_pct: snap.air_humidity_pct,
            rain_detected: snap.rain_detected,
            light_pct: snap.light_pct,
            soil_temperature_c: snap.soil_temperature_c,
            soil_moisture_pct: snap.soil_moisture_pct,
            tank_level_pct: snap.tank_level_pct,
            need_pct: need,
            alert,
            irrigate,
            reason,
            sensor_faults,
        }
    }

    /// The record as flat `Category, Field, Value` facts, always
    /// [`FACT_COUNT`] of them in a fixed order.
    pub fn facts(&self) -> heapless::Vec<Fact, FACT_COUNT> {
        let mut out = heapless::Vec::new();
        let mut push = |category, field, value: FactValue| {
            // Capacity is FACT_COUNT and exactly that many are pushed.
            let _ = out.push(Fact::new(category, field, value));
        };

        push("System", "Cycle", FactValue::Count(self.cycle));
        push("System", "Time", FactValue::Clock(self.time));
        push("Ambient", "Temperature", FactValue::Celsius(self.air_temperature_c));
        push("Ambient", "Humidity", FactValue::PercentF(self.air_humidity_pct));
        push("Ambient", "Rain", FactValue::YesNo(self.rain_detected));
        push("Ambient", "Light", FactValue::Percent(self.light_pct));
        push("Soil", "Temperature", FactValue::Celsius(self.soil_temperature_c));
        push("Soil", "Moisture", FactValue::Percent(self.soil_moisture_pct));
        push("System", "Tank", FactValue::Percent(self.tank_level_pct));
        push("Calculation", "Need", FactValue::Percent(self.need_pct.map(IrrigationNeed::percent)));
        push("Calculation", "Alert", FactValue::Alert(self.alert));
        push("Decision", "Irrigate", FactValue::YesNo(self.irrigate));
        push("Decision", "Reason", FactValue::Reason(self.reason));
        out
    }
}

// ───────────────────────────────────────────────────────────────
// Flat facts
// ───────────────────────────────────────────────────────────────

pub const FACT_COUNT: usize = 13;

/// Rendered value column; wide enough for the longest reason text.
pub type FactText = heapless::String<40>;

/// One `Category, Field, Value` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fact {
    pub category: &'static str,
    pub field: &'static str,
    pub value: FactText,
}

enum FactValue {
    Count(u64),
    Clock(Option<WallClock>),
    Celsius(Option<f32>),
    PercentF(Option<f32>),
    Percent(Option<u8>),
    YesNo(bool),
    Alert(AlertLevel),
    Reason(Reason),
}

impl Fact {
    fn new(category: &'static str, field: &'static str, value: FactValue) -> Self {
        let mut text = FactText::new();
        // Every rendering below fits in FactText; a truncated value is
        // still better than a missing line.
        let _ = match value {
            FactValue::Count(n) => write!(text, "{}", n),
            FactValue::Clock(Some(t)) => write!(text, "{}", t),
            FactValue::Clock(None) => write!(text, "unavailable"),
            FactValue::Celsius(Some(c)) => write!(text, "{:.2} C", c),
            FactValue::PercentF(Some(p)) => write!(text, "{:.2} %", p),
            FactValue::Percent(Some(p)) => write!(text, "{} %", p),
            FactValue::Celsius(None) | FactValue::PercentF(None) | FactValue::Percent(None) => {
                write!(text, "invalid")
            }
            FactValue::YesNo(b) => write!(text, "{}", if b { "yes" } else { "no" }),
            FactValue::Alert(a) => write!(text, "{}", a),
            FactValue::Reason(r) => write!(text, "{}", r),
        };
        Self {
            category,
            field,
            value: text,
        }
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.category, self.field, self.value)
    }
}
