//! Mock adapters for integration tests.
//!
//! `MockHardware` replays scripted sensor snapshots and records every
//! actuator call so tests can assert on the full command history without
//! touching real GPIO/ADC registers.

use std::collections::VecDeque;

use irrigator::app::events::AppEvent;
use irrigator::app::ports::{ActuatorPort, ClockPort, EventSink, SensorPort};
use irrigator::app::telemetry::WallClock;
use irrigator::control::need::AlertLevel;
use irrigator::control::snapshot::SensorSnapshot;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    SetPump(bool),
    ShowAlert(AlertLevel),
    AllOff,
}

/// Every sensor readable, soil moist, no rain.
pub fn nominal() -> SensorSnapshot {
    SensorSnapshot {
        air_temperature_c: Some(22.0),
        air_humidity_pct: Some(55.0),
        rain_detected: false,
        light_pct: Some(20),
        soil_moisture_pct: Some(60),
        tank_level_pct: Some(70),
        soil_temperature_c: Some(18.5),
    }
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    script: VecDeque<SensorSnapshot>,
    current: SensorSnapshot,
    pub calls: Vec<ActuatorCall>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new(current: SensorSnapshot) -> Self {
        Self {
            script: VecDeque::new(),
            current,
            calls: Vec::new(),
        }
    }

    /// Queue snapshots for the next cycles. Once drained, the last one
    /// keeps being returned.
    pub fn script(&mut self, snaps: impl IntoIterator<Item = SensorSnapshot>) {
        self.script.extend(snaps);
    }

    pub fn pump_writes(&self) -> Vec<bool> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ActuatorCall::SetPump(on) => Some(*on),
                _ => None,
            })
            .collect()
    }

    pub fn pump_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::SetPump(on) => Some(*on),
                ActuatorCall::AllOff => Some(false),
                ActuatorCall::ShowAlert(_) => None,
            })
            .unwrap_or(false)
    }

    pub fn alerts(&self) -> Vec<AlertLevel> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ActuatorCall::ShowAlert(level) => Some(*level),
                _ => None,
            })
            .collect()
    }
}

impl SensorPort for MockHardware {
    fn read_all(&mut self) -> SensorSnapshot {
        if let Some(next) = self.script.pop_front() {
            self.current = next;
        }
        self.current
    }
}

impl ActuatorPort for MockHardware {
    fn set_pump(&mut self, on: bool) {
        self.calls.push(ActuatorCall::SetPump(on));
    }

    fn show_alert(&mut self, level: AlertLevel) {
        self.calls.push(ActuatorCall::ShowAlert(level));
    }

    fn all_off(&mut self) {
        self.calls.push(ActuatorCall::AllOff);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fault_events(&self) -> Vec<&AppEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::FaultDetected(_) | AppEvent::FaultCleared))
            .collect()
    }

    pub fn decision_changes(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::DecisionChanged { .. }))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── FixedClock ────────────────────────────────────────────────

#[derive(Default)]
pub struct FixedClock {
    pub uptime_ms: u64,
    pub time: Option<WallClock>,
}

impl ClockPort for FixedClock {
    fn uptime_ms(&self) -> u64 {
        self.uptime_ms
    }

    fn wall_clock(&self) -> Option<WallClock> {
        self.time
    }
}
