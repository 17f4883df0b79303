//! Application service — the hexagonal core.
//!
//! [`IrrigationService`] owns the decision engine and the sensor health
//! supervisor. It exposes a clean, hardware-agnostic API. All I/O flows
//! through port traits injected at call sites, making the entire service
//! testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                 │    IrrigationService      │
//! ActuatorPort ◀──│  Health · Need · Engine   │ ◀── ClockPort
//!                 └──────────────────────────┘
//! ```
//!
//! A cycle never fails. Whatever the sensors return, the pump and the
//! indicator are written and a full telemetry record is emitted.

use log::{info, warn};

use crate::config::SystemConfig;
use crate::control::need::{AlertLevel, IrrigationNeed};
use crate::control::policy::{Decision, DecisionEngine};
use crate::control::snapshot::plausible_percent;
use crate::health::SensorHealth;

use super::events::AppEvent;
use super::ports::{ActuatorPort, ClockPort, EventSink, SensorPort};
use super::telemetry::TelemetryRecord;

// ───────────────────────────────────────────────────────────────
// IrrigationService
// ───────────────────────────────────────────────────────────────

pub struct IrrigationService {
    engine: DecisionEngine,
    health: SensorHealth,
    cycle_count: u64,
    /// Only used to report changes; never feeds back into the decision.
    last_decision: Option<Decision>,
}

impl IrrigationService {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            engine: DecisionEngine::new(config.policy),
            health: SensorHealth::new(),
            cycle_count: 0,
            last_decision: None,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Put the actuators in their safe state and announce startup.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        hw.all_off();
        sink.emit(&AppEvent::Started);
        info!("IrrigationService started");
    }

    /// Safe shutdown: pump off, indicator dark.
    pub fn stop(&mut self, hw: &mut impl ActuatorPort) {
        hw.all_off();
        info!("IrrigationService stopped after {} cycles", self.cycle_count);
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one full control cycle: read → health → need/alert → decide →
    /// actuate → emit.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`], which avoids a double mutable borrow while keeping
    /// the port boundary explicit.
    pub fn run_cycle(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) -> TelemetryRecord {
        self.cycle_count += 1;

        // 1. Acquire
        let snapshot = hw.read_all();

        // 2. Sensor health (reporting only)
        let prev_faults = self.health.faults();
        let faults = self.health.evaluate(&snapshot);
        if faults & !prev_faults != 0 {
            warn!("Sensor fault! flags=0b{:08b}", faults);
            sink.emit(&AppEvent::FaultDetected(faults));
        } else if prev_faults != 0 && faults == 0 {
            sink.emit(&AppEvent::FaultCleared);
        }

        // 3. Need → indicator
        let need = plausible_percent(snapshot.soil_moisture_pct).map(IrrigationNeed::from_moisture);
        let alert = need.map_or_else(AlertLevel::for_unknown_need, AlertLevel::for_need);
        hw.show_alert(alert);

        // 4. Decide → pump, unconditionally every cycle
        let decision = self.engine.evaluate(&snapshot);
        hw.set_pump(decision.irrigate);

        if let Some(prev) = self.last_decision.filter(|p| *p != decision) {
            info!(
                "Decision: {} ({}) -> {} ({})",
                on_off(prev.irrigate),
                prev.reason,
                on_off(decision.irrigate),
                decision.reason
            );
            sink.emit(&AppEvent::DecisionChanged {
                from: prev,
                to: decision,
            });
        }
        self.last_decision = Some(decision);

        // 5. Telemetry
        let record = TelemetryRecord::new(
            self.cycle_count,
            clock.wall_clock(),
            &snapshot,
            need,
            alert,
            decision.irrigate,
            decision.reason,
            faults,
        );
        sink.emit(&AppEvent::Cycle(record));
        record
    }

    // ── Queries ───────────────────────────────────────────────

    /// Total control cycles executed since startup.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    /// Current sensor fault bitmask (0 = all readable).
    pub fn sensor_faults(&self) -> u8 {
        self.health.faults()
    }

    pub fn last_decision(&self) -> Option<Decision> {
        self.last_decision
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "OFF" }
}
