//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`], the pump relay and the indicator bank, exposing
//! them through [`SensorPort`] and [`ActuatorPort`]. This is the only
//! module in the system that touches actual hardware. On non-espidf
//! targets the sensors use cfg-gated simulation stubs, and the output pins
//! are whatever `embedded-hal` implementation the caller supplies.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::control::need::AlertLevel;
use crate::control::snapshot::SensorSnapshot;
use crate::drivers::indicator::IndicatorBank;
use crate::drivers::relay::PumpRelay;
use crate::sensors::SensorHub;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<P> {
    sensor_hub: SensorHub,
    relay: PumpRelay<P>,
    indicator: IndicatorBank<P>,
}

impl<P: OutputPin> HardwareAdapter<P> {
    pub fn new(sensor_hub: SensorHub, relay: PumpRelay<P>, indicator: IndicatorBank<P>) -> Self {
        Self {
            sensor_hub,
            relay,
            indicator,
        }
    }

    pub fn pump_on(&self) -> bool {
        self.relay.is_on()
    }

    pub fn shown_alert(&self) -> Option<AlertLevel> {
        self.indicator.shown()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<P: OutputPin> SensorPort for HardwareAdapter<P> {
    fn read_all(&mut self) -> SensorSnapshot {
        self.sensor_hub.read_all()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<P: OutputPin> ActuatorPort for HardwareAdapter<P> {
    fn set_pump(&mut self, on: bool) {
        if let Err(e) = self.relay.set(on) {
            warn!("pump relay: {}", e);
        }
    }

    fn show_alert(&mut self, level: AlertLevel) {
        if let Err(e) = self.indicator.show(level) {
            warn!("indicator ({}): {}", level, e);
        }
    }

    fn all_off(&mut self) {
        self.set_pump(false);
        if let Err(e) = self.indicator.clear() {
            warn!("indicator: {}", e);
        }
    }
}
