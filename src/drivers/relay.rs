//! Pump relay driver.
//!
//! A single digital output switches the relay coil. Some relay boards are
//! active-low, so polarity is configured at construction and callers only
//! ever say on or off.
//!
//! Construction drives the coil OFF, so an active-low board whose pin
//! comes up low never runs the pump before the first cycle. The output is
//! rewritten on every call even when the commanded state has not changed;
//! a glitched pin is corrected by the next cycle.

use embedded_hal::digital::OutputPin;

use crate::error::ActuatorError;

pub struct PumpRelay<P> {
    pin: P,
    active_low: bool,
    on: bool,
}

impl<P: OutputPin> PumpRelay<P> {
    /// Take the pin and immediately drive the relay OFF.
    pub fn new(pin: P, active_low: bool) -> Result<Self, ActuatorError> {
        let mut relay = Self {
            pin,
            active_low,
            on: false,
        };
        relay.set(false)?;
        Ok(relay)
    }

    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        let drive_high = on != self.active_low;
        let res = if drive_high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        res.map_err(|_| ActuatorError::RelayWriteFailed)?;
        self.on = on;
        Ok(())
    }

    /// Last successfully commanded state.
    pub fn is_on(&self) -> bool {
        self.on
    }
}
