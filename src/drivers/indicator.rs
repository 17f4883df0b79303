//! Four-LED alert indicator (red / orange / yellow / green).
//!
//! Exactly one LED is lit at a time. Every update first drives all four
//! low and only then raises the selected one, so no two LEDs are ever
//! lit together, not even between two writes.

use embedded_hal::digital::OutputPin;

use crate::control::need::AlertLevel;
use crate::error::ActuatorError;

pub struct IndicatorBank<P> {
    /// Indexed by [`AlertLevel::index`].
    leds: [P; 4],
    shown: Option<AlertLevel>,
}

impl<P: OutputPin> IndicatorBank<P> {
    /// `leds` in [`AlertLevel::ALL`] order: critical, high, moderate, low.
    pub fn new(leds: [P; 4]) -> Self {
        Self { leds, shown: None }
    }

    pub fn show(&mut self, level: AlertLevel) -> Result<(), ActuatorError> {
        self.clear()?;
        self.leds[level.index()]
            .set_high()
            .map_err(|_| ActuatorError::IndicatorWriteFailed)?;
        self.shown = Some(level);
        Ok(())
    }

    /// Turn every LED off.
    pub fn clear(&mut self) -> Result<(), ActuatorError> {
        self.shown = None;
        let mut result = Ok(());
        for led in &mut self.leds {
            if led.set_low().is_err() {
                result = Err(ActuatorError::IndicatorWriteFailed);
            }
        }
        result
    }

    pub fn shown(&self) -> Option<AlertLevel> {
        self.shown
    }
}
