//! Unified error types for the Irrigator firmware.
//!
//! All variants are `Copy` so they can be passed through the health
//! supervisor and the decision path without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// ADC read returned an error.
    AdcReadFailed,
    /// The sensor did not answer within its protocol timing window.
    Timeout,
    /// A digital frame was received but its checksum did not match.
    ChecksumMismatch,
    /// Reading is outside the physically plausible range.
    OutOfRange,
    /// A GPIO on the sensor's data line could not be driven or sampled.
    GpioFailed,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::Timeout => write!(f, "sensor timed out"),
            Self::ChecksumMismatch => write!(f, "checksum mismatch"),
            Self::OutOfRange => write!(f, "reading out of range"),
            Self::GpioFailed => write!(f, "GPIO access failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

/// Output writes are best-effort once running; these are logged, never
/// propagated past the hardware adapter. Only bring-up fails on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// Pump relay GPIO write failed.
    RelayWriteFailed,
    /// One of the indicator LED GPIO writes failed.
    IndicatorWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RelayWriteFailed => write!(f, "relay write failed"),
            Self::IndicatorWriteFailed => write!(f, "indicator write failed"),
        }
    }
}

impl core::error::Error for ActuatorError {}

// ---------------------------------------------------------------------------
// Sensor faults
// ---------------------------------------------------------------------------

/// Per-field sensor faults, accumulated in a bitmask by the health
/// supervisor so several unreadable channels can be reported at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SensorFault {
    AirTemperature = 0b0000_0001,
    AirHumidity = 0b0000_0010,
    Light = 0b0000_0100,
    SoilMoisture = 0b0000_1000,
    TankLevel = 0b0001_0000,
    SoilTemperature = 0b0010_0000,
}

impl SensorFault {
    pub const ALL: [Self; 6] = [
        Self::AirTemperature,
        Self::AirHumidity,
        Self::Light,
        Self::SoilMoisture,
        Self::TankLevel,
        Self::SoilTemperature,
    ];

    /// Return the bitmask for this fault.
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for SensorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AirTemperature => write!(f, "air temperature unreadable"),
            Self::AirHumidity => write!(f, "air humidity unreadable"),
            Self::Light => write!(f, "light level unreadable"),
            Self::SoilMoisture => write!(f, "soil moisture unreadable"),
            Self::TankLevel => write!(f, "tank level unreadable"),
            Self::SoilTemperature => write!(f, "soil thermistor at rail"),
        }
    }
}
