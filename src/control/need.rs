//! Irrigation need and its four-level alert mapping.

use core::fmt;

use serde::Serialize;

/// Irrigation urgency, the inverse of soil moisture. Always 0–100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct IrrigationNeed(u8);

impl IrrigationNeed {
    /// `need = 100 − soil_moisture_pct`. Moisture above 100 % is clamped.
    pub fn from_moisture(soil_moisture_pct: u8) -> Self {
        Self(100 - soil_moisture_pct.min(100))
    }

    pub fn percent(self) -> u8 {
        self.0
    }
}

impl fmt::Display for IrrigationNeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Discretised need driving the four-LED status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Critical,
    High,
    Moderate,
    Low,
}

impl AlertLevel {
    /// Indicator order, one output per level.
    pub const ALL: [Self; 4] = [Self::Critical, Self::High, Self::Moderate, Self::Low];

    /// Thresholds are checked high to low; the first match wins.
    pub fn for_need(need: IrrigationNeed) -> Self {
        match need.percent() {
            80.. => Self::Critical,
            50..=79 => Self::High,
            25..=49 => Self::Moderate,
            _ => Self::Low,
        }
    }

    /// Level to show when need cannot be computed (soil moisture
    /// unreadable). Unknown soil state is reported as the loudest level.
    pub fn for_unknown_need() -> Self {
        Self::Critical
    }

    /// Position of this level's output in [`AlertLevel::ALL`].
    pub fn index(self) -> usize {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Moderate => 2,
            Self::Low => 3,
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::High => write!(f, "high"),
            Self::Moderate => write!(f, "moderate"),
            Self::Low => write!(f, "low"),
        }
    }
}
