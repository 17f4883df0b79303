//! Ratiometric ADC channels mapped onto 0–100 %.
//!
//! Soil moisture, tank level and ambient light are all plain voltage
//! dividers; each reading is a linear map of the raw code over the ADC's
//! full scale, clamped to [0, 100]. The LDR divider reads high in the dark,
//! so the light channel is inverted.

use crate::drivers::hw_init;
use crate::error::SensorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// 0 → 0 %, full scale → 100 %.
    Direct,
    /// 0 → 100 %, full scale → 0 %.
    Inverted,
}

pub struct PercentChannel {
    adc_channel: u32,
    full_scale: u16,
    polarity: Polarity,
}

impl PercentChannel {
    pub fn new(adc_channel: u32, full_scale: u16, polarity: Polarity) -> Self {
        Self {
            adc_channel,
            full_scale: full_scale.max(1),
            polarity,
        }
    }

    pub fn read(&self) -> Result<u8, SensorError> {
        let raw = hw_init::adc1_read(self.adc_channel).ok_or(SensorError::AdcReadFailed)?;
        Ok(self.to_percent(raw))
    }

    /// Integer linear map, truncating like the Arduino `map()` helper.
    pub fn to_percent(&self, raw: u16) -> u8 {
        let direct = (u32::from(raw) * 100 / u32::from(self.full_scale)).min(100) as u8;
        match self.polarity {
            Polarity::Direct => direct,
            Polarity::Inverted => 100 - direct,
        }
    }
}
