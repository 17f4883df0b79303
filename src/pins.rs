//! GPIO / peripheral pin assignments for the Irrigator controller board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.
//!
//! Target is the original ESP32 (WROOM-32); ADC1 channel numbers below are
//! that chip's GPIO→channel mapping.

// ---------------------------------------------------------------------------
// Actuators
// ---------------------------------------------------------------------------

/// Pump relay coil driver input.
pub const RELAY_GPIO: i32 = 18;

// ---------------------------------------------------------------------------
// Status indicator (four discrete LEDs, one lit at a time)
// ---------------------------------------------------------------------------

pub const LED_CRITICAL_GPIO: i32 = 13; // red
pub const LED_HIGH_GPIO: i32 = 12; // orange
pub const LED_MODERATE_GPIO: i32 = 27; // yellow
pub const LED_LOW_GPIO: i32 = 25; // green

// ---------------------------------------------------------------------------
// Sensors — Digital
// ---------------------------------------------------------------------------

/// DHT22 single-wire data line (open-drain, external pull-up).
pub const DHT_GPIO: i32 = 26;
/// Rain sensor comparator output. HIGH = rain.
pub const RAIN_GPIO: i32 = 14;

// ---------------------------------------------------------------------------
// Sensors — Analog (ADC1, 12-bit, 12 dB attenuation)
// ---------------------------------------------------------------------------

/// Capacitive soil moisture sensor, GPIO32.
pub const SOIL_MOISTURE_ADC_CH: u32 = 4;
/// Tank level float potentiometer, GPIO33.
pub const TANK_LEVEL_ADC_CH: u32 = 5;
/// LDR divider, GPIO34. Reads high in darkness.
pub const LIGHT_ADC_CH: u32 = 6;
/// Soil NTC thermistor divider, GPIO35.
pub const SOIL_NTC_ADC_CH: u32 = 7;

/// Every ADC1 channel the firmware samples.
pub const ADC1_CHANNELS: [u32; 4] = [
    SOIL_MOISTURE_ADC_CH,
    TANK_LEVEL_ADC_CH,
    LIGHT_ADC_CH,
    SOIL_NTC_ADC_CH,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digital_assignments_are_distinct() {
        let gpios = [
            RELAY_GPIO,
            LED_CRITICAL_GPIO,
            LED_HIGH_GPIO,
            LED_MODERATE_GPIO,
            LED_LOW_GPIO,
            DHT_GPIO,
            RAIN_GPIO,
        ];
        for (i, a) in gpios.iter().enumerate() {
            assert!(!gpios[i + 1..].contains(a), "GPIO{} assigned twice", a);
        }
    }

    #[test]
    fn adc_channels_are_distinct() {
        for (i, ch) in ADC1_CHANNELS.iter().enumerate() {
            assert!(!ADC1_CHANNELS[i + 1..].contains(ch), "ADC1 channel {} assigned twice", ch);
        }
    }
}
