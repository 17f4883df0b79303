//! One-shot hardware peripheral initialization.
//!
//! Configures the ADC1 oneshot unit and the raw GPIO inputs using
//! ESP-IDF sys calls. Called once from `main()` before the control loop
//! starts. Output pins (relay, indicator LEDs) and the DHT22 data line are
//! owned by `esp-idf-hal` pin drivers instead, so the drivers can stay
//! generic over `embedded-hal` traits.
//!
//! On host targets the ADC is simulated: every channel reads a value set
//! with [`sim_set_adc`], and [`sim_fail_adc`] makes a channel report a
//! read error.

#[cfg(feature = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(feature = "espidf")]
use log::info;

#[cfg(feature = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

#[cfg(feature = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_adc()?;
        init_gpio_inputs()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(feature = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(feature = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// control-loop read path. `init_adc()` completes before the loop starts.
#[cfg(feature = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(feature = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    // 12 dB attenuation covers the full 0–3.3 V divider swing.
    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };

    for channel in pins::ADC1_CHANNELS {
        let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), channel, &chan_cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::AdcInitFailed(ret));
        }
    }

    info!("hw_init: ADC1 configured (CH4=soil, CH5=tank, CH6=light, CH7=ntc)");
    Ok(())
}

/// Read one ADC1 channel. `None` if the driver reports an error.
#[cfg(feature = "espidf")]
pub fn adc1_read(channel: u32) -> Option<u16> {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract — single-threaded control-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return None;
    }
    Some(raw.max(0) as u16)
}

#[cfg(not(feature = "espidf"))]
mod sim {
    use core::sync::atomic::{AtomicU16, Ordering};

    const CHANNELS: usize = 10;

    static SIM_ADC: [AtomicU16; CHANNELS] = [const { AtomicU16::new(2048) }; CHANNELS];
    static SIM_ADC_FAILED: AtomicU16 = AtomicU16::new(0);

    fn bit(channel: u32) -> Option<u16> {
        ((channel as usize) < CHANNELS).then(|| 1u16 << channel)
    }

    pub fn set(channel: u32, raw: u16) {
        let Some(mask) = bit(channel) else { return };
        SIM_ADC[channel as usize].store(raw, Ordering::Relaxed);
        SIM_ADC_FAILED.fetch_and(!mask, Ordering::Relaxed);
    }

    pub fn fail(channel: u32) {
        if let Some(mask) = bit(channel) {
            SIM_ADC_FAILED.fetch_or(mask, Ordering::Relaxed);
        }
    }

    pub fn read(channel: u32) -> Option<u16> {
        let mask = bit(channel)?;
        if SIM_ADC_FAILED.load(Ordering::Relaxed) & mask != 0 {
            return None;
        }
        Some(SIM_ADC[channel as usize].load(Ordering::Relaxed))
    }
}

/// Inject a raw ADC code for `channel` (clears any injected failure).
#[cfg(not(feature = "espidf"))]
pub fn sim_set_adc(channel: u32, raw: u16) {
    sim::set(channel, raw);
}

/// Make `channel` report a read error until the next [`sim_set_adc`].
#[cfg(not(feature = "espidf"))]
pub fn sim_fail_adc(channel: u32) {
    sim::fail(channel);
}

#[cfg(not(feature = "espidf"))]
pub fn adc1_read(channel: u32) -> Option<u16> {
    sim::read(channel)
}

// ── GPIO Inputs ───────────────────────────────────────────────

#[cfg(feature = "espidf")]
unsafe fn init_gpio_inputs() -> Result<(), HwInitError> {
    // Rain module drives a push-pull comparator output; no pull needed.
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::RAIN_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }

    info!("hw_init: GPIO inputs configured");
    Ok(())
}

#[cfg(feature = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin; safe to call from main context.
    (unsafe { gpio_get_level(pin) }) != 0
}
