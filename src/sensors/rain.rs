//! Rain detector (resistive plate + comparator module).
//!
//! The comparator output is a plain digital level on a GPIO input
//! configured by `hw_init`. HIGH = water on the plate.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the GPIO level via hw_init helpers.
//! On host/test: defaults to dry.

#[cfg(not(feature = "espidf"))]
use core::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature = "espidf")]
use crate::drivers::hw_init;

#[cfg(not(feature = "espidf"))]
static SIM_RAIN: AtomicBool = AtomicBool::new(false);

#[cfg(not(feature = "espidf"))]
pub fn sim_set_rain(detected: bool) {
    SIM_RAIN.store(detected, Ordering::Relaxed);
}

pub struct RainSensor {
    #[cfg_attr(not(feature = "espidf"), allow(dead_code))]
    gpio: i32,
}

impl RainSensor {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }

    #[cfg(feature = "espidf")]
    pub fn read(&self) -> bool {
        hw_init::gpio_read(self.gpio)
    }

    #[cfg(not(feature = "espidf"))]
    pub fn read(&self) -> bool {
        SIM_RAIN.load(Ordering::Relaxed)
    }
}
