//! Application core — domain orchestration, zero I/O.
//!
//! The per-cycle pipeline (read → health → need/alert → decide → actuate →
//! emit) lives in [`service`]. All interaction with hardware happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
pub mod telemetry;
