//! Irrigator firmware library.
//!
//! Exposes the pure-logic modules for integration testing and host-side
//! simulation. All ESP-IDF-specific code is guarded by
//! `#[cfg(feature = "espidf")]` within each module, the same feature that
//! pulls in the ESP-IDF crates. Without it every driver uses its host
//! simulation backend.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod health;
pub mod pins;
pub mod scheduler;

pub mod adapters;
pub mod drivers;
pub mod sensors;

// Host-side critical-section implementation for embassy-sync in unit tests.
#[cfg(all(test, not(target_os = "espidf")))]
use critical_section as _;
