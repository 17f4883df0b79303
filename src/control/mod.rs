//! Control core — pure functions of one cycle's readings.
//!
//! Nothing in here touches hardware or keeps state between cycles.

pub mod need;
pub mod policy;
pub mod snapshot;
