//! Outbound application events.
//!
//! The [`IrrigationService`](super::service::IrrigationService) emits these
//! through the [`EventSink`](super::ports::EventSink) port. Adapters on the
//! other side decide what to do with them: flat log lines, JSON lines, or a
//! recorder in tests.

use crate::control::policy::Decision;

use super::telemetry::TelemetryRecord;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service has started; actuators are in their safe state.
    Started,

    /// One full control cycle completed.
    Cycle(TelemetryRecord),

    /// The decision differs from the previous cycle's.
    DecisionChanged { from: Decision, to: Decision },

    /// New sensor faults appeared (the full current bitmask).
    FaultDetected(u8),

    /// Every sensor fault has cleared.
    FaultCleared,
}
