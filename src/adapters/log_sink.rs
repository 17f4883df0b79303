//! Log-based event sink adapters.
//!
//! [`LogEventSink`] writes every [`AppEvent`] through the `log` facade
//! (ESP-IDF logger on target, UART / USB-CDC in production). Cycle records
//! become one `Category, Field, Value` line per fact.
//!
//! [`TelemetrySink`] picks between this and the JSON-lines encoding from
//! [`TelemetryFormat`].

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::config::TelemetryFormat;

use super::json_sink::JsonLineSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Cycle(record) => {
                info!("---------------------------");
                for fact in record.facts() {
                    info!("{}", fact);
                }
            }
            AppEvent::DecisionChanged { from, to } => {
                info!(
                    "DECISION | irrigate={} ({}) -> irrigate={} ({})",
                    from.irrigate, from.reason, to.irrigate, to.reason
                );
            }
            AppEvent::FaultDetected(flags) => {
                info!("FAULT | detected, flags=0b{:08b}", flags);
            }
            AppEvent::FaultCleared => {
                info!("FAULT | all cleared");
            }
            AppEvent::Started => {
                info!("START | actuators safe");
            }
        }
    }
}

/// Telemetry sink selected by configuration.
pub enum TelemetrySink {
    Flat(LogEventSink),
    JsonLines(JsonLineSink<std::io::Stdout>),
}

impl TelemetrySink {
    pub fn for_format(format: TelemetryFormat) -> Self {
        match format {
            TelemetryFormat::Flat => Self::Flat(LogEventSink::new()),
            TelemetryFormat::JsonLines => Self::JsonLines(JsonLineSink::new(std::io::stdout())),
        }
    }
}

impl EventSink for TelemetrySink {
    fn emit(&mut self, event: &AppEvent) {
        match self {
            Self::Flat(sink) => sink.emit(event),
            Self::JsonLines(sink) => sink.emit(event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_selects_sink() {
        assert!(matches!(
            TelemetrySink::for_format(TelemetryFormat::Flat),
            TelemetrySink::Flat(_)
        ));
        assert!(matches!(
            TelemetrySink::for_format(TelemetryFormat::JsonLines),
            TelemetrySink::JsonLines(_)
        ));
    }
}
