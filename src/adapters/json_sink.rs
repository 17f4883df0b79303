//! JSON-lines event sink.
//!
//! Every [`AppEvent`] becomes one JSON object on its own line, tagged by
//! `"event"`. Cycle records carry every telemetry field; unreadable
//! readings serialize as `null`.

use std::io::Write;

use log::warn;
use serde::Serialize;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::app::telemetry::TelemetryRecord;
use crate::control::policy::Decision;

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Line<'a> {
    Started,
    Cycle(&'a TelemetryRecord),
    DecisionChanged { from: &'a Decision, to: &'a Decision },
    FaultDetected { flags: u8 },
    FaultCleared,
}

impl<'a> From<&'a AppEvent> for Line<'a> {
    fn from(event: &'a AppEvent) -> Self {
        match event {
            AppEvent::Started => Self::Started,
            AppEvent::Cycle(r) => Self::Cycle(r),
            AppEvent::DecisionChanged { from, to } => Self::DecisionChanged { from, to },
            AppEvent::FaultDetected(flags) => Self::FaultDetected { flags: *flags },
            AppEvent::FaultCleared => Self::FaultCleared,
        }
    }
}

pub struct JsonLineSink<W> {
    out: W,
}

impl<W: Write> JsonLineSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EventSink for JsonLineSink<W> {
    fn emit(&mut self, event: &AppEvent) {
        let line = match serde_json::to_string(&Line::from(event)) {
            Ok(line) => line,
            Err(e) => {
                warn!("telemetry encode failed: {}", e);
                return;
            }
        };
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|()| self.out.flush()) {
            warn!("telemetry write failed: {}", e);
        }
    }
}
