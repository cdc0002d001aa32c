//! Result sinks: where progress lines and reported maxima go.

use std::fmt;
use std::io::Write;
use std::sync::Mutex;

use crate::report::LengthCount;
use crate::stage::Stage;

/// A line of user-facing output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Waiting(Stage),
    Finished(Stage),
    ArtifactCreated { name: String },
    MaxLength(LengthCount),
}

impl fmt::Display for SinkEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkEvent::Waiting(stage) => write!(f, "Waiting {stage}"),
            SinkEvent::Finished(stage) => write!(f, "Finished {stage}"),
            SinkEvent::ArtifactCreated { name } => write!(f, "{name} created successfully."),
            SinkEvent::MaxLength(LengthCount { length, count }) => {
                write!(f, "Words of length {length} were repeated {count} times.")
            }
        }
    }
}

pub trait ResultSink: Send + Sync {
    fn emit(&self, event: SinkEvent);
}

/// Writes one line per event to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ResultSink for ConsoleSink {
    fn emit(&self, event: SinkEvent) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = writeln!(out, "{event}") {
            tracing::warn!(error = %e, "Failed to write to stdout");
        }
    }
}

/// Collects events in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<SinkEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.events().iter().map(ToString::to_string).collect()
    }
}

impl ResultSink for MemorySink {
    fn emit(&self, event: SinkEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}
