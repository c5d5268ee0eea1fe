use std::collections::VecDeque;

use super::event::TelemetryEvent;
use super::metrics::{compute_snapshot, TelemetrySnapshot};

const MAX_EVENTS: usize = 10_000;

#[derive(Debug)]
pub struct TelemetryRecorder {
    buffer: VecDeque<TelemetryEvent>,
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryRecorder {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::with_capacity(64),
        }
    }

    pub fn record(&mut self, event: TelemetryEvent) {
        if self.buffer.len() >= MAX_EVENTS {
            self.buffer.pop_front();
        }
        self.buffer.push_back(event);
    }

    pub fn events(&self) -> impl Iterator<Item = &TelemetryEvent> {
        self.buffer.iter()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        // Delegate to pure functional metrics module
        compute_snapshot(&self.buffer)
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
