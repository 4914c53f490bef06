use std::sync::Mutex;
use tokio::sync::mpsc;

use vidsage_types::RelayEvent;

/// Receiver of fire-and-forget progress events for one request
///
/// Delivery is best effort: implementations must not block and a dropped
/// receiver never fails the request.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: RelayEvent);
}

impl ProgressSink for mpsc::UnboundedSender<RelayEvent> {
    fn emit(&self, event: RelayEvent) {
        if let Err(e) = self.send(event) {
            tracing::debug!(action = e.0.action(), "Progress receiver gone, event dropped");
        }
    }
}

impl ProgressSink for mpsc::Sender<RelayEvent> {
    fn emit(&self, event: RelayEvent) {
        if let Err(e) = self.try_send(event) {
            tracing::debug!("Progress event dropped: {}", e);
        }
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn emit(&self, _event: RelayEvent) {}
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<RelayEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RelayEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Step labels of the `processingStatusUpdate` events, in order
    pub fn steps(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RelayEvent::ProcessingStatusUpdate { step, .. } => Some(step),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: RelayEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
