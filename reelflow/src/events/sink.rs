//! Event sink trait and implementations.

use super::WorkflowEvent;
use async_trait::async_trait;
use tracing::{debug, info, warn, Level};
use uuid::Uuid;

/// Trait for sinks that receive run transitions.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Emits an event asynchronously.
    async fn emit(&self, event: &WorkflowEvent);

    /// Emits an event without blocking.
    ///
    /// Must never panic; errors are logged and suppressed.
    fn try_emit(&self, event: &WorkflowEvent);
}

/// A no-op event sink that discards all events.
///
/// Used as the default when no sink is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: &WorkflowEvent) {}

    fn try_emit(&self, _event: &WorkflowEvent) {}
}

/// An event sink that logs events using the tracing framework.
///
/// Failures are always logged at warn level regardless of the configured
/// level.
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    level: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingEventSink {
    /// Creates a new logging event sink with the specified level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level logging sink.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    /// Creates an info-level logging sink.
    #[must_use]
    pub fn info() -> Self {
        Self::new(Level::INFO)
    }

    fn log_event(&self, event: &WorkflowEvent) {
        let event_type = event.event_type();
        let run_id = event.run_id();

        if let WorkflowEvent::StageFailed { stage, message, .. } = event {
            warn!(%run_id, %stage, event_type, error = %message, "Event: {}", event_type);
            return;
        }

        if self.level == Level::DEBUG {
            debug!(%run_id, event_type, progress = ?event.progress(), "Event: {}", event_type);
        } else {
            info!(%run_id, event_type, progress = ?event.progress(), "Event: {}", event_type);
        }
    }
}

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event: &WorkflowEvent) {
        self.log_event(event);
    }

    fn try_emit(&self, event: &WorkflowEvent) {
        self.log_event(event);
    }
}

/// A collecting event sink for testing purposes.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: parking_lot::RwLock<Vec<WorkflowEvent>>,
}

impl CollectingEventSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<WorkflowEvent> {
        self.events.read().clone()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Clears all collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }

    /// Returns events whose type starts with `type_prefix`.
    #[must_use]
    pub fn events_of_type(&self, type_prefix: &str) -> Vec<WorkflowEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.event_type().starts_with(type_prefix))
            .cloned()
            .collect()
    }

    /// Returns the events of one run, in emission order.
    #[must_use]
    pub fn events_for_run(&self, run_id: Uuid) -> Vec<WorkflowEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.run_id() == run_id)
            .cloned()
            .collect()
    }

    /// Returns the distinct progress values one run passed through.
    #[must_use]
    pub fn progress_trail(&self, run_id: Uuid) -> Vec<u8> {
        let mut trail: Vec<u8> = self
            .events_for_run(run_id)
            .iter()
            .filter_map(WorkflowEvent::progress)
            .collect();
        trail.dedup();
        trail
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event: &WorkflowEvent) {
        self.events.write().push(event.clone());
    }

    fn try_emit(&self, event: &WorkflowEvent) {
        self.events.write().push(event.clone());
    }
}
