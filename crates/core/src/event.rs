//! Domain events and action logging.
//!
//! Executors report progress through an injected [`LogSink`] rather than a
//! process-wide emitter, so each session (and each test) captures only its
//! own entries. [`EventBus`] is the broadcast-backed sink used by the CLI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Severity of an action log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Error,
    Success,
}

/// One line of progress reported by an executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogMessage {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub level: LogLevel,
    /// Which executor produced the entry (e.g. "wrap").
    pub source: String,
}

impl LogMessage {
    pub fn new(source: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
            level,
            source: source.into(),
        }
    }
}

/// Destination for action logs. Emission is best-effort and must never
/// fail the caller.
pub trait LogSink: Send + Sync {
    fn emit(&self, entry: LogMessage);
}

/// Sink that keeps entries in memory, for tests and post-run inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogMessage>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogMessage> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl LogSink for MemorySink {
    fn emit(&self, entry: LogMessage) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }
}

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// An executor logged progress
    ActionLogged(LogMessage),

    /// The orchestrator started driving a planned step
    StepStarted {
        index: usize,
        agent: String,
        timestamp: DateTime<Utc>,
    },

    /// A step reached completion (with or without an executor)
    StepCompleted {
        index: usize,
        agent: String,
        success: bool,
        timestamp: DateTime<Utc>,
    },

    /// An error aborted the current plan
    ErrorOccurred {
        context: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
/// Components can subscribe to receive all events and filter for what they care about.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // Ignore send errors (no subscribers = that's fine)
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl LogSink for EventBus {
    fn emit(&self, entry: LogMessage) {
        self.publish(DomainEvent::ActionLogged(entry));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(DomainEvent::StepStarted {
            index: 0,
            agent: "stake_agent".into(),
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            DomainEvent::StepStarted { index, agent, .. } => {
                assert_eq!(*index, 0);
                assert_eq!(agent, "stake_agent");
            }
            _ => panic!("Expected StepStarted event"),
        }
    }

    #[tokio::test]
    async fn event_bus_is_a_log_sink() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.emit(LogMessage::new("wrap", LogLevel::Success, "Created attestation"));

        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            DomainEvent::ActionLogged(entry) => {
                assert_eq!(entry.source, "wrap");
                assert_eq!(entry.level, LogLevel::Success);
            }
            _ => panic!("Expected ActionLogged event"),
        }
    }

    #[test]
    fn event_bus_no_subscribers_doesnt_panic() {
        let bus = EventBus::new(16);
        bus.emit(LogMessage::new("stake", LogLevel::Info, "no subscribers"));
    }

    #[test]
    fn memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.emit(LogMessage::new("wrap", LogLevel::Info, "first"));
        sink.emit(LogMessage::new("wrap", LogLevel::Error, "second"));

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "first");
        assert_eq!(entries[1].level, LogLevel::Error);
    }
}
