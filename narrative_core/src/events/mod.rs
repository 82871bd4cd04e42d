//! Narrative events and the observers that receive them.
//!
//! Telemetry sinks and milestone schedulers implement [`NarrativeObserver`] and
//! are handed to the controller when it is built. Notification is one-way:
//! the controller logs an observer's failure and carries on.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;
use uuid::Uuid;

use story_graph::StateMap;

/// Identifies one playthrough. Every event a controller emits carries it, and
/// it is regenerated only when a new controller is built, not on `reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Something that happened during traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NarrativeEvent {
    /// A choice was taken. Sent before the matching `NodeEntered` or `SentinelReached`.
    ChoiceSelected {
        session: SessionId,
        node_id: String,
        choice: String,
        target: String,
    },

    /// The controller arrived at a node.
    NodeEntered {
        session: SessionId,
        node_id: String,
        /// Zero-based position of the node in the history.
        step: usize,
        is_terminal: bool,
    },

    /// A choice led to a target handled outside the engine.
    SentinelReached {
        session: SessionId,
        from: String,
        sentinel: String,
        state: StateMap,
    },

    /// The session went back to the start node with fresh state.
    SessionReset { session: SessionId, start: String },
}

impl NarrativeEvent {
    pub fn session(&self) -> SessionId {
        match self {
            NarrativeEvent::ChoiceSelected { session, .. }
            | NarrativeEvent::NodeEntered { session, .. }
            | NarrativeEvent::SentinelReached { session, .. }
            | NarrativeEvent::SessionReset { session, .. } => *session,
        }
    }

    /// Short event name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            NarrativeEvent::ChoiceSelected { .. } => "choice_selected",
            NarrativeEvent::NodeEntered { .. } => "node_entered",
            NarrativeEvent::SentinelReached { .. } => "sentinel_reached",
            NarrativeEvent::SessionReset { .. } => "session_reset",
        }
    }
}

/// Failure reported by an observer. Never affects engine state.
#[derive(Debug, Error)]
#[error("observer '{observer}' failed: {message}")]
pub struct ObserverError {
    pub observer: String,
    pub message: String,
}

impl ObserverError {
    pub fn new(observer: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            observer: observer.into(),
            message: message.into(),
        }
    }
}

/// Receives narrative events. Implementations must not block.
pub trait NarrativeObserver: Send + Sync {
    fn notify(&self, event: &NarrativeEvent) -> Result<(), ObserverError>;
}

/// Keeps every event it receives in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<NarrativeEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far.
    pub fn events(&self) -> Vec<NarrativeEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl NarrativeObserver for RecordingObserver {
    fn notify(&self, event: &NarrativeEvent) -> Result<(), ObserverError> {
        self.events
            .lock()
            .map_err(|_| ObserverError::new("recording", "event buffer poisoned"))?
            .push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_observer() {
        let observer = RecordingObserver::new();
        let session = SessionId::new();

        observer
            .notify(&NarrativeEvent::SessionReset {
                session,
                start: "a".to_string(),
            })
            .unwrap();

        let events = observer.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].session(), session);
        assert_eq!(events[0].name(), "session_reset");

        observer.clear();
        assert!(observer.events().is_empty());
    }

    #[test]
    fn test_session_ids_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn test_observer_error_display() {
        let err = ObserverError::new("telemetry", "queue full");
        assert_eq!(err.to_string(), "observer 'telemetry' failed: queue full");
    }
}
