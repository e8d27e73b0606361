//! Port for structured session event logging.
//!
//! Defines the [`SessionEventLogger`] trait for recording what happened in a
//! session (creation, eliminations, skips, forfeits, status changes) to an
//! audit log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the session
//! timeline in a machine-readable format (JSONL).

use chrono::{DateTime, Utc};
use decider_domain::{HistoryEntry, SessionId, SessionStatus};
use serde_json::{Value, json};

/// A structured session event.
pub struct SessionEvent {
    /// Event type identifier (e.g. "session_created", "item_eliminated").
    pub event_type: &'static str,
    pub session_id: SessionId,
    /// When the event happened in session time.
    pub at: DateTime<Utc>,
    /// Event-specific fields.
    pub payload: Value,
}

impl SessionEvent {
    pub fn new(
        event_type: &'static str,
        session_id: SessionId,
        at: DateTime<Utc>,
        payload: Value,
    ) -> Self {
        Self {
            event_type,
            session_id,
            at,
            payload,
        }
    }

    /// Event for one appended history entry.
    pub fn from_history(session_id: SessionId, entry: &HistoryEntry) -> Self {
        let payload = serde_json::to_value(entry).unwrap_or(Value::Null);
        Self::new(entry.kind(), session_id, entry.timestamp, payload)
    }

    pub fn status_changed(
        session_id: SessionId,
        from: SessionStatus,
        to: SessionStatus,
        at: DateTime<Utc>,
    ) -> Self {
        Self::new(
            "status_changed",
            session_id,
            at,
            json!({ "from": from, "to": to }),
        )
    }
}

/// Port for logging session events.
///
/// `log` is synchronous and infallible; a failing sink must not break a turn.
pub trait SessionEventLogger: Send + Sync {
    fn log(&self, event: SessionEvent);
}

/// No-op implementation for tests and when event logging is disabled.
pub struct NoSessionEventLogger;

impl SessionEventLogger for NoSessionEventLogger {
    fn log(&self, _event: SessionEvent) {}
}
