use crate::providers::Message;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A chat message as persisted for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Session the message belongs to
    pub session_id: String,
    /// The role-tagged message
    pub message: Message,
    /// Replay order key in Unix seconds; strictly increasing per session
    pub timestamp: f64,
}

impl StoredMessage {
    /// Wall-clock time of the write
    pub fn recorded_at(&self) -> DateTime<Utc> {
        seconds_to_datetime(self.timestamp)
    }
}

/// Summary of a stored chat session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    /// Session identifier
    pub session_id: String,
    /// Number of stored messages
    pub message_count: usize,
    /// Timestamp of the first message
    pub first_timestamp: f64,
    /// Timestamp of the latest message
    pub last_timestamp: f64,
}

impl StoredSession {
    /// When the session's first message was written
    pub fn started_at(&self) -> DateTime<Utc> {
        seconds_to_datetime(self.first_timestamp)
    }

    /// When the session was last written to
    pub fn last_active(&self) -> DateTime<Utc> {
        seconds_to_datetime(self.last_timestamp)
    }
}

fn seconds_to_datetime(seconds: f64) -> DateTime<Utc> {
    let micros = (seconds * 1_000_000.0).round() as i64;
    Utc.timestamp_micros(micros)
        .single()
        .unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorded_at_converts_seconds() {
        let stored = StoredMessage {
            session_id: "s".to_string(),
            message: Message::human("hi"),
            timestamp: 1_700_000_000.5,
        };
        let at = stored.recorded_at();
        assert_eq!(at.timestamp(), 1_700_000_000);
        assert_eq!(at.timestamp_subsec_millis(), 500);
    }
}
