//! Wire messages exchanged with the streaming transcription service.
//!
//! Outbound audio is raw binary PCM and never JSON-wrapped; only control
//! and event messages appear here.

use serde::{Deserialize, Serialize};

/// Messages received from the transcription service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum InboundMessage {
    /// Session established; carries the service-side session identifier.
    Begin {
        id: String,
        #[serde(default)]
        expires_at: Option<i64>,
    },
    /// Transcript for the turn in progress. `turn_is_formatted` marks the
    /// final, immutable form.
    Turn {
        #[serde(default)]
        transcript: String,
        #[serde(default)]
        turn_is_formatted: bool,
        #[serde(default)]
        end_of_turn: bool,
    },
    /// Session ended by the service; reports total audio processed.
    Termination {
        #[serde(default)]
        audio_duration_seconds: Option<f64>,
    },
}

impl InboundMessage {
    /// Parses a message, returning `None` for unknown message types or
    /// malformed payloads (both are ignored by the receiver lane).
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }
}

/// Control messages sent to the transcription service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum OutboundMessage {
    /// Request an orderly session termination.
    Terminate,
}

impl OutboundMessage {
    /// Serialize to the wire JSON form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
